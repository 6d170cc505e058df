use crate::error::ConsoleResult;
use crate::types::catalog::{CatalogStats, SubscriptionType, TypePayload};
use crate::types::notification::{NotificationRequest, SendReport};
use crate::types::push::SubscribeRequest;

pub trait Backend {
    fn list_types(&self) -> impl Future<Output = ConsoleResult<Vec<SubscriptionType>>>;

    fn type_stats(&self) -> impl Future<Output = ConsoleResult<CatalogStats>>;

    fn create_type(&self, payload: &TypePayload) -> impl Future<Output = ConsoleResult<()>>;

    fn update_type(
        &self,
        key: &str,
        payload: &TypePayload,
    ) -> impl Future<Output = ConsoleResult<()>>;

    fn delete_type(&self, key: &str) -> impl Future<Output = ConsoleResult<()>>;

    fn vapid_public_key(&self) -> impl Future<Output = ConsoleResult<String>>;

    fn subscribe(&self, request: &SubscribeRequest) -> impl Future<Output = ConsoleResult<()>>;

    fn send_notification(
        &self,
        request: &NotificationRequest,
    ) -> impl Future<Output = ConsoleResult<SendReport>>;
}
