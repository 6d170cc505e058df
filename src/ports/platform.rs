use crate::controls::PermissionState;
use crate::error::ConsoleResult;
use crate::types::push::PushSubscription;

pub trait PushPlatform {
    fn supports_push(&self) -> bool;

    fn permission(&self) -> PermissionState;

    fn request_permission(&mut self) -> impl Future<Output = PermissionState>;

    fn register_worker(&mut self, script_path: &str) -> impl Future<Output = ConsoleResult<()>>;

    fn get_subscription(&self) -> impl Future<Output = ConsoleResult<Option<PushSubscription>>>;

    fn subscribe(
        &mut self,
        application_server_key: &[u8],
    ) -> impl Future<Output = ConsoleResult<PushSubscription>>;

    fn unsubscribe(
        &mut self,
        subscription: &PushSubscription,
    ) -> impl Future<Output = ConsoleResult<bool>>;
}
