use super::ApiClient;
use crate::error::ConsoleResult;
use crate::types::notification::{NotificationRequest, SendReport};
use crate::types::push::{PublicKeyResponse, SubscribeRequest};
use reqwest::Method;

impl ApiClient {
    pub async fn fetch_vapid_public_key(&self) -> ConsoleResult<String> {
        let response: PublicKeyResponse = self.get(&["api", "vapid-public-key"]).await?;
        Ok(response.public_key)
    }

    pub async fn post_subscription(&self, request: &SubscribeRequest) -> ConsoleResult<()> {
        self.send(Method::POST, &["api", "subscribe"], Some(request))
            .await?;
        Ok(())
    }

    pub async fn post_notification(
        &self,
        request: &NotificationRequest,
    ) -> ConsoleResult<SendReport> {
        let text = self
            .send(Method::POST, &["api", "send-notification"], Some(request))
            .await?;
        Self::decode(&text)
    }
}
