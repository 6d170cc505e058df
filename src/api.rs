use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use crate::error::{ConsoleError, ConsoleResult};
use crate::ports::Backend;
use crate::types::catalog::{CatalogStats, SubscriptionType, TypePayload};
use crate::types::notification::{NotificationRequest, SendReport};
use crate::types::push::SubscribeRequest;

pub mod push;
pub mod types;

#[derive(Clone, Debug)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(client: reqwest::Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    async fn get<T>(&self, segments: &[&str]) -> ConsoleResult<T>
    where
        T: DeserializeOwned,
    {
        let text = self.send(Method::GET, segments, None::<&()>).await?;
        Self::decode(&text)
    }

    async fn send<P>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&P>,
    ) -> ConsoleResult<String>
    where
        P: Serialize + ?Sized,
    {
        let url = self.endpoint(segments)?;
        debug!("sending {method} request to {url}");
        let mut request = self.client.request(method, url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        Self::response(status, text, &url)
    }

    fn response(status: StatusCode, text: String, url: &Url) -> ConsoleResult<String> {
        if status.is_success() {
            return Ok(text);
        }
        info!(%url, status = status.as_u16(), body = %text, "api error");
        Err(ConsoleError::Http {
            status: status.as_u16(),
            detail: error_detail(&text),
        })
    }

    fn decode<T>(text: &str) -> ConsoleResult<T>
    where
        T: DeserializeOwned,
    {
        serde_json::from_str(text).map_err(|err| {
            info!("failed to deserialize api response: {err} from {text}");
            ConsoleError::Decode(err)
        })
    }

    fn endpoint(&self, segments: &[&str]) -> ConsoleResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ConsoleError::Config(format!("'{}' cannot be a base url", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn error_detail(text: &str) -> Option<String> {
    let body: Value = serde_json::from_str(text).ok()?;
    match body.get("detail")? {
        Value::Null => None,
        Value::String(detail) => Some(detail.clone()),
        other => Some(other.to_string()),
    }
}

impl Backend for ApiClient {
    async fn list_types(&self) -> ConsoleResult<Vec<SubscriptionType>> {
        self.fetch_types().await
    }

    async fn type_stats(&self) -> ConsoleResult<CatalogStats> {
        self.fetch_type_stats().await
    }

    async fn create_type(&self, payload: &TypePayload) -> ConsoleResult<()> {
        self.post_type(payload).await
    }

    async fn update_type(&self, key: &str, payload: &TypePayload) -> ConsoleResult<()> {
        self.put_type(key, payload).await
    }

    async fn delete_type(&self, key: &str) -> ConsoleResult<()> {
        self.remove_type(key).await
    }

    async fn vapid_public_key(&self) -> ConsoleResult<String> {
        self.fetch_vapid_public_key().await
    }

    async fn subscribe(&self, request: &SubscribeRequest) -> ConsoleResult<()> {
        self.post_subscription(request).await
    }

    async fn send_notification(&self, request: &NotificationRequest) -> ConsoleResult<SendReport> {
        self.post_notification(request).await
    }
}
