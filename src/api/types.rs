use super::ApiClient;
use crate::error::ConsoleResult;
use crate::types::catalog::{CatalogStats, SubscriptionType, TypeCatalog, TypePayload};
use reqwest::Method;

impl ApiClient {
    pub async fn fetch_types(&self) -> ConsoleResult<Vec<SubscriptionType>> {
        let catalog: TypeCatalog = self.get(&["api", "types"]).await?;
        Ok(catalog.types)
    }

    pub async fn fetch_type_stats(&self) -> ConsoleResult<CatalogStats> {
        self.get(&["api", "types", "stats"]).await
    }

    pub async fn post_type(&self, payload: &TypePayload) -> ConsoleResult<()> {
        self.send(Method::POST, &["api", "types"], Some(payload))
            .await?;
        Ok(())
    }

    pub async fn put_type(&self, key: &str, payload: &TypePayload) -> ConsoleResult<()> {
        self.send(Method::PUT, &["api", "types", key], Some(payload))
            .await?;
        Ok(())
    }

    pub async fn remove_type(&self, key: &str) -> ConsoleResult<()> {
        self.send(Method::DELETE, &["api", "types", key], None::<&()>)
            .await?;
        Ok(())
    }
}
