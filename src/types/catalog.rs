use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionType {
    pub type_key: String,
    pub type_name: String,
    #[serde(default)]
    pub type_description: Option<String>,
    #[serde(default)]
    pub type_color: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeCatalog {
    #[serde(default)]
    pub types: Vec<SubscriptionType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeStats {
    pub type_key: String,
    pub type_name: String,
    #[serde(default)]
    pub type_color: Option<String>,
    #[serde(default)]
    pub subscriber_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogStats {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub types: Vec<TypeStats>,
}

impl CatalogStats {
    pub fn subscribers_for(&self, type_key: &str) -> u64 {
        self.types
            .iter()
            .find(|stats| stats.type_key == type_key)
            .map(|stats| stats.subscriber_count)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypePayload {
    pub type_key: String,
    pub type_name: String,
    pub type_description: String,
    pub type_color: String,
}
