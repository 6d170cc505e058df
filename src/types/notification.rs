use serde::{Deserialize, Serialize};
use std::fmt;

pub const ALL_TARGET: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SendTarget {
    All,
    Type(String),
}

impl From<String> for SendTarget {
    fn from(value: String) -> Self {
        if value == ALL_TARGET {
            SendTarget::All
        } else {
            SendTarget::Type(value)
        }
    }
}

impl From<&str> for SendTarget {
    fn from(value: &str) -> Self {
        SendTarget::from(value.to_string())
    }
}

impl From<SendTarget> for String {
    fn from(value: SendTarget) -> Self {
        match value {
            SendTarget::All => ALL_TARGET.to_string(),
            SendTarget::Type(key) => key,
        }
    }
}

impl fmt::Display for SendTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendTarget::All => f.write_str(ALL_TARGET),
            SendTarget::Type(key) => f.write_str(key),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    #[serde(rename = "targetType")]
    pub target: SendTarget,
    pub title: String,
    pub body: String,
    pub url: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendReport {
    #[serde(default)]
    pub sent: u64,
    #[serde(default)]
    pub failed: u64,
    #[serde(default)]
    pub deleted: u64,
}
