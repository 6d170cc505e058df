use thiserror::Error;

pub type ConsoleResult<T> = Result<T, ConsoleError>;

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("HTTP error! status: {status}, detail: {}", detail_or_unknown(.detail))]
    Http { status: u16, detail: Option<String> },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("notification permission was not granted")]
    PermissionDenied,
    #[error("invalid application server key: {0}")]
    InvalidServerKey(String),
    #[error("push platform error: {0}")]
    Platform(String),
    #[error("failed to render view: {0}")]
    Render(#[from] askama::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ConsoleError {
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ConsoleError::Http { detail, .. } => {
                detail.clone().unwrap_or_else(|| fallback.to_string())
            }
            other => other.to_string(),
        }
    }
}

fn detail_or_unknown(detail: &Option<String>) -> &str {
    detail.as_deref().unwrap_or("Unknown error")
}
