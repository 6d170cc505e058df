use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::{ConsoleError, ConsoleResult};

pub const LOCAL_SERVER_URL: &str = "http://localhost:5000";
pub const PRODUCTION_SERVER_URL: &str = "https://pwa-791i.onrender.com";
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_STATE_FILE: &str = "pushdesk-state.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Local,
    GithubPages,
    Render,
    Unknown,
}

impl Environment {
    pub fn detect(hostname: &str) -> Self {
        let hostname = hostname.trim();
        if hostname == "localhost" || hostname == "127.0.0.1" {
            Environment::Local
        } else if hostname.contains("github.io") {
            Environment::GithubPages
        } else if hostname.contains("onrender.com") {
            Environment::Render
        } else {
            Environment::Unknown
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::GithubPages => "GitHub Pages",
            Environment::Render => "Render",
            Environment::Unknown => "unknown",
        }
    }
}

pub fn server_url_for_host(hostname: &str) -> String {
    match Environment::detect(hostname) {
        Environment::Local => LOCAL_SERVER_URL.to_string(),
        Environment::Render => format!("https://{}", hostname.trim()),
        Environment::GithubPages | Environment::Unknown => PRODUCTION_SERVER_URL.to_string(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub server_url: Option<String>,
    pub host: Option<String>,
    pub state_path: Option<PathBuf>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> ConsoleResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> ConsoleResult<Self> {
        toml::from_str(contents).map_err(|err| ConsoleError::Config(err.to_string()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub server_url: Option<String>,
    pub host: Option<String>,
    pub state_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub server_url: Url,
    pub environment: Environment,
    pub state_path: PathBuf,
}

impl ClientConfig {
    pub fn resolve(overrides: Overrides, file: ConfigFile) -> ConsoleResult<Self> {
        let host = overrides
            .host
            .or(file.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let environment = Environment::detect(&host);
        let raw_url = overrides
            .server_url
            .or(file.server_url)
            .unwrap_or_else(|| server_url_for_host(&host));
        let server_url = Url::parse(raw_url.trim()).map_err(|err| {
            ConsoleError::Config(format!("invalid server url '{raw_url}': {err}"))
        })?;
        if server_url.cannot_be_a_base() {
            return Err(ConsoleError::Config(format!(
                "server url '{raw_url}' cannot be used as a base"
            )));
        }
        let state_path = overrides
            .state_path
            .or(file.state_path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_FILE));

        Ok(Self {
            server_url,
            environment,
            state_path,
        })
    }
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;

    #[test]
    fn server_url_for_host__should_pick_environment_url() {
        assert_eq!(server_url_for_host("localhost"), LOCAL_SERVER_URL);
        assert_eq!(server_url_for_host("127.0.0.1"), LOCAL_SERVER_URL);
        assert_eq!(server_url_for_host("team.github.io"), PRODUCTION_SERVER_URL);
        assert_eq!(
            server_url_for_host("console.onrender.com"),
            "https://console.onrender.com"
        );
        assert_eq!(server_url_for_host("example.org"), PRODUCTION_SERVER_URL);
    }

    #[test]
    fn resolve__should_default_to_local_server() {
        // When
        let config =
            ClientConfig::resolve(Overrides::default(), ConfigFile::default()).expect("config");

        // Then
        assert_eq!(config.environment, Environment::Local);
        assert_eq!(config.server_url.as_str(), "http://localhost:5000/");
        assert_eq!(config.state_path, PathBuf::from(DEFAULT_STATE_FILE));
    }

    #[test]
    fn resolve__should_prefer_overrides_over_file() {
        // Given
        let file = ConfigFile::parse(
            r#"
server_url = "https://push.example.com"
host = "push.example.com"
state_path = "/tmp/file-state.json"
"#,
        )
        .expect("parse config");
        let overrides = Overrides {
            server_url: Some("http://127.0.0.1:9000".to_string()),
            ..Overrides::default()
        };

        // When
        let config = ClientConfig::resolve(overrides, file).expect("config");

        // Then
        assert_eq!(config.server_url.as_str(), "http://127.0.0.1:9000/");
        assert_eq!(config.environment, Environment::Unknown);
        assert_eq!(config.state_path, PathBuf::from("/tmp/file-state.json"));
    }

    #[test]
    fn resolve__should_reject_invalid_url() {
        // Given
        let overrides = Overrides {
            server_url: Some("not a url".to_string()),
            ..Overrides::default()
        };

        // Then
        assert!(ClientConfig::resolve(overrides, ConfigFile::default()).is_err());
    }

    #[test]
    fn parse__should_reject_unknown_keys() {
        assert!(ConfigFile::parse("serverurl = \"x\"").is_err());
    }
}
