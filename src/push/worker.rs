use serde::Serialize;
use serde_json::{Map, Number, Value, json};

use crate::controls::PermissionState;

pub const FALLBACK_TITLE: &str = "New notification";
pub const DEFAULT_TITLE: &str = "Push notification";
pub const DEFAULT_BODY: &str = "...";
pub const DEFAULT_ICON: &str = "/icons/icon-192.png";
pub const DEFAULT_BADGE: &str = "/icons/badge.png";
pub const DEFAULT_URL: &str = "/";
pub const VIBRATION_PATTERN: [u32; 3] = [200, 100, 200];
pub const OPEN_ACTION: &str = "open";
pub const CLOSE_ACTION: &str = "close";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationDisplay {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    pub data: Value,
    pub actions: Vec<NotificationAction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "url", rename_all = "snake_case")]
pub enum ClickOutcome {
    Dismissed,
    OpenWindow(String),
}

pub fn default_actions() -> Vec<NotificationAction> {
    vec![
        NotificationAction {
            action: OPEN_ACTION.to_string(),
            title: "Open".to_string(),
        },
        NotificationAction {
            action: CLOSE_ACTION.to_string(),
            title: "Close".to_string(),
        },
    ]
}

pub fn handle_push(
    permission: PermissionState,
    payload: Option<&[u8]>,
) -> Option<NotificationDisplay> {
    if permission != PermissionState::Granted {
        return None;
    }

    let fields = match payload {
        Some(bytes) => parse_payload(bytes),
        None => Map::new(),
    };

    Some(NotificationDisplay {
        title: text_field(&fields, "title").unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        body: text_field(&fields, "body").unwrap_or_else(|| DEFAULT_BODY.to_string()),
        icon: text_field(&fields, "icon").unwrap_or_else(|| DEFAULT_ICON.to_string()),
        badge: text_field(&fields, "badge").unwrap_or_else(|| DEFAULT_BADGE.to_string()),
        vibrate: VIBRATION_PATTERN.to_vec(),
        data: match fields.get("data") {
            Some(data) if is_truthy(data) => data.clone(),
            _ => json!({ "url": DEFAULT_URL }),
        },
        actions: default_actions(),
    })
}

pub fn handle_click(action: Option<&str>, data: Option<&Value>) -> ClickOutcome {
    if action == Some(CLOSE_ACTION) {
        return ClickOutcome::Dismissed;
    }
    let url = data
        .and_then(|data| data.get("url"))
        .filter(|url| is_truthy(url))
        .map(|url| match url {
            Value::String(url) => url.clone(),
            other => other.to_string(),
        })
        .unwrap_or_else(|| DEFAULT_URL.to_string());
    ClickOutcome::OpenWindow(url)
}

fn parse_payload(bytes: &[u8]) -> Map<String, Value> {
    let text = String::from_utf8_lossy(bytes);
    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(fields)) => fields,
        Ok(_) => Map::new(),
        Err(_) => {
            let mut fields = Map::new();
            fields.insert("title".to_string(), Value::from(FALLBACK_TITLE));
            fields.insert("body".to_string(), Value::from(text.into_owned()));
            fields
        }
    }
}

fn text_field(fields: &Map<String, Value>, name: &str) -> Option<String> {
    match fields.get(name)? {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number) if number.as_f64() != Some(0.0) => Some(number_text(number)),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

// Whole floats print without a fraction, as `String(42.0)` does in the worker script.
fn number_text(number: &Number) -> String {
    match number.as_f64() {
        Some(value) if number.is_f64() && value.fract() == 0.0 && value.abs() < 1e15 => {
            format!("{value:.0}")
        }
        _ => number.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(text) => !text.is_empty(),
        Value::Number(number) => number.as_f64() != Some(0.0),
        _ => true,
    }
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;

    #[test]
    fn handle_push__should_drop_message_without_permission() {
        for permission in [PermissionState::Default, PermissionState::Denied] {
            assert_eq!(handle_push(permission, Some(&b"{}"[..])), None);
        }
    }

    #[test]
    fn handle_push__should_fall_back_to_text_body_for_unparsable_payload() {
        // When
        let display =
            handle_push(PermissionState::Granted, Some("plain text, not json".as_bytes()))
                .expect("display");

        // Then
        assert_eq!(display.title, FALLBACK_TITLE);
        assert_eq!(display.body, "plain text, not json");
        assert_eq!(display.data, json!({ "url": "/" }));
    }

    #[test]
    fn handle_push__should_use_payload_fields() {
        // Given
        let payload = json!({
            "title": "Release",
            "body": "v2 is out",
            "icon": "/icons/release.png",
            "data": { "url": "/changelog" }
        })
        .to_string();

        // When
        let display =
            handle_push(PermissionState::Granted, Some(payload.as_bytes())).expect("display");

        // Then
        assert_eq!(display.title, "Release");
        assert_eq!(display.body, "v2 is out");
        assert_eq!(display.icon, "/icons/release.png");
        assert_eq!(display.badge, DEFAULT_BADGE);
        assert_eq!(display.vibrate, vec![200, 100, 200]);
        assert_eq!(display.data, json!({ "url": "/changelog" }));
        assert_eq!(display.actions, default_actions());
    }

    #[test]
    fn handle_push__should_substitute_defaults_for_empty_or_missing_fields() {
        // When
        let from_empty = handle_push(PermissionState::Granted, Some(&br#"{"title":""}"#[..]))
            .expect("display");
        let from_none = handle_push(PermissionState::Granted, None).expect("display");

        // Then
        for display in [from_empty, from_none] {
            assert_eq!(display.title, DEFAULT_TITLE);
            assert_eq!(display.body, DEFAULT_BODY);
            assert_eq!(display.icon, DEFAULT_ICON);
        }
    }

    #[test]
    fn handle_click__should_only_dismiss_on_close_action() {
        // Given
        let data = json!({ "url": "/inbox" });

        // Then
        assert_eq!(
            handle_click(Some(CLOSE_ACTION), Some(&data)),
            ClickOutcome::Dismissed
        );
        assert_eq!(
            handle_click(Some(OPEN_ACTION), Some(&data)),
            ClickOutcome::OpenWindow("/inbox".to_string())
        );
    }

    #[test]
    fn handle_click__should_default_to_root_url() {
        assert_eq!(
            handle_click(None, None),
            ClickOutcome::OpenWindow("/".to_string())
        );
        assert_eq!(
            handle_click(None, Some(&json!({ "url": "" }))),
            ClickOutcome::OpenWindow("/".to_string())
        );
    }

    #[test]
    fn handle_push__should_only_accept_text_like_fields() {
        // Given
        let payload = json!({
            "title": { "nested": true },
            "body": 42.0,
            "icon": ["a", "b"],
            "badge": 0
        })
        .to_string();

        // When
        let display =
            handle_push(PermissionState::Granted, Some(payload.as_bytes())).expect("display");

        // Then
        assert_eq!(display.title, DEFAULT_TITLE);
        assert_eq!(display.body, "42");
        assert_eq!(display.icon, DEFAULT_ICON);
        assert_eq!(display.badge, DEFAULT_BADGE);
    }
}
