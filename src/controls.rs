use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    #[default]
    Default,
    Granted,
    Denied,
}

impl PermissionState {
    pub fn label(self) -> &'static str {
        match self {
            PermissionState::Granted => "Granted",
            PermissionState::Denied => "Denied",
            PermissionState::Default => "Not requested",
        }
    }
}

impl fmt::Display for PermissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PermissionState::Default => "default",
            PermissionState::Granted => "granted",
            PermissionState::Denied => "denied",
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActionState {
    pub subscribe: bool,
    pub unsubscribe: bool,
    pub send: bool,
}

impl ActionState {
    pub fn derive(permission: PermissionState, has_subscription: bool) -> Self {
        match permission {
            PermissionState::Granted => Self {
                subscribe: !has_subscription,
                unsubscribe: has_subscription,
                send: has_subscription,
            },
            PermissionState::Default => Self {
                subscribe: true,
                unsubscribe: false,
                send: false,
            },
            PermissionState::Denied => Self::default(),
        }
    }
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;

    fn actions(subscribe: bool, unsubscribe: bool, send: bool) -> ActionState {
        ActionState {
            subscribe,
            unsubscribe,
            send,
        }
    }

    #[test]
    fn derive__should_enable_unsubscribe_and_send_when_granted_and_subscribed() {
        assert_eq!(
            ActionState::derive(PermissionState::Granted, true),
            actions(false, true, true)
        );
    }

    #[test]
    fn derive__should_only_enable_subscribe_when_granted_without_subscription() {
        assert_eq!(
            ActionState::derive(PermissionState::Granted, false),
            actions(true, false, false)
        );
    }

    #[test]
    fn derive__should_ignore_subscription_when_not_requested() {
        for has_subscription in [true, false] {
            assert_eq!(
                ActionState::derive(PermissionState::Default, has_subscription),
                actions(true, false, false)
            );
        }
    }

    #[test]
    fn derive__should_disable_everything_when_denied() {
        for has_subscription in [true, false] {
            assert_eq!(
                ActionState::derive(PermissionState::Denied, has_subscription),
                actions(false, false, false)
            );
        }
    }

    #[test]
    fn permission_state__should_use_platform_names_on_the_wire() {
        // When
        let parsed: PermissionState = serde_json::from_str("\"granted\"").expect("parse");

        // Then
        assert_eq!(parsed, PermissionState::Granted);
        assert_eq!(
            serde_json::to_string(&PermissionState::Default).expect("serialize"),
            "\"default\""
        );
    }
}
