use base64::{URL_SAFE_NO_PAD, encode_config};
use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::{debug, error, info};

use crate::controls::{ActionState, PermissionState};
use crate::error::{ConsoleError, ConsoleResult};
use crate::ports;
use crate::push::is_uncompressed_p256_point;
use crate::state::PlatformState;
use crate::types::push::PushSubscription;

// Subscriptions are not minted locally: the endpoint and keys come from a
// real browser and are handed in with `offer_subscription`.
pub struct StoredPushPlatform {
    path: PathBuf,
    state: PlatformState,
    offered: Option<PushSubscription>,
    auto_grant: bool,
}

impl StoredPushPlatform {
    pub fn open(path: PathBuf) -> ConsoleResult<Self> {
        let state = PlatformState::load(&path)?;
        Ok(Self {
            path,
            state,
            offered: None,
            auto_grant: false,
        })
    }

    pub fn with_auto_grant(mut self, auto_grant: bool) -> Self {
        self.auto_grant = auto_grant;
        self
    }

    pub fn offer_subscription(&mut self, subscription: PushSubscription) {
        self.offered = Some(subscription);
    }

    pub fn state(&self) -> &PlatformState {
        &self.state
    }

    fn save(&self) -> ConsoleResult<()> {
        self.state.save(&self.path)?;
        Ok(())
    }
}

impl ports::PushPlatform for StoredPushPlatform {
    fn supports_push(&self) -> bool {
        true
    }

    fn permission(&self) -> PermissionState {
        self.state.permission
    }

    async fn request_permission(&mut self) -> PermissionState {
        if self.state.permission != PermissionState::Default {
            return self.state.permission;
        }
        let granted = self.auto_grant || prompt_yes_no("Allow notifications from this console?");
        self.state.permission = if granted {
            PermissionState::Granted
        } else {
            PermissionState::Denied
        };
        if let Err(err) = self.save() {
            error!("failed to persist permission decision: {err}");
        }
        self.state.permission
    }

    async fn register_worker(&mut self, script_path: &str) -> ConsoleResult<()> {
        self.state.worker_script = Some(script_path.to_string());
        self.save()
    }

    async fn get_subscription(&self) -> ConsoleResult<Option<PushSubscription>> {
        Ok(self.state.subscription.clone())
    }

    async fn subscribe(
        &mut self,
        application_server_key: &[u8],
    ) -> ConsoleResult<PushSubscription> {
        if self.state.worker_script.is_none() {
            return Err(ConsoleError::Platform(
                "no active service worker registration".to_string(),
            ));
        }
        if self.state.permission != PermissionState::Granted {
            return Err(ConsoleError::PermissionDenied);
        }
        if !is_uncompressed_p256_point(application_server_key) {
            return Err(ConsoleError::InvalidServerKey(format!(
                "expected a 65-byte uncompressed P-256 point, got {} bytes",
                application_server_key.len()
            )));
        }

        let encoded_key = encode_config(application_server_key, URL_SAFE_NO_PAD);
        if let Some(existing) = &self.state.subscription {
            if self.state.application_server_key.as_deref() == Some(encoded_key.as_str()) {
                debug!(endpoint = %existing.endpoint, "reusing active subscription");
                return Ok(existing.clone());
            }
            return Err(ConsoleError::Platform(
                "a subscription with a different application server key already exists"
                    .to_string(),
            ));
        }

        let subscription = self.offered.take().ok_or_else(|| {
            ConsoleError::Platform(
                "no push endpoint available; pass --endpoint, --p256dh and --auth".to_string(),
            )
        })?;
        self.state.application_server_key = Some(encoded_key);
        self.state.subscription = Some(subscription.clone());
        self.save()?;
        info!(endpoint = %subscription.endpoint, "push subscription stored");
        Ok(subscription)
    }

    async fn unsubscribe(&mut self, subscription: &PushSubscription) -> ConsoleResult<bool> {
        let matches = self
            .state
            .subscription
            .as_ref()
            .is_some_and(|active| active.endpoint == subscription.endpoint);
        if !matches {
            return Ok(false);
        }
        self.state.subscription = None;
        self.state.application_server_key = None;
        self.save()?;
        Ok(true)
    }
}

#[derive(Debug, Default)]
pub struct TerminalConsole {
    assume_yes: bool,
    regions: BTreeMap<ports::Region, String>,
    permission: PermissionState,
    actions: ActionState,
}

impl TerminalConsole {
    pub fn new(assume_yes: bool) -> Self {
        Self {
            assume_yes,
            ..Self::default()
        }
    }

    pub fn region(&self, region: ports::Region) -> Option<&str> {
        self.regions.get(&region).map(String::as_str)
    }

    pub fn permission(&self) -> PermissionState {
        self.permission
    }

    pub fn actions(&self) -> ActionState {
        self.actions
    }
}

impl ports::Console for TerminalConsole {
    fn render(&mut self, region: ports::Region, html: &str) {
        debug!(region = region.element_id(), "region re-rendered");
        self.regions.insert(region, html.to_string());
    }

    fn show_permission(&mut self, permission: PermissionState) {
        self.permission = permission;
    }

    fn set_actions(&mut self, actions: ActionState) {
        self.actions = actions;
    }

    fn show_status(&mut self, message: &str) {
        println!("{message}");
    }

    fn alert(&mut self, message: &str) {
        println!("{message}");
    }

    fn confirm(&mut self, message: &str) -> bool {
        if self.assume_yes {
            println!("{message}");
            return true;
        }
        prompt_yes_no(message)
    }
}

fn prompt_yes_no(message: &str) -> bool {
    print!("{message} [y/N] ");
    if std::io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    match std::io::stdin().lock().read_line(&mut answer) {
        Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}
