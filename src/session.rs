use askama::Template;
use tracing::{debug, error, info, warn};

use crate::catalog::{FormIssue, TypeEditor, TypeSubmission};
use crate::controls::{ActionState, PermissionState};
use crate::error::{ConsoleError, ConsoleResult};
use crate::ports::{Backend, Console, PushPlatform, Region};
use crate::push::decode_application_server_key;
use crate::templates::{
    STATS_ERROR_HTML, StatsTemplate, SubscribeChoicesTemplate, TargetChoicesTemplate,
    TypeCardsTemplate,
};
use crate::types::catalog::{CatalogStats, SubscriptionType};
use crate::types::notification::{NotificationRequest, SendReport, SendTarget};
use crate::types::push::{PushSubscription, SubscribeRequest};

pub const SERVICE_WORKER_PATH: &str = "/service-worker.js";
pub const DEFAULT_MESSAGE_TITLE: &str = "Notification";
pub const DEFAULT_MESSAGE_BODY: &str = "Empty message";
pub const NOTIFICATION_URL: &str = "/";
pub const UNSUPPORTED_MESSAGE: &str = "This client does not support push notifications";
pub const WORKER_FAILED_MESSAGE: &str = "Service worker registration failed";
pub const NO_TYPES_MESSAGE: &str = "Create at least one subscription type first";
pub const INCOMPLETE_TYPE_MESSAGE: &str = "Fill in the type key and name";
pub const INVALID_COLOR_MESSAGE: &str = "Type color must look like #rgb or #rrggbb";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscribeOutcome {
    Subscribed(PushSubscription),
    MissingType,
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Sent(SendReport),
    Cancelled,
    NoTarget,
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Created,
    Updated,
    Incomplete,
    InvalidColor,
    NoEditor,
}

pub struct ClientSession<B, P, C> {
    backend: B,
    platform: P,
    console: C,
    registered: bool,
    subscription: Option<PushSubscription>,
    catalog: Vec<SubscriptionType>,
    stats: Option<CatalogStats>,
    selected_type: Option<String>,
    editor: Option<TypeEditor>,
}

impl<B, P, C> ClientSession<B, P, C>
where
    B: Backend,
    P: PushPlatform,
    C: Console,
{
    pub fn new(backend: B, platform: P, console: C) -> Self {
        Self {
            backend,
            platform,
            console,
            registered: false,
            subscription: None,
            catalog: Vec::new(),
            stats: None,
            selected_type: None,
            editor: None,
        }
    }

    pub async fn start(&mut self) {
        if !self.platform.supports_push() {
            self.console.show_status(UNSUPPORTED_MESSAGE);
            return;
        }
        if let Err(err) = self.load_types().await {
            debug!("initial catalog load failed: {err}");
        }
        self.register_worker().await;
    }

    pub async fn register_worker(&mut self) {
        match self.platform.register_worker(SERVICE_WORKER_PATH).await {
            Ok(()) => {
                info!("service worker registered");
                self.registered = true;
                self.update_ui().await;
            }
            Err(err) => {
                error!("service worker registration failed: {err}");
                self.console.show_status(WORKER_FAILED_MESSAGE);
            }
        }
    }

    pub async fn update_ui(&mut self) -> ActionState {
        let permission = self.platform.permission();
        if self.registered {
            match self.platform.get_subscription().await {
                Ok(subscription) => self.subscription = subscription,
                Err(err) => error!("failed to read push subscription: {err}"),
            }
        }
        let actions = self.current_actions();
        self.console.show_permission(permission);
        self.console.set_actions(actions);
        debug!(?permission, ?actions, "ui updated");
        actions
    }

    pub async fn on_permission_change(&mut self) -> ActionState {
        self.update_ui().await
    }

    pub async fn load_types(&mut self) -> ConsoleResult<()> {
        let types = match self.backend.list_types().await {
            Ok(types) => types,
            Err(err) => {
                error!("failed to load subscription types: {err}");
                return Err(err);
            }
        };
        info!(count = types.len(), "subscription types loaded");
        self.catalog = types;
        let selection_valid = self
            .selected_type
            .as_deref()
            .is_some_and(|key| self.catalog.iter().any(|ty| ty.type_key == key));
        if !selection_valid {
            self.selected_type = self.catalog.first().map(|ty| ty.type_key.clone());
        }
        self.render_catalog()?;
        if let Err(err) = self.load_stats().await {
            debug!("stats refresh after catalog load failed: {err}");
        }
        Ok(())
    }

    pub async fn load_stats(&mut self) -> ConsoleResult<CatalogStats> {
        match self.backend.type_stats().await {
            Ok(stats) => {
                let html = StatsTemplate::new(&stats).render()?;
                self.console.render(Region::Stats, &html);
                self.stats = Some(stats.clone());
                self.render_cards()?;
                Ok(stats)
            }
            Err(err) => {
                error!("failed to load stats: {err}");
                self.console.render(Region::Stats, STATS_ERROR_HTML);
                Err(err)
            }
        }
    }

    pub fn select_type(&mut self, key: &str) -> bool {
        if !self.catalog.iter().any(|ty| ty.type_key == key) {
            return false;
        }
        self.selected_type = Some(key.to_string());
        if let Err(err) = self.render_subscribe_choices() {
            error!("failed to render subscription choices: {err}");
        }
        true
    }

    pub async fn subscribe(&mut self) -> ConsoleResult<SubscribeOutcome> {
        match self.try_subscribe().await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                error!("subscription failed: {err}");
                self.console.alert(&format!("Subscription failed: {err}"));
                Err(err)
            }
        }
    }

    async fn try_subscribe(&mut self) -> ConsoleResult<SubscribeOutcome> {
        if !self.current_actions().subscribe {
            debug!("subscribe is disabled");
            return Ok(SubscribeOutcome::Disabled);
        }
        if self.platform.permission() != PermissionState::Granted
            && self.platform.request_permission().await != PermissionState::Granted
        {
            return Err(ConsoleError::PermissionDenied);
        }

        let Some(subscription_type) = self.selected_type.clone() else {
            self.console.alert(NO_TYPES_MESSAGE);
            return Ok(SubscribeOutcome::MissingType);
        };

        let public_key = self.backend.vapid_public_key().await?;
        let application_server_key = decode_application_server_key(&public_key)?;
        let subscription = self.platform.subscribe(&application_server_key).await?;
        self.subscription = Some(subscription.clone());

        let request = SubscribeRequest::new(&subscription, &subscription_type);
        debug!(
            endpoint = %request.endpoint,
            subscription_type = %subscription_type,
            "posting subscription"
        );
        self.backend.subscribe(&request).await?;
        info!(subscription_type = %subscription_type, "push subscription created");

        self.update_ui().await;
        self.refresh_stats().await;
        Ok(SubscribeOutcome::Subscribed(subscription))
    }

    // The backend keeps its stored record; there is no delete endpoint.
    pub async fn unsubscribe(&mut self) -> ConsoleResult<bool> {
        let Some(subscription) = self.subscription.clone() else {
            return Ok(false);
        };
        if !self.current_actions().unsubscribe {
            debug!("unsubscribe is disabled");
            return Ok(false);
        }
        if let Err(err) = self.platform.unsubscribe(&subscription).await {
            error!("unsubscribe failed: {err}");
            return Err(err);
        }
        self.subscription = None;
        info!("unsubscribed from push notifications");
        self.update_ui().await;
        self.refresh_stats().await;
        Ok(true)
    }

    pub async fn send_notification(
        &mut self,
        target: Option<SendTarget>,
        title: &str,
        body: &str,
    ) -> ConsoleResult<SendOutcome> {
        let Some(target) = target else {
            return Ok(SendOutcome::NoTarget);
        };
        if !self.current_actions().send {
            debug!("send is disabled");
            return Ok(SendOutcome::Disabled);
        }
        let request = NotificationRequest {
            title: non_blank_or(title, DEFAULT_MESSAGE_TITLE),
            body: non_blank_or(body, DEFAULT_MESSAGE_BODY),
            url: NOTIFICATION_URL.to_string(),
            target,
        };

        let prompt = format!(
            "Send message?\n\nTo: {}\nTitle: {}\nText: {}\n\nContinue?",
            self.recipient_label(&request.target),
            request.title,
            request.body
        );
        if !self.console.confirm(&prompt) {
            return Ok(SendOutcome::Cancelled);
        }

        match self.backend.send_notification(&request).await {
            Ok(report) => {
                info!(?report, target = %request.target, "notification sent");
                self.console.alert(&format!(
                    "Message sent\n\nDelivered: {}\nFailed: {}\nStale subscriptions removed: {}",
                    report.sent, report.failed, report.deleted
                ));
                self.refresh_stats().await;
                Ok(SendOutcome::Sent(report))
            }
            Err(err) => {
                error!("send failed: {err}");
                self.console.alert(&format!("Send failed: {err}"));
                Err(err)
            }
        }
    }

    pub fn open_new_type(&mut self) -> &mut TypeEditor {
        self.editor.insert(TypeEditor::for_new())
    }

    pub fn open_edit_type(&mut self, key: &str) -> Option<&mut TypeEditor> {
        let subscription_type = self.catalog.iter().find(|ty| ty.type_key == key)?;
        Some(self.editor.insert(TypeEditor::for_existing(subscription_type)))
    }

    pub fn cancel_edit(&mut self) {
        self.editor = None;
    }

    pub async fn save_type(&mut self) -> ConsoleResult<SaveOutcome> {
        let Some(editor) = &self.editor else {
            return Ok(SaveOutcome::NoEditor);
        };
        let submission = match editor.submission() {
            Ok(submission) => submission,
            Err(FormIssue::MissingKeyOrName) => {
                self.console.alert(INCOMPLETE_TYPE_MESSAGE);
                return Ok(SaveOutcome::Incomplete);
            }
            Err(FormIssue::InvalidColor) => {
                self.console.alert(INVALID_COLOR_MESSAGE);
                return Ok(SaveOutcome::InvalidColor);
            }
        };

        let result = match &submission {
            TypeSubmission::Create(payload) => self.backend.create_type(payload).await,
            TypeSubmission::Update { key, payload } => {
                self.backend.update_type(key, payload).await
            }
        };
        if let Err(err) = result {
            warn!(key = %submission.payload().type_key, "saving type failed: {err}");
            self.console
                .alert(&format!("Error: {}", err.user_message("Failed to save type")));
            return Err(err);
        }

        let outcome = match submission {
            TypeSubmission::Create(_) => SaveOutcome::Created,
            TypeSubmission::Update { .. } => SaveOutcome::Updated,
        };
        self.console.alert(match outcome {
            SaveOutcome::Updated => "Type updated",
            _ => "Type added",
        });
        self.editor = None;
        self.refresh_catalog().await;
        Ok(outcome)
    }

    pub async fn delete_type(&mut self, key: &str) -> ConsoleResult<bool> {
        let prompt = format!("Delete type \"{key}\"? This cannot be undone.");
        if !self.console.confirm(&prompt) {
            return Ok(false);
        }
        if let Err(err) = self.backend.delete_type(key).await {
            warn!(key, "deleting type failed: {err}");
            self.console
                .alert(&format!("Error: {}", err.user_message("Failed to delete type")));
            return Err(err);
        }
        self.console.alert("Type deleted");
        self.refresh_catalog().await;
        Ok(true)
    }

    pub fn catalog(&self) -> &[SubscriptionType] {
        &self.catalog
    }

    pub fn stats(&self) -> Option<&CatalogStats> {
        self.stats.as_ref()
    }

    pub fn subscription(&self) -> Option<&PushSubscription> {
        self.subscription.as_ref()
    }

    pub fn selected_type(&self) -> Option<&str> {
        self.selected_type.as_deref()
    }

    pub fn editor(&self) -> Option<&TypeEditor> {
        self.editor.as_ref()
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    // Buttons are disabled in the page; here every action checks the same table.
    fn current_actions(&self) -> ActionState {
        ActionState::derive(self.platform.permission(), self.subscription.is_some())
    }

    fn recipient_label(&self, target: &SendTarget) -> String {
        match target {
            SendTarget::All => "ALL subscribers".to_string(),
            SendTarget::Type(key) => self
                .catalog
                .iter()
                .find(|ty| &ty.type_key == key)
                .map(|ty| ty.type_name.clone())
                .unwrap_or_else(|| key.clone()),
        }
    }

    async fn refresh_catalog(&mut self) {
        if let Err(err) = self.load_types().await {
            debug!("catalog refresh failed: {err}");
        }
    }

    async fn refresh_stats(&mut self) {
        if let Err(err) = self.load_stats().await {
            debug!("stats refresh failed: {err}");
        }
    }

    fn render_catalog(&mut self) -> ConsoleResult<()> {
        self.render_cards()?;
        self.render_subscribe_choices()?;
        let html = TargetChoicesTemplate::new(&self.catalog, None).render()?;
        self.console.render(Region::TargetChoices, &html);
        Ok(())
    }

    fn render_cards(&mut self) -> ConsoleResult<()> {
        let html = TypeCardsTemplate::new(&self.catalog, self.stats.as_ref()).render()?;
        self.console.render(Region::TypeCards, &html);
        Ok(())
    }

    fn render_subscribe_choices(&mut self) -> ConsoleResult<()> {
        let html =
            SubscribeChoicesTemplate::new(&self.catalog, self.selected_type.as_deref()).render()?;
        self.console.render(Region::SubscribeChoices, &html);
        Ok(())
    }
}

fn non_blank_or(value: &str, fallback: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}
