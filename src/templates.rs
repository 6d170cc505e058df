use askama::Template;

use crate::catalog::sanitize_color;
use crate::push::worker;
use crate::types::catalog::{CatalogStats, SubscriptionType};

pub const STATS_ERROR_HTML: &str = "<p class=\"error\">Failed to load statistics</p>";

#[derive(Template)]
#[template(path = "type_cards.html")]
pub struct TypeCardsTemplate {
    pub cards: Vec<TypeCard>,
}

pub struct TypeCard {
    pub key: String,
    pub name: String,
    pub description: String,
    pub color: String,
    pub subscribers: u64,
}

impl TypeCardsTemplate {
    pub fn new(types: &[SubscriptionType], stats: Option<&CatalogStats>) -> Self {
        let cards = types
            .iter()
            .map(|subscription_type| TypeCard {
                key: subscription_type.type_key.clone(),
                name: subscription_type.type_name.clone(),
                description: subscription_type
                    .type_description
                    .clone()
                    .filter(|description| !description.is_empty())
                    .unwrap_or_else(|| "No description".to_string()),
                color: color_of(subscription_type.type_color.as_deref()),
                subscribers: stats
                    .map(|stats| stats.subscribers_for(&subscription_type.type_key))
                    .unwrap_or(0),
            })
            .collect();
        Self { cards }
    }
}

#[derive(Template)]
#[template(path = "subscribe_choices.html")]
pub struct SubscribeChoicesTemplate {
    pub choices: Vec<TypeChoice>,
}

#[derive(Template)]
#[template(path = "target_choices.html")]
pub struct TargetChoicesTemplate {
    pub all_checked: bool,
    pub choices: Vec<TypeChoice>,
}

pub struct TypeChoice {
    pub key: String,
    pub name: String,
    pub description: String,
    pub color: String,
    pub checked: bool,
}

impl SubscribeChoicesTemplate {
    pub fn new(types: &[SubscriptionType], selected: Option<&str>) -> Self {
        Self {
            choices: choices(types, selected),
        }
    }
}

impl TargetChoicesTemplate {
    pub fn new(types: &[SubscriptionType], selected: Option<&str>) -> Self {
        Self {
            all_checked: selected.is_none(),
            choices: choices(types, selected),
        }
    }
}

fn choices(types: &[SubscriptionType], selected: Option<&str>) -> Vec<TypeChoice> {
    types
        .iter()
        .map(|subscription_type| TypeChoice {
            key: subscription_type.type_key.clone(),
            name: subscription_type.type_name.clone(),
            description: subscription_type.type_description.clone().unwrap_or_default(),
            color: color_of(subscription_type.type_color.as_deref()),
            checked: selected == Some(subscription_type.type_key.as_str()),
        })
        .collect()
}

#[derive(Template)]
#[template(path = "stats.html")]
pub struct StatsTemplate {
    pub total: u64,
    pub rows: Vec<StatsRow>,
}

pub struct StatsRow {
    pub name: String,
    pub color: String,
    pub subscribers: u64,
}

impl StatsTemplate {
    pub fn new(stats: &CatalogStats) -> Self {
        Self {
            total: stats.total,
            rows: stats
                .types
                .iter()
                .map(|row| StatsRow {
                    name: row.type_name.clone(),
                    color: color_of(row.type_color.as_deref()),
                    subscribers: row.subscriber_count,
                })
                .collect(),
        }
    }
}

#[derive(Template)]
#[template(path = "service-worker.js", escape = "none")]
pub struct ServiceWorkerTemplate {
    pub fallback_title: &'static str,
    pub default_title: &'static str,
    pub default_body: &'static str,
    pub default_icon: &'static str,
    pub default_badge: &'static str,
    pub default_url: &'static str,
    pub close_action: &'static str,
    pub vibrate: String,
    pub actions: String,
}

impl Default for ServiceWorkerTemplate {
    fn default() -> Self {
        let vibrate = worker::VIBRATION_PATTERN
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let actions = serde_json::to_string(&worker::default_actions()).unwrap_or_default();
        Self {
            fallback_title: worker::FALLBACK_TITLE,
            default_title: worker::DEFAULT_TITLE,
            default_body: worker::DEFAULT_BODY,
            default_icon: worker::DEFAULT_ICON,
            default_badge: worker::DEFAULT_BADGE,
            default_url: worker::DEFAULT_URL,
            close_action: worker::CLOSE_ACTION,
            vibrate,
            actions,
        }
    }
}

fn color_of(raw: Option<&str>) -> String {
    sanitize_color(raw.unwrap_or_default())
}

mod filters {
    use std::fmt::Write;

    pub fn json_escape(value: &str, _values: &dyn askama::Values) -> askama::Result<String> {
        let mut escaped = String::with_capacity(value.len());
        for ch in value.chars() {
            match ch {
                '"' => escaped.push_str("\\\""),
                '\\' => escaped.push_str("\\\\"),
                '\n' => escaped.push_str("\\n"),
                '\r' => escaped.push_str("\\r"),
                '\t' => escaped.push_str("\\t"),
                '\u{08}' => escaped.push_str("\\b"),
                '\u{0C}' => escaped.push_str("\\f"),
                '<' => escaped.push_str("\\u003c"),
                ch if ch < '\u{20}' => {
                    write!(escaped, "\\u{:04x}", ch as u32)?;
                }
                _ => escaped.push(ch),
            }
        }
        Ok(escaped)
    }
}
