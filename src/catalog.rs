use crate::types::catalog::{SubscriptionType, TypePayload};

pub const DEFAULT_TYPE_COLOR: &str = "#e2e3e5";

pub fn normalize_type_key(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .map(|ch| match ch {
            'a'..='z' | '0'..='9' | '_' => ch,
            _ => '_',
        })
        .collect()
}

pub fn parse_color(raw: &str) -> Option<String> {
    let value = raw.trim();
    let hex = value.strip_prefix('#')?;
    if matches!(hex.len(), 3 | 6) && hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
        Some(value.to_ascii_lowercase())
    } else {
        None
    }
}

// Stored colors are checked again before they reach a style attribute.
pub fn sanitize_color(raw: &str) -> String {
    parse_color(raw).unwrap_or_else(|| DEFAULT_TYPE_COLOR.to_string())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeForm {
    pub key: String,
    pub name: String,
    pub description: String,
    pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormIssue {
    MissingKeyOrName,
    InvalidColor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSubmission {
    Create(TypePayload),
    Update { key: String, payload: TypePayload },
}

impl TypeSubmission {
    pub fn payload(&self) -> &TypePayload {
        match self {
            TypeSubmission::Create(payload) => payload,
            TypeSubmission::Update { payload, .. } => payload,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeEditor {
    editing_key: Option<String>,
    form: TypeForm,
}

impl TypeEditor {
    pub fn for_new() -> Self {
        Self {
            editing_key: None,
            form: TypeForm {
                color: DEFAULT_TYPE_COLOR.to_string(),
                ..TypeForm::default()
            },
        }
    }

    pub fn for_existing(subscription_type: &SubscriptionType) -> Self {
        Self {
            editing_key: Some(subscription_type.type_key.clone()),
            form: TypeForm {
                key: subscription_type.type_key.clone(),
                name: subscription_type.type_name.clone(),
                description: subscription_type
                    .type_description
                    .clone()
                    .unwrap_or_default(),
                color: sanitize_color(subscription_type.type_color.as_deref().unwrap_or_default()),
            },
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing_key.is_some()
    }

    pub fn key_locked(&self) -> bool {
        self.is_editing()
    }

    pub fn form(&self) -> &TypeForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut TypeForm {
        &mut self.form
    }

    pub fn submission(&self) -> Result<TypeSubmission, FormIssue> {
        let key = match &self.editing_key {
            Some(key) => key.clone(),
            None => normalize_type_key(&self.form.key),
        };
        let name = self.form.name.trim();
        if key.is_empty() || name.is_empty() {
            return Err(FormIssue::MissingKeyOrName);
        }
        let color = match self.form.color.trim() {
            "" => DEFAULT_TYPE_COLOR.to_string(),
            raw => parse_color(raw).ok_or(FormIssue::InvalidColor)?,
        };

        let payload = TypePayload {
            type_key: key.clone(),
            type_name: name.to_string(),
            type_description: self.form.description.trim().to_string(),
            type_color: color,
        };
        Ok(match &self.editing_key {
            Some(_) => TypeSubmission::Update { key, payload },
            None => TypeSubmission::Create(payload),
        })
    }
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;

    fn is_slug(value: &str) -> bool {
        value
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_')
    }

    #[test]
    fn normalize_type_key__should_lowercase_and_replace_invalid_characters() {
        assert_eq!(normalize_type_key("  Breaking News! "), "breaking_news_");
        assert_eq!(normalize_type_key("promo-2024"), "promo_2024");
        assert_eq!(normalize_type_key("Тест"), "____");
        assert_eq!(normalize_type_key(""), "");
    }

    #[test]
    fn normalize_type_key__should_be_total_and_idempotent() {
        // Given
        let inputs = [
            "news",
            "Sports & Games",
            "ÄÖÜ",
            "İstanbul",
            "tab\tseparated",
            "emoji 🚀",
            "__already_ok__",
        ];

        for input in inputs {
            // When
            let once = normalize_type_key(input);
            let twice = normalize_type_key(&once);

            // Then
            assert!(is_slug(&once), "{input:?} normalized to {once:?}");
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn sanitize_color__should_reject_non_hex_values() {
        assert_eq!(sanitize_color("#FFAA00"), "#ffaa00");
        assert_eq!(sanitize_color("#abc"), "#abc");
        assert_eq!(sanitize_color("red; background: url(x)"), DEFAULT_TYPE_COLOR);
        assert_eq!(sanitize_color("#12345"), DEFAULT_TYPE_COLOR);
        assert_eq!(parse_color(" #ABC "), Some("#abc".to_string()));
        assert_eq!(parse_color("abc"), None);
    }

    #[test]
    fn submission__should_create_with_normalized_key() {
        // Given
        let mut editor = TypeEditor::for_new();
        *editor.form_mut() = TypeForm {
            key: "Weekly Digest".to_string(),
            name: " Weekly digest ".to_string(),
            description: "Once a week".to_string(),
            color: "#00ff00".to_string(),
        };

        // When
        let submission = editor.submission().expect("submission");

        // Then
        assert_eq!(
            submission,
            TypeSubmission::Create(TypePayload {
                type_key: "weekly_digest".to_string(),
                type_name: "Weekly digest".to_string(),
                type_description: "Once a week".to_string(),
                type_color: "#00ff00".to_string(),
            })
        );
    }

    #[test]
    fn submission__should_keep_original_key_when_editing() {
        // Given
        let existing = SubscriptionType {
            type_key: "news".to_string(),
            type_name: "News".to_string(),
            type_description: None,
            type_color: None,
        };
        let mut editor = TypeEditor::for_existing(&existing);
        editor.form_mut().key = "renamed".to_string();
        editor.form_mut().name = "Daily news".to_string();

        // When
        let submission = editor.submission().expect("submission");

        // Then
        assert!(editor.key_locked());
        assert_eq!(editor.form().color, DEFAULT_TYPE_COLOR);
        match submission {
            TypeSubmission::Update { key, payload } => {
                assert_eq!(key, "news");
                assert_eq!(payload.type_key, "news");
                assert_eq!(payload.type_name, "Daily news");
            }
            other => panic!("expected update, got {other:?}"),
        }
    }

    #[test]
    fn submission__should_require_key_and_name() {
        // Given
        let mut editor = TypeEditor::for_new();
        editor.form_mut().key = "   ".to_string();
        editor.form_mut().name = "Name".to_string();

        // Then
        assert_eq!(editor.submission(), Err(FormIssue::MissingKeyOrName));

        editor.form_mut().key = "key".to_string();
        editor.form_mut().name = " ".to_string();
        assert_eq!(editor.submission(), Err(FormIssue::MissingKeyOrName));
    }

    #[test]
    fn submission__should_reject_invalid_color() {
        // Given
        let mut editor = TypeEditor::for_new();
        editor.form_mut().key = "alerts".to_string();
        editor.form_mut().name = "Alerts".to_string();
        editor.form_mut().color = "red".to_string();

        // Then
        assert_eq!(editor.submission(), Err(FormIssue::InvalidColor));

        editor.form_mut().color = "  ".to_string();
        let submission = editor.submission().expect("submission");
        assert_eq!(submission.payload().type_color, DEFAULT_TYPE_COLOR);
    }
}
