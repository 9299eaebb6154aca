use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Title used when an ingested payload does not carry one.
pub const DEFAULT_TITLE: &str = "Notification";

/// Category of a stored notification. Drives icon selection in the
/// presentation layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// A new order was placed.
    Order,
    /// The batch of unclaimed orders changed.
    Update,
    /// An order was assigned to the current handler.
    Assigned,
    /// An order was claimed by a handler.
    Claimed,
    /// Previously claimed orders went back to the pool.
    Released,
    /// Delivery progress of an order (pickup reached, picked up, delivered).
    Status,
    /// Anything else. Unknown tags read back from storage land here as well.
    #[default]
    #[serde(other)]
    Info,
}

impl NotificationKind {
    /// Returns the wire tag of the kind, as stored in the `type` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Order => "order",
            NotificationKind::Update => "update",
            NotificationKind::Assigned => "assigned",
            NotificationKind::Claimed => "claimed",
            NotificationKind::Released => "released",
            NotificationKind::Status => "status",
            NotificationKind::Info => "info",
        }
    }
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

/// A normalized notification as held by the store and persisted to durable
/// storage.
///
/// Identity and creation time are assigned on the client at ingestion; a
/// notification is never mutated after that.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Session-unique identifier (`<unix-millis>_<base36 suffix>`).
    pub id: String,
    /// Ingestion time, used for display.
    pub created_at: DateTime<Utc>,
    /// Category of the notification.
    #[serde(rename = "type", default)]
    pub kind: NotificationKind,
    /// Short display title.
    #[serde(default = "default_title")]
    pub title: String,
    /// Display message.
    #[serde(default)]
    pub message: String,
    /// Opaque payload of the originating event, used for navigation.
    #[serde(default)]
    pub meta: Option<Value>,
}

impl Notification {
    /// Builds a notification out of a draft, filling in the defaults for
    /// everything the draft leaves out.
    pub fn from_draft(draft: NotificationDraft, id: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            created_at,
            kind: draft.kind.unwrap_or_default(),
            title: draft.title.unwrap_or_else(default_title),
            message: draft.message.unwrap_or_default(),
            meta: draft.meta.filter(|meta| !meta.is_null()),
        }
    }

    /// Looks up a string-like field of the meta payload. Numbers are rendered
    /// in their decimal form, everything else counts as absent.
    pub fn meta_text(&self, field: &str) -> Option<String> {
        let value = self.meta.as_ref()?.get(field)?;
        match value {
            Value::String(text) => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        }
    }

    /// Human-readable order identifier carried in the meta payload, if any.
    pub fn order_id(&self) -> Option<String> {
        self.meta_text("orderId")
    }

    /// Short text used for transient toasts.
    pub fn toast_text(&self) -> String {
        format!("{}: {}", self.title, self.message)
    }
}

/// Raw, not yet normalized notification content produced by an event handler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationDraft {
    pub kind: Option<NotificationKind>,
    pub title: Option<String>,
    pub message: Option<String>,
    pub meta: Option<Value>,
}

impl NotificationDraft {
    pub fn new(kind: NotificationKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: Some(kind),
            title: Some(title.into()),
            message: Some(message.into()),
            meta: None,
        }
    }

    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }
}
