use serde::{Deserialize, Serialize};

use crate::role::Role;

/// Storage key the notification list is persisted under by default.
pub const DEFAULT_STORAGE_KEY: &str = "app_notifications";

/// Connection settings for the notification event channel.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Base URL of the notification server.
    pub server_url: String,
    /// Role to join broadcast groups with once connected.
    pub role: Role,
    /// User identifier sent along with the pilot join request.
    pub user_id: Option<String>,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:5000".to_string(),
            role: Role::Admin,
            user_id: None,
        }
    }
}

/// Settings of the local notification list and its alerts.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NotificationsConfig {
    /// Key the list is persisted under in durable storage.
    pub storage_key: String,
    /// Whether every ingested notification also raises a transient toast.
    pub show_toast: bool,
    /// How long a toast stays visible, in seconds.
    pub toast_duration_secs: u64,
    /// Largest serialized list accepted by storage, in bytes. Pushes that
    /// would exceed it stay in memory only.
    pub storage_quota_bytes: usize,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            show_toast: true,
            toast_duration_secs: 5,
            storage_quota_bytes: 5 * 1024 * 1024,
        }
    }
}

/// Settings for click-through navigation.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Origin relative destinations are resolved against.
    pub origin: String,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            origin: "http://localhost:5173".to_string(),
        }
    }
}

/// Settings for the push broadcast REST API.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PushApiConfig {
    /// Base URL of the API, the `notifications/...` routes hang off it.
    pub base_url: String,
}

impl Default for PushApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
        }
    }
}

/// Global application configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Event channel connection settings.
    pub channel: ChannelConfig,
    /// Notification list settings.
    pub notifications: NotificationsConfig,
    /// Click-through navigation settings.
    pub navigation: NavigationConfig,
    /// Push broadcast API settings.
    pub push_api: PushApiConfig,
}
