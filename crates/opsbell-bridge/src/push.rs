//! Types exchanged with the push broadcast API.

use serde::{Deserialize, Serialize};

/// A broadcast the operator wants to send to all push subscribers.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushRequest {
    pub title: String,
    pub body: String,
    /// Defer delivery to the next Sunday instead of sending right away.
    pub schedule_sunday: bool,
}

/// A previously sent broadcast, as listed by the history endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushHistoryItem {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub sent_count: Option<u64>,
}

/// Subscriber statistics reported by the stats endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushStats {
    #[serde(default)]
    pub total_subscribers: u64,
    #[serde(default)]
    pub visited_via_push: u64,
}
