use std::sync::Arc;

use crate::channel::adapter::ChannelHandle;
use crate::config::ConfigPaths;
use crate::store::NotificationStore;

/// The core application state that holds configuration, the notification
/// store, and the running event channel.
///
/// It is designed to be wrapped in async-friendly concurrency primitives (see
/// [`SharedState`]) so handlers can read it concurrently and occasionally
/// write to it.
pub struct State {
    /// The loaded application configuration.
    pub config: opsbell_bridge::config::Config,
    /// Locations of the config file and the persisted notifications.
    pub paths: ConfigPaths,
    /// Shared HTTP client for making efficient, pooled requests.
    pub request_client: reqwest::Client,
    /// The persisted notification list.
    pub store: Arc<NotificationStore>,
    /// Currently running event channel, if any.
    pub channel: Option<ChannelHandle>,
}

/// Thread-safe, async-friendly shared reference to the application [`State`].
pub type SharedState = Arc<tokio::sync::RwLock<State>>;
