//! Communication bridge between frontend and backend.
//!
//! This crate defines the types and protocols used to connect the
//! presentation layer with the asynchronous backend responsible for the
//! notification event channel, the persisted notification list, and the push
//! broadcast API.
//!
//! The design is deliberately lightweight and unidirectional:
//! - The frontend sends commands (e.g., clear notifications, send a push
//!   broadcast, reconfigure the channel).
//! - The backend pushes events (e.g., the updated notification list, toasts,
//!   push history).
//!
//! Communication happens over bounded [`tokio::sync::mpsc`] channels wrapped
//! in [`BridgeChannels`], providing back-pressure, async compatibility, and
//! clean separation of concerns.

pub mod config;
pub mod notification;
pub mod push;
pub mod role;
pub mod toast;

use tokio::sync::mpsc::{self, Receiver, Sender};

/// Messages emitted by the backend to inform the frontend of state updates.
#[derive(Debug, Clone)]
pub enum MessageFromBackend {
    /// Transient alert for the user.
    Toast(toast::ToastMessage),
    /// Response to the configuration request from the frontend.
    ConfigurationResponse(config::Config),
    /// The full notification list, most recent first. Sent after every
    /// change, whether it originated here or in another process.
    NotificationsUpdated(Vec<notification::Notification>),
    /// Previously sent push broadcasts.
    PushHistoryResponse(Vec<push::PushHistoryItem>),
    /// Push subscriber statistics.
    PushStatsResponse(push::PushStats),
}

/// Commands issued by the frontend to control or query the backend.
#[derive(Debug, Clone)]
pub enum MessageToBackend {
    /// Request for the application configuration.
    ConfigurationRequest,
    /// Request for the current notification list.
    NotificationsRequest,
    /// Drop every stored notification.
    ClearNotifications,
    /// Replace the event channel settings and reconnect.
    UpdateChannelConfig(config::ChannelConfig),
    /// Send a push broadcast.
    SendPush(push::PushRequest),
    /// Request for the push broadcast history.
    PushHistoryRequest,
    /// Send a previously sent broadcast again.
    ResendPush { id: String, title: String },
    /// Request for push subscriber statistics.
    PushStatsRequest,
    /// The frontend is going away; release the channel and drop late results.
    Unmount,
}

/// Paired `tokio::mpsc` channels for bidirectional communication between
/// frontend and backend.
pub struct BridgeChannels {
    /// Receiver used by the frontend to get messages from the backend.
    pub frontend_rx: Receiver<MessageFromBackend>,
    /// Sender used by the frontend to send commands to the backend.
    pub frontend_tx: Sender<MessageToBackend>,

    /// Receiver used by the backend to get commands from the frontend.
    pub backend_rx: Receiver<MessageToBackend>,
    /// Sender used by the backend to send events/responses to the frontend.
    pub backend_tx: Sender<MessageFromBackend>,
}

impl BridgeChannels {
    /// Creates a new pair of bridged channels with the given buffer capacity.
    pub fn new(buffer: usize) -> Self {
        let (to_backend_tx, to_backend_rx) = mpsc::channel(buffer);
        let (to_frontend_tx, to_frontend_rx) = mpsc::channel(buffer);
        Self {
            frontend_tx: to_backend_tx,
            frontend_rx: to_frontend_rx,
            backend_rx: to_backend_rx,
            backend_tx: to_frontend_tx,
        }
    }
}

impl Default for BridgeChannels {
    fn default() -> Self {
        Self::new(64)
    }
}
