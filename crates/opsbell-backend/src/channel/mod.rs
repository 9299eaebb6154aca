//! The long-lived notification event channel.
//!
//! A transport delivers connection state changes and named server events;
//! the adapter joins the role's broadcast group on every connect and turns
//! recognized events into stored notifications. Reconnection, heartbeats,
//! and backoff are entirely up to the transport.

pub mod adapter;
pub mod events;
#[cfg(test)]
pub(crate) mod scripted;
pub mod sse;

use std::future::Future;

use serde_json::Value;

/// Join request emitted by pilots, carrying their user identifier.
pub const JOIN_PILOTS: &str = "joinPilots";
/// Join request emitted by admins, without payload.
pub const JOIN_ADMINS: &str = "joinAdmins";

/// Something the transport observed on the connection.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// The connection is (re)established.
    Connected,
    /// A named server event arrived.
    Message { name: String, payload: Value },
    /// The connection dropped. The transport may reconnect on its own.
    Disconnected(String),
}

/// Errors that can occur while talking over the event channel.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The configured server URL cannot be used.
    #[error("invalid server url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The event stream request could not be set up.
    #[error("failed to open event stream: {0}")]
    Source(#[from] reqwest_eventsource::CannotCloneRequestError),
    /// Sending a request to the server failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The transport was already closed.
    #[error("event channel is closed")]
    Closed,
}

/// Bidirectional event connection to the notification server.
pub trait EventTransport: Send + 'static {
    /// Waits for the next connection event. `None` means the transport gave
    /// up and will not produce anything else.
    fn next_event(&mut self) -> impl Future<Output = Option<TransportEvent>> + Send;

    /// Sends a named event to the server.
    fn emit(
        &mut self,
        event: &str,
        payload: Option<Value>,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Releases the underlying connection.
    fn close(&mut self);
}
