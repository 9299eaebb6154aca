//! Application context and message dispatching utilities.
//!
//! The context contains the shared state and provides helpers for sending
//! responses and toasts back to the frontend bridge.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use opsbell_bridge::toast::{ToastKind, ToastMessage};
use opsbell_bridge::{MessageFromBackend, MessageToBackend};
use tokio::sync::mpsc::{Receiver, Sender};

use crate::services;
use crate::state::SharedState;

/// Shared application context passed to services and message handlers.
pub(crate) struct AppContext {
    /// Mutable runtime application state shared across services.
    pub state: SharedState,
    /// Outbound channel to the frontend bridge.
    pub tx: Sender<MessageFromBackend>,
    /// Cleared once the frontend unmounts; later results are discarded.
    mounted: AtomicBool,
}

impl AppContext {
    pub fn new(state: SharedState, tx: Sender<MessageFromBackend>) -> Self {
        Self {
            state,
            tx,
            mounted: AtomicBool::new(true),
        }
    }

    /// Read and dispatch messages from the frontend bridge until it closes.
    pub async fn consume_bridge_messages(self: &Arc<Self>, mut rx: Receiver<MessageToBackend>) {
        while let Some(message) = rx.recv().await {
            log::debug!("Got a frontend message: {message:?}");
            self.dispatch_message(message).await;
        }
    }

    /// Dispatches the received message from frontend down to individual
    /// service handlers.
    pub(crate) async fn dispatch_message(self: &Arc<Self>, message: MessageToBackend) {
        match message {
            MessageToBackend::ConfigurationRequest => {
                services::config_service::handle_config_request(self.clone()).await;
            }
            MessageToBackend::NotificationsRequest => {
                services::notification_service::handle_notifications_request(self.clone()).await;
            }
            MessageToBackend::ClearNotifications => {
                services::notification_service::handle_clear_request(self.clone()).await;
            }
            MessageToBackend::UpdateChannelConfig(channel) => {
                services::channel_service::handle_update_channel_config(self.clone(), channel)
                    .await;
            }
            MessageToBackend::SendPush(request) => {
                services::push_service::handle_send_push(self.clone(), request).await;
            }
            MessageToBackend::PushHistoryRequest => {
                services::push_service::handle_push_history_request(self.clone()).await;
            }
            MessageToBackend::ResendPush { id, title } => {
                services::push_service::handle_resend_push(self.clone(), id, title).await;
            }
            MessageToBackend::PushStatsRequest => {
                services::push_service::handle_push_stats_request(self.clone()).await;
            }
            MessageToBackend::Unmount => {
                services::channel_service::handle_unmount(self.clone()).await;
            }
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
    }

    /// Send a message to the frontend bridge. Messages produced after the
    /// frontend unmounted are dropped.
    pub async fn send(&self, message: MessageFromBackend) {
        if !self.is_mounted() {
            log::debug!("Frontend unmounted, dropping {message:?}");
            return;
        }
        if self.tx.send(message).await.is_err() {
            log::warn!("Frontend bridge is closed");
        }
    }

    /// Send a toast to the frontend bridge.
    pub async fn send_toast(&self, kind: ToastKind, content: impl Into<String>) {
        self.send(MessageFromBackend::Toast(ToastMessage::new(kind, content)))
            .await;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::path::Path;

    use opsbell_bridge::config::Config;
    use opsbell_bridge::push::PushRequest;
    use opsbell_storage::DurableStorage;
    use opsbell_storage::memory::MemoryStorage;
    use tokio::sync::{RwLock, mpsc};

    use super::*;
    use crate::config::ConfigPaths;
    use crate::state::State;
    use crate::store::NotificationStore;

    /// Builds a context over `storage` without a running event channel.
    pub(crate) fn context_over(
        storage: Arc<dyn DurableStorage>,
    ) -> (Arc<AppContext>, mpsc::Receiver<MessageFromBackend>) {
        let config = Config::default();
        let store = Arc::new(NotificationStore::initialize(
            storage,
            config.notifications.storage_key.clone(),
        ));
        let state = Arc::new(RwLock::new(State {
            config,
            paths: ConfigPaths::under(Path::new("/nonexistent/opsbell")),
            request_client: reqwest::Client::new(),
            store,
            channel: None,
        }));
        let (tx, rx) = mpsc::channel(64);
        (Arc::new(AppContext::new(state, tx)), rx)
    }

    #[tokio::test]
    async fn clearing_reports_the_empty_list() {
        let (context, mut rx) = context_over(Arc::new(MemoryStorage::new()));
        context.dispatch_message(MessageToBackend::ClearNotifications).await;

        match rx.try_recv() {
            Ok(MessageFromBackend::NotificationsUpdated(list)) => assert!(list.is_empty()),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn incomplete_push_is_rejected_with_a_warning() {
        let (context, mut rx) = context_over(Arc::new(MemoryStorage::new()));
        context
            .dispatch_message(MessageToBackend::SendPush(PushRequest {
                title: "Sale".into(),
                body: " ".into(),
                schedule_sunday: false,
            }))
            .await;

        match rx.try_recv() {
            Ok(MessageFromBackend::Toast(toast)) => {
                assert_eq!(toast.kind, ToastKind::Warning);
                assert_eq!(toast.message, "Please fill out both title and message");
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn nothing_reaches_the_frontend_after_unmount() {
        let (context, mut rx) = context_over(Arc::new(MemoryStorage::new()));
        context.dispatch_message(MessageToBackend::Unmount).await;
        assert!(!context.is_mounted());

        context.dispatch_message(MessageToBackend::NotificationsRequest).await;
        context
            .send_toast(ToastKind::Info, "late result")
            .await;
        assert!(rx.try_recv().is_err());
    }
}
