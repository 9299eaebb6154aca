use std::sync::Arc;

use opsbell_bridge::{
    MessageFromBackend,
    config::ChannelConfig,
    role::Role,
    toast::{ToastKind, ToastMessage},
};
use serde_json::Value;
use tokio::sync::{mpsc::Sender, oneshot};
use tokio::task::JoinHandle;

use super::events::ServerEvent;
use super::{EventTransport, JOIN_ADMINS, JOIN_PILOTS, TransportEvent};
use crate::store::NotificationStore;

/// Drives one transport connection: joins the role's group on every connect
/// and feeds recognized server events into the notification store.
pub struct EventChannelAdapter<T> {
    transport: Option<T>,
    role: Role,
    user_id: Option<String>,
    store: Arc<NotificationStore>,
    tx: Sender<MessageFromBackend>,
    show_toast: bool,
    connected: bool,
}

impl<T: EventTransport> EventChannelAdapter<T> {
    pub fn new(
        transport: T,
        channel: &ChannelConfig,
        store: Arc<NotificationStore>,
        tx: Sender<MessageFromBackend>,
        show_toast: bool,
    ) -> Self {
        Self {
            transport: Some(transport),
            role: channel.role.clone(),
            user_id: channel.user_id.clone(),
            store,
            tx,
            show_toast,
            connected: false,
        }
    }

    /// Processes transport events in delivery order until the transport ends
    /// or `shutdown` fires (or its sender is dropped), then releases the
    /// transport.
    pub async fn run(mut self, mut shutdown: oneshot::Receiver<()>) {
        loop {
            let event = {
                let Some(transport) = self.transport.as_mut() else {
                    break;
                };
                tokio::select! {
                    biased;
                    _ = &mut shutdown => break,
                    event = transport.next_event() => event,
                }
            };

            match event {
                Some(TransportEvent::Connected) => self.on_connected().await,
                Some(TransportEvent::Message { name, payload }) => self.ingest(&name, &payload).await,
                Some(TransportEvent::Disconnected(reason)) => self.on_disconnected(reason).await,
                None => break,
            }
        }

        self.release();
    }

    async fn on_connected(&mut self) {
        log::info!("Notification channel connected as {}", self.role);
        self.connected = true;

        let (event, payload) = match &self.role {
            Role::Pilot => (JOIN_PILOTS, Some(Value::from(self.user_id.clone()))),
            Role::Admin => (JOIN_ADMINS, None),
            Role::Unrecognized(role) => {
                log::debug!("Role {role} has no broadcast group to join");
                return;
            }
        };

        let Some(transport) = self.transport.as_mut() else {
            return;
        };
        if let Err(error) = transport.emit(event, payload).await {
            log::error!("Failed to emit {event}: {error}");
            toast(&self.tx, ToastKind::Error, format!("Failed to join notifications: {error}")).await;
        }
    }

    async fn on_disconnected(&mut self, reason: String) {
        log::warn!("Notification channel error: {reason}");
        // only the first failure after a successful connect is surfaced
        if std::mem::take(&mut self.connected) {
            toast(&self.tx, ToastKind::Error, "Notification channel disconnected").await;
        }
    }

    async fn ingest(&mut self, name: &str, payload: &Value) {
        let Some(event) = ServerEvent::from_name(name) else {
            log::debug!("Ignoring unsubscribed event {name}");
            return;
        };
        let Some(draft) = event.to_draft(payload) else {
            log::debug!("Event {name} carried nothing to show");
            return;
        };

        let list = self.store.push(draft);
        let toast_text = list.first().map(|notification| notification.toast_text());
        log::debug!("Ingested {name}, {} notification(s) stored", list.len());

        send(&self.tx, MessageFromBackend::NotificationsUpdated(list)).await;
        if self.show_toast {
            if let Some(text) = toast_text {
                toast(&self.tx, ToastKind::Info, text).await;
            }
        }
    }

    fn release(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.close();
            log::info!("Notification channel released");
        }
    }
}

async fn toast(tx: &Sender<MessageFromBackend>, kind: ToastKind, message: impl Into<String>) {
    send(tx, MessageFromBackend::Toast(ToastMessage::new(kind, message))).await;
}

async fn send(tx: &Sender<MessageFromBackend>, message: MessageFromBackend) {
    if tx.send(message).await.is_err() {
        log::warn!("Frontend bridge is closed, dropping channel update");
    }
}

/// Owner of a running adapter task.
pub struct ChannelHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl ChannelHandle {
    /// Spawns `adapter` onto the current runtime.
    pub fn spawn<T: EventTransport>(adapter: EventChannelAdapter<T>) -> Self {
        let (shutdown, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(adapter.run(shutdown_rx));
        Self {
            shutdown: Some(shutdown),
            task: Some(task),
        }
    }

    /// Asks the adapter to release its connection. Returns `false` when the
    /// channel was already torn down.
    pub fn teardown(&mut self) -> bool {
        match self.shutdown.take() {
            Some(shutdown) => {
                let _ = shutdown.send(());
                log::info!("Tearing down notification channel");
                true
            }
            None => false,
        }
    }

    /// Tears the channel down and waits for the adapter to finish.
    pub async fn shutdown(mut self) {
        self.teardown();
        if let Some(task) = self.task.take() {
            if let Err(error) = task.await {
                log::error!("Notification channel task failed: {error}");
            }
        }
    }
}

impl Drop for ChannelHandle {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use opsbell_bridge::notification::NotificationKind;
    use opsbell_storage::memory::MemoryStorage;
    use serde_json::json;
    use tokio::sync::mpsc;

    use super::*;
    use crate::channel::scripted::{Emitted, ScriptedTransport};

    fn message(name: &str, payload: Value) -> TransportEvent {
        TransportEvent::Message {
            name: name.to_string(),
            payload,
        }
    }

    fn channel(role: Role, user_id: Option<&str>) -> ChannelConfig {
        ChannelConfig {
            role,
            user_id: user_id.map(str::to_string),
            ..ChannelConfig::default()
        }
    }

    fn store() -> Arc<NotificationStore> {
        Arc::new(NotificationStore::initialize(
            Arc::new(MemoryStorage::new()),
            "app_notifications",
        ))
    }

    async fn run_to_end(
        events: Vec<TransportEvent>,
        channel: ChannelConfig,
        show_toast: bool,
    ) -> (Emitted, Arc<AtomicUsize>, Arc<NotificationStore>, Vec<MessageFromBackend>) {
        let transport = ScriptedTransport::new(events, false);
        let (emitted, closes) = (transport.emitted.clone(), transport.closes.clone());
        let store = store();
        let (tx, mut rx) = mpsc::channel(64);
        let (_shutdown, shutdown_rx) = oneshot::channel();

        EventChannelAdapter::new(transport, &channel, store.clone(), tx, show_toast)
            .run(shutdown_rx)
            .await;

        let mut messages = Vec::new();
        while let Ok(message) = rx.try_recv() {
            messages.push(message);
        }
        (emitted, closes, store, messages)
    }

    #[tokio::test]
    async fn pilot_joins_once_per_connection_with_user_id() {
        let (emitted, _, _, _) = run_to_end(
            vec![TransportEvent::Connected],
            channel(Role::Pilot, Some("u1")),
            true,
        )
        .await;

        assert_eq!(
            *emitted.lock().unwrap(),
            vec![("joinPilots".to_string(), Some(json!("u1")))]
        );
    }

    #[tokio::test]
    async fn reconnects_join_again() {
        let (emitted, _, _, _) = run_to_end(
            vec![
                TransportEvent::Connected,
                TransportEvent::Disconnected("reset".into()),
                TransportEvent::Connected,
            ],
            channel(Role::Admin, None),
            true,
        )
        .await;

        assert_eq!(
            *emitted.lock().unwrap(),
            vec![("joinAdmins".to_string(), None), ("joinAdmins".to_string(), None)]
        );
    }

    #[tokio::test]
    async fn unrecognized_roles_join_nothing() {
        let (emitted, _, _, _) = run_to_end(
            vec![TransportEvent::Connected],
            channel(Role::Unrecognized("user".into()), Some("u1")),
            true,
        )
        .await;

        assert!(emitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn each_event_stores_once_and_toasts_once() {
        let (_, _, store, messages) = run_to_end(
            vec![
                TransportEvent::Connected,
                message("newOrder", json!({ "orderId": "A1", "finalAmount": 10 })),
                message("orderDelivered", json!({ "orderId": "A1" })),
                message("somethingElse", json!({})),
                message("ordersUpdate", json!({ "orders": "nope" })),
            ],
            channel(Role::Admin, None),
            true,
        )
        .await;

        let list = store.snapshot();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].kind, NotificationKind::Status);
        assert_eq!(list[1].kind, NotificationKind::Order);

        let updates = messages
            .iter()
            .filter(|m| matches!(m, MessageFromBackend::NotificationsUpdated(_)))
            .count();
        let toasts: Vec<_> = messages
            .iter()
            .filter_map(|m| match m {
                MessageFromBackend::Toast(toast) => Some(toast.message.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(updates, 2);
        assert_eq!(
            toasts,
            vec![
                "New order: Order A1 placed - ₹10".to_string(),
                "Delivered: Order A1 delivered".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn toasts_can_be_disabled() {
        let (_, _, store, messages) = run_to_end(
            vec![message("orderClaimed", json!({ "orderId": "C" }))],
            channel(Role::Admin, None),
            false,
        )
        .await;

        assert_eq!(store.snapshot().len(), 1);
        assert!(
            !messages
                .iter()
                .any(|m| matches!(m, MessageFromBackend::Toast(_)))
        );
    }

    #[tokio::test]
    async fn duplicate_events_are_not_deduplicated() {
        let payload = json!({ "orderId": "D" });
        let (_, _, store, _) = run_to_end(
            vec![
                message("orderPickedUp", payload.clone()),
                message("orderPickedUp", payload),
            ],
            channel(Role::Admin, None),
            false,
        )
        .await;

        let list = store.snapshot();
        assert_eq!(list.len(), 2);
        assert_ne!(list[0].id, list[1].id);
    }

    #[tokio::test]
    async fn disconnect_after_connect_is_surfaced_once() {
        let (_, _, _, messages) = run_to_end(
            vec![
                TransportEvent::Connected,
                TransportEvent::Disconnected("reset".into()),
                TransportEvent::Disconnected("still down".into()),
            ],
            channel(Role::Unrecognized("none".into()), None),
            true,
        )
        .await;

        let errors = messages
            .iter()
            .filter(|m| matches!(m, MessageFromBackend::Toast(t) if t.kind == ToastKind::Error))
            .count();
        assert_eq!(errors, 1);
    }

    #[tokio::test]
    async fn transport_end_releases_once() {
        let (_, closes, _, _) = run_to_end(vec![], channel(Role::Admin, None), true).await;
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn teardown_is_idempotent_and_releases_once() {
        let transport = ScriptedTransport::new(vec![TransportEvent::Connected], true);
        let closes = transport.closes.clone();
        let (tx, _rx) = mpsc::channel(64);
        let adapter =
            EventChannelAdapter::new(transport, &channel(Role::Admin, None), store(), tx, true);

        let mut handle = ChannelHandle::spawn(adapter);
        assert!(handle.teardown());
        assert!(!handle.teardown());
        handle.shutdown().await;

        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn dropping_the_handle_releases_the_transport() {
        let transport = ScriptedTransport::new(vec![], true);
        let closes = transport.closes.clone();
        let (tx, _rx) = mpsc::channel(64);
        let adapter =
            EventChannelAdapter::new(transport, &channel(Role::Admin, None), store(), tx, true);

        let handle = ChannelHandle::spawn(adapter);
        drop(handle);

        for _ in 0..100 {
            if closes.load(Ordering::SeqCst) == 1 {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }
}
