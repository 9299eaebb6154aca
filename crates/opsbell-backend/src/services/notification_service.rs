use std::sync::Arc;

use opsbell_bridge::MessageFromBackend;
use opsbell_storage::{ChangeCallback, ChangeSubscription, DurableStorage};

use crate::store::NotificationStore;

/// Handles an incoming notification list request (see
/// [`opsbell_bridge::MessageToBackend::NotificationsRequest`]).
pub async fn handle_notifications_request(context: super::AppContextHandle) {
    let list = context.state.read().await.store.snapshot();
    context
        .send(MessageFromBackend::NotificationsUpdated(list))
        .await;
}

/// Handles a request to drop every stored notification.
pub async fn handle_clear_request(context: super::AppContextHandle) {
    let store = context.state.read().await.store.clone();
    store.clear();
    log::info!("Cleared notifications");
    context
        .send(MessageFromBackend::NotificationsUpdated(Vec::new()))
        .await;
}

/// Mirrors changes other processes make to the persisted list into `store`
/// and forwards the result to the frontend.
///
/// Must be called from within the backend runtime. Returns `None` when the
/// storage cannot be observed; the store then only reflects local changes.
pub fn watch_external_changes(
    context: &super::AppContextHandle,
    storage: &dyn DurableStorage,
    store: Arc<NotificationStore>,
) -> Option<ChangeSubscription> {
    let runtime = tokio::runtime::Handle::current();
    let key = store.key().to_string();
    let context = context.clone();

    // storage may call back from its own watcher thread
    let callback: ChangeCallback = Arc::new(move |raw: Option<String>| {
        let Some(list) = store.sync_from_external_change(raw.as_deref()) else {
            return;
        };
        log::info!("Notifications changed elsewhere, now {} stored", list.len());

        let context = context.clone();
        runtime.spawn(async move {
            context
                .send(MessageFromBackend::NotificationsUpdated(list))
                .await;
        });
    });

    match storage.on_external_change(&key, callback) {
        Ok(subscription) => Some(subscription),
        Err(error) => {
            log::error!("Failed to observe notification storage: {error}");
            None
        }
    }
}
