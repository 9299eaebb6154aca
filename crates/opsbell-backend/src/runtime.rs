//! Backend runtime setup and orchestration.
//!
//! This module wires together configuration, persisted notifications, the
//! event channel, and the message dispatch loop that listens to frontend
//! bridge requests.

use std::{sync::Arc, thread};

use opsbell_bridge::config::Config;
use opsbell_bridge::{MessageFromBackend, MessageToBackend};
use opsbell_storage::file::FileStorage;
use tokio::sync::{
    RwLock,
    mpsc::{Receiver, Sender},
};

use crate::app::AppContext;
use crate::config::ConfigPaths;
use crate::services::{channel_service, notification_service};
use crate::state::State;
use crate::store::NotificationStore;

fn resolve_paths() -> ConfigPaths {
    match ConfigPaths::resolve() {
        Ok(paths) => paths,
        Err(error) => {
            let fallback = std::env::temp_dir().join("opsbell");
            log::warn!("{error}, keeping everything under {fallback:?}");
            ConfigPaths::under(&fallback)
        }
    }
}

/// Initialize backend state and start processing frontend messages.
async fn setup_backend(rx: Receiver<MessageToBackend>, tx: Sender<MessageFromBackend>) {
    let paths = resolve_paths();
    let config = match crate::config::load_config(&paths).await {
        Ok(config) => config,
        Err(error) => {
            log::error!("{error}, falling back to defaults");
            Config::default()
        }
    };

    let storage = Arc::new(
        FileStorage::new(paths.data_dir.clone())
            .with_quota(config.notifications.storage_quota_bytes),
    );
    let store = Arc::new(NotificationStore::initialize(
        storage.clone(),
        config.notifications.storage_key.clone(),
    ));
    log::info!(
        "Loaded {} notifications from {:?}",
        store.snapshot().len(),
        storage.directory()
    );

    let state = Arc::new(RwLock::new(State {
        config,
        paths,
        request_client: reqwest::Client::new(),
        store: store.clone(),
        channel: None,
    }));

    let context = Arc::new(AppContext::new(state, tx));
    let _subscription = notification_service::watch_external_changes(&context, &*storage, store);
    channel_service::start_channel(context.clone()).await;

    context.consume_bridge_messages(rx).await;
    channel_service::stop_channel(&context).await;
    log::info!("Backend stopped");
}

/// Spawn the backend runtime and begin processing bridge messages.
///
/// The returned thread finishes once the frontend drops its sender.
pub fn run(
    rx: Receiver<MessageToBackend>,
    tx: Sender<MessageFromBackend>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(error) => {
                log::error!("Failed to build backend runtime: {error}");
                return;
            }
        };
        runtime.block_on(setup_backend(rx, tx));
    })
}
