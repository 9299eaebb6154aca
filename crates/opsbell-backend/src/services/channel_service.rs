use opsbell_bridge::config::ChannelConfig;
use opsbell_bridge::toast::ToastKind;

use crate::app::AppContext;
use crate::channel::adapter::{ChannelHandle, EventChannelAdapter};
use crate::channel::sse::SseTransport;
use crate::channel::{EventTransport, TransportError};

fn connect_sse(
    client: reqwest::Client,
    channel: &ChannelConfig,
) -> Result<SseTransport, TransportError> {
    SseTransport::connect(client, &channel.server_url)
}

/// Opens the event channel described by the current configuration, replacing
/// a running one.
pub async fn start_channel(context: super::AppContextHandle) {
    start_channel_with(context, connect_sse).await;
}

async fn start_channel_with<T, F>(context: super::AppContextHandle, connect: F)
where
    T: EventTransport,
    F: FnOnce(reqwest::Client, &ChannelConfig) -> Result<T, TransportError>,
{
    let (channel, show_toast, request_client, store) = {
        let state = context.state.read().await;
        (
            state.config.channel.clone(),
            state.config.notifications.show_toast,
            state.request_client.clone(),
            state.store.clone(),
        )
    };

    let transport = match connect(request_client, &channel) {
        Ok(transport) => transport,
        Err(error) => {
            log::error!("Failed to open notification channel: {error}");
            context
                .send_toast(
                    ToastKind::Error,
                    format!("Failed to open notification channel: {error}"),
                )
                .await;
            return;
        }
    };

    let adapter =
        EventChannelAdapter::new(transport, &channel, store, context.tx.clone(), show_toast);
    let previous = context
        .state
        .write()
        .await
        .channel
        .replace(ChannelHandle::spawn(adapter));
    if let Some(previous) = previous {
        previous.shutdown().await;
    }
}

/// Tears down the running event channel, if any, and waits for it to release
/// its connection.
pub async fn stop_channel(context: &AppContext) {
    let previous = context.state.write().await.channel.take();
    if let Some(previous) = previous {
        previous.shutdown().await;
    }
}

/// Handles a channel reconfiguration request: the running channel is torn
/// down, the new settings are persisted, and a new channel is opened.
pub async fn handle_update_channel_config(context: super::AppContextHandle, channel: ChannelConfig) {
    reconfigure_with(context, channel, connect_sse).await;
}

async fn reconfigure_with<T, F>(context: super::AppContextHandle, channel: ChannelConfig, connect: F)
where
    T: EventTransport,
    F: FnOnce(reqwest::Client, &ChannelConfig) -> Result<T, TransportError>,
{
    stop_channel(&context).await;

    let (config, paths) = {
        let mut state = context.state.write().await;
        state.config.channel = channel;
        (state.config.clone(), state.paths.clone())
    };
    log::info!(
        "Reconnecting notification channel to {} as {}",
        config.channel.server_url,
        config.channel.role
    );

    if let Err(error) = crate::config::save_config(&paths, &config).await {
        log::error!("Failed to save channel settings: {error}");
        context
            .send_toast(ToastKind::Warning, "Channel settings will not survive a restart")
            .await;
    }

    start_channel_with(context, connect).await;
}

/// Handles the frontend going away: late results are dropped from now on and
/// the channel is released.
pub async fn handle_unmount(context: super::AppContextHandle) {
    context.unmount();
    stop_channel(&context).await;
    log::info!("Frontend unmounted");
}
