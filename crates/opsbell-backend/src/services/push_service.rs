use opsbell_bridge::MessageFromBackend;
use opsbell_bridge::push::PushRequest;
use opsbell_bridge::toast::ToastKind;

use crate::push::{PushApiClient, PushError};

async fn push_client(context: &super::AppContextHandle) -> Option<PushApiClient> {
    let (base_url, request_client) = {
        let state = context.state.read().await;
        (
            state.config.push_api.base_url.clone(),
            state.request_client.clone(),
        )
    };

    match PushApiClient::new(request_client, &base_url) {
        Ok(client) => Some(client),
        Err(error) => {
            log::error!("Push api is misconfigured: {error}");
            context
                .send_toast(ToastKind::Error, error.to_string())
                .await;
            None
        }
    }
}

/// Fetches history and stats after a successful broadcast.
async fn refresh(context: &super::AppContextHandle, client: &PushApiClient) {
    match client.history().await {
        Ok(history) => {
            context
                .send(MessageFromBackend::PushHistoryResponse(history))
                .await
        }
        Err(error) => log::error!("Failed to refresh push history: {error}"),
    }
    match client.stats().await {
        Ok(stats) => context.send(MessageFromBackend::PushStatsResponse(stats)).await,
        Err(error) => log::error!("Failed to refresh push stats: {error}"),
    }
}

fn failure_text(action: &str, error: &PushError) -> String {
    format!("Failed to {action}: {error}")
}

/// Handles a push broadcast request (see
/// [`opsbell_bridge::MessageToBackend::SendPush`]).
pub async fn handle_send_push(context: super::AppContextHandle, request: PushRequest) {
    if let Err(error) = PushApiClient::validate(&request) {
        context
            .send_toast(ToastKind::Warning, error.to_string())
            .await;
        return;
    }
    let Some(client) = push_client(&context).await else {
        return;
    };

    log::info!("Sending push broadcast {:?}", request.title);
    tokio::spawn(async move {
        match client.send(&request).await {
            Ok(()) => {
                context
                    .send_toast(ToastKind::Success, "Notification sent successfully!")
                    .await;
                refresh(&context, &client).await;
            }
            Err(error) => {
                log::error!("Push broadcast failed: {error}");
                context
                    .send_toast(ToastKind::Error, failure_text("send", &error))
                    .await;
            }
        }
    });
}

/// Handles a request to send a previous broadcast again.
pub async fn handle_resend_push(context: super::AppContextHandle, id: String, title: String) {
    let Some(client) = push_client(&context).await else {
        return;
    };

    tokio::spawn(async move {
        match client.resend(&id).await {
            Ok(()) => {
                context
                    .send_toast(ToastKind::Success, format!("Notification \"{title}\" resent!"))
                    .await;
                refresh(&context, &client).await;
            }
            Err(error) => {
                log::error!("Resending push {id} failed: {error}");
                context
                    .send_toast(ToastKind::Error, failure_text("resend", &error))
                    .await;
            }
        }
    });
}

/// Handles an incoming push history request.
pub async fn handle_push_history_request(context: super::AppContextHandle) {
    let Some(client) = push_client(&context).await else {
        return;
    };

    tokio::spawn(async move {
        match client.history().await {
            Ok(history) => {
                context
                    .send(MessageFromBackend::PushHistoryResponse(history))
                    .await
            }
            Err(error) => {
                log::error!("Failed to fetch push history: {error}");
                context
                    .send_toast(ToastKind::Error, "Failed to load history.")
                    .await;
            }
        }
    });
}

/// Handles an incoming push statistics request.
pub async fn handle_push_stats_request(context: super::AppContextHandle) {
    let Some(client) = push_client(&context).await else {
        return;
    };

    tokio::spawn(async move {
        match client.stats().await {
            Ok(stats) => context.send(MessageFromBackend::PushStatsResponse(stats)).await,
            Err(error) => {
                log::error!("Failed to fetch push stats: {error}");
                context
                    .send_toast(ToastKind::Error, "Failed to load stats")
                    .await;
            }
        }
    });
}
