//! Terminal presentation layer.
//!
//! Draws the notification panel, the push broadcast page and toasts with
//! ratatui, and turns command bar input into bridge messages.

use std::io;

use anyhow::Context;
use crossterm::cursor::Show;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use opsbell_bridge::config::ChannelConfig;
use opsbell_bridge::push::PushRequest;
use opsbell_bridge::{MessageFromBackend, MessageToBackend};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;

mod app_state;
pub mod commands;
pub mod entities;
pub mod formatting;
mod input;
pub mod navigation;
mod shell;
pub mod toast;
mod views;

#[derive(Clone)]
pub struct BackendBridge {
    pub to_backend: mpsc::Sender<MessageToBackend>,
}

impl BackendBridge {
    async fn send(&self, message: MessageToBackend) -> anyhow::Result<()> {
        self.to_backend
            .send(message)
            .await
            .context("backend is not running")
    }

    pub async fn request_config(&self) -> anyhow::Result<()> {
        self.send(MessageToBackend::ConfigurationRequest).await
    }

    pub async fn request_notifications(&self) -> anyhow::Result<()> {
        self.send(MessageToBackend::NotificationsRequest).await
    }

    pub async fn clear_notifications(&self) -> anyhow::Result<()> {
        self.send(MessageToBackend::ClearNotifications).await
    }

    pub async fn update_channel(&self, channel: ChannelConfig) -> anyhow::Result<()> {
        self.send(MessageToBackend::UpdateChannelConfig(channel))
            .await
    }

    pub async fn send_push(&self, request: PushRequest) -> anyhow::Result<()> {
        self.send(MessageToBackend::SendPush(request)).await
    }

    pub async fn request_push_history(&self) -> anyhow::Result<()> {
        self.send(MessageToBackend::PushHistoryRequest).await
    }

    pub async fn resend_push(&self, id: String, title: String) -> anyhow::Result<()> {
        self.send(MessageToBackend::ResendPush { id, title }).await
    }

    pub async fn request_push_stats(&self) -> anyhow::Result<()> {
        self.send(MessageToBackend::PushStatsRequest).await
    }

    pub async fn unmount(&self) -> anyhow::Result<()> {
        self.send(MessageToBackend::Unmount).await
    }
}

/// Runs the terminal UI on the current thread until the user quits or the
/// backend goes away. The terminal is restored even when the UI fails.
pub fn run(
    rx: mpsc::Receiver<MessageFromBackend>,
    tx: mpsc::Sender<MessageToBackend>,
) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build frontend runtime")?;

    let bridge = BackendBridge { to_backend: tx };
    let events = input::spawn_events(input::CrosstermEventSource);

    enable_raw_mode().context("failed to enable raw mode")?;
    execute!(io::stdout(), EnterAlternateScreen)?;
    let result = Terminal::new(CrosstermBackend::new(io::stdout()))
        .context("failed to set up terminal")
        .and_then(|mut terminal| {
            runtime.block_on(shell::Shell::new(bridge).run(&mut terminal, rx, events))
        });

    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, Show)?;
    result
}
