use std::ops::ControlFlow;
use std::time::{Duration, Instant};

use crossterm::event::Event;
use opsbell_bridge::MessageFromBackend;
use ratatui::Terminal;
use ratatui::backend::Backend;
use tokio::sync::mpsc::Receiver;

use crate::BackendBridge;
use crate::app_state::AppState;
use crate::commands::Command;
use crate::navigation::{BrowserLocation, NavigationResolver};

const PRUNE_INTERVAL: Duration = Duration::from_secs(1);

pub(crate) struct Shell {
    bridge: BackendBridge,
    app: AppState,
    resolver: Option<NavigationResolver<BrowserLocation>>,
}

impl Shell {
    pub fn new(bridge: BackendBridge) -> Self {
        Self {
            bridge,
            app: AppState::default(),
            resolver: None,
        }
    }

    /// Draws and handles input until the user quits, the input stream ends or
    /// the backend goes away. Quitting unmounts the backend.
    pub async fn run<B: Backend>(
        mut self,
        terminal: &mut Terminal<B>,
        mut rx: Receiver<MessageFromBackend>,
        mut events: Receiver<anyhow::Result<Event>>,
    ) -> anyhow::Result<()> {
        self.bridge.request_config().await?;
        self.bridge.request_notifications().await?;
        self.bridge.request_push_history().await?;
        self.bridge.request_push_stats().await?;

        let mut prune = tokio::time::interval(PRUNE_INTERVAL);
        loop {
            terminal.draw(|f| self.app.render(f))?;

            tokio::select! {
                message = rx.recv() => match message {
                    Some(message) => self.on_backend_message(message),
                    None => {
                        log::warn!("Backend closed the bridge");
                        return Ok(());
                    }
                },
                event = events.recv() => {
                    let Some(event) = event else { break };
                    if let Event::Key(key) = event? {
                        let Some(command) = self.app.handle_key(key) else { continue };
                        if self.on_command(command).await?.is_break() {
                            break;
                        }
                    }
                }
                _ = prune.tick() => {
                    self.app.toaster.prune(Instant::now());
                }
            }
        }

        self.bridge.unmount().await
    }

    fn on_backend_message(&mut self, message: MessageFromBackend) {
        log::debug!("Got a message from backend: {message:?}");
        if let MessageFromBackend::ConfigurationResponse(config) = &message {
            match BrowserLocation::new(&config.navigation.origin) {
                Ok(location) => self.resolver = Some(NavigationResolver::new(location)),
                Err(error) => log::error!("Navigation disabled: {error}"),
            }
        }
        self.app.on_backend_message(message, Instant::now());
    }

    fn open(&mut self, position: usize) {
        let Some(notification) = self.app.data.notifications.at_position(position) else {
            self.app.set_status(format!("No notification number {position}"));
            return;
        };
        let Some(resolver) = &self.resolver else {
            self.app.set_status("Settings are still loading");
            return;
        };

        let status = match resolver.open(notification) {
            Ok(Some(destination)) => format!("Opened {destination}"),
            Ok(None) => "Nothing to open for this notification".to_string(),
            Err(error) => {
                log::error!("Navigation failed: {error}");
                format!("Could not open: {error}")
            }
        };
        self.app.set_status(status);
    }

    async fn on_command(&mut self, command: Command) -> anyhow::Result<ControlFlow<()>> {
        match command {
            Command::Open { position } => self.open(position),
            Command::Clear => self.bridge.clear_notifications().await?,
            Command::Push { sunday, words } => {
                self.bridge
                    .send_push(Command::push_request(sunday, &words))
                    .await?
            }
            Command::History => self.bridge.request_push_history().await?,
            Command::Resend { id } => {
                let title = self
                    .app
                    .data
                    .push
                    .find(&id)
                    .map(|item| item.title.clone())
                    .unwrap_or_else(|| id.clone());
                self.bridge.resend_push(id, title).await?;
            }
            Command::Stats => self.bridge.request_push_stats().await?,
            Command::Role { role, user_id } => {
                let mut channel = self.app.data.settings.config.channel.clone();
                channel.role = role;
                channel.user_id = user_id;
                self.bridge.update_channel(channel.clone()).await?;
                self.app.data.settings.config.channel = channel;
            }
            Command::Quit => return Ok(ControlFlow::Break(())),
        }
        Ok(ControlFlow::Continue(()))
    }
}
