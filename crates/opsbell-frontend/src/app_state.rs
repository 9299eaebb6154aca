use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use opsbell_bridge::MessageFromBackend;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::commands::{self, Command, Feedback};
use crate::entities::DataEntities;
use crate::toast::Toaster;
use crate::views::{command_bar, notification_panel, push_page, toasts};

/// Everything on screen plus the command bar being typed into.
#[derive(Debug, Default)]
pub(crate) struct AppState {
    pub data: DataEntities,
    pub toaster: Toaster,
    input: String,
    /// Outcome of the last command, shown under the input line.
    pub status: Option<String>,
    /// 0-based index into the notification list.
    selected: usize,
    help: Option<String>,
}

impl AppState {
    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(text.into());
    }

    pub fn on_backend_message(&mut self, message: MessageFromBackend, now: Instant) {
        match message {
            MessageFromBackend::Toast(toast) => self.toaster.show(toast, now),
            MessageFromBackend::ConfigurationResponse(config) => {
                self.toaster.set_duration(Duration::from_secs(
                    config.notifications.toast_duration_secs,
                ));
                self.data.settings.update(config);
            }
            MessageFromBackend::NotificationsUpdated(notifications) => {
                self.data.notifications.update(notifications);
                let len = self.data.notifications.notifications.len();
                self.selected = self.selected.min(len.saturating_sub(1));
            }
            MessageFromBackend::PushHistoryResponse(history) => self.data.push.history = history,
            MessageFromBackend::PushStatsResponse(stats) => self.data.push.stats = Some(stats),
        }
    }

    /// Applies one key press. Returns the command to run when the key
    /// submitted one.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Command> {
        if key.kind != KeyEventKind::Press {
            return None;
        }

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Some(Command::Quit);
            }
            KeyCode::Char(ch) => self.input.push(ch),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Esc => {
                self.input.clear();
                self.status = None;
                self.help = None;
            }
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => {
                if self.selected + 1 < self.data.notifications.notifications.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Enter => return self.submit(),
            _ => {}
        }
        None
    }

    fn submit(&mut self) -> Option<Command> {
        let line = std::mem::take(&mut self.input);
        match commands::parse(&line) {
            // an empty line opens the highlighted notification
            None if !self.data.notifications.notifications.is_empty() => Some(Command::Open {
                position: self.selected + 1,
            }),
            None => None,
            Some(Ok(command)) => {
                self.status = None;
                self.help = None;
                Some(command)
            }
            Some(Err(Feedback::Help(text))) => {
                self.help = Some(text);
                None
            }
            Some(Err(Feedback::Error(message))) => {
                self.status = Some(message);
                None
            }
        }
    }

    pub fn render(&self, f: &mut Frame) {
        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(6),
                Constraint::Length(toasts::height(&self.toaster)),
                Constraint::Length(4),
            ])
            .split(f.size());
        let main = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(vertical[0]);

        notification_panel::render(f, main[0], &self.data.notifications, self.selected);
        match &self.help {
            Some(help) => {
                let pane = Paragraph::new(help.as_str())
                    .block(Block::default().title("Help (Esc closes)").borders(Borders::ALL))
                    .wrap(Wrap { trim: false });
                f.render_widget(pane, main[1]);
            }
            None => push_page::render(f, main[1], &self.data.push),
        }
        toasts::render(f, vertical[1], &self.toaster);
        command_bar::render(
            f,
            vertical[2],
            &self.data.settings,
            &self.input,
            self.status.as_deref(),
        );
    }
}
