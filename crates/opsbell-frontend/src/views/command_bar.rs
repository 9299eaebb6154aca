use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::entities::settings_entity::SettingsEntity;

const PROMPT: &str = "> ";

fn title(settings: &SettingsEntity) -> String {
    if !settings.loaded {
        return "Loading settings…".to_string();
    }
    let channel = &settings.config.channel;
    match &channel.user_id {
        Some(user_id) => format!("{} {user_id} @ {}", channel.role, channel.server_url),
        None => format!("{} @ {}", channel.role, channel.server_url),
    }
}

/// Draws the input line with the last status message under it and places the
/// cursor after the typed text.
pub fn render(
    f: &mut Frame,
    area: Rect,
    settings: &SettingsEntity,
    input: &str,
    status: Option<&str>,
) {
    let lines = vec![
        Line::from(vec![
            Span::styled(PROMPT, Style::default().fg(Color::Cyan)),
            Span::raw(input),
        ]),
        Line::from(Span::styled(
            status.unwrap_or("Enter opens the selected notification, `help` lists commands"),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let bar = Paragraph::new(lines).block(Block::default().title(title(settings)).borders(Borders::ALL));
    f.render_widget(bar, area);

    let typed = (PROMPT.len() + input.chars().count()) as u16;
    f.set_cursor(
        (area.x + 1 + typed).min(area.right().saturating_sub(2)),
        area.y + 1,
    );
}
