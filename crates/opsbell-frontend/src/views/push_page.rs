use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::entities::push_entity::PushEntity;

pub fn stats_line(entity: &PushEntity) -> String {
    match entity.stats {
        Some(stats) => format!(
            "Subscribers: {}  Visited via push: {}",
            stats.total_subscribers, stats.visited_via_push
        ),
        None => "Stats not loaded yet".to_string(),
    }
}

fn history_lines(entity: &PushEntity) -> Vec<Line<'static>> {
    if entity.history.is_empty() {
        return vec![Line::from(Span::styled(
            "No notifications sent yet",
            Style::default().fg(Color::DarkGray),
        ))];
    }

    let mut lines = vec![Line::from(Span::styled(
        "Sent notifications",
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    for item in &entity.history {
        let mut heading = vec![
            Span::styled(format!("[{}] ", item.id), Style::default().fg(Color::Cyan)),
            Span::raw(item.title.clone()),
        ];
        if let Some(created_at) = &item.created_at {
            heading.push(Span::styled(
                format!("  ({created_at})"),
                Style::default().fg(Color::DarkGray),
            ));
        }
        if let Some(sent_count) = item.sent_count {
            heading.push(Span::raw(format!("  sent {sent_count}x")));
        }
        lines.push(Line::from(heading));
        lines.push(Line::from(format!("    {}", item.body)));
    }
    lines
}

/// Draws subscriber stats above the broadcast history. Ids are shown so a
/// broadcast can be resent by id.
pub fn render(f: &mut Frame, area: Rect, entity: &PushEntity) {
    let mut lines = vec![Line::from(stats_line(entity)), Line::default()];
    lines.extend(history_lines(entity));

    let page = Paragraph::new(lines)
        .block(Block::default().title("Push").borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    f.render_widget(page, area);
}
