use opsbell_bridge::notification::Notification;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use crate::entities::notifications_entity::NotificationsEntity;
use crate::formatting::{format_timestamp, icon};

fn item_lines(position: usize, notification: &Notification) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(vec![
        Span::raw(format!("{position}. {} ", icon(notification.kind))),
        Span::styled(
            notification.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {}", format_timestamp(notification.created_at)),
            Style::default().fg(Color::DarkGray),
        ),
    ])];
    if !notification.message.is_empty() {
        lines.push(Line::from(format!("   {}", notification.message)));
    }
    if let Some(order_id) = notification.order_id() {
        lines.push(Line::from(Span::styled(
            format!("   Order: {order_id}"),
            Style::default().fg(Color::Yellow),
        )));
    }
    lines
}

/// Draws the notification list, most recent first, with `selected` (0-based)
/// highlighted.
pub fn render(f: &mut Frame, area: Rect, entity: &NotificationsEntity, selected: usize) {
    let block = Block::default()
        .title(format!("Notifications ({})", entity.notifications.len()))
        .borders(Borders::ALL);

    if entity.notifications.is_empty() {
        let empty = Paragraph::new(Span::styled(
            "No notifications yet",
            Style::default().fg(Color::DarkGray),
        ))
        .block(block);
        f.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = entity
        .notifications
        .iter()
        .enumerate()
        .map(|(index, notification)| ListItem::new(item_lines(index + 1, notification)))
        .collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::new()
                .bg(Color::Cyan)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut list_state = ListState::default();
    list_state.select(Some(selected.min(entity.notifications.len() - 1)));
    f.render_stateful_widget(list, area, &mut list_state);
}
