use opsbell_bridge::toast::ToastKind;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::formatting::toast_label;
use crate::toast::Toaster;

const MAX_VISIBLE: usize = 4;

fn color(kind: ToastKind) -> Color {
    match kind {
        ToastKind::Info => Color::Cyan,
        ToastKind::Success => Color::Green,
        ToastKind::Warning => Color::Yellow,
        ToastKind::Error => Color::Red,
    }
}

/// Rows the toast pane needs, borders included.
pub fn height(toaster: &Toaster) -> u16 {
    toaster.active().count().clamp(1, MAX_VISIBLE) as u16 + 2
}

/// Draws the newest toasts, oldest on top.
pub fn render(f: &mut Frame, area: Rect, toaster: &Toaster) {
    let active: Vec<_> = toaster.active().collect();
    let skip = active.len().saturating_sub(MAX_VISIBLE);
    let lines: Vec<Line> = active[skip..]
        .iter()
        .map(|toast| {
            Line::from(vec![
                Span::styled(
                    format!("[{}] ", toast_label(toast.kind)),
                    Style::default()
                        .fg(color(toast.kind))
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(toast.message.as_str()),
            ])
        })
        .collect();

    let pane = Paragraph::new(lines).block(Block::default().title("Toasts").borders(Borders::ALL));
    f.render_widget(pane, area);
}
