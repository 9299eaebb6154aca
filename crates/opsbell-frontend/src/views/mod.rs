//! Widgets for the terminal screen, one module per pane.

pub mod command_bar;
pub mod notification_panel;
pub mod push_page;
pub mod toasts;
