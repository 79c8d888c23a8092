pub mod board;
pub mod confirm;
pub mod dashboard;
pub mod form;
pub mod history;
pub mod login;
pub mod projects;

use ratatui::style::Color;

use pmboard_core::model::{Priority, Role, TaskStatus};

use super::{app::App, widgets::help_bar::HelpBar};

pub(crate) fn help_bar(app: &App) -> HelpBar<'_> {
    HelpBar {
        screen: &app.nav.screen,
        input_mode: &app.input_mode,
        tab: &app.tab,
    }
}

pub(crate) fn status_color(status: &TaskStatus) -> Color {
    match status {
        TaskStatus::Todo => Color::Yellow,
        TaskStatus::InProgress => Color::Cyan,
        TaskStatus::Completed => Color::Green,
        TaskStatus::Other(_) => Color::DarkGray,
    }
}

pub(crate) fn priority_color(priority: &Priority) -> Color {
    match priority {
        Priority::High => Color::Red,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Green,
        Priority::Other(_) => Color::DarkGray,
    }
}

pub(crate) fn role_label(role: Option<Role>) -> String {
    role.map(|r| r.to_string()).unwrap_or_else(|| "—".to_string())
}

/// Cut to `max` characters, marking the cut with an ellipsis.
pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    } else {
        text.to_string()
    }
}
