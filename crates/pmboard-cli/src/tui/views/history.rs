use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use pmboard_core::model::TaskHistory;

use crate::tui::app::App;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let layout = Layout::vertical([
        Constraint::Min(5),    // entries
        Constraint::Length(1), // progress
        Constraint::Length(1), // help bar
    ])
    .split(area);

    let lines: Vec<Line> = if app.history.is_empty() {
        let text = if app.loading {
            "  Loading..."
        } else {
            "  No changes recorded yet."
        };
        vec![Line::from(Span::styled(
            text,
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        app.history.entries().iter().map(entry_line).collect()
    };

    let name = app.project.as_ref().map(|p| p.name.as_str()).unwrap_or("");
    let body = Paragraph::new(lines)
        .scroll((app.history_scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(format!(" History: {name} ({}) ", app.history.entries().len())),
        );
    frame.render_widget(body, layout[0]);

    let received = app.history.received();
    let mut progress = match app.history_expected {
        Some(expected) if received < expected => {
            format!(" Loaded {received}/{expected} tasks")
        }
        Some(expected) => format!(" Loaded {expected} tasks"),
        None => String::new(),
    };
    if !app.history.failed().is_empty() {
        progress.push_str(&format!(", {} failed", app.history.failed().len()));
    }
    frame.render_widget(
        Paragraph::new(progress).style(Style::default().fg(Color::DarkGray)),
        layout[1],
    );

    frame.render_widget(super::help_bar(app), layout[2]);
}

fn entry_line(entry: &TaskHistory) -> Line<'static> {
    let when = entry
        .changed_at
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "----------------".to_string());
    let by = entry
        .changed_by
        .map(|id| format!(" by #{id}"))
        .unwrap_or_default();
    Line::from(vec![
        Span::styled(format!(" {when} "), Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("task {} ", entry.task_id),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            entry.field.clone(),
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            ": {} → {}",
            entry.old_value.as_deref().unwrap_or("∅"),
            entry.new_value.as_deref().unwrap_or("∅"),
        )),
        Span::styled(by, Style::default().fg(Color::DarkGray)),
    ])
}
