use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use pmboard_core::model::{DashboardStats, TaskStatus};

use crate::tui::app::App;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let layout = Layout::vertical([
        Constraint::Length(8), // counters
        Constraint::Min(5),    // lanes
        Constraint::Length(1), // help bar
    ])
    .split(area);

    let Some(stats) = &app.stats else {
        let text = if app.loading {
            "  Loading..."
        } else {
            "  No dashboard data. Press r to refresh."
        };
        frame.render_widget(
            Paragraph::new(text).style(Style::default().fg(Color::Yellow)),
            layout[0],
        );
        frame.render_widget(super::help_bar(app), layout[2]);
        return;
    };

    let name = app
        .session
        .current_user()
        .map(|u| u.name.as_str())
        .unwrap_or("");
    let counter = |label: &'static str, value: u64, color: Color| {
        Line::from(vec![
            Span::styled(format!("  {label:<13}"), Style::default().fg(Color::DarkGray)),
            Span::styled(
                value.to_string(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
        ])
    };
    let info = Paragraph::new(vec![
        counter("Projects:", stats.total_projects, Color::Magenta),
        counter("Tasks:", stats.total_tasks, Color::White),
        counter("To do:", stats.todo_tasks, Color::Yellow),
        counter("In progress:", stats.in_progress_tasks, Color::Cyan),
        counter("Completed:", stats.completed_tasks, Color::Green),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(format!(" Welcome, {name} ")),
    );
    frame.render_widget(info, layout[0]);

    let lanes = Layout::horizontal([Constraint::Ratio(1, 3); 3]).split(layout[1]);
    for (i, status) in TaskStatus::KNOWN.iter().enumerate() {
        render_lane(frame, stats, status, lanes[i]);
    }

    frame.render_widget(super::help_bar(app), layout[2]);
}

fn render_lane(frame: &mut Frame, stats: &DashboardStats, status: &TaskStatus, area: Rect) {
    let tasks = stats.lane(status);
    let width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = tasks
        .iter()
        .map(|task| {
            let project = task.project_name.as_deref().unwrap_or("");
            ListItem::new(Line::from(vec![
                Span::raw(super::truncate(&task.name, width.saturating_sub(project.len() + 1))),
                Span::styled(format!(" {project}"), Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(super::status_color(status)))
            .title(format!(" {status} ({}) ", tasks.len())),
    );
    frame.render_widget(list, area);
}
