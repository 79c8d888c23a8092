use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Tabs},
    Frame,
};

use crate::tui::{
    app::{App, BoardTab},
    widgets::filter_bar::FilterBar,
};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let layout = Layout::vertical([
        Constraint::Length(2), // title + tabs
        Constraint::Length(1), // filter bar
        Constraint::Min(5),    // table
        Constraint::Length(1), // notice
        Constraint::Length(1), // help bar
    ])
    .split(area);

    render_header(frame, app, layout[0]);

    if app.tab == BoardTab::Tasks {
        frame.render_widget(
            FilterBar {
                selected: app.filter,
                counts: app.board.lane_counts(),
            },
            layout[1],
        );
    }

    match app.tab {
        BoardTab::Tasks => render_tasks(frame, app, layout[2]),
        BoardTab::Members => render_members(frame, app, layout[2]),
    }

    if let Some(notice) = &app.notice {
        frame.render_widget(
            Paragraph::new(format!(" ✓ {notice}")).style(Style::default().fg(Color::Green)),
            layout[3],
        );
    }

    frame.render_widget(super::help_bar(app), layout[4]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let [title_area, tabs_area] =
        Layout::horizontal([Constraint::Min(20), Constraint::Length(24)]).areas(area);

    let name = app.project.as_ref().map(|p| p.name.as_str()).unwrap_or("");
    let title = Line::from(vec![
        Span::styled(
            format!(" {name} "),
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("│ role: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            super::role_label(app.caps.role()),
            Style::default().fg(Color::Cyan),
        ),
    ]);
    frame.render_widget(
        Paragraph::new(title).block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(Color::DarkGray)),
        ),
        title_area,
    );

    let selected = match app.tab {
        BoardTab::Tasks => 0,
        BoardTab::Members => 1,
    };
    let tabs = Tabs::new(vec!["Tasks", "Members"])
        .select(selected)
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, tabs_area);
}

fn render_tasks(frame: &mut Frame, app: &App, area: Rect) {
    let tasks = app.visible_tasks();
    if app.loading && tasks.is_empty() {
        frame.render_widget(
            Paragraph::new("  Loading...").style(Style::default().fg(Color::Yellow)),
            area,
        );
        return;
    }

    let header = Row::new(vec![
        Cell::from("ID"),
        Cell::from("Name"),
        Cell::from("Status"),
        Cell::from("Priority"),
        Cell::from("Due"),
        Cell::from("Assignee"),
    ])
    .style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )
    .bottom_margin(1);

    let rows: Vec<Row> = if tasks.is_empty() {
        vec![Row::new(vec![Cell::from(Span::styled(
            "  No tasks here.",
            Style::default().fg(Color::DarkGray),
        ))])]
    } else {
        tasks
            .iter()
            .map(|t| {
                Row::new(vec![
                    Cell::from(Span::styled(
                        t.id.to_string(),
                        Style::default().fg(Color::DarkGray),
                    )),
                    Cell::from(super::truncate(&t.name, 40)),
                    Cell::from(Span::styled(
                        t.status.to_string(),
                        Style::default().fg(super::status_color(&t.status)),
                    )),
                    Cell::from(Span::styled(
                        t.priority.to_string(),
                        Style::default().fg(super::priority_color(&t.priority)),
                    )),
                    Cell::from(
                        t.due_date
                            .map(|d| d.format("%Y-%m-%d").to_string())
                            .unwrap_or_else(|| "-".to_string()),
                    ),
                    Cell::from(t.assignee_name.clone().unwrap_or_else(|| "-".to_string())),
                ])
            })
            .collect()
    };

    let widths = [
        Constraint::Length(6),
        Constraint::Min(20),
        Constraint::Length(12),
        Constraint::Length(9),
        Constraint::Length(11),
        Constraint::Length(16),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(format!(" Tasks: {} ({}) ", app.filter.label(), tasks.len())),
        )
        .row_highlight_style(
            Style::default()
                .bg(Color::Indexed(236))
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▸ ");

    let mut state = TableState::default();
    if !tasks.is_empty() {
        state.select(Some(app.task_selected));
    }
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_members(frame: &mut Frame, app: &App, area: Rect) {
    let header = Row::new(vec![
        Cell::from("Name"),
        Cell::from("Email"),
        Cell::from("Role"),
        Cell::from("Status"),
    ])
    .style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )
    .bottom_margin(1);

    let rows: Vec<Row> = app
        .members
        .iter()
        .map(|m| {
            let status_color = if m.status == "ACCEPTED" {
                Color::Green
            } else {
                Color::Yellow
            };
            Row::new(vec![
                Cell::from(m.name.clone()),
                Cell::from(Span::styled(
                    m.email.clone(),
                    Style::default().fg(Color::DarkGray),
                )),
                Cell::from(Span::styled(
                    super::role_label(m.role),
                    Style::default().fg(Color::Magenta),
                )),
                Cell::from(Span::styled(
                    m.status.clone(),
                    Style::default().fg(status_color),
                )),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(20),
        Constraint::Min(24),
        Constraint::Length(10),
        Constraint::Length(10),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(format!(" Members ({}) ", app.members.len())),
        )
        .row_highlight_style(
            Style::default()
                .bg(Color::Indexed(236))
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▸ ");

    let mut state = TableState::default();
    if !app.members.is_empty() {
        state.select(Some(app.member_selected));
    }
    frame.render_stateful_widget(table, area, &mut state);
}
