use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::tui::app::App;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let layout = Layout::vertical([
        Constraint::Min(5),    // table
        Constraint::Length(1), // notice
        Constraint::Length(1), // help bar
    ])
    .split(area);

    render_table(frame, app, layout[0]);

    if let Some(notice) = &app.notice {
        frame.render_widget(
            Paragraph::new(format!(" ✓ {notice}")).style(Style::default().fg(Color::Green)),
            layout[1],
        );
    }

    frame.render_widget(super::help_bar(app), layout[2]);
}

fn render_table(frame: &mut Frame, app: &App, area: Rect) {
    if app.loading && app.projects.is_empty() {
        let loading = Line::from(vec![Span::styled(
            "  Loading...",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )]);
        frame.render_widget(loading, area);
        return;
    }

    let header = Row::new(vec![
        Cell::from("Name"),
        Cell::from("Description"),
        Cell::from("Start"),
        Cell::from("Status"),
    ])
    .style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )
    .bottom_margin(1);

    let rows: Vec<Row> = if app.projects.is_empty() {
        vec![Row::new(vec![Cell::from(Span::styled(
            "  No projects yet. Press n to create one.",
            Style::default().fg(Color::DarkGray),
        ))])]
    } else {
        app.projects
            .iter()
            .map(|p| {
                Row::new(vec![
                    Cell::from(Span::styled(
                        p.name.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                    Cell::from(super::truncate(p.description.as_deref().unwrap_or("-"), 50)),
                    Cell::from(Span::styled(
                        p.start_date
                            .map(|d| d.format("%Y-%m-%d").to_string())
                            .unwrap_or_else(|| "-".to_string()),
                        Style::default().fg(Color::DarkGray),
                    )),
                    Cell::from(Span::styled(
                        p.status.clone(),
                        Style::default().fg(Color::Magenta),
                    )),
                ])
            })
            .collect()
    };

    let widths = [
        Constraint::Length(24),
        Constraint::Min(20),
        Constraint::Length(12),
        Constraint::Length(10),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(format!(" Projects ({}) ", app.projects.len())),
        )
        .row_highlight_style(
            Style::default()
                .bg(Color::Indexed(236))
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▸ ");

    let mut state = TableState::default();
    if !app.projects.is_empty() {
        state.select(Some(app.selected));
    }
    frame.render_stateful_widget(table, area, &mut state);
}
