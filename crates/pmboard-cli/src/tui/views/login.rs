use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::tui::app::App;

/// Banner behind the login form. The form itself is drawn as an overlay.
pub fn render(frame: &mut Frame, app: &App, area: Rect, base_url: &str) {
    let layout = Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).split(area);

    let [banner] = Layout::vertical([Constraint::Length(3)])
        .flex(Flex::Start)
        .areas(layout[0]);
    let lines = vec![
        Line::from(Span::styled(
            "  pmboard",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("  Server: ", Style::default().fg(Color::DarkGray)),
            Span::styled(base_url.to_string(), Style::default().fg(Color::Green)),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines), banner);

    frame.render_widget(super::help_bar(app), layout[1]);
}
