use ratatui::{
    layout::{Constraint, Flex, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use pmboard_core::confirm::Confirmation;

pub fn render(frame: &mut Frame, confirmation: &Confirmation) {
    let [area] = Layout::horizontal([Constraint::Percentage(50)])
        .flex(Flex::Center)
        .areas(frame.area());
    let [area] = Layout::vertical([Constraint::Length(6)])
        .flex(Flex::Center)
        .areas(area);

    frame.render_widget(Clear, area);
    let body = Paragraph::new(vec![
        Line::from(confirmation.prompt()),
        Line::from(""),
        Line::from(vec![
            Span::styled(
                "y",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" confirm   "),
            Span::styled("n", Style::default().fg(Color::Cyan)),
            Span::raw(" cancel"),
        ]),
    ])
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red))
            .title(" Confirm "),
    );
    frame.render_widget(body, area);
}
