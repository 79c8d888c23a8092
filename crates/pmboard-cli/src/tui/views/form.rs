use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Clear},
    Frame,
};

use crate::tui::{form::Form, widgets::text_input::TextInput};

/// Centered modal with one boxed input per field.
pub fn render(frame: &mut Frame, form: &Form) {
    let height = form.fields.len() as u16 * 3 + 2;
    let [area] = Layout::horizontal([Constraint::Percentage(60)])
        .flex(Flex::Center)
        .areas(frame.area());
    let [area] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);

    frame.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(form.title());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::vertical(vec![Constraint::Length(3); form.fields.len()]).split(inner);
    for (i, field) in form.fields.iter().enumerate() {
        frame.render_widget(
            TextInput {
                field,
                focused: i == form.focus,
            },
            rows[i],
        );
    }
}
