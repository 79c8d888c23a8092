use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

use crate::tui::form::{Field, FieldKind};

/// One form field in a bordered box. Choice fields show `< value >`.
pub struct TextInput<'a> {
    pub field: &'a Field,
    pub focused: bool,
}

impl Widget for TextInput<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_color = if self.focused {
            Color::Yellow
        } else {
            Color::DarkGray
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .title(format!(" {} ", self.field.label));

        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height == 0 || inner.width == 0 {
            return;
        }

        let text = self.field.display();
        let line = match self.field.kind {
            FieldKind::Choice(_) => {
                let arrow = Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD);
                Line::from(vec![
                    Span::styled(" < ", arrow),
                    Span::styled(
                        text,
                        Style::default()
                            .fg(Color::Magenta)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(" > ", arrow),
                ])
            }
            FieldKind::Text | FieldKind::Secret => {
                let mut spans = vec![Span::raw(text)];
                if self.focused {
                    spans.push(Span::styled(
                        " ",
                        Style::default().bg(Color::White).add_modifier(Modifier::BOLD),
                    ));
                }
                Line::from(spans)
            }
        };
        buf.set_line(inner.x, inner.y, &line, inner.width);
    }
}
