use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use pmboard_core::board::{LaneCounts, StatusFilter};

/// Status filter strip with per-lane counts.
pub struct FilterBar {
    pub selected: StatusFilter,
    pub counts: LaneCounts,
}

impl Widget for FilterBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut spans: Vec<Span> = vec![Span::styled(
            "Status: ",
            Style::default().fg(Color::DarkGray),
        )];

        for (i, filter) in StatusFilter::ALL.iter().enumerate() {
            let count = match filter {
                StatusFilter::All => self.counts.total,
                StatusFilter::Todo => self.counts.todo,
                StatusFilter::InProgress => self.counts.in_progress,
                StatusFilter::Completed => self.counts.completed,
            };

            let style = if *filter == self.selected {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            spans.push(Span::styled(format!(" {} ({count}) ", filter.label()), style));

            if i < StatusFilter::ALL.len() - 1 {
                spans.push(Span::styled("│", Style::default().fg(Color::DarkGray)));
            }
        }

        if self.counts.other > 0 {
            spans.push(Span::styled(
                format!("  +{} other", self.counts.other),
                Style::default().fg(Color::Yellow),
            ));
        }

        let line = Line::from(spans);
        buf.set_line(area.x, area.y, &line, area.width);
    }
}
