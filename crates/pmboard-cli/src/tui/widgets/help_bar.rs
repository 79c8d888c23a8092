use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::tui::app::{BoardTab, InputMode, Screen};

/// Bottom help bar showing context-sensitive key bindings.
pub struct HelpBar<'a> {
    pub screen: &'a Screen,
    pub input_mode: &'a InputMode,
    pub tab: &'a BoardTab,
}

impl HelpBar<'_> {
    fn bindings(&self) -> &'static [(&'static str, &'static str)] {
        match (self.screen, self.input_mode) {
            (_, InputMode::Form) => &[
                ("Tab", "next field"),
                ("Shift+Tab", "prev field"),
                ("←/→", "choose"),
                ("Enter", "submit"),
                ("Esc", "cancel"),
                ("Ctrl+C", "quit"),
            ],
            (_, InputMode::Confirm) => &[("y", "confirm"), ("n/Esc", "cancel")],
            (Screen::Login, _) => &[("Enter", "log in"), ("Ctrl+C", "quit")],
            (Screen::Dashboard, _) => &[
                ("p/Tab", "projects"),
                ("r", "refresh"),
                ("L", "log out"),
                ("q", "quit"),
            ],
            (Screen::Projects, _) => &[
                ("j/k", "navigate"),
                ("Enter", "open"),
                ("h", "history"),
                ("n", "new"),
                ("Tab", "dashboard"),
                ("r", "refresh"),
                ("q", "quit"),
            ],
            (Screen::Board, _) => match self.tab {
                BoardTab::Tasks => &[
                    ("j/k", "navigate"),
                    ("f", "filter"),
                    ("n", "new"),
                    ("e", "edit"),
                    ("s", "advance"),
                    ("d", "delete"),
                    ("Tab", "members"),
                    ("h", "history"),
                    ("D", "delete project"),
                    ("Esc", "back"),
                ],
                BoardTab::Members => &[
                    ("j/k", "navigate"),
                    ("i", "invite"),
                    ("o", "change role"),
                    ("d", "remove"),
                    ("Tab", "tasks"),
                    ("h", "history"),
                    ("Esc", "back"),
                ],
            },
            (Screen::History, _) => &[
                ("j/k", "scroll"),
                ("PgUp/PgDn", "page"),
                ("r", "refresh"),
                ("Esc", "back"),
                ("q", "quit"),
            ],
        }
    }
}

impl Widget for HelpBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let style = Style::default().fg(Color::DarkGray);
        let key_style = Style::default().fg(Color::Cyan);

        let spans: Vec<Span> = self
            .bindings()
            .iter()
            .flat_map(|(key, what)| {
                [
                    Span::styled(*key, key_style),
                    Span::styled(format!(" {what}  "), style),
                ]
            })
            .collect();

        let line = Line::from(spans);
        buf.set_line(area.x, area.y, &line, area.width);
    }
}
