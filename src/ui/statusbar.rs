use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};

pub struct StatusBar {
    pub busy: bool,
    pub state: &'static str,
    pub message: String,
}

impl StatusBar {
    pub fn new() -> Self {
        Self {
            busy: false,
            state: "IDLE",
            message: String::new(),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let status_color = if self.busy {
            Color::Yellow
        } else {
            Color::Green
        };
        let status_text = if self.busy { "◌" } else { "●" };

        let text = Line::from(vec![
            Span::styled(
                format!("{} ", status_text),
                Style::default().fg(status_color),
            ),
            Span::styled(self.state, Style::default().fg(Color::White)),
            Span::raw(" | "),
            Span::styled(self.message.as_str(), Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled("Esc", Style::default().fg(Color::Yellow)),
            Span::raw(":Quit "),
            Span::styled("Tab", Style::default().fg(Color::Yellow)),
            Span::raw(":Focus "),
            Span::styled("Enter", Style::default().fg(Color::Yellow)),
            Span::raw(":Search/Chart "),
            Span::styled("F5", Style::default().fg(Color::Yellow)),
            Span::raw(":Top 10 "),
            Span::styled("^W", Style::default().fg(Color::Yellow)),
            Span::raw(":Window"),
        ]);

        let para = Paragraph::new(text).block(Block::default());
        frame.render_widget(para, area);
    }
}
