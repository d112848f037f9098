use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthChar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Search,
    TopTen,
}

/// Query field plus the Search and Top 10 buttons.
pub struct SearchBar {
    input: String,
    /// Cursor position in chars, not bytes.
    cursor: usize,
    pub focused: bool,
    input_area: Rect,
    search_area: Rect,
    top_area: Rect,
}

impl SearchBar {
    pub fn new() -> Self {
        Self {
            input: String::new(),
            cursor: 0,
            focused: true,
            input_area: Rect::default(),
            search_area: Rect::default(),
            top_area: Rect::default(),
        }
    }

    pub fn query(&self) -> &str {
        &self.input
    }

    fn byte_index(&self) -> usize {
        self.input
            .char_indices()
            .nth(self.cursor)
            .map_or(self.input.len(), |(idx, _)| idx)
    }

    /// Terminal cells taken by the text left of the cursor.
    fn cursor_column(&self) -> u16 {
        let width: usize = self
            .input
            .chars()
            .take(self.cursor)
            .map(|c| c.width().unwrap_or(0))
            .sum();
        u16::try_from(width).unwrap_or(u16::MAX)
    }

    pub fn insert(&mut self, ch: char) {
        let idx = self.byte_index();
        self.input.insert(idx, ch);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let idx = self.byte_index();
        self.input.remove(idx);
    }

    pub fn delete(&mut self) {
        if self.cursor < self.input.chars().count() {
            let idx = self.byte_index();
            self.input.remove(idx);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.input.chars().count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.input.chars().count();
    }

    pub fn button_at(&self, column: u16, row: u16) -> Option<Button> {
        let pos = Position { x: column, y: row };
        if self.search_area.contains(pos) {
            Some(Button::Search)
        } else if self.top_area.contains(pos) {
            Some(Button::TopTen)
        } else {
            None
        }
    }

    pub fn input_contains(&self, column: u16, row: u16) -> bool {
        self.input_area.contains(Position { x: column, y: row })
    }

    /// Remembers where the field and buttons landed for mouse hit-testing.
    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Min(20),
                Constraint::Length(10),
                Constraint::Length(12),
            ])
            .split(area);
        self.input_area = chunks[0];
        self.search_area = chunks[1];
        self.top_area = chunks[2];

        let border = if self.focused {
            Color::Yellow
        } else {
            Color::Cyan
        };
        let block = Block::default()
            .title("Search")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border));

        let text = if self.input.is_empty() && !self.focused {
            Line::from(Span::styled(
                "coin name or keyword (e.g. bit)",
                Style::default().fg(Color::DarkGray),
            ))
        } else {
            Line::from(Span::styled(
                self.input.as_str(),
                Style::default().fg(Color::White),
            ))
        };
        let inner = block.inner(self.input_area);
        let column = self.cursor_column();
        let scroll = column.saturating_sub(inner.width.saturating_sub(1));
        frame.render_widget(
            Paragraph::new(text).block(block).scroll((0, scroll)),
            self.input_area,
        );

        if self.focused {
            frame.set_cursor_position(Position {
                x: inner.x + column - scroll,
                y: inner.y,
            });
        }

        render_button(frame, self.search_area, "Search");
        render_button(frame, self.top_area, "Top 10");
    }
}

fn render_button(frame: &mut Frame, area: Rect, label: &str) {
    let para = Paragraph::new(Line::from(Span::styled(
        label,
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue)),
    );
    frame.render_widget(para, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    fn typed(text: &str) -> SearchBar {
        let mut bar = SearchBar::new();
        text.chars().for_each(|c| bar.insert(c));
        bar
    }

    #[test]
    fn editing_respects_cursor() {
        let mut bar = typed("btc");
        bar.move_left();
        bar.insert('x');
        assert_eq!(bar.query(), "btxc");

        bar.backspace();
        assert_eq!(bar.query(), "btc");

        bar.move_home();
        bar.delete();
        assert_eq!(bar.query(), "tc");

        bar.move_end();
        bar.delete();
        bar.backspace();
        assert_eq!(bar.query(), "t");
    }

    #[test]
    fn multibyte_input_is_handled_by_char() {
        let mut bar = typed("비트");
        bar.backspace();
        assert_eq!(bar.query(), "비");
        bar.move_home();
        bar.insert('a');
        assert_eq!(bar.query(), "a비");
    }

    #[test]
    fn buttons_are_hit_tested_after_render() {
        let mut bar = SearchBar::new();
        let mut terminal = Terminal::new(TestBackend::new(60, 3)).unwrap();
        terminal.draw(|f| bar.render(f, f.area())).unwrap();

        // 60 wide: input 38, search 10, top 12
        assert_eq!(bar.button_at(42, 1), Some(Button::Search));
        assert_eq!(bar.button_at(55, 1), Some(Button::TopTen));
        assert_eq!(bar.button_at(5, 1), None);
        assert!(bar.input_contains(5, 1));
    }

    #[test]
    fn wide_chars_move_cursor_two_cells() {
        let mut bar = typed("비트a");
        assert_eq!(bar.cursor_column(), 5);
        bar.move_left();
        assert_eq!(bar.cursor_column(), 4);

        let mut terminal = Terminal::new(TestBackend::new(60, 3)).unwrap();
        terminal.draw(|f| bar.render(f, f.area())).unwrap();
        assert_eq!(terminal.get_cursor_position().unwrap(), Position { x: 5, y: 1 });
    }
}
