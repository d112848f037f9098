use crate::data::CoinRow;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

/// Rows on screen together with the row → coin id mapping that belongs to
/// them. Both are swapped in one assignment so a click can never resolve
/// against ids from a different load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableSnapshot {
    rows: Vec<CoinRow>,
    ids: Vec<String>,
}

impl TableSnapshot {
    pub fn new(rows: Vec<CoinRow>) -> Self {
        let ids = rows.iter().map(|r| r.coin_id.clone()).collect();
        Self { rows, ids }
    }

    pub fn rows(&self) -> &[CoinRow] {
        &self.rows
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// border + header line
const BODY_TOP: u16 = 2;

pub struct CoinTable {
    pub snapshot: TableSnapshot,
    pub state: TableState,
    pub focused: bool,
    area: Rect,
}

impl CoinTable {
    pub fn new() -> Self {
        Self {
            snapshot: TableSnapshot::default(),
            state: TableState::default(),
            focused: false,
            area: Rect::default(),
        }
    }

    /// Replaces every row and the selection mapping, then moves the cursor
    /// back to the top.
    pub fn load(&mut self, rows: Vec<CoinRow>) {
        self.snapshot = TableSnapshot::new(rows);
        let first = if self.snapshot.is_empty() { None } else { Some(0) };
        self.state = TableState::default().with_selected(first);
    }

    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    /// Coin id behind `row`, if the row exists and has a non-empty id.
    pub fn coin_at(&self, row: usize) -> Option<&str> {
        self.snapshot
            .ids()
            .get(row)
            .map(String::as_str)
            .filter(|id| !id.is_empty())
    }

    pub fn selected(&self) -> Option<usize> {
        self.state.selected().filter(|&row| row < self.len())
    }

    pub fn select(&mut self, row: usize) {
        if row < self.len() {
            self.state.select(Some(row));
        }
    }

    pub fn select_next(&mut self) {
        if self.snapshot.is_empty() {
            return;
        }
        let next = self.selected().map_or(0, |row| (row + 1).min(self.len() - 1));
        self.state.select(Some(next));
    }

    pub fn select_prev(&mut self) {
        if self.snapshot.is_empty() {
            return;
        }
        let prev = self.selected().map_or(0, |row| row.saturating_sub(1));
        self.state.select(Some(prev));
    }

    /// Row index under a terminal cell, based on where the table was last
    /// drawn. May point past the end; callers resolve it with [`coin_at`].
    ///
    /// [`coin_at`]: CoinTable::coin_at
    pub fn row_at(&self, column: u16, row: u16) -> Option<usize> {
        let area = self.area;
        let body_bottom = area.y + area.height.saturating_sub(1);
        let inside = column > area.x
            && column < area.x + area.width.saturating_sub(1)
            && row >= area.y + BODY_TOP
            && row < body_bottom;

        inside.then(|| self.state.offset() + (row - area.y - BODY_TOP) as usize)
    }

    pub fn contains(&self, column: u16, row: u16) -> bool {
        self.area.contains(ratatui::layout::Position { x: column, y: row })
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.area = area;

        let border = if self.focused {
            Color::Yellow
        } else {
            Color::Magenta
        };
        let block = Block::default()
            .title(format!("Coins ({})", self.len()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border));

        let header = Row::new(vec!["Coin", "Price (USD)", "24h"]).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

        let rows: Vec<Row> = self
            .snapshot
            .rows()
            .iter()
            .map(|coin| {
                let change_color = match coin.change_pct {
                    Some(pct) if pct >= 0.0 => Color::Green,
                    Some(_) => Color::Red,
                    None => Color::Gray,
                };
                Row::new(vec![
                    Cell::from(coin.display_name.as_str()),
                    Cell::from(coin.price_usd.as_str()),
                    Cell::from(Span::styled(
                        coin.change_24h.as_str(),
                        Style::default().fg(change_color),
                    )),
                ])
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Percentage(45),
                Constraint::Percentage(30),
                Constraint::Percentage(25),
            ],
        )
        .header(header)
        .block(block)
        .row_highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

        frame.render_stateful_widget(table, area, &mut self.state);
    }
}
