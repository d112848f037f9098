use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use serde::{Deserialize, Serialize};

/// Time span requested from the market-chart endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartWindow {
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "7d")]
    SevenDays,
}

impl ChartWindow {
    pub fn all() -> Vec<ChartWindow> {
        vec![ChartWindow::OneDay, ChartWindow::SevenDays]
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChartWindow::OneDay => "24H",
            ChartWindow::SevenDays => "7D",
        }
    }

    /// Shown after the coin id in the chart title.
    pub fn title(&self) -> &'static str {
        match self {
            ChartWindow::OneDay => "24-hour price change",
            ChartWindow::SevenDays => "7-day price change (USD)",
        }
    }

    pub fn days(&self) -> u32 {
        match self {
            ChartWindow::OneDay => 1,
            ChartWindow::SevenDays => 7,
        }
    }

    /// `None` lets the API pick its automatic granularity.
    pub fn interval(&self) -> Option<&'static str> {
        match self {
            ChartWindow::OneDay => None,
            ChartWindow::SevenDays => Some("daily"),
        }
    }
}

pub struct WindowSelector {
    pub windows: Vec<ChartWindow>,
    pub selected: usize,
}

impl WindowSelector {
    pub fn from_window(window: ChartWindow) -> Self {
        let windows = ChartWindow::all();
        let selected = windows.iter().position(|w| *w == window).unwrap_or(0);
        Self { windows, selected }
    }

    pub fn current(&self) -> ChartWindow {
        self.windows[self.selected]
    }

    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1) % self.windows.len();
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title("Window")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let text: Vec<Span> = self
            .windows
            .iter()
            .enumerate()
            .flat_map(|(idx, window)| {
                let style = if idx == self.selected {
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
                } else {
                    Style::default().fg(Color::White)
                };
                vec![
                    Span::styled(window.label(), style),
                    if idx < self.windows.len() - 1 {
                        Span::raw(" ")
                    } else {
                        Span::raw("")
                    },
                ]
            })
            .collect();

        let para = Paragraph::new(Line::from(text)).alignment(Alignment::Center);
        frame.render_widget(para, inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_cycles_windows() {
        let mut selector = WindowSelector::from_window(ChartWindow::SevenDays);
        assert_eq!(selector.current(), ChartWindow::SevenDays);

        selector.select_next();
        assert_eq!(selector.current(), ChartWindow::OneDay);
        selector.select_next();
        assert_eq!(selector.current(), ChartWindow::SevenDays);
    }

    #[test]
    fn windows_serialize_as_short_names() {
        assert_eq!(serde_json::to_string(&ChartWindow::OneDay).unwrap(), "\"1d\"");
        let parsed: ChartWindow = serde_json::from_str("\"7d\"").unwrap();
        assert_eq!(parsed, ChartWindow::SevenDays);
    }
}
