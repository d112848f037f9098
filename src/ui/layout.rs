use crate::ui::{ChartStyle, ChartWindow, CoinTable, PriceChart, SearchBar, StatusBar, WindowSelector};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};

pub struct LayoutManager {
    pub search: SearchBar,
    pub window: WindowSelector,
    pub table: CoinTable,
    pub chart: PriceChart,
    pub statusbar: StatusBar,
}

impl LayoutManager {
    pub fn new(window: ChartWindow, style: ChartStyle) -> Self {
        Self {
            search: SearchBar::new(),
            window: WindowSelector::from_window(window),
            table: CoinTable::new(),
            chart: PriceChart::new(style),
            statusbar: StatusBar::new(),
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(1),
            ])
            .split(area);

        let top_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(40), Constraint::Length(14)])
            .split(main_chunks[0]);

        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(main_chunks[1]);

        self.search.render(frame, top_chunks[0]);
        self.window.render(frame, top_chunks[1]);
        self.table.render(frame, content_chunks[0]);
        self.chart.render(frame, content_chunks[1]);
        self.statusbar.render(frame, main_chunks[2]);
    }
}
