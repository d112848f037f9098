use crate::data::PricePoint;
use crate::ui::ChartStyle;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

const GRID_LINES: usize = 4;

#[derive(Debug, Clone)]
pub struct PriceChart {
    pub coin_id: Option<String>,
    pub title: String,
    pub points: Vec<PricePoint>,
    pub style: ChartStyle,
}

impl PriceChart {
    pub fn new(style: ChartStyle) -> Self {
        Self {
            coin_id: None,
            title: "Price chart".to_string(),
            points: Vec::new(),
            style,
        }
    }

    /// Replaces the plotted series. An empty series keeps whatever is on
    /// screen and returns `false`.
    pub fn plot(&mut self, coin_id: &str, points: Vec<PricePoint>, window_title: &str) -> bool {
        if points.is_empty() {
            tracing::info!(coin_id, "no chart data, keeping previous chart");
            return false;
        }

        self.coin_id = Some(coin_id.to_string());
        self.title = format!("{} - {}", coin_id, window_title);
        self.points = points;
        true
    }

    fn price_bounds(&self) -> (f64, f64) {
        let (min, max) = self
            .points
            .iter()
            .fold((f64::MAX, f64::MIN), |(min, max), p| {
                (min.min(p.price_usd), max.max(p.price_usd))
            });

        let pad = if max > min {
            (max - min) * 0.05
        } else {
            (max.abs() * 0.01).max(0.0001)
        };
        (min - pad, max + pad)
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let mut block = Block::default()
            .title(self.title.as_str())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        if let Some(bg) = self.style.background {
            block = block.style(Style::default().bg(bg));
        }

        if self.points.is_empty() {
            let text = Line::from(Span::styled(
                "Select a coin to show its price chart",
                Style::default().fg(Color::Gray),
            ));
            let para = Paragraph::new(text)
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(para, area);
            return;
        }

        let series: Vec<(f64, f64)> = self
            .points
            .iter()
            .map(|p| (p.index as f64, p.price_usd))
            .collect();

        let x_max = series.last().map(|(x, _)| *x).unwrap_or(0.0).max(1.0);
        let (y_min, y_max) = self.price_bounds();

        let grid: Vec<[(f64, f64); 2]> = match self.style.grid {
            Some(_) => (1..GRID_LINES)
                .map(|i| {
                    let y = y_min + (y_max - y_min) * i as f64 / GRID_LINES as f64;
                    [(0.0, y), (x_max, y)]
                })
                .collect(),
            None => Vec::new(),
        };

        let mut datasets: Vec<Dataset> = grid
            .iter()
            .map(|line| {
                Dataset::default()
                    .marker(ratatui::symbols::Marker::Dot)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(self.style.grid.unwrap_or(Color::DarkGray)))
                    .data(line)
            })
            .collect();

        datasets.push(
            Dataset::default()
                .marker(self.style.line_marker)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(self.style.line))
                .data(&series),
        );
        datasets.push(
            Dataset::default()
                .marker(self.style.point_marker)
                .graph_type(GraphType::Scatter)
                .style(
                    Style::default()
                        .fg(self.style.point)
                        .add_modifier(Modifier::BOLD),
                )
                .data(&series),
        );

        let axis_style = Style::default().fg(self.style.axis_text);
        let y_labels = vec![
            Span::styled(format!("{:.2}", y_min), axis_style),
            Span::styled(format!("{:.2}", (y_min + y_max) / 2.0), axis_style),
            Span::styled(format!("{:.2}", y_max), axis_style),
        ];
        let x_labels = vec![
            Span::styled("0", axis_style),
            Span::styled(format!("{}", x_max as usize), axis_style),
        ];

        let mut chart = Chart::new(datasets)
            .block(block)
            .x_axis(
                Axis::default()
                    .title(Span::styled("index", axis_style))
                    .style(axis_style)
                    .bounds([0.0, x_max])
                    .labels(x_labels),
            )
            .y_axis(
                Axis::default()
                    .title(Span::styled("USD", axis_style))
                    .style(axis_style)
                    .bounds([y_min, y_max])
                    .labels(y_labels),
            );
        if let Some(bg) = self.style.background {
            chart = chart.style(Style::default().bg(bg));
        }

        frame.render_widget(chart, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    fn points(prices: &[f64]) -> Vec<PricePoint> {
        prices
            .iter()
            .enumerate()
            .map(|(index, &price_usd)| PricePoint { index, price_usd })
            .collect()
    }

    fn screen(chart: &PriceChart) -> String {
        let mut terminal = Terminal::new(TestBackend::new(60, 16)).unwrap();
        terminal.draw(|f| chart.render(f, f.area())).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn plot_sets_title_and_points() {
        let mut chart = PriceChart::new(ChartStyle::plain());

        assert!(chart.plot("bitcoin", points(&[1.0, 2.0, 3.0]), "7-day price change (USD)"));

        assert_eq!(chart.title, "bitcoin - 7-day price change (USD)");
        assert_eq!(chart.coin_id.as_deref(), Some("bitcoin"));
        assert_eq!(chart.points.len(), 3);
    }

    #[test]
    fn empty_series_keeps_previous_chart() {
        let mut chart = PriceChart::new(ChartStyle::dark());
        chart.plot("bitcoin", points(&[1.0, 2.0]), "24-hour price change");

        assert!(!chart.plot("ethereum", Vec::new(), "24-hour price change"));

        assert_eq!(chart.coin_id.as_deref(), Some("bitcoin"));
        assert_eq!(chart.title, "bitcoin - 24-hour price change");
        assert_eq!(chart.points, points(&[1.0, 2.0]));
    }

    #[test]
    fn flat_series_still_has_a_range() {
        let mut chart = PriceChart::new(ChartStyle::plain());
        chart.plot("tether", points(&[1.0, 1.0, 1.0]), "24-hour price change");

        let (lo, hi) = chart.price_bounds();
        assert!(lo < 1.0 && hi > 1.0);
    }

    #[test]
    fn renders_title_and_placeholder() {
        let mut chart = PriceChart::new(ChartStyle::dark());
        assert!(screen(&chart).contains("Select a coin"));

        chart.plot("solana", points(&[140.0, 150.0, 145.0]), "24-hour price change");
        assert!(screen(&chart).contains("solana - 24-hour price change"));
    }
}
