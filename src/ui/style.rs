use ratatui::{style::Color, symbols::Marker};
use serde::{Deserialize, Serialize};

/// Named chart skins selectable from the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StylePreset {
    #[default]
    Plain,
    Dark,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartStyle {
    pub background: Option<Color>,
    pub line: Color,
    pub line_marker: Marker,
    pub point: Color,
    pub point_marker: Marker,
    pub axis_text: Color,
    pub grid: Option<Color>,
}

impl ChartStyle {
    pub fn plain() -> Self {
        Self {
            background: None,
            line: Color::Blue,
            line_marker: Marker::Braille,
            point: Color::Blue,
            point_marker: Marker::Dot,
            axis_text: Color::Gray,
            grid: None,
        }
    }

    /// Dark background, lime line, white points and a faint grid.
    pub fn dark() -> Self {
        Self {
            background: Some(Color::Rgb(0x2b, 0x2b, 0x2b)),
            line: Color::Rgb(0x00, 0xff, 0x00),
            line_marker: Marker::Braille,
            point: Color::White,
            point_marker: Marker::Dot,
            axis_text: Color::Rgb(0xee, 0xee, 0xee),
            grid: Some(Color::Rgb(0x55, 0x55, 0x55)),
        }
    }
}

impl From<StylePreset> for ChartStyle {
    fn from(preset: StylePreset) -> Self {
        match preset {
            StylePreset::Plain => ChartStyle::plain(),
            StylePreset::Dark => ChartStyle::dark(),
        }
    }
}
