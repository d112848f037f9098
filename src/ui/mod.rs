pub mod chart;
pub mod layout;
pub mod searchbar;
pub mod statusbar;
pub mod style;
pub mod table;
pub mod window;

pub use chart::PriceChart;
pub use layout::LayoutManager;
pub use searchbar::{Button, SearchBar};
pub use statusbar::StatusBar;
pub use style::{ChartStyle, StylePreset};
pub use table::{CoinTable, TableSnapshot};
pub use window::{ChartWindow, WindowSelector};
