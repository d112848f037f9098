pub mod client;
pub mod error;
pub mod normalize;
pub mod transport;

pub use client::*;
pub use error::FetchError;
pub use normalize::{coin_rows, price_points, CoinRow, PricePoint};
pub use transport::{HttpTransport, RawResponse, Transport};
