//! CoinGecko API access: client, response types and the `MarketSource` seam.

pub mod api_types;
pub mod client;
pub mod params;
pub mod source;
pub mod types;

pub use client::GeckoClient;
pub use params::{MarketOrder, MarketParams, PAGE_SIZE};
pub use source::MarketSource;
pub use types::{Coin, CoinDetail, TrendingCoin};
