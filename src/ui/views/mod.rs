mod coin_detail;
mod market;

pub use coin_detail::CoinDetailView;
pub use market::MarketView;
