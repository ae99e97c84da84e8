use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of `/coins/markets`.
///
/// Upstream sends `null` for numbers it doesn't know, so every figure is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Coin {
  pub id: String,
  pub symbol: String,
  pub name: String,
  pub current_price: Option<f64>,
  pub market_cap: Option<f64>,
  pub market_cap_rank: Option<u32>,
  pub total_volume: Option<f64>,
  pub high_24h: Option<f64>,
  pub low_24h: Option<f64>,
  pub price_change_24h: Option<f64>,
  pub price_change_percentage_24h: Option<f64>,
  pub market_cap_change_percentage_24h: Option<f64>,
  pub circulating_supply: Option<f64>,
  pub total_supply: Option<f64>,
  pub max_supply: Option<f64>,
  pub ath: Option<f64>,
  pub ath_change_percentage: Option<f64>,
  pub atl: Option<f64>,
  pub atl_change_percentage: Option<f64>,
  pub last_updated: Option<DateTime<Utc>>,
}

/// Entry from `/search/trending`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrendingCoin {
  pub id: String,
  pub name: String,
  pub symbol: String,
  pub market_cap_rank: Option<u32>,
  pub price_btc: Option<f64>,
  pub score: Option<u32>,
}

/// Full coin details, projected onto one quote currency
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoinDetail {
  pub id: String,
  pub symbol: String,
  pub name: String,
  pub market_cap_rank: Option<u32>,
  pub current_price: Option<f64>,
  pub price_change_24h: Option<f64>,
  pub price_change_percentage_24h: Option<f64>,
  pub market_cap: Option<f64>,
  pub market_cap_change_percentage_24h: Option<f64>,
  pub total_volume: Option<f64>,
  pub high_24h: Option<f64>,
  pub low_24h: Option<f64>,
  pub circulating_supply: Option<f64>,
  pub total_supply: Option<f64>,
  pub max_supply: Option<f64>,
  pub ath: Option<f64>,
  pub ath_change_percentage: Option<f64>,
  pub ath_date: Option<DateTime<Utc>>,
  pub atl: Option<f64>,
  pub atl_change_percentage: Option<f64>,
  pub atl_date: Option<DateTime<Utc>>,
}
