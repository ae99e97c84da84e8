//! Serde-deserializable types matching CoinGecko's nested responses.
//!
//! These types are separate from domain types to allow clean deserialization
//! while keeping domain types focused on application needs. `/coins/markets`
//! is already flat and deserializes straight into [`Coin`](super::types::Coin).

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;

use super::types::{CoinDetail, TrendingCoin};

// ============================================================================
// /search/trending
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiTrendingResponse {
  #[serde(default)]
  pub coins: Vec<ApiTrendingItem>,
}

#[derive(Debug, Deserialize)]
pub struct ApiTrendingItem {
  pub item: ApiTrendingCoin,
}

#[derive(Debug, Deserialize)]
pub struct ApiTrendingCoin {
  pub id: String,
  pub name: String,
  pub symbol: String,
  pub market_cap_rank: Option<u32>,
  pub price_btc: Option<f64>,
  pub score: Option<u32>,
}

impl ApiTrendingResponse {
  pub fn into_coins(self) -> Vec<TrendingCoin> {
    self
      .coins
      .into_iter()
      .map(|entry| {
        let coin = entry.item;
        TrendingCoin {
          id: coin.id,
          name: coin.name,
          symbol: coin.symbol,
          market_cap_rank: coin.market_cap_rank,
          price_btc: coin.price_btc,
          score: coin.score,
        }
      })
      .collect()
  }
}

// ============================================================================
// /coins/{id}
// ============================================================================

/// Per-currency figures, e.g. `{"usd": 1.0, "eur": 0.9}`. Values can be null.
type CurrencyMap<T> = HashMap<String, Option<T>>;

#[derive(Debug, Deserialize)]
pub struct ApiCoinDetail {
  pub id: String,
  pub symbol: String,
  pub name: String,
  pub market_cap_rank: Option<u32>,
  pub market_data: Option<ApiMarketData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiMarketData {
  #[serde(default)]
  pub current_price: CurrencyMap<f64>,
  #[serde(default)]
  pub market_cap: CurrencyMap<f64>,
  #[serde(default)]
  pub total_volume: CurrencyMap<f64>,
  #[serde(default)]
  pub high_24h: CurrencyMap<f64>,
  #[serde(default)]
  pub low_24h: CurrencyMap<f64>,
  #[serde(default)]
  pub price_change_24h_in_currency: CurrencyMap<f64>,
  pub price_change_percentage_24h: Option<f64>,
  pub market_cap_change_percentage_24h: Option<f64>,
  pub circulating_supply: Option<f64>,
  pub total_supply: Option<f64>,
  pub max_supply: Option<f64>,
  #[serde(default)]
  pub ath: CurrencyMap<f64>,
  #[serde(default)]
  pub ath_change_percentage: CurrencyMap<f64>,
  #[serde(default)]
  pub ath_date: CurrencyMap<DateTime<Utc>>,
  #[serde(default)]
  pub atl: CurrencyMap<f64>,
  #[serde(default)]
  pub atl_change_percentage: CurrencyMap<f64>,
  #[serde(default)]
  pub atl_date: CurrencyMap<DateTime<Utc>>,
}

fn pick<T: Copy>(map: &CurrencyMap<T>, currency: &str) -> Option<T> {
  map.get(currency).copied().flatten()
}

impl ApiCoinDetail {
  /// Convert to domain type, keeping only figures quoted in `currency`
  pub fn into_detail(self, currency: &str) -> CoinDetail {
    let data = self.market_data.unwrap_or_default();

    CoinDetail {
      id: self.id,
      symbol: self.symbol,
      name: self.name,
      market_cap_rank: self.market_cap_rank,
      current_price: pick(&data.current_price, currency),
      price_change_24h: pick(&data.price_change_24h_in_currency, currency),
      price_change_percentage_24h: data.price_change_percentage_24h,
      market_cap: pick(&data.market_cap, currency),
      market_cap_change_percentage_24h: data.market_cap_change_percentage_24h,
      total_volume: pick(&data.total_volume, currency),
      high_24h: pick(&data.high_24h, currency),
      low_24h: pick(&data.low_24h, currency),
      circulating_supply: data.circulating_supply,
      total_supply: data.total_supply,
      max_supply: data.max_supply,
      ath: pick(&data.ath, currency),
      ath_change_percentage: pick(&data.ath_change_percentage, currency),
      ath_date: pick(&data.ath_date, currency),
      atl: pick(&data.atl, currency),
      atl_change_percentage: pick(&data.atl_change_percentage, currency),
      atl_date: pick(&data.atl_date, currency),
    }
  }
}
