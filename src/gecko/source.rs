use color_eyre::Result;
use std::future::Future;

use super::params::{MarketOrder, MarketParams};
use super::types::{Coin, CoinDetail, TrendingCoin};

/// Where market data comes from.
///
/// [`GeckoClient`](super::GeckoClient) is the real implementation. Views and the
/// market feed are generic over this so they can run against canned data.
pub trait MarketSource: Clone + Send + Sync + 'static {
  /// One page of `/coins/markets`
  fn markets(&self, params: MarketParams) -> impl Future<Output = Result<Vec<Coin>>> + Send;

  /// Trending coins from `/search/trending`
  fn trending(&self) -> impl Future<Output = Result<Vec<TrendingCoin>>> + Send;

  /// Full details for a single coin
  fn coin(&self, id: &str) -> impl Future<Output = Result<CoinDetail>> + Send;

  /// Forget any cached responses
  fn clear_cache(&self) {}

  fn top_gainers(
    &self,
    vs_currency: &str,
    limit: u32,
  ) -> impl Future<Output = Result<Vec<Coin>>> + Send {
    self.markets(top(vs_currency, MarketOrder::PriceChangePercentageDesc, limit))
  }

  fn top_losers(
    &self,
    vs_currency: &str,
    limit: u32,
  ) -> impl Future<Output = Result<Vec<Coin>>> + Send {
    self.markets(top(vs_currency, MarketOrder::PriceChangePercentageAsc, limit))
  }

  fn highest_volume(
    &self,
    vs_currency: &str,
    limit: u32,
  ) -> impl Future<Output = Result<Vec<Coin>>> + Send {
    self.markets(top(vs_currency, MarketOrder::VolumeDesc, limit))
  }
}

fn top(vs_currency: &str, order: MarketOrder, limit: u32) -> MarketParams {
  MarketParams::new(vs_currency).order(order).per_page(limit).page(1)
}
