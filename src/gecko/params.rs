use serde_json::{json, Value};

/// Rows per market page
pub const PAGE_SIZE: u32 = 50;

/// Upstream `order` values for `/coins/markets`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketOrder {
  MarketCapDesc,
  MarketCapAsc,
  VolumeDesc,
  VolumeAsc,
  IdDesc,
  IdAsc,
  PriceDesc,
  PriceAsc,
  PriceChangePercentageDesc,
  PriceChangePercentageAsc,
}

impl MarketOrder {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::MarketCapDesc => "market_cap_desc",
      Self::MarketCapAsc => "market_cap_asc",
      Self::VolumeDesc => "volume_desc",
      Self::VolumeAsc => "volume_asc",
      Self::IdDesc => "id_desc",
      Self::IdAsc => "id_asc",
      Self::PriceDesc => "price_desc",
      Self::PriceAsc => "price_asc",
      Self::PriceChangePercentageDesc => "price_change_percentage_desc",
      Self::PriceChangePercentageAsc => "price_change_percentage_asc",
    }
  }
}

/// Query for one page of `/coins/markets`
#[derive(Debug, Clone, PartialEq)]
pub struct MarketParams {
  pub vs_currency: String,
  pub order: MarketOrder,
  pub per_page: u32,
  pub page: u32,
}

impl MarketParams {
  /// First page, ordered by market cap
  pub fn new(vs_currency: impl Into<String>) -> Self {
    Self {
      vs_currency: vs_currency.into(),
      order: MarketOrder::MarketCapDesc,
      per_page: PAGE_SIZE,
      page: 1,
    }
  }

  pub fn order(mut self, order: MarketOrder) -> Self {
    self.order = order;
    self
  }

  pub fn page(mut self, page: u32) -> Self {
    self.page = page;
    self
  }

  pub fn per_page(mut self, per_page: u32) -> Self {
    self.per_page = per_page;
    self
  }

  /// Query pairs as sent upstream
  pub fn query(&self) -> Vec<(&'static str, Value)> {
    vec![
      ("vs_currency", json!(self.vs_currency)),
      ("order", json!(self.order.as_str())),
      ("per_page", json!(self.per_page)),
      ("page", json!(self.page)),
      ("sparkline", json!(false)),
      ("price_change_percentage", json!("24h")),
    ]
  }
}
