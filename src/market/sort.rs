use std::cmp::Ordering;

use crate::gecko::{Coin, MarketOrder};

/// Column the market table is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
  #[default]
  MarketCapRank,
  CurrentPrice,
  PriceChange24h,
  MarketCap,
  TotalVolume,
  Name,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
  #[default]
  Asc,
  Desc,
}

impl SortDirection {
  pub fn flipped(self) -> Self {
    match self {
      Self::Asc => Self::Desc,
      Self::Desc => Self::Asc,
    }
  }

  pub fn arrow(self) -> &'static str {
    match self {
      Self::Asc => "▲",
      Self::Desc => "▼",
    }
  }
}

/// Value a record contributes to a comparison
enum SortKey<'a> {
  Number(Option<f64>),
  Text(&'a str),
}

impl SortField {
  /// Selector order, matching the number keys in the market view
  pub const ALL: [SortField; 6] = [
    SortField::MarketCapRank,
    SortField::CurrentPrice,
    SortField::PriceChange24h,
    SortField::MarketCap,
    SortField::TotalVolume,
    SortField::Name,
  ];

  pub fn label(self) -> &'static str {
    match self {
      Self::MarketCapRank => "Rank",
      Self::CurrentPrice => "Price",
      Self::PriceChange24h => "24h Change",
      Self::MarketCap => "Market Cap",
      Self::TotalVolume => "24h Volume",
      Self::Name => "Name",
    }
  }

  fn key(self, coin: &Coin) -> SortKey<'_> {
    match self {
      Self::MarketCapRank => SortKey::Number(coin.market_cap_rank.map(f64::from)),
      Self::CurrentPrice => SortKey::Number(coin.current_price),
      Self::PriceChange24h => SortKey::Number(coin.price_change_percentage_24h),
      Self::MarketCap => SortKey::Number(coin.market_cap),
      Self::TotalVolume => SortKey::Number(coin.total_volume),
      Self::Name => SortKey::Text(&coin.name),
    }
  }
}

/// Active sort field and direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortConfig {
  pub field: SortField,
  pub direction: SortDirection,
}

impl SortConfig {
  /// Selecting the active field flips direction; any other field starts ascending.
  pub fn select(&mut self, field: SortField) {
    if self.field == field {
      self.direction = self.direction.flipped();
    } else {
      self.field = field;
      self.direction = SortDirection::Asc;
    }
  }

  pub fn flip(&mut self) {
    self.direction = self.direction.flipped();
  }

  /// Compare two records on the active field.
  ///
  /// A missing number on either side compares equal, so such rows keep their
  /// relative order under the stable sort.
  pub fn compare(&self, a: &Coin, b: &Coin) -> Ordering {
    let ordering = match (self.field.key(a), self.field.key(b)) {
      (SortKey::Number(Some(x)), SortKey::Number(Some(y))) => {
        x.partial_cmp(&y).unwrap_or(Ordering::Equal)
      }
      (SortKey::Text(x), SortKey::Text(y)) => compare_text(x, y),
      _ => Ordering::Equal,
    };

    match self.direction {
      SortDirection::Asc => ordering,
      SortDirection::Desc => ordering.reverse(),
    }
  }

  /// Stable-sort indices into `records`
  pub fn sort_indices(&self, records: &[Coin], indices: &mut [usize]) {
    indices.sort_by(|&a, &b| self.compare(&records[a], &records[b]));
  }

  /// Upstream `order` that yields this sort for server-side paging
  pub fn upstream_order(&self) -> MarketOrder {
    use SortDirection::{Asc, Desc};
    match (self.field, self.direction) {
      // Rank 1 is the largest market cap
      (SortField::MarketCapRank, Asc) => MarketOrder::MarketCapDesc,
      (SortField::MarketCapRank, Desc) => MarketOrder::MarketCapAsc,
      (SortField::CurrentPrice, Asc) => MarketOrder::PriceAsc,
      (SortField::CurrentPrice, Desc) => MarketOrder::PriceDesc,
      (SortField::PriceChange24h, Asc) => MarketOrder::PriceChangePercentageAsc,
      (SortField::PriceChange24h, Desc) => MarketOrder::PriceChangePercentageDesc,
      (SortField::MarketCap, Asc) => MarketOrder::MarketCapAsc,
      (SortField::MarketCap, Desc) => MarketOrder::MarketCapDesc,
      (SortField::TotalVolume, Asc) => MarketOrder::VolumeAsc,
      (SortField::TotalVolume, Desc) => MarketOrder::VolumeDesc,
      (SortField::Name, Asc) => MarketOrder::IdAsc,
      (SortField::Name, Desc) => MarketOrder::IdDesc,
    }
  }
}

/// Case-folded comparison, falling back to code point order for ties
fn compare_text(a: &str, b: &str) -> Ordering {
  a.to_lowercase()
    .cmp(&b.to_lowercase())
    .then_with(|| a.cmp(b))
}
