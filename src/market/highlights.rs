//! Top gainers, top losers and highest volume, fetched together.

use crate::gecko::{Coin, MarketSource};

/// Rows requested per highlight list
pub const HIGHLIGHT_LIMIT: u32 = 10;

/// Reported when any of the three queries failed
pub const HIGHLIGHTS_ERROR: &str = "Failed to fetch some highlight data";

/// Outcome of one highlights round; `None` marks a failed query
#[derive(Debug, Clone, Default)]
pub struct HighlightsFetch {
  pub gainers: Option<Vec<Coin>>,
  pub losers: Option<Vec<Coin>>,
  pub volume: Option<Vec<Coin>>,
}

impl HighlightsFetch {
  pub fn is_complete(&self) -> bool {
    self.gainers.is_some() && self.losers.is_some() && self.volume.is_some()
  }
}

/// Run the three highlight queries concurrently.
///
/// Never fails as a whole: each slot carries its own outcome.
pub async fn fetch_highlights<S: MarketSource>(
  source: &S,
  vs_currency: &str,
  limit: u32,
) -> HighlightsFetch {
  let (gainers, losers, volume) = futures::join!(
    source.top_gainers(vs_currency, limit),
    source.top_losers(vs_currency, limit),
    source.highest_volume(vs_currency, limit),
  );

  let keep = |name: &str, result: color_eyre::Result<Vec<Coin>>| match result {
    Ok(coins) => Some(coins),
    Err(e) => {
      tracing::warn!(list = name, error = %e, "highlight query failed");
      None
    }
  };

  HighlightsFetch {
    gainers: keep("gainers", gainers),
    losers: keep("losers", losers),
    volume: keep("volume", volume),
  }
}

/// Highlight lists as displayed
#[derive(Debug, Clone, Default)]
pub struct Highlights {
  pub gainers: Vec<Coin>,
  pub losers: Vec<Coin>,
  pub volume: Vec<Coin>,
  pub error: Option<String>,
}

impl Highlights {
  /// Fill each slot whose query succeeded; failed slots keep what they had.
  pub fn apply(&mut self, fetch: HighlightsFetch) {
    let complete = fetch.is_complete();

    if let Some(gainers) = fetch.gainers {
      self.gainers = gainers;
    }
    if let Some(losers) = fetch.losers {
      self.losers = losers;
    }
    if let Some(volume) = fetch.volume {
      self.volume = volume;
    }

    self.error = if complete {
      None
    } else {
      Some(HIGHLIGHTS_ERROR.to_string())
    };
  }
}
