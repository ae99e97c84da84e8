use tokio::sync::mpsc;
use tokio::time::Instant;

use super::sort::SortField;
use super::state::{MarketState, PageRequest};
use crate::gecko::{Coin, MarketSource};

type PageResult = (u64, Result<Vec<Coin>, String>);

/// Drives a [`MarketState`] against a [`MarketSource`].
///
/// Page fetches run on spawned tasks and report back over a channel; `tick()`
/// drains the channel on the event loop, so the state only changes there.
pub struct MarketFeed<S: MarketSource> {
  source: S,
  state: MarketState,
  tx: mpsc::UnboundedSender<PageResult>,
  rx: mpsc::UnboundedReceiver<PageResult>,
}

impl<S: MarketSource> MarketFeed<S> {
  pub fn new(source: S, vs_currency: impl Into<String>) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();
    Self {
      source,
      state: MarketState::new(vs_currency),
      tx,
      rx,
    }
  }

  pub fn state(&self) -> &MarketState {
    &self.state
  }

  pub fn refresh(&mut self) {
    let request = self.state.refresh();
    self.dispatch(request);
  }

  pub fn load_more(&mut self) {
    if let Some(request) = self.state.load_more() {
      self.dispatch(request);
    }
  }

  pub fn set_search_term(&mut self, term: impl Into<String>) {
    self.state.set_search_term(term, Instant::now());
  }

  pub fn select_sort(&mut self, field: SortField) {
    if let Some(request) = self.state.select_sort(field) {
      self.dispatch(request);
    }
  }

  pub fn flip_direction(&mut self) {
    if let Some(request) = self.state.flip_direction() {
      self.dispatch(request);
    }
  }

  /// Apply a settled search term and any finished page fetches.
  ///
  /// Returns true if the state changed.
  pub fn tick(&mut self) -> bool {
    let mut changed = false;

    let before = self.state.search_term().to_string();
    if let Some(request) = self.state.poll_search(Instant::now()) {
      self.dispatch(request);
    }
    changed |= before != self.state.search_term();

    while let Ok((seq, result)) = self.rx.try_recv() {
      changed |= self.state.apply(seq, result);
    }

    changed
  }

  fn dispatch(&self, request: PageRequest) {
    tracing::debug!(
      seq = request.seq,
      page = request.params.page,
      order = request.params.order.as_str(),
      "fetching market page"
    );

    let source = self.source.clone();
    let tx = self.tx.clone();
    tokio::spawn(async move {
      let result = source
        .markets(request.params)
        .await
        .map_err(|e| e.to_string());
      // Receiver gone means the view was closed
      let _ = tx.send((request.seq, result));
    });
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::gecko::{CoinDetail, MarketOrder, MarketParams, TrendingCoin};
  use color_eyre::{eyre::eyre, Result};
  use std::sync::{Arc, Mutex};
  use tokio::time::Duration;

  /// Serves scripted pages and records every request it sees
  #[derive(Clone, Default)]
  struct ScriptedSource {
    pages: Arc<Mutex<Vec<Result<Vec<Coin>, String>>>>,
    seen: Arc<Mutex<Vec<MarketParams>>>,
  }

  impl ScriptedSource {
    fn push(&self, page: Result<Vec<Coin>, String>) {
      self.pages.lock().unwrap().push(page);
    }

    fn seen(&self) -> Vec<MarketParams> {
      self.seen.lock().unwrap().clone()
    }
  }

  impl MarketSource for ScriptedSource {
    async fn markets(&self, params: MarketParams) -> Result<Vec<Coin>> {
      self.seen.lock().unwrap().push(params);
      let next = {
        let mut pages = self.pages.lock().unwrap();
        if pages.is_empty() {
          Ok(Vec::new())
        } else {
          pages.remove(0)
        }
      };
      next.map_err(|e| eyre!(e))
    }

    async fn trending(&self) -> Result<Vec<TrendingCoin>> {
      Ok(Vec::new())
    }

    async fn coin(&self, _id: &str) -> Result<CoinDetail> {
      Err(eyre!("not used"))
    }
  }

  fn coins(names: &[&str]) -> Vec<Coin> {
    names
      .iter()
      .map(|name| Coin {
        id: name.to_lowercase(),
        name: name.to_string(),
        symbol: name[..3].to_lowercase(),
        ..Default::default()
      })
      .collect()
  }

  async fn settle<S: MarketSource>(feed: &mut MarketFeed<S>) {
    for _ in 0..10 {
      tokio::task::yield_now().await;
    }
    feed.tick();
  }

  #[tokio::test]
  async fn test_refresh_loads_records() {
    let source = ScriptedSource::default();
    source.push(Ok(coins(&["Bitcoin", "Ethereum"])));

    let mut feed = MarketFeed::new(source.clone(), "usd");
    feed.refresh();
    assert!(feed.state().is_loading());

    settle(&mut feed).await;
    assert!(!feed.state().is_loading());
    assert_eq!(feed.state().visible_len(), 2);
    assert_eq!(source.seen()[0].order, MarketOrder::MarketCapDesc);
  }

  #[tokio::test]
  async fn test_network_error_keeps_previous_records() {
    let source = ScriptedSource::default();
    source.push(Ok(coins(&["Bitcoin", "Ethereum"])));
    source.push(Err("Request to /coins/markets failed".to_string()));

    let mut feed = MarketFeed::new(source, "usd");
    feed.refresh();
    settle(&mut feed).await;

    feed.refresh();
    settle(&mut feed).await;

    assert_eq!(feed.state().error(), Some("Request to /coins/markets failed"));
    assert_eq!(feed.state().visible_len(), 2);
  }

  #[tokio::test(start_paused = true)]
  async fn test_search_applies_after_debounce() {
    let source = ScriptedSource::default();
    source.push(Ok(coins(&["Bitcoin", "Ethereum", "Litecoin"])));

    let mut feed = MarketFeed::new(source, "usd");
    feed.refresh();
    settle(&mut feed).await;

    feed.set_search_term("eth");
    tokio::time::advance(Duration::from_millis(299)).await;
    feed.tick();
    assert_eq!(feed.state().visible_len(), 3);

    tokio::time::advance(Duration::from_millis(1)).await;
    assert!(feed.tick());
    let names: Vec<_> = feed.state().visible().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Ethereum"]);
  }

  #[tokio::test]
  async fn test_load_more_requests_next_page() {
    let source = ScriptedSource::default();
    let full: Vec<Coin> = (0..50)
      .map(|i| Coin {
        id: format!("c{}", i),
        name: format!("Coin {}", i),
        ..Default::default()
      })
      .collect();
    source.push(Ok(full));
    source.push(Ok(coins(&["Extra"])));

    let mut feed = MarketFeed::new(source.clone(), "usd");
    feed.refresh();
    settle(&mut feed).await;
    assert!(feed.state().has_more());

    feed.load_more();
    settle(&mut feed).await;

    assert_eq!(feed.state().records().len(), 51);
    assert!(!feed.state().has_more());
    assert_eq!(source.seen()[1].page, 2);
  }

  #[tokio::test]
  async fn test_sort_change_refetches_upstream() {
    let source = ScriptedSource::default();
    let mut feed = MarketFeed::new(source.clone(), "usd");

    feed.select_sort(SortField::CurrentPrice);
    settle(&mut feed).await;

    let seen = source.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].order, MarketOrder::PriceAsc);
    assert_eq!(seen[0].page, 1);
  }
}
