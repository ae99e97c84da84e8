//! Market table state and its derived view.
//!
//! `MarketState` is a plain state machine: user actions return the page request
//! to issue (if any), and results are fed back through [`MarketState::apply`].
//! It never performs I/O itself, which keeps every transition testable without
//! a runtime. [`MarketFeed`](super::MarketFeed) wires it to a `MarketSource`.

use chrono::{DateTime, Local};
use tokio::time::Instant;

use super::debounce::{Debounced, SEARCH_DEBOUNCE};
use super::filter::filter_indices;
use super::sort::{SortConfig, SortField};
use crate::gecko::{Coin, MarketOrder, MarketParams, PAGE_SIZE};

/// A page fetch the owner should perform
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
  /// Issue order; only the latest issued request is accepted back
  pub seq: u64,
  pub params: MarketParams,
  /// Append to the current records instead of replacing them
  pub append: bool,
}

#[derive(Debug, Clone, Copy)]
struct InFlight {
  seq: u64,
  page: u32,
  per_page: u32,
  order: MarketOrder,
  append: bool,
}

#[derive(Debug)]
pub struct MarketState {
  vs_currency: String,
  records: Vec<Coin>,
  search: Debounced<String>,
  sort: SortConfig,
  /// Upstream order of the loaded pages; further pages must use it too
  loaded_order: MarketOrder,
  page: u32,
  has_more: bool,
  loading: bool,
  error: Option<String>,
  last_seq: u64,
  in_flight: Option<InFlight>,
  /// Indices into `records`, filtered and sorted
  visible: Vec<usize>,
  updated_at: Option<DateTime<Local>>,
}

impl MarketState {
  pub fn new(vs_currency: impl Into<String>) -> Self {
    Self {
      vs_currency: vs_currency.into(),
      records: Vec::new(),
      search: Debounced::new(String::new(), SEARCH_DEBOUNCE),
      sort: SortConfig::default(),
      loaded_order: SortConfig::default().upstream_order(),
      page: 1,
      has_more: true,
      loading: false,
      error: None,
      last_seq: 0,
      in_flight: None,
      visible: Vec::new(),
      updated_at: None,
    }
  }

  // ==========================================================================
  // Actions
  // ==========================================================================

  /// Fetch the first page again, replacing the records on success
  pub fn refresh(&mut self) -> PageRequest {
    let order = self.sort.upstream_order();
    self.request(order, 1, false)
  }

  /// Fetch the next page and append it. No-op while loading or after a short page.
  ///
  /// Pages continue the order the records were loaded in, even if a local
  /// sort has changed since.
  pub fn load_more(&mut self) -> Option<PageRequest> {
    if self.loading || !self.has_more {
      return None;
    }
    Some(self.request(self.loaded_order, self.page + 1, true))
  }

  /// Record a keystroke in the search box. Filtering follows after the debounce.
  pub fn set_search_term(&mut self, term: impl Into<String>, now: Instant) {
    self.search.set(term.into(), now);
  }

  /// Apply a settled search term.
  ///
  /// Clearing the search goes back to server ordering, so that triggers a
  /// first-page fetch.
  pub fn poll_search(&mut self, now: Instant) -> Option<PageRequest> {
    if !self.search.poll(now) {
      return None;
    }

    tracing::debug!(term = %self.search.applied(), "search applied");
    self.recompute();

    if self.search.applied().is_empty() {
      Some(self.refresh())
    } else {
      None
    }
  }

  /// Select a sort field (same field flips direction)
  pub fn select_sort(&mut self, field: SortField) -> Option<PageRequest> {
    self.sort.select(field);
    self.sort_changed()
  }

  /// Flip the sort direction of the active field
  pub fn flip_direction(&mut self) -> Option<PageRequest> {
    self.sort.flip();
    self.sort_changed()
  }

  /// Feed back the outcome of a page request.
  ///
  /// Returns false when the response was superseded by a newer request and
  /// discarded. A failure keeps the current records.
  pub fn apply(&mut self, seq: u64, result: Result<Vec<Coin>, String>) -> bool {
    let in_flight = match self.in_flight {
      Some(in_flight) if in_flight.seq == seq => in_flight,
      _ => {
        tracing::debug!(seq, latest = self.last_seq, "discarding superseded market page");
        return false;
      }
    };

    self.in_flight = None;
    self.loading = false;

    match result {
      Ok(coins) => {
        tracing::info!(
          page = in_flight.page,
          count = coins.len(),
          append = in_flight.append,
          "market page loaded"
        );
        self.has_more = coins.len() == in_flight.per_page as usize;
        if in_flight.append {
          self.records.extend(coins);
        } else {
          self.records = coins;
          self.loaded_order = in_flight.order;
        }
        self.page = in_flight.page;
        self.updated_at = Some(Local::now());
        self.recompute();
      }
      Err(error) => {
        tracing::warn!(page = in_flight.page, %error, "market page failed");
        self.error = Some(error);
      }
    }

    true
  }

  // ==========================================================================
  // Derived view
  // ==========================================================================

  /// Records to render, in display order
  pub fn visible(&self) -> impl Iterator<Item = &Coin> + '_ {
    self.visible.iter().map(|&i| &self.records[i])
  }

  pub fn visible_len(&self) -> usize {
    self.visible.len()
  }

  pub fn visible_at(&self, index: usize) -> Option<&Coin> {
    self.visible.get(index).map(|&i| &self.records[i])
  }

  // ==========================================================================
  // Accessors
  // ==========================================================================

  pub fn records(&self) -> &[Coin] {
    &self.records
  }

  /// Search term currently filtering the records
  pub fn search_term(&self) -> &str {
    self.search.applied()
  }

  /// A typed term is still waiting out the debounce
  pub fn search_pending(&self) -> bool {
    self.search.is_pending()
  }

  pub fn sort(&self) -> SortConfig {
    self.sort
  }

  pub fn page(&self) -> u32 {
    self.page
  }

  pub fn has_more(&self) -> bool {
    self.has_more
  }

  pub fn is_loading(&self) -> bool {
    self.loading
  }

  pub fn error(&self) -> Option<&str> {
    self.error.as_deref()
  }

  pub fn updated_at(&self) -> Option<DateTime<Local>> {
    self.updated_at
  }

  // ==========================================================================
  // Internals
  // ==========================================================================

  fn request(&mut self, order: MarketOrder, page: u32, append: bool) -> PageRequest {
    self.last_seq += 1;
    let seq = self.last_seq;

    let params = MarketParams::new(self.vs_currency.clone())
      .order(order)
      .per_page(PAGE_SIZE)
      .page(page);

    self.in_flight = Some(InFlight {
      seq,
      page,
      per_page: params.per_page,
      order,
      append,
    });
    self.loading = true;
    self.error = None;

    PageRequest {
      seq,
      params,
      append,
    }
  }

  /// With no search, ordering comes from upstream; with one, sort locally.
  fn sort_changed(&mut self) -> Option<PageRequest> {
    if self.search.applied().is_empty() {
      Some(self.refresh())
    } else {
      self.recompute();
      None
    }
  }

  fn recompute(&mut self) {
    let term = self.search.applied();
    let mut visible = filter_indices(&self.records, term);
    if !term.is_empty() {
      self.sort.sort_indices(&self.records, &mut visible);
    }
    self.visible = visible;
  }
}
