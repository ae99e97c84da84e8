//! Background fetches polled from the event loop.
//!
//! A `Query<T>` owns a fetcher closure. Each run is spawned on tokio and its
//! result travels back over a channel; views call `poll()` on every tick.
//! The last successful value is kept through later loads and failures, so a
//! section keeps showing data while it reloads or after a refresh fails.
//!
//! ```ignore
//! let source = client.clone();
//! let mut trending = Query::new(move || {
//!   let source = source.clone();
//!   async move { source.trending().await.map_err(|e| e.to_string()) }
//! });
//! trending.fetch();
//!
//! // every tick
//! if trending.poll() {
//!   // redraw
//! }
//! ```

use std::future::Future;
use std::pin::Pin;
use tokio::sync::mpsc;

/// Outcome of the most recent run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryStatus {
  /// Never started
  Idle,
  Loading,
  Success,
  Error(String),
}

type Outcome<T> = Result<T, String>;
type Fetcher<T> = Box<dyn Fn() -> Pin<Box<dyn Future<Output = Outcome<T>> + Send>> + Send + Sync>;

pub struct Query<T> {
  fetcher: Fetcher<T>,
  status: QueryStatus,
  last_good: Option<T>,
  /// Channel of the run whose result we still want; `None` when settled
  pending: Option<mpsc::UnboundedReceiver<Outcome<T>>>,
}

impl<T: Send + 'static> Query<T> {
  pub fn new<F, Fut>(fetcher: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Outcome<T>> + Send + 'static,
  {
    Self {
      fetcher: Box::new(move || Box::pin(fetcher())),
      status: QueryStatus::Idle,
      last_good: None,
      pending: None,
    }
  }

  pub fn status(&self) -> &QueryStatus {
    &self.status
  }

  /// Latest successful value, even if a newer run is loading or failed
  pub fn data(&self) -> Option<&T> {
    self.last_good.as_ref()
  }

  pub fn is_loading(&self) -> bool {
    self.status == QueryStatus::Loading
  }

  pub fn error(&self) -> Option<&str> {
    match &self.status {
      QueryStatus::Error(e) => Some(e),
      _ => None,
    }
  }

  /// Start a run unless one is already loading
  pub fn fetch(&mut self) {
    if !self.is_loading() {
      self.spawn_run();
    }
  }

  /// Start a new run now. A run still in flight finishes but is ignored.
  pub fn refetch(&mut self) {
    self.spawn_run();
  }

  /// Take a finished result, if any. Returns true when the status changed.
  pub fn poll(&mut self) -> bool {
    let Some(rx) = self.pending.as_mut() else {
      return false;
    };

    let outcome = match rx.try_recv() {
      Ok(outcome) => outcome,
      Err(mpsc::error::TryRecvError::Empty) => return false,
      // The task died without reporting
      Err(mpsc::error::TryRecvError::Disconnected) => Err("Query was cancelled".to_string()),
    };
    self.pending = None;

    match outcome {
      Ok(value) => {
        self.last_good = Some(value);
        self.status = QueryStatus::Success;
      }
      Err(error) => self.status = QueryStatus::Error(error),
    }
    true
  }

  fn spawn_run(&mut self) {
    let (tx, rx) = mpsc::unbounded_channel();
    // Replacing the receiver is what discards a superseded run
    self.pending = Some(rx);
    self.status = QueryStatus::Loading;

    let run = (self.fetcher)();
    tokio::spawn(async move {
      let _ = tx.send(run.await);
    });
  }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Query<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Query")
      .field("status", &self.status)
      .field("last_good", &self.last_good)
      .finish_non_exhaustive()
  }
}
