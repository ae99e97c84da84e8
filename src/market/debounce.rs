use tokio::time::{Duration, Instant};

/// Quiet period before a search keystroke reaches the filter
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// A value whose changes only take effect after a quiet period.
///
/// Each `set` restarts the timer and replaces whatever was pending, so only the
/// last value written during a burst is ever applied.
#[derive(Debug, Clone)]
pub struct Debounced<T> {
  applied: T,
  pending: Option<(T, Instant)>,
  quiet: Duration,
}

impl<T: Clone + PartialEq> Debounced<T> {
  pub fn new(initial: T, quiet: Duration) -> Self {
    Self {
      applied: initial,
      pending: None,
      quiet,
    }
  }

  /// Schedule `value` to apply once `quiet` has passed since `now`
  pub fn set(&mut self, value: T, now: Instant) {
    self.pending = Some((value, now + self.quiet));
  }

  /// Apply the pending value if its deadline has passed.
  ///
  /// Returns true only when the applied value actually changed.
  pub fn poll(&mut self, now: Instant) -> bool {
    let value = match self.pending.take() {
      Some((value, deadline)) if now >= deadline => value,
      waiting => {
        self.pending = waiting;
        return false;
      }
    };
    if value == self.applied {
      return false;
    }
    self.applied = value;
    true
  }

  /// Value currently in effect
  pub fn applied(&self) -> &T {
    &self.applied
  }

  pub fn is_pending(&self) -> bool {
    self.pending.is_some()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
  }

  #[test]
  fn test_applies_after_quiet_period() {
    let start = Instant::now();
    let mut search = Debounced::new(String::new(), SEARCH_DEBOUNCE);

    search.set("eth".to_string(), start);
    assert!(!search.poll(start + ms(299)));
    assert_eq!(search.applied(), "");
    assert!(search.is_pending());

    assert!(search.poll(start + ms(300)));
    assert_eq!(search.applied(), "eth");
    assert!(!search.is_pending());
  }

  #[test]
  fn test_keystrokes_restart_the_timer() {
    let start = Instant::now();
    let mut search = Debounced::new(String::new(), SEARCH_DEBOUNCE);

    search.set("e".to_string(), start);
    search.set("et".to_string(), start + ms(200));
    search.set("eth".to_string(), start + ms(400));

    // First deadline passed, but it was superseded
    assert!(!search.poll(start + ms(600)));
    assert_eq!(search.applied(), "");

    assert!(search.poll(start + ms(700)));
    assert_eq!(search.applied(), "eth");
  }

  #[test]
  fn test_unchanged_value_reports_no_change() {
    let start = Instant::now();
    let mut search = Debounced::new("btc".to_string(), SEARCH_DEBOUNCE);

    search.set("btc".to_string(), start);
    assert!(!search.poll(start + ms(300)));
    assert!(!search.is_pending());
  }

  #[test]
  fn test_poll_without_pending() {
    let mut search = Debounced::new(0u32, SEARCH_DEBOUNCE);
    assert!(!search.poll(Instant::now()));
  }
}
