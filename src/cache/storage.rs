//! Bounded, time-expiring response storage.

use std::collections::{HashMap, VecDeque};
use tokio::time::{Duration, Instant};

/// How long a stored response stays usable.
pub const CACHE_TTL: Duration = Duration::from_millis(60_000);

/// Maximum number of stored responses.
pub const MAX_CACHE_ENTRIES: usize = 100;

struct CacheEntry<V> {
  value: V,
  stored_at: Instant,
}

impl<V> CacheEntry<V> {
  fn is_expired(&self, ttl: Duration) -> bool {
    self.stored_at.elapsed() > ttl
  }
}

/// Insertion-ordered key/value store with a TTL and a capacity bound.
///
/// Eviction is by insertion order, not by access: reading an entry does not
/// protect it from being the next one evicted.
pub struct ResponseCache<V> {
  entries: HashMap<String, CacheEntry<V>>,
  /// Keys, oldest insertion first
  order: VecDeque<String>,
  capacity: usize,
  ttl: Duration,
}

impl<V: Clone> ResponseCache<V> {
  pub fn new(capacity: usize, ttl: Duration) -> Self {
    Self {
      entries: HashMap::with_capacity(capacity),
      order: VecDeque::with_capacity(capacity),
      capacity,
      ttl,
    }
  }

  /// Get a stored value, dropping it first if it has outlived the TTL.
  pub fn get(&mut self, key: &str) -> Option<V> {
    let entry = self.entries.get(key)?;

    if entry.is_expired(self.ttl) {
      tracing::debug!(key, "cache entry expired");
      self.remove(key);
      return None;
    }

    Some(entry.value.clone())
  }

  /// Insert or overwrite a value.
  ///
  /// Overwriting keeps the key's original insertion position and refreshes its
  /// timestamp. A new key arriving at capacity evicts the oldest-inserted entry.
  pub fn set(&mut self, key: impl Into<String>, value: V) {
    if self.capacity == 0 {
      return;
    }

    let key = key.into();
    let stored_at = Instant::now();

    if let Some(entry) = self.entries.get_mut(&key) {
      entry.value = value;
      entry.stored_at = stored_at;
      return;
    }

    if self.entries.len() >= self.capacity {
      if let Some(oldest) = self.order.pop_front() {
        tracing::debug!(key = %oldest, "cache full, evicting oldest entry");
        self.entries.remove(&oldest);
      }
    }

    self.order.push_back(key.clone());
    self.entries.insert(key, CacheEntry { value, stored_at });
  }

  /// Drop every entry.
  pub fn clear(&mut self) {
    self.entries.clear();
    self.order.clear();
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  fn remove(&mut self, key: &str) {
    self.entries.remove(key);
    self.order.retain(|k| k != key);
  }
}
