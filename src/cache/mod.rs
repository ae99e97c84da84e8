//! In-memory response cache for upstream API calls.
//!
//! This module provides a small, explicitly constructed cache that:
//! - Keys responses by endpoint plus a canonical rendering of the query parameters
//! - Treats entries older than the TTL as absent
//! - Evicts the oldest-inserted entry once the capacity bound is reached

mod key;
mod storage;

pub use key::cache_key;
pub use storage::{ResponseCache, CACHE_TTL, MAX_CACHE_ENTRIES};
