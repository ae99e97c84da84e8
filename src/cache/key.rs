//! Cache key derivation.

use serde_json::Value;
use std::collections::BTreeMap;

/// Build the cache key for an endpoint and its query parameters.
///
/// Parameters are ordered by name before rendering, so two calls with the same
/// parameter set produce the same key regardless of the order they were given in.
/// Values are rendered as JSON, which keeps `"1"` and `1` distinct.
pub fn cache_key<'a, I>(endpoint: &str, params: I) -> String
where
  I: IntoIterator<Item = (&'a str, &'a Value)>,
{
  let sorted: BTreeMap<&str, &Value> = params.into_iter().collect();

  let rendered = sorted
    .iter()
    .map(|(name, value)| format!("{}={}", name, value))
    .collect::<Vec<_>>()
    .join("&");

  format!("{}?{}", endpoint, rendered)
}
