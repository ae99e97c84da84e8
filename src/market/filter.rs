use crate::gecko::Coin;

/// Indices of records whose name or symbol contains `term`, ignoring case.
///
/// An empty term keeps every record in its original order.
pub fn filter_indices(records: &[Coin], term: &str) -> Vec<usize> {
  if term.is_empty() {
    return (0..records.len()).collect();
  }

  let needle = term.to_lowercase();
  records
    .iter()
    .enumerate()
    .filter(|(_, coin)| matches(coin, &needle))
    .map(|(i, _)| i)
    .collect()
}

fn matches(coin: &Coin, needle: &str) -> bool {
  coin.name.to_lowercase().contains(needle) || coin.symbol.to_lowercase().contains(needle)
}
