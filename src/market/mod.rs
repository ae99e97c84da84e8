//! Market table pipeline: fetched records combined with search, sort and paging.

mod debounce;
mod feed;
mod filter;
mod highlights;
mod sort;
mod state;

pub use feed::MarketFeed;
pub use highlights::{fetch_highlights, Highlights, HighlightsFetch, HIGHLIGHT_LIMIT};
pub use sort::SortField;
