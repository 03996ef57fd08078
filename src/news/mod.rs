// file: src/news/mod.rs
// description: news merging and ticker module exports
// reference: internal module structure

pub mod merger;
pub mod ticker;

pub use merger::NewsMerger;
pub use ticker::{TICKER_PLACEHOLDER, TickerSummarizer};
