// file: src/news/ticker.rs
// description: condenses the merged news set into a single rotating headline string
// reference: breaking-news ticker

use crate::models::NewsItem;

pub const TICKER_PLACEHOLDER: &str = "ALERT: Loading latest cybersecurity news...";
const TICKER_PREFIX: &str = "BREAKING: ";
const TICKER_SEPARATOR: &str = " • ";

pub struct TickerSummarizer {
    headlines: usize,
}

impl TickerSummarizer {
    pub fn new(headlines: usize) -> Self {
        Self { headlines }
    }

    pub fn summarize(&self, items: &[NewsItem]) -> String {
        if items.is_empty() {
            return TICKER_PLACEHOLDER.to_string();
        }

        let headlines = items
            .iter()
            .take(self.headlines)
            .map(|item| item.title.as_str())
            .collect::<Vec<_>>()
            .join(TICKER_SEPARATOR);

        format!("{}{}", TICKER_PREFIX, headlines)
    }
}

impl Default for TickerSummarizer {
    fn default() -> Self {
        Self::new(5)
    }
}
