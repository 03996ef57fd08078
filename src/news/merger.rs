// file: src/news/merger.rs
// description: merges independent feed results into one time-ordered, capped news list
// reference: multi-source rss aggregation

use crate::models::{FeedBatch, NewsCard, NewsItem};
use crate::utils::text::{strip_html, truncate_chars};
use crate::utils::time::format_display_or_raw;
use std::cmp::Ordering;
use tracing::{debug, warn};

pub struct NewsMerger {
    cap: usize,
    description_chars: usize,
}

impl NewsMerger {
    pub fn new(cap: usize, description_chars: usize) -> Self {
        Self {
            cap,
            description_chars,
        }
    }

    /// Failed feeds contribute nothing. Items are ordered newest first; items
    /// with unparseable dates sink to the end, and ties keep feed order.
    pub fn merge(&self, batches: Vec<FeedBatch>) -> Vec<NewsItem> {
        let mut merged = Vec::new();

        for batch in batches {
            match batch.items {
                Ok(items) => {
                    debug!("Feed {} contributed {} items", batch.source, items.len());
                    merged.extend(items);
                }
                Err(e) => {
                    warn!("Feed {} excluded from merge: {}", batch.source, e);
                }
            }
        }

        let mut keyed: Vec<_> = merged
            .into_iter()
            .map(|item| (item.published_at(), item))
            .collect();

        keyed.sort_by(|(a, _), (b, _)| match (a, b) {
            (Some(a), Some(b)) => b.cmp(a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });

        keyed
            .into_iter()
            .take(self.cap)
            .map(|(_, item)| item)
            .collect()
    }

    pub fn to_card(&self, item: &NewsItem) -> NewsCard {
        let plain = strip_html(&item.description);
        let description = truncate_chars(plain.trim(), self.description_chars);

        NewsCard {
            title: item.title.clone(),
            published: format_display_or_raw(&item.published),
            description,
            link: item.link.clone(),
        }
    }

    pub fn to_cards(&self, items: &[NewsItem]) -> Vec<NewsCard> {
        items.iter().map(|item| self.to_card(item)).collect()
    }
}

impl Default for NewsMerger {
    fn default() -> Self {
        Self::new(10, 200)
    }
}
