// file: src/models/news.rs
// description: news item model and per-feed fetch outcome
// reference: https://rss2json.com/docs

use crate::error::Result;
use crate::models::{lenient_vec, null_as_default};
use crate::utils::time::parse_timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Rss2JsonResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub items: Vec<NewsItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub link: String,

    #[serde(rename = "pubDate", default, deserialize_with = "null_as_default")]
    pub published: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
}

impl NewsItem {
    pub fn new(title: &str, link: &str, published: &str) -> Self {
        Self {
            title: title.to_string(),
            link: link.to_string(),
            published: published.to_string(),
            description: String::new(),
        }
    }

    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.published)
    }
}

/// Outcome of fetching a single configured feed.
#[derive(Debug)]
pub struct FeedBatch {
    pub source: String,
    pub items: Result<Vec<NewsItem>>,
}

impl FeedBatch {
    pub fn ok(source: &str, items: Vec<NewsItem>) -> Self {
        Self {
            source: source.to_string(),
            items: Ok(items),
        }
    }

    pub fn failed(source: &str, error: crate::error::AggregatorError) -> Self {
        Self {
            source: source.to_string(),
            items: Err(error),
        }
    }
}
