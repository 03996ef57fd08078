// file: src/sources/rss.rs
// description: rss2json-backed news client fetching every configured feed independently
// reference: https://rss2json.com/docs

use crate::error::{AggregatorError, Result};
use crate::models::{FeedBatch, NewsItem, Rss2JsonResponse};
use crate::sources::{NewsSource, decode_json};
use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

const SOURCE_NAME: &str = "rss2json";

pub struct Rss2JsonClient {
    client: Client,
    endpoint: String,
    feeds: Vec<String>,
}

impl Rss2JsonClient {
    pub fn new(endpoint: String, feeds: Vec<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            endpoint,
            feeds,
        }
    }

    fn feed_url(&self, feed: &str) -> String {
        format!("{}?rss_url={}", self.endpoint, urlencoding::encode(feed))
    }

    async fn fetch_feed(&self, feed: &str) -> Result<Vec<NewsItem>> {
        let response = self
            .client
            .get(self.feed_url(feed))
            .send()
            .await
            .map_err(|e| AggregatorError::transport(SOURCE_NAME, e))?;

        let body: Rss2JsonResponse = decode_json(SOURCE_NAME, response).await?;
        if !body.status.is_empty() && body.status != "ok" {
            return Err(AggregatorError::payload(
                SOURCE_NAME,
                format!("feed {} reported status {}", feed, body.status),
            ));
        }
        Ok(body.items)
    }
}

#[async_trait]
impl NewsSource for Rss2JsonClient {
    async fn fetch_feeds(&self) -> Result<Vec<FeedBatch>> {
        let fetches = self.feeds.iter().map(|feed| async move {
            match self.fetch_feed(feed).await {
                Ok(items) => {
                    debug!("Feed {} returned {} items", feed, items.len());
                    FeedBatch::ok(feed, items)
                }
                Err(e) => {
                    warn!("Feed {} failed: {}", feed, e);
                    FeedBatch::failed(feed, e)
                }
            }
        });

        Ok(join_all(fetches).await)
    }
}
