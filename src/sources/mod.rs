// file: src/sources/mod.rs
// description: upstream feed collaborators and their http implementations
// reference: internal module structure

pub mod nvd;
pub mod otx;
pub mod rss;

pub use nvd::NvdClient;
pub use otx::OtxClient;
pub use rss::Rss2JsonClient;

use crate::error::{AggregatorError, Result};
use crate::models::{FeedBatch, Pulse, Vulnerability};
use crate::ranker::TimeWindow;
use async_trait::async_trait;
use reqwest::Response;
use serde::de::DeserializeOwned;

#[async_trait]
pub trait PulseSource: Send + Sync {
    async fn fetch_pulses(&self) -> Result<Vec<Pulse>>;
}

#[async_trait]
pub trait CveSource: Send + Sync {
    async fn fetch_cves(&self, window: &TimeWindow) -> Result<Vec<Vulnerability>>;
}

#[async_trait]
pub trait NewsSource: Send + Sync {
    /// One batch per configured feed. An `Err` here means the fetch layer
    /// itself failed, not that an individual feed did.
    async fn fetch_feeds(&self) -> Result<Vec<FeedBatch>>;
}

/// Checks the status and decodes a JSON body, mapping failures onto the
/// transport/payload split.
pub(crate) async fn decode_json<T: DeserializeOwned>(source_name: &str, response: Response) -> Result<T> {
    if !response.status().is_success() {
        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(AggregatorError::transport(
            source_name,
            format!("request failed with status {}: {}", status, error_text),
        ));
    }

    let body = response
        .text()
        .await
        .map_err(|e| AggregatorError::transport(source_name, e))?;

    serde_json::from_str(&body).map_err(|e| AggregatorError::payload(source_name, e))
}
