// file: src/sources/nvd.rs
// description: NVD 2.0 client querying vulnerabilities by publish-date range
// reference: https://nvd.nist.gov/developers/vulnerabilities

use crate::error::{AggregatorError, Result};
use crate::models::{NvdResponse, Vulnerability};
use crate::ranker::TimeWindow;
use crate::sources::{CveSource, decode_json};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

const SOURCE_NAME: &str = "nvd";

pub struct NvdClient {
    client: Client,
    url: String,
    results_per_page: usize,
}

impl NvdClient {
    pub fn new(url: String, results_per_page: usize, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            url,
            results_per_page,
        }
    }

    fn query_url(&self, window: &TimeWindow) -> String {
        format!(
            "{}?pubStartDate={}&pubEndDate={}&resultsPerPage={}",
            self.url,
            urlencoding::encode(&nvd_timestamp(&window.start)),
            urlencoding::encode(&nvd_timestamp(&window.end)),
            self.results_per_page
        )
    }
}

fn nvd_timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

#[async_trait]
impl CveSource for NvdClient {
    async fn fetch_cves(&self, window: &TimeWindow) -> Result<Vec<Vulnerability>> {
        let url = self.query_url(window);
        debug!("Requesting vulnerabilities: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AggregatorError::transport(SOURCE_NAME, e))?;

        let body: NvdResponse = decode_json(SOURCE_NAME, response).await?;
        let vulnerabilities = body.into_vulnerabilities();
        debug!("NVD returned {} vulnerabilities", vulnerabilities.len());
        Ok(vulnerabilities)
    }
}
