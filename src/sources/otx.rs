// file: src/sources/otx.rs
// description: AlienVault OTX subscribed-pulse client
// reference: https://otx.alienvault.com/api

use crate::error::{AggregatorError, Result};
use crate::models::{Pulse, PulseResponse};
use crate::sources::{PulseSource, decode_json};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

const SOURCE_NAME: &str = "otx";

pub struct OtxClient {
    client: Client,
    url: String,
    api_key: Option<String>,
}

impl OtxClient {
    pub fn new(url: String, api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            url,
            api_key,
        }
    }
}

#[async_trait]
impl PulseSource for OtxClient {
    async fn fetch_pulses(&self) -> Result<Vec<Pulse>> {
        debug!("Requesting subscribed pulses from {}", self.url);

        let mut request = self.client.get(&self.url);
        if let Some(key) = &self.api_key {
            request = request.header("X-OTX-API-KEY", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AggregatorError::transport(SOURCE_NAME, e))?;

        let body: PulseResponse = decode_json(SOURCE_NAME, response).await?;
        debug!("OTX returned {} pulses", body.results.len());
        Ok(body.results)
    }
}
