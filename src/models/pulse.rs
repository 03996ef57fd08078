// file: src/models/pulse.rs
// description: threat-intelligence pulse model as delivered by the OTX subscribed feed
// reference: https://otx.alienvault.com/api

use crate::models::{lenient_vec, null_as_default};
use crate::utils::time::parse_timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub const OTX_PULSE_URL: &str = "https://otx.alienvault.com/pulse";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PulseResponse {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub results: Vec<Pulse>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pulse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub modified: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub created: String,

    /// Raw upstream severity; absent or non-numeric values read as `None`.
    #[serde(default, deserialize_with = "lenient_severity")]
    pub severity: Option<i64>,

    #[serde(default, deserialize_with = "lenient_vec")]
    pub tags: Vec<String>,

    #[serde(default, deserialize_with = "lenient_vec")]
    pub indicators: Vec<Indicator>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub indicator_type: String,

    #[serde(rename = "indicator", default, deserialize_with = "null_as_default")]
    pub value: String,
}

impl Pulse {
    pub fn otx_url(&self) -> String {
        format!("{}/{}", OTX_PULSE_URL, self.id)
    }

    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.modified)
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.created)
    }

    /// Severity with the absent case folded to zero.
    pub fn raw_severity(&self) -> i64 {
        self.severity.unwrap_or(0)
    }
}

impl Indicator {
    pub fn new(indicator_type: &str, value: &str) -> Self {
        Self {
            indicator_type: indicator_type.to_string(),
            value: value.to_string(),
        }
    }
}

fn lenient_severity<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        serde_json::Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }))
}
