// file: src/models/vulnerability.rs
// description: CVE record model following the NVD 2.0 response layout
// reference: https://nvd.nist.gov/developers/vulnerabilities

use crate::models::{lenient_opt_vec, lenient_vec, null_as_default};
use crate::utils::time::parse_timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const NVD_DETAIL_URL: &str = "https://nvd.nist.gov/vuln/detail";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NvdResponse {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub vulnerabilities: Vec<VulnerabilityEnvelope>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VulnerabilityEnvelope {
    pub cve: Vulnerability,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vulnerability {
    pub id: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub published: String,

    #[serde(default, deserialize_with = "lenient_vec")]
    pub descriptions: Vec<CveDescription>,

    #[serde(default)]
    pub metrics: Option<CveMetrics>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CveDescription {
    #[serde(default, deserialize_with = "null_as_default")]
    pub lang: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CveMetrics {
    #[serde(
        rename = "cvssMetricV31",
        default,
        deserialize_with = "lenient_opt_vec",
        skip_serializing_if = "Option::is_none"
    )]
    pub v31: Option<Vec<CvssMetric>>,

    #[serde(
        rename = "cvssMetricV2",
        default,
        deserialize_with = "lenient_opt_vec",
        skip_serializing_if = "Option::is_none"
    )]
    pub v2: Option<Vec<CvssMetric>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CvssMetric {
    #[serde(rename = "cvssData", default, skip_serializing_if = "Option::is_none")]
    pub cvss_data: Option<CvssData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CvssData {
    #[serde(rename = "baseScore", default, skip_serializing_if = "Option::is_none")]
    pub base_score: Option<f64>,
}

impl CvssMetric {
    pub fn with_score(base_score: f64) -> Self {
        Self {
            cvss_data: Some(CvssData {
                base_score: Some(base_score),
            }),
        }
    }

    pub fn base_score(&self) -> Option<f64> {
        self.cvss_data.as_ref().and_then(|data| data.base_score)
    }
}

impl NvdResponse {
    pub fn into_vulnerabilities(self) -> Vec<Vulnerability> {
        self.vulnerabilities.into_iter().map(|v| v.cve).collect()
    }
}

impl Vulnerability {
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.published)
    }

    /// First base score of the v3.1 metrics, falling back to v2, then 0.
    pub fn canonical_score(&self) -> f64 {
        self.metrics
            .as_ref()
            .and_then(|metrics| {
                first_score(metrics.v31.as_deref()).or_else(|| first_score(metrics.v2.as_deref()))
            })
            .unwrap_or(0.0)
    }

    /// True when either metrics key is present, even with an empty array.
    pub fn has_score_source(&self) -> bool {
        self.metrics
            .as_ref()
            .is_some_and(|metrics| metrics.v31.is_some() || metrics.v2.is_some())
    }

    pub fn english_description(&self) -> Option<&str> {
        self.descriptions
            .iter()
            .find(|d| d.lang == "en")
            .map(|d| d.value.as_str())
    }

    pub fn detail_url(&self) -> String {
        format!("{}/{}", NVD_DETAIL_URL, self.id)
    }
}

fn first_score(metrics: Option<&[CvssMetric]>) -> Option<f64> {
    metrics.and_then(|m| m.first()).and_then(CvssMetric::base_score)
}
