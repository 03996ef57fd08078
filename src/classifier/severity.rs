// file: src/classifier/severity.rs
// description: severity tiers for pulse severity integers and CVSS base scores
// reference: https://www.first.org/cvss/specification-document

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SeverityTier {
    Low,
    Medium,
    High,
    Critical,
}

impl SeverityTier {
    /// Total over all integers: `>= 3` is Critical, `2` High, `1` Medium,
    /// anything else (zero, negative) Low.
    pub fn from_pulse_severity(severity: i64) -> Self {
        if severity >= 3 {
            SeverityTier::Critical
        } else if severity == 2 {
            SeverityTier::High
        } else if severity == 1 {
            SeverityTier::Medium
        } else {
            SeverityTier::Low
        }
    }

    pub fn from_optional_pulse_severity(severity: Option<i64>) -> Self {
        Self::from_pulse_severity(severity.unwrap_or(0))
    }

    pub fn from_cvss_score(score: f64) -> Self {
        if score >= 9.0 {
            SeverityTier::Critical
        } else if score >= 7.0 {
            SeverityTier::High
        } else if score >= 4.0 {
            SeverityTier::Medium
        } else {
            SeverityTier::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SeverityTier::Low => "Low",
            SeverityTier::Medium => "Medium",
            SeverityTier::High => "High",
            SeverityTier::Critical => "Critical",
        }
    }

    /// Style class used by the rendering layer.
    pub fn tier_class(&self) -> &'static str {
        match self {
            SeverityTier::Low => "low",
            SeverityTier::Medium => "medium",
            SeverityTier::High => "high",
            SeverityTier::Critical => "critical",
        }
    }
}

impl fmt::Display for SeverityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
