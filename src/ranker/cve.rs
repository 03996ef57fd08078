// file: src/ranker/cve.rs
// description: freshness filtering, canonical scoring and top-k selection of vulnerabilities
// reference: https://nvd.nist.gov/vuln-metrics/cvss

use crate::classifier::SeverityTier;
use crate::models::{CveCard, Vulnerability};
use crate::utils::text::truncate_chars;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

const NO_DESCRIPTION: &str = "No description available";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn trailing_hours(now: DateTime<Utc>, hours: i64) -> Self {
        Self {
            start: now - Duration::hours(hours),
            end: now,
        }
    }

    /// Inclusive of the start instant. Records after `end` still count, so a
    /// clock skew between us and the upstream never hides brand new items.
    pub fn admits(&self, published: DateTime<Utc>) -> bool {
        published >= self.start
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedCve {
    pub vulnerability: Vulnerability,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CveRanking {
    Ranked(Vec<CveCard>),
    /// Nothing in the batch was published inside the window.
    NoFreshItems,
}

impl CveRanking {
    pub fn cards(&self) -> &[CveCard] {
        match self {
            CveRanking::Ranked(cards) => cards,
            CveRanking::NoFreshItems => &[],
        }
    }
}

pub struct CveRanker {
    top_k: usize,
    description_chars: usize,
}

impl CveRanker {
    pub fn new(top_k: usize, description_chars: usize) -> Self {
        Self {
            top_k,
            description_chars,
        }
    }

    pub fn rank(&self, batch: Vec<Vulnerability>, window: &TimeWindow) -> CveRanking {
        match self.select(batch, window) {
            Some(ranked) => CveRanking::Ranked(ranked.iter().map(|r| self.to_card(r)).collect()),
            None => CveRanking::NoFreshItems,
        }
    }

    /// Returns `None` when the freshness filter leaves nothing, otherwise the
    /// scored records in descending score order, equal scores in input order.
    pub fn select(&self, batch: Vec<Vulnerability>, window: &TimeWindow) -> Option<Vec<RankedCve>> {
        let total = batch.len();

        let fresh: Vec<Vulnerability> = batch
            .into_iter()
            .filter(|v| v.published_at().is_some_and(|at| window.admits(at)))
            .collect();

        if fresh.is_empty() {
            debug!("No vulnerabilities inside window out of {} received", total);
            return None;
        }

        let fresh_count = fresh.len();
        let mut ranked: Vec<RankedCve> = fresh
            .into_iter()
            .filter(|v| v.has_score_source())
            .map(|vulnerability| {
                let score = vulnerability.canonical_score();
                RankedCve {
                    vulnerability,
                    score,
                }
            })
            .collect();

        // sort_by is stable
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked.truncate(self.top_k);

        debug!(
            "Ranked {} of {} fresh vulnerabilities ({} received)",
            ranked.len(),
            fresh_count,
            total
        );

        Some(ranked)
    }

    fn to_card(&self, ranked: &RankedCve) -> CveCard {
        let cve = &ranked.vulnerability;
        let tier = SeverityTier::from_cvss_score(ranked.score);
        let description = cve
            .english_description()
            .unwrap_or(NO_DESCRIPTION)
            .to_string();
        let short_description = truncate_chars(&description, self.description_chars);
        let published = cve
            .published_at()
            .map(|at| at.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| cve.published.clone());

        CveCard {
            id: cve.id.clone(),
            score: ranked.score,
            severity_label: tier.label().to_string(),
            severity_class: tier.tier_class().to_string(),
            description,
            short_description,
            expanded: false,
            published,
            url: cve.detail_url(),
        }
    }
}

impl Default for CveRanker {
    fn default() -> Self {
        Self::new(10, 150)
    }
}
