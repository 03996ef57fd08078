// file: src/pipeline/coordinator.rs
// description: owns per-category result state and drives the three independent refresh cycles
// reference: orchestrates fetch, transform and commit for pulses, cves and news

use crate::config::Config;
use crate::error::{AggregatorError, Result};
use crate::exporter::{CsvExporter, ExportManifest};
use crate::geo::{GeoDispatcher, GeoResolver, MarkerLayer};
use crate::models::{FeedBatch, Marker, NewsCard, NewsItem, Pulse, Vulnerability};
use crate::news::{NewsMerger, TICKER_PLACEHOLDER, TickerSummarizer};
use crate::pipeline::processor::{PulseProcessor, PulseView};
use crate::pipeline::state::{Category, CategorySlot, CategoryState, CommitOutcome, RefreshTicket};
use crate::ranker::{CveRanker, CveRanking, TimeWindow};
use crate::sources::{CveSource, NewsSource, PulseSource};
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewsView {
    pub items: Vec<NewsItem>,
    pub cards: Vec<NewsCard>,
    pub ticker: String,
}

/// Result of a pulse commit. `lookups` are the geolocation tasks spawned for
/// it; dropping them leaves the tasks running.
#[derive(Debug)]
pub struct PulseCommit {
    pub outcome: CommitOutcome,
    pub lookups: Vec<JoinHandle<()>>,
}

pub struct RefreshCoordinator {
    cve_window_hours: i64,
    pulse_processor: PulseProcessor,
    cve_ranker: CveRanker,
    news_merger: NewsMerger,
    ticker: TickerSummarizer,
    pulses: CategorySlot<PulseView>,
    cves: CategorySlot<CveRanking>,
    news: CategorySlot<NewsView>,
    markers: Arc<MarkerLayer>,
    geo: Option<GeoDispatcher>,
}

impl RefreshCoordinator {
    pub fn new(config: &Config) -> Self {
        let limits = &config.limits;
        let policy = config.refresh.failure_policy;

        Self {
            cve_window_hours: limits.cve_window_hours,
            pulse_processor: PulseProcessor::new(limits.display_pulses, limits.indicator_prefix),
            cve_ranker: CveRanker::new(limits.cve_top_k, limits.cve_description_chars),
            news_merger: NewsMerger::new(limits.news_cap, limits.news_description_chars),
            ticker: TickerSummarizer::new(limits.ticker_headlines),
            pulses: CategorySlot::new(Category::Pulses, policy),
            cves: CategorySlot::new(Category::Cves, policy),
            news: CategorySlot::new(Category::News, policy),
            markers: Arc::new(MarkerLayer::new()),
            geo: None,
        }
    }

    pub fn with_geo_resolver(mut self, resolver: Arc<dyn GeoResolver>) -> Self {
        self.geo = Some(GeoDispatcher::new(resolver, self.markers.clone()));
        self
    }

    pub fn begin_pulses(&self) -> RefreshTicket {
        self.pulses.begin()
    }

    /// Commits a pulse batch. On success the marker layer is cleared and one
    /// lookup per extracted IP is spawned; the cards are visible before any
    /// lookup resolves. The marker generation is opened while the pulse slot
    /// is still locked, so marker generations follow commit order.
    pub fn commit_pulses(&self, ticket: RefreshTicket, fetched: Result<Vec<Pulse>>) -> PulseCommit {
        let view = fetched.map(|pulses| self.pulse_processor.process(pulses));

        let (outcome, committed) = self
            .pulses
            .commit_with(ticket, view, |view| (self.markers.reset(), view.ips.clone()));
        let Some((generation, ips)) = committed else {
            return PulseCommit {
                outcome,
                lookups: Vec::new(),
            };
        };

        let lookups = match &self.geo {
            Some(geo) => geo.dispatch(generation, ips),
            None => {
                debug!("No geolocation resolver configured, skipping {} IPs", ips.len());
                Vec::new()
            }
        };

        PulseCommit { outcome, lookups }
    }

    pub async fn refresh_pulses(&self, source: &dyn PulseSource) -> PulseCommit {
        let ticket = self.begin_pulses();
        let fetched = source.fetch_pulses().await;
        self.commit_pulses(ticket, fetched)
    }

    pub fn cve_window(&self, now: DateTime<Utc>) -> TimeWindow {
        TimeWindow::trailing_hours(now, self.cve_window_hours)
    }

    pub fn begin_cves(&self) -> RefreshTicket {
        self.cves.begin()
    }

    pub fn commit_cves(
        &self,
        ticket: RefreshTicket,
        window: &TimeWindow,
        fetched: Result<Vec<Vulnerability>>,
    ) -> CommitOutcome {
        let ranking = fetched.map(|batch| self.cve_ranker.rank(batch, window));
        if let Ok(CveRanking::NoFreshItems) = &ranking {
            info!("No CVEs published since {}", window.start);
        }
        self.cves.commit(ticket, ranking)
    }

    pub async fn refresh_cves(&self, source: &dyn CveSource, now: DateTime<Utc>) -> CommitOutcome {
        let ticket = self.begin_cves();
        let window = self.cve_window(now);
        let fetched = source.fetch_cves(&window).await;
        self.commit_cves(ticket, &window, fetched)
    }

    pub fn begin_news(&self) -> RefreshTicket {
        self.news.begin()
    }

    pub fn commit_news(&self, ticket: RefreshTicket, fetched: Result<Vec<FeedBatch>>) -> CommitOutcome {
        let view = fetched.map(|batches| {
            let items = self.news_merger.merge(batches);
            NewsView {
                cards: self.news_merger.to_cards(&items),
                ticker: self.ticker.summarize(&items),
                items,
            }
        });
        self.news.commit(ticket, view)
    }

    pub async fn refresh_news(&self, source: &dyn NewsSource) -> CommitOutcome {
        let ticket = self.begin_news();
        let fetched = source.fetch_feeds().await;
        self.commit_news(ticket, fetched)
    }

    pub fn pulse_state(&self) -> CategoryState<PulseView> {
        self.pulses.state()
    }

    pub fn cve_state(&self) -> CategoryState<CveRanking> {
        self.cves.state()
    }

    pub fn news_state(&self) -> CategoryState<NewsView> {
        self.news.state()
    }

    pub fn markers(&self) -> Vec<Marker> {
        self.markers.snapshot()
    }

    pub fn ticker(&self) -> String {
        self.news
            .view()
            .map(|view| view.ticker)
            .unwrap_or_else(|| TICKER_PLACEHOLDER.to_string())
    }

    fn exportable_pulses(&self) -> Result<Vec<Pulse>> {
        self.pulses
            .view()
            .map(|view| view.pulses)
            .ok_or_else(|| AggregatorError::Export("no pulse data loaded".to_string()))
    }

    pub fn export_csv(&self, exporter: &CsvExporter, date: NaiveDate) -> Result<ExportManifest> {
        exporter.export(&self.exportable_pulses()?, date)
    }

    pub fn export_csv_string(&self, exporter: &CsvExporter) -> Result<String> {
        exporter.to_csv_string(&self.exportable_pulses()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FailurePolicy;
    use crate::models::{CveDescription, CveMetrics, CvssMetric, GeoPoint, Indicator};
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;
    use std::time::Duration as StdDuration;

    struct StaticPulses(Vec<Pulse>);

    #[async_trait]
    impl PulseSource for StaticPulses {
        async fn fetch_pulses(&self) -> Result<Vec<Pulse>> {
            Ok(self.0.clone())
        }
    }

    struct BrokenPulses;

    #[async_trait]
    impl PulseSource for BrokenPulses {
        async fn fetch_pulses(&self) -> Result<Vec<Pulse>> {
            Err(AggregatorError::transport("otx", "connection refused"))
        }
    }

    struct StaticCves(Vec<Vulnerability>);

    #[async_trait]
    impl CveSource for StaticCves {
        async fn fetch_cves(&self, _window: &TimeWindow) -> Result<Vec<Vulnerability>> {
            Ok(self.0.clone())
        }
    }

    struct TwoFeeds;

    #[async_trait]
    impl NewsSource for TwoFeeds {
        async fn fetch_feeds(&self) -> Result<Vec<FeedBatch>> {
            Ok(vec![
                FeedBatch::ok(
                    "a",
                    vec![
                        NewsItem::new("t10", "https://a/10", "2024-03-01 10:00:00"),
                        NewsItem::new("t8", "https://a/8", "2024-03-01 08:00:00"),
                    ],
                ),
                FeedBatch::failed("b", AggregatorError::transport("b", "status 502")),
            ])
        }
    }

    struct MapResolver;

    #[async_trait]
    impl GeoResolver for MapResolver {
        async fn resolve(&self, ip: &str) -> Result<GeoPoint> {
            if ip == "1.2.3.4" {
                return Err(AggregatorError::geolocation(ip, "response has no loc field"));
            }
            Ok(GeoPoint::new(ip, 1.0, 2.0))
        }
    }

    struct HangingResolver;

    #[async_trait]
    impl GeoResolver for HangingResolver {
        async fn resolve(&self, _ip: &str) -> Result<GeoPoint> {
            std::future::pending::<()>().await;
            unreachable!()
        }
    }

    fn config(policy: FailurePolicy) -> Config {
        let mut config = Config::default_config();
        config.refresh.failure_policy = policy;
        config
    }

    fn pulse(id: &str, ips: &[&str]) -> Pulse {
        Pulse {
            id: id.to_string(),
            name: format!("pulse {}", id),
            severity: Some(3),
            tags: vec!["phishing".to_string()],
            indicators: ips.iter().map(|ip| Indicator::new("IPv4", ip)).collect(),
            ..Default::default()
        }
    }

    async fn settle(commit: PulseCommit) {
        for lookup in commit.lookups {
            lookup.await.unwrap();
        }
    }

    fn marker_labels(coordinator: &RefreshCoordinator) -> Vec<String> {
        let mut labels: Vec<String> = coordinator.markers().into_iter().map(|m| m.label).collect();
        labels.sort();
        labels
    }

    #[tokio::test]
    async fn test_pulse_refresh_with_geolocation_failure() {
        let coordinator =
            RefreshCoordinator::new(&config(FailurePolicy::KeepStale)).with_geo_resolver(Arc::new(MapResolver));
        let source = StaticPulses(vec![pulse("p1", &["1.2.3.4", "5.6.7.8"]), pulse("p2", &["9.9.9.9"])]);

        let commit = coordinator.refresh_pulses(&source).await;
        assert_eq!(commit.outcome, CommitOutcome::Committed);
        settle(commit).await;

        let view = coordinator.pulse_state().view().cloned().unwrap();
        assert_eq!(view.cards.len(), 2);
        assert_eq!(view.cards[0].iocs, vec!["IPv4: 1.2.3.4", "IPv4: 5.6.7.8"]);
        assert_eq!(marker_labels(&coordinator), vec!["5.6.7.8 - , , ", "9.9.9.9 - , , "]);
    }

    #[tokio::test]
    async fn test_markers_do_not_leak_across_refreshes() {
        let coordinator =
            RefreshCoordinator::new(&config(FailurePolicy::KeepStale)).with_geo_resolver(Arc::new(MapResolver));

        settle(coordinator.refresh_pulses(&StaticPulses(vec![pulse("p1", &["5.6.7.8"])])).await).await;
        assert_eq!(coordinator.markers().len(), 1);

        settle(coordinator.refresh_pulses(&StaticPulses(vec![pulse("p2", &["9.9.9.9"])])).await).await;
        assert_eq!(marker_labels(&coordinator), vec!["9.9.9.9 - , , "]);
    }

    #[tokio::test]
    async fn test_render_does_not_wait_on_lookups() {
        let coordinator = RefreshCoordinator::new(&config(FailurePolicy::KeepStale))
            .with_geo_resolver(Arc::new(HangingResolver));
        let source = StaticPulses(vec![pulse("p1", &["5.6.7.8"])]);

        let commit = tokio::time::timeout(StdDuration::from_secs(1), coordinator.refresh_pulses(&source))
            .await
            .expect("pulse refresh must not wait on geolocation");

        assert_eq!(commit.outcome, CommitOutcome::Committed);
        assert_eq!(commit.lookups.len(), 1);
        assert_eq!(coordinator.pulse_state().view().unwrap().cards.len(), 1);
        assert!(coordinator.markers().is_empty());

        // a later refresh is not blocked by the hanging lookup
        let next = coordinator.refresh_pulses(&source).await;
        assert_eq!(next.outcome, CommitOutcome::Committed);
    }

    #[tokio::test]
    async fn test_superseded_pulse_commit_keeps_newer_markers() {
        let coordinator =
            RefreshCoordinator::new(&config(FailurePolicy::KeepStale)).with_geo_resolver(Arc::new(MapResolver));
        let older = coordinator.begin_pulses();
        let newer = coordinator.begin_pulses();

        settle(coordinator.commit_pulses(newer, Ok(vec![pulse("new", &["9.9.9.9"])]))).await;
        let stale = coordinator.commit_pulses(older, Ok(vec![pulse("old", &["5.6.7.8"])]));

        assert_eq!(stale.outcome, CommitOutcome::Superseded);
        assert!(stale.lookups.is_empty());
        assert_eq!(coordinator.pulse_state().view().unwrap().cards[0].id, "new");
        assert_eq!(marker_labels(&coordinator), vec!["9.9.9.9 - , , "]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_refreshes_keep_markers_in_step_with_view() {
        let coordinator = Arc::new(
            RefreshCoordinator::new(&config(FailurePolicy::KeepStale))
                .with_geo_resolver(Arc::new(MapResolver)),
        );

        let mut refreshes = Vec::new();
        for i in 0..32 {
            let coordinator = coordinator.clone();
            refreshes.push(tokio::spawn(async move {
                let ip = format!("10.0.0.{}", i);
                let source = StaticPulses(vec![pulse(&i.to_string(), &[ip.as_str()])]);
                coordinator.refresh_pulses(&source).await
            }));
        }
        for refresh in refreshes {
            settle(refresh.await.unwrap()).await;
        }

        let view = coordinator.pulse_state().view().cloned().unwrap();
        let expected: Vec<String> = view.ips.iter().map(|ip| format!("{} - , , ", ip)).collect();
        assert_eq!(expected.len(), 1);
        assert_eq!(marker_labels(&coordinator), expected);
    }

    #[tokio::test]
    async fn test_pulse_failure_keeps_stale_view_and_markers() {
        let coordinator =
            RefreshCoordinator::new(&config(FailurePolicy::KeepStale)).with_geo_resolver(Arc::new(MapResolver));
        settle(coordinator.refresh_pulses(&StaticPulses(vec![pulse("p1", &["5.6.7.8"])])).await).await;

        let commit = coordinator.refresh_pulses(&BrokenPulses).await;
        assert_eq!(commit.outcome, CommitOutcome::Failed);

        let state = coordinator.pulse_state();
        assert!(state.is_failed());
        assert_eq!(state.view().unwrap().cards[0].id, "p1");
        assert_eq!(coordinator.markers().len(), 1);
    }

    #[tokio::test]
    async fn test_news_refresh_tolerates_failed_feed() {
        let coordinator = RefreshCoordinator::new(&config(FailurePolicy::KeepStale));
        assert_eq!(coordinator.ticker(), TICKER_PLACEHOLDER);

        let outcome = coordinator.refresh_news(&TwoFeeds).await;
        assert_eq!(outcome, CommitOutcome::Committed);

        let view = coordinator.news_state().view().cloned().unwrap();
        let titles: Vec<&str> = view.cards.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["t10", "t8"]);
        assert_eq!(coordinator.ticker(), "BREAKING: t10 • t8");
    }

    #[tokio::test]
    async fn test_cve_refresh_ranks_and_reports_no_fresh_items() {
        let coordinator = RefreshCoordinator::new(&config(FailurePolicy::KeepStale));
        let now = Utc.with_ymd_and_hms(2024, 3, 2, 12, 0, 0).unwrap();
        let published = (now - Duration::hours(2)).format("%Y-%m-%dT%H:%M:%S%.3f").to_string();
        let scored = |id: &str, score: f64| Vulnerability {
            id: id.to_string(),
            published: published.clone(),
            descriptions: vec![CveDescription {
                lang: "en".to_string(),
                value: "desc".to_string(),
            }],
            metrics: Some(CveMetrics {
                v31: Some(vec![CvssMetric::with_score(score)]),
                v2: None,
            }),
        };

        let source = StaticCves(vec![scored("CVE-LOW", 3.1), scored("CVE-HIGH", 8.8)]);
        assert_eq!(coordinator.refresh_cves(&source, now).await, CommitOutcome::Committed);
        let ids: Vec<String> = coordinator
            .cve_state()
            .view()
            .unwrap()
            .cards()
            .iter()
            .map(|c| c.id.clone())
            .collect();
        assert_eq!(ids, vec!["CVE-HIGH", "CVE-LOW"]);

        let later = now + Duration::days(2);
        assert_eq!(coordinator.refresh_cves(&source, later).await, CommitOutcome::Committed);
        assert_eq!(coordinator.cve_state().view(), Some(&CveRanking::NoFreshItems));
    }

    #[tokio::test]
    async fn test_categories_fail_independently() {
        let coordinator = RefreshCoordinator::new(&config(FailurePolicy::ShowError));

        coordinator.refresh_news(&TwoFeeds).await;
        let commit = coordinator.refresh_pulses(&BrokenPulses).await;

        assert_eq!(commit.outcome, CommitOutcome::Failed);
        assert!(coordinator.pulse_state().view().is_none());
        assert!(!coordinator.news_state().is_failed());
        assert_eq!(coordinator.cve_state(), CategoryState::Pending);
    }

    #[tokio::test]
    async fn test_export_uses_full_batch() {
        let coordinator = RefreshCoordinator::new(&config(FailurePolicy::KeepStale));
        let exporter = CsvExporter::new("./unused", "threat_intel_feed");
        assert!(coordinator.export_csv_string(&exporter).is_err());

        let pulses: Vec<Pulse> = (0..18).map(|i| pulse(&i.to_string(), &[])).collect();
        coordinator.refresh_pulses(&StaticPulses(pulses)).await;

        let csv = coordinator.export_csv_string(&exporter).unwrap();
        assert_eq!(csv.lines().count(), 19);
        assert!(csv.contains("\"Critical\",\"Phishing\""));
    }
}
