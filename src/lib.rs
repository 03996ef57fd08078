// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod classifier;
pub mod config;
pub mod error;
pub mod exporter;
pub mod extractor;
pub mod geo;
pub mod models;
pub mod news;
pub mod pipeline;
pub mod ranker;
pub mod sources;
pub mod utils;

pub use classifier::{CategoryClassifier, SeverityTier, ThreatCategory};
pub use config::{Config, ExportConfig, FailurePolicy, LimitsConfig, RefreshConfig, SourcesConfig};
pub use error::{AggregatorError, Result};
pub use exporter::{CsvExporter, ExportManifest, ExportRow};
pub use extractor::IndicatorExtractor;
pub use geo::{GeoDispatcher, GeoResolver, IpInfoResolver, MarkerLayer};
pub use models::{CveCard, FeedBatch, Marker, NewsCard, NewsItem, Pulse, PulseCard, Vulnerability};
pub use news::{NewsMerger, TickerSummarizer};
pub use pipeline::{
    Category, CategoryState, CommitOutcome, NewsView, PulseCommit, PulseProcessor, PulseView,
    RefreshCoordinator, RefreshTicket,
};
pub use ranker::{CveRanker, CveRanking, TimeWindow};
pub use sources::{CveSource, NewsSource, NvdClient, OtxClient, PulseSource, Rss2JsonClient};
