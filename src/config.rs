// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{AggregatorError, Result};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub sources: SourcesConfig,
    pub limits: LimitsConfig,
    pub refresh: RefreshConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourcesConfig {
    pub otx_url: String,
    pub otx_api_key: Option<String>,
    pub nvd_url: String,
    pub nvd_results_per_page: usize,
    pub rss2json_url: String,
    pub news_feeds: Vec<String>,
    pub ipinfo_url: String,
    pub ipinfo_token: Option<String>,
    pub http_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LimitsConfig {
    pub display_pulses: usize,
    pub indicator_prefix: usize,
    pub export_pulses: usize,
    pub export_indicators: usize,
    pub cve_top_k: usize,
    pub cve_window_hours: i64,
    pub cve_description_chars: usize,
    pub news_cap: usize,
    pub news_description_chars: usize,
    pub ticker_headlines: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RefreshConfig {
    pub pulses_secs: u64,
    pub cves_secs: u64,
    pub news_secs: u64,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

/// What a category shows after a failed refresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Keep the last good view alongside the failure.
    #[default]
    KeepStale,
    /// Drop the last good view and show only the failure.
    ShowError,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExportConfig {
    pub output_dir: PathBuf,
    pub file_prefix: String,
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            builder = builder.add_source(config::File::from(Path::new("config/default.toml")));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("THREAT_DECK")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| AggregatorError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| AggregatorError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            sources: SourcesConfig {
                otx_url: "https://otx.alienvault.com/api/v1/pulses/subscribed".to_string(),
                otx_api_key: None,
                nvd_url: "https://services.nvd.nist.gov/rest/json/cves/2.0".to_string(),
                nvd_results_per_page: 100,
                rss2json_url: "https://api.rss2json.com/v1/api.json".to_string(),
                news_feeds: vec![
                    "https://cybersecuritynews.com/feed/".to_string(),
                    "https://feeds.feedburner.com/TheHackersNews".to_string(),
                    "https://www.bleepingcomputer.com/feed/".to_string(),
                ],
                ipinfo_url: "https://ipinfo.io".to_string(),
                ipinfo_token: None,
                http_timeout_secs: 30,
            },
            limits: LimitsConfig {
                display_pulses: 15,
                indicator_prefix: 5,
                export_pulses: 20,
                export_indicators: 5,
                cve_top_k: 10,
                cve_window_hours: 24,
                cve_description_chars: 150,
                news_cap: 10,
                news_description_chars: 200,
                ticker_headlines: 5,
            },
            refresh: RefreshConfig {
                pulses_secs: 5 * 60,
                cves_secs: 10 * 60,
                news_secs: 15 * 60,
                failure_policy: FailurePolicy::KeepStale,
            },
            export: ExportConfig {
                output_dir: PathBuf::from("./exports"),
                file_prefix: "threat_intel_feed".to_string(),
            },
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.sources.http_timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        let limits = [
            ("display_pulses", self.limits.display_pulses),
            ("indicator_prefix", self.limits.indicator_prefix),
            ("export_pulses", self.limits.export_pulses),
            ("export_indicators", self.limits.export_indicators),
            ("cve_top_k", self.limits.cve_top_k),
            ("cve_description_chars", self.limits.cve_description_chars),
            ("news_cap", self.limits.news_cap),
            ("news_description_chars", self.limits.news_description_chars),
            ("ticker_headlines", self.limits.ticker_headlines),
        ];

        for (name, value) in limits {
            if value == 0 {
                return Err(AggregatorError::Config(format!(
                    "{} must be greater than 0",
                    name
                )));
            }
        }

        if self.limits.cve_window_hours <= 0 {
            return Err(AggregatorError::Config(
                "cve_window_hours must be greater than 0".to_string(),
            ));
        }

        if self.refresh.pulses_secs == 0 || self.refresh.cves_secs == 0 || self.refresh.news_secs == 0
        {
            return Err(AggregatorError::Config(
                "refresh cadences must be greater than 0".to_string(),
            ));
        }

        if self.sources.news_feeds.is_empty() {
            return Err(AggregatorError::Config(
                "at least one news feed must be configured".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default_config();
        assert!(config.validate().is_ok());
        assert_eq!(config.sources.news_feeds.len(), 3);
        assert_eq!(config.refresh.failure_policy, FailurePolicy::KeepStale);
    }

    #[test]
    fn test_zero_cap_rejected() {
        let mut config = Config::default_config();
        config.limits.news_cap = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("news_cap"));
    }

    #[test]
    fn test_zero_cadence_rejected() {
        let mut config = Config::default_config();
        config.refresh.cves_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.toml");
        let defaults = Config::default_config();
        let mut raw = String::new();
        raw.push_str("[sources]\n");
        raw.push_str(&format!("otx_url = \"{}\"\n", defaults.sources.otx_url));
        raw.push_str(&format!("nvd_url = \"{}\"\n", defaults.sources.nvd_url));
        raw.push_str("nvd_results_per_page = 50\n");
        raw.push_str(&format!("rss2json_url = \"{}\"\n", defaults.sources.rss2json_url));
        raw.push_str("news_feeds = [\"https://example.org/feed\"]\n");
        raw.push_str("ipinfo_url = \"https://ipinfo.io\"\n");
        raw.push_str("http_timeout_secs = 5\n");
        raw.push_str("[limits]\n");
        raw.push_str("display_pulses = 15\nindicator_prefix = 5\nexport_pulses = 20\n");
        raw.push_str("export_indicators = 5\ncve_top_k = 10\ncve_window_hours = 24\n");
        raw.push_str("cve_description_chars = 150\nnews_cap = 10\n");
        raw.push_str("news_description_chars = 200\nticker_headlines = 5\n");
        raw.push_str("[refresh]\npulses_secs = 300\ncves_secs = 600\nnews_secs = 900\n");
        raw.push_str("failure_policy = \"show_error\"\n");
        raw.push_str("[export]\noutput_dir = \"./out\"\nfile_prefix = \"feed\"\n");
        std::fs::write(&path, raw).unwrap();

        let config = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(config.sources.nvd_results_per_page, 50);
        assert_eq!(config.refresh.failure_policy, FailurePolicy::ShowError);
        assert_eq!(config.export.file_prefix, "feed");
    }
}
