// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and refresh timers

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use threat_deck::utils::logging::{
    format_error, format_heading, format_severity, format_success, format_title, format_warning,
};
use threat_deck::{
    CategoryState, Config, CsvExporter, CveRanking, IpInfoResolver, NewsView, NvdClient, OtxClient,
    PulseView, RefreshCoordinator, Rss2JsonClient,
};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "threat-deck")]
#[command(author = "cipher")]
#[command(version = "0.1.0")]
#[command(about = "Threat-intelligence feed aggregator", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config/default.toml"
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch subscribed pulses and print the cards and resolved markers
    Pulses {
        /// Seconds to wait for geolocation lookups before printing markers
        #[arg(long, default_value_t = 10)]
        geo_wait: u64,
    },

    /// Fetch and rank vulnerabilities published inside the freshness window
    Cves {
        /// Print full descriptions instead of the truncated form
        #[arg(long)]
        full: bool,
    },

    /// Fetch every configured news feed and print the merged list
    News,

    /// Fetch pulses and write the CSV export
    Export {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Refresh all categories on their configured cadences until interrupted
    Watch,
}

struct Services {
    coordinator: Arc<RefreshCoordinator>,
    otx: Arc<OtxClient>,
    nvd: Arc<NvdClient>,
    news: Arc<Rss2JsonClient>,
}

impl Services {
    fn new(config: &Config) -> Self {
        let timeout = config.http_timeout();
        let sources = &config.sources;

        let resolver = IpInfoResolver::new(
            sources.ipinfo_url.clone(),
            sources.ipinfo_token.clone(),
            timeout,
        );
        let coordinator = RefreshCoordinator::new(config).with_geo_resolver(Arc::new(resolver));

        Self {
            coordinator: Arc::new(coordinator),
            otx: Arc::new(OtxClient::new(
                sources.otx_url.clone(),
                sources.otx_api_key.clone(),
                timeout,
            )),
            nvd: Arc::new(NvdClient::new(
                sources.nvd_url.clone(),
                sources.nvd_results_per_page,
                timeout,
            )),
            news: Arc::new(Rss2JsonClient::new(
                sources.rss2json_url.clone(),
                sources.news_feeds.clone(),
                timeout,
            )),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    threat_deck::utils::logging::init_logger(cli.color, cli.verbose);

    info!("Threat Deck feed aggregator");
    info!("Loading configuration from: {}", cli.config.display());

    let config = if cli.config.exists() {
        Config::load(Some(cli.config.as_path())).context("Failed to load configuration")?
    } else {
        warn!(
            "Config file {} not found, using default configuration",
            cli.config.display()
        );
        Config::load(None).unwrap_or_else(|e| {
            warn!("Falling back to built-in defaults: {}", e);
            Config::default_config()
        })
    };

    let services = Services::new(&config);

    match cli.command {
        Commands::Pulses { geo_wait } => cmd_pulses(&services, geo_wait).await,
        Commands::Cves { full } => cmd_cves(&services, full).await,
        Commands::News => cmd_news(&services).await,
        Commands::Export { output } => cmd_export(&services, &config, output).await,
        Commands::Watch => cmd_watch(&services, &config).await,
    }
}

async fn cmd_pulses(services: &Services, geo_wait: u64) -> Result<()> {
    let commit = services.coordinator.refresh_pulses(services.otx.as_ref()).await;
    print_pulses(&services.coordinator.pulse_state());

    if !commit.lookups.is_empty() {
        let lookups = futures::future::join_all(commit.lookups);
        if tokio::time::timeout(Duration::from_secs(geo_wait), lookups)
            .await
            .is_err()
        {
            println!("{}", format_warning("Some geolocation lookups are still pending"));
        }
    }

    let markers = services.coordinator.markers();
    println!("{}", format_heading(&format!("Map markers ({})", markers.len())));
    for marker in markers {
        println!("  [{:.4}, {:.4}] {}", marker.lat, marker.lon, marker.label);
    }

    Ok(())
}

async fn cmd_cves(services: &Services, full: bool) -> Result<()> {
    services
        .coordinator
        .refresh_cves(services.nvd.as_ref(), Utc::now())
        .await;

    let mut state = services.coordinator.cve_state();
    if full {
        if let CategoryState::Ready {
            view: CveRanking::Ranked(cards),
            ..
        } = &mut state
        {
            cards.iter_mut().for_each(|card| card.toggle());
        }
    }

    print_cves(&state);
    Ok(())
}

async fn cmd_news(services: &Services) -> Result<()> {
    services
        .coordinator
        .refresh_news(services.news.as_ref())
        .await;

    print_news(&services.coordinator.news_state());
    println!("{}", services.coordinator.ticker());
    Ok(())
}

async fn cmd_export(services: &Services, config: &Config, output: Option<PathBuf>) -> Result<()> {
    services.coordinator.refresh_pulses(services.otx.as_ref()).await;

    let output_dir = output.unwrap_or_else(|| config.export.output_dir.clone());
    let exporter = CsvExporter::new(output_dir, &config.export.file_prefix)
        .with_limits(config.limits.export_pulses, config.limits.export_indicators);

    let manifest = services
        .coordinator
        .export_csv(&exporter, Utc::now().date_naive())
        .context("CSV export failed")?;

    println!(
        "{}",
        format_success(&format!(
            "Exported {} pulses to {}",
            manifest.total_rows,
            manifest.path.display()
        ))
    );
    Ok(())
}

async fn cmd_watch(services: &Services, config: &Config) -> Result<()> {
    let mut pulse_tick = interval(Duration::from_secs(config.refresh.pulses_secs));
    let mut cve_tick = interval(Duration::from_secs(config.refresh.cves_secs));
    let mut news_tick = interval(Duration::from_secs(config.refresh.news_secs));
    for tick in [&mut pulse_tick, &mut cve_tick, &mut news_tick] {
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
    }

    info!(
        "Watching feeds (pulses every {}s, CVEs every {}s, news every {}s)",
        config.refresh.pulses_secs, config.refresh.cves_secs, config.refresh.news_secs
    );

    loop {
        tokio::select! {
            _ = pulse_tick.tick() => {
                let coordinator = services.coordinator.clone();
                let otx = services.otx.clone();
                tokio::spawn(async move {
                    coordinator.refresh_pulses(otx.as_ref()).await;
                    print_pulses(&coordinator.pulse_state());
                });
            }
            _ = cve_tick.tick() => {
                let coordinator = services.coordinator.clone();
                let nvd = services.nvd.clone();
                tokio::spawn(async move {
                    coordinator.refresh_cves(nvd.as_ref(), Utc::now()).await;
                    print_cves(&coordinator.cve_state());
                });
            }
            _ = news_tick.tick() => {
                let coordinator = services.coordinator.clone();
                let news = services.news.clone();
                tokio::spawn(async move {
                    coordinator.refresh_news(news.as_ref()).await;
                    print_news(&coordinator.news_state());
                    println!("{}", coordinator.ticker());
                });
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping refresh timers");
                break;
            }
        }
    }

    Ok(())
}

fn print_failure<T>(state: &CategoryState<T>) -> bool {
    match state {
        CategoryState::Pending => {
            println!("{}", format_warning("Not loaded yet"));
            true
        }
        CategoryState::Failed { message, stale, .. } => {
            println!("{}", format_error(message));
            if stale.is_some() {
                println!("{}", format_warning("Showing data from the last successful refresh"));
            }
            stale.is_none()
        }
        CategoryState::Ready { .. } => false,
    }
}

fn print_pulses(state: &CategoryState<PulseView>) {
    println!("{}", format_heading("Threat feeds"));
    if print_failure(state) {
        return;
    }
    let Some(view) = state.view() else { return };

    for card in &view.cards {
        println!("{}", format_title(&card.title));
        println!("  Updated: {}", card.updated);
        println!(
            "  Severity: {} | Category: {}",
            format_severity(&card.severity_label, &card.severity_class),
            card.category_label
        );
        for ioc in &card.iocs {
            println!("    {}", ioc);
        }
        println!("  Tags: {}", card.tags.join(" "));
        println!("  {}", card.url);
    }
}

fn print_cves(state: &CategoryState<CveRanking>) {
    println!("{}", format_heading("Latest CVEs"));
    if print_failure(state) {
        return;
    }

    match state.view() {
        Some(CveRanking::NoFreshItems) => {
            println!("{}", format_warning("No CVEs published in the freshness window"));
        }
        Some(CveRanking::Ranked(cards)) => {
            for card in cards {
                println!(
                    "{} CVSS: {}",
                    format_title(&card.id),
                    format_severity(&card.score.to_string(), &card.severity_class)
                );
                println!("  {}", card.displayed_description());
                println!("  Published: {}", card.published);
                println!("  {}", card.url);
            }
        }
        None => {}
    }
}

fn print_news(state: &CategoryState<NewsView>) {
    println!("{}", format_heading("Cybersecurity news"));
    if print_failure(state) {
        return;
    }
    let Some(view) = state.view() else { return };

    for card in &view.cards {
        println!("{}", format_title(&card.title));
        println!("  {}", card.published);
        println!("  {}", card.description);
        println!("  {}", card.link);
    }
}
