// file: src/utils/logging.rs
// description: Tracing subscriber initialization and colored CLI status lines
// reference: https://docs.rs/tracing-subscriber

use colored::*;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub fn init_logger(colored_output: bool, verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(true)
        .with_line_number(true)
        .compact()
        .with_ansi(colored_output);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

pub fn format_success(msg: &str) -> String {
    format!("{} {}", "✓".green().bold(), msg.green())
}

pub fn format_error(msg: &str) -> String {
    format!("{} {}", "✗".red().bold(), msg.red())
}

pub fn format_warning(msg: &str) -> String {
    format!("{} {}", "⚠".yellow().bold(), msg.yellow())
}

pub fn format_heading(msg: &str) -> String {
    format!("{}", msg.cyan().bold())
}

pub fn format_title(msg: &str) -> String {
    format!("{}", msg.bold())
}

/// Colors a severity label by tier class (`critical`, `high`, `medium`, `low`).
pub fn format_severity(label: &str, tier_class: &str) -> String {
    match tier_class {
        "critical" => label.red().bold().to_string(),
        "high" => label.truecolor(255, 111, 0).bold().to_string(),
        "medium" => label.yellow().to_string(),
        _ => label.green().to_string(),
    }
}
