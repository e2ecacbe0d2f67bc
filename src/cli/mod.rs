//! CLI command implementations.
//!
//! Provides subcommand handlers for:
//! - `scrapedash show`: load the report and print the dashboard view
//! - `scrapedash check`: load the report and report the outcome
//! - `scrapedash history`: recent load events and success rate
//! - `scrapedash config show|init|set|reset`: configuration management

use anyhow::{Result, bail};
use colored::Colorize;

use crate::analytics::history;
use crate::analytics::load_log::{EventLog, LoadEvent, LoadOutcome};
use crate::config;
use crate::loader::{LoadState, ReportLoader};
use crate::render::DisplayOptions;
use crate::view::{ChartDataset, DashboardView, Tier, map_report_to_view_with_mime};

/// Output format for `show` and `history`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

/// Width of the bars drawn for chart values in table output.
const BAR_WIDTH: usize = 30;

// ---------------------------------------------------------------------------
// scrapedash show
// ---------------------------------------------------------------------------

/// Load the report once and print its dashboard view.
pub fn run_show(loader: &ReportLoader, display: &DisplayOptions, format: OutputFormat) -> Result<()> {
    let view = load_view(loader, display)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view)?),
        OutputFormat::Csv => print!("{}", view_csv(&view)),
        OutputFormat::Table => print_view_table(&view),
    }

    Ok(())
}

fn load_view(loader: &ReportLoader, display: &DisplayOptions) -> Result<DashboardView> {
    match loader.load_blocking() {
        LoadState::Loaded(report) => Ok(map_report_to_view_with_mime(&report, &display.screenshot_mime)),
        LoadState::Failed(failure) => bail!(
            "failed to load report from {}: {failure}",
            loader.source_description()
        ),
        LoadState::Loading => bail!("report from {} is still loading", loader.source_description()),
    }
}

fn print_view_table(view: &DashboardView) {
    println!("{}", view.page_title.bold().cyan());
    println!("{}", "=".repeat(60));
    println!();

    println!("{}", "Summary".bold().cyan());
    for metric in &view.summary_metrics {
        println!(
            "  {:<22} {:>10}  {}",
            metric.label,
            metric.value.to_string(),
            colorize_tier(metric.tier)
        );
    }
    println!();

    print_chart(&view.element_chart);
    print_chart(&view.lighthouse_chart);

    println!("{}", format!("Images ({})", view.images.len()).bold().cyan());
    if view.images.is_empty() {
        println!("  {}", "none".dimmed());
    }
    for image in &view.images {
        println!("  {} {}", truncate(&image.description, 30), image.url.dimmed());
    }
    println!();

    println!("{}", "Screenshot".bold().cyan());
    if view.screenshot.is_empty() {
        println!("  {}", "none".dimmed());
    } else {
        println!(
            "  {} ({} base64 chars)",
            view.screenshot.mime,
            format_number(view.screenshot.data.len() as u64)
        );
    }
}

fn print_chart(chart: &ChartDataset) {
    println!("{}", chart.title.bold().cyan());
    let max = chart.series.values.iter().copied().fold(0.0_f64, f64::max);
    for (label, value, _, _) in chart.points() {
        println!(
            "  {:<16} {} {}",
            label,
            bar(value, max, BAR_WIDTH),
            crate::view::MetricValue::Score(value)
        );
    }
    println!();
}

/// `label,value,tier` rows for the summary metrics.
fn view_csv(view: &DashboardView) -> String {
    let mut out = String::from("label,value,tier\n");
    for metric in &view.summary_metrics {
        out.push_str(&format!("{},{},{}\n", metric.label, metric.value, metric.tier));
    }
    out
}

// ---------------------------------------------------------------------------
// scrapedash check
// ---------------------------------------------------------------------------

/// Load the report once and report whether it worked.
pub fn run_check(loader: &ReportLoader) -> Result<()> {
    let source = loader.source_description();
    match loader.load_blocking() {
        LoadState::Loaded(report) => {
            print_check_item("Report", true, &format!("loaded from {source}"));
            print_check_item("Page title", true, &report.page_title);
            print_check_item("Images", true, &report.images.len().to_string());
            let bad = report.out_of_range_scores();
            print_check_item(
                "Score range",
                bad.is_empty(),
                &if bad.is_empty() {
                    "all scores within 0-100".to_string()
                } else {
                    bad.iter()
                        .map(|(k, v)| format!("{k}={v}"))
                        .collect::<Vec<_>>()
                        .join(", ")
                },
            );
            Ok(())
        }
        LoadState::Failed(failure) => {
            print_check_item("Report", false, &failure.to_string());
            bail!("report check failed for {source}")
        }
        LoadState::Loading => bail!("report from {source} is still loading"),
    }
}

fn print_check_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<15} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// scrapedash history
// ---------------------------------------------------------------------------

/// Show recent load events and aggregate success rate.
pub fn run_history(log: Option<&EventLog>, limit: usize, format: OutputFormat) -> Result<()> {
    let Some(log) = log else {
        println!(
            "{}",
            "Load event recording is disabled (logging.events = false).".yellow()
        );
        return Ok(());
    };

    let events = log.read_all();
    if events.is_empty() {
        println!("{}", "No load events recorded yet.".yellow());
        return Ok(());
    }

    let recent = history::recent(&events, limit);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&recent)?),
        OutputFormat::Csv => print!("{}", history_csv(&recent)),
        OutputFormat::Table => {
            let summary = history::summarize(&events);
            println!("{}", "Load History".bold().cyan());
            println!("{}", "=".repeat(60));
            println!(
                "  {} {}  {} {}  {} {}",
                "Loaded:".bold(),
                summary.loaded,
                "Failed:".bold(),
                summary.failed,
                "Cancelled:".bold(),
                summary.cancelled
            );
            println!("  {} {:.1}%", "Success rate:".bold(), summary.success_pct());
            if let Some(ms) = summary.avg_loaded_latency_ms {
                println!("  {} {}ms", "Avg latency: ".bold(), ms);
            }
            if let Some(reason) = &summary.last_failure {
                println!("  {} {}", "Last failure:".bold(), reason.red());
            }
            println!();

            for e in recent {
                let outcome = match e.outcome {
                    LoadOutcome::Loaded => "loaded".green(),
                    LoadOutcome::Failed => "failed".red(),
                    LoadOutcome::Cancelled => "cancelled".yellow(),
                };
                println!(
                    "  {:<26} {:<10} {:>7}ms  {}",
                    truncate(&e.timestamp, 25),
                    outcome,
                    e.latency_ms,
                    truncate(&e.source, 40).dimmed()
                );
            }
        }
    }

    Ok(())
}

fn history_csv(events: &[&LoadEvent]) -> String {
    let mut out = String::from("timestamp,source,outcome,latency_ms,reason\n");
    for e in events {
        out.push_str(&format!(
            "{},{},{},{},{}\n",
            csv_field(&e.timestamp),
            csv_field(&e.source),
            e.outcome,
            e.latency_ms,
            csv_field(e.reason.as_deref().unwrap_or(""))
        ));
    }
    out
}

/// Quote a CSV field (RFC 4180) when it contains a separator, quote or newline.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

// ---------------------------------------------------------------------------
// scrapedash config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective scrapedash Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source_line("~/.scrapedash/config.toml", global_exists);
    print_source_line(".scrapedash.toml", project_exists);
    println!(
        "  {} {}",
        "·".dimmed(),
        "SCRAPEDASH_* environment variables".dimmed()
    );

    Ok(())
}

fn print_source_line(name: &str, exists: bool) {
    if exists {
        println!("  {} {}", "✓".green(), name.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{name} (not found)").dimmed());
    }
}

/// Initialize a default config file at `~/.scrapedash/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Format a number with comma separators for readability.
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// Truncate a string to `max_len` characters, appending "…" if truncated.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{head}…")
    }
}

/// Horizontal bar of `width` cells, filled in proportion to `value / max`.
fn bar(value: f64, max: f64, width: usize) -> String {
    let filled = if max > 0.0 {
        ((value.max(0.0) / max) * width as f64).round() as usize
    } else {
        0
    }
    .min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

fn colorize_tier(tier: Tier) -> colored::ColoredString {
    match tier {
        Tier::Excellent => tier.as_str().green(),
        Tier::Good => tier.as_str().cyan(),
        Tier::Average => tier.as_str().yellow(),
        Tier::Poor => tier.as_str().red(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
