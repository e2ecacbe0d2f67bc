use anyhow::Result;
use clap::{Parser, Subcommand};

use scrapedash::config::{self, ScrapedashConfig};
use scrapedash::loader::{ReportLoader, ReportSource, source_from_target};
use scrapedash::render::RenderContext;
use scrapedash::web::{self, Dashboard};
use scrapedash::{cli, logging};

#[derive(Debug, Parser)]
#[command(name = "scrapedash")]
#[command(about = "Dashboard for scraped page reports: element counts, Lighthouse scores, screenshots")]
struct App {
    /// Report location: an http(s) URL or a local JSON file (overrides config)
    #[arg(long, global = true, value_name = "URL|PATH")]
    report: Option<String>,
    /// Log level filter, e.g. debug or scrapedash=trace (RUST_LOG wins)
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Serve the dashboard over HTTP
    Serve {
        /// Listen address (default from config: 127.0.0.1:9747)
        #[arg(long)]
        addr: Option<String>,
        /// Do not open the dashboard in a browser
        #[arg(long)]
        no_browser: bool,
    },
    /// Load the report once and print the dashboard view
    Show {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Load the report once and report whether it succeeded
    Check,
    /// Show recent load events
    History {
        /// Number of events to show
        #[arg(long, default_value = "10")]
        limit: usize,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Write a default config file to ~/.scrapedash/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a configuration value using a dotted key, e.g. source.url
    Set { key: String, value: String },
    /// Reset configuration to defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();
    let cfg = config::load();
    logging::init(&cfg.logging, app.log_level.as_deref())?;

    match app.command {
        Commands::Serve { addr, no_browser } => {
            let addr = addr.unwrap_or_else(|| cfg.server.addr.clone());
            let dashboard = Dashboard::new(build_loader(&cfg, app.report.as_deref()), build_render(&cfg));
            web::serve(&addr, &dashboard, cfg.server.open_browser && !no_browser)
        }
        Commands::Show { format } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            let loader = build_loader(&cfg, app.report.as_deref());
            cli::run_show(&loader, &cfg.display.to_options(), fmt)
        }
        Commands::Check => cli::run_check(&build_loader(&cfg, app.report.as_deref())),
        Commands::History { limit, format } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_history(cfg.logging.event_log().as_ref(), limit, fmt)
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}

fn build_loader(cfg: &ScrapedashConfig, report: Option<&str>) -> ReportLoader {
    let source: Box<dyn ReportSource> = match report {
        Some(target) => source_from_target(target, cfg.source.timeout()),
        None => cfg.source.build(),
    };
    ReportLoader::with_event_log(source, cfg.logging.event_log())
}

fn build_render(cfg: &ScrapedashConfig) -> RenderContext {
    RenderContext::with_standard_charts(cfg.display.to_options())
}
