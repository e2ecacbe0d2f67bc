/// Configuration schema and defaults for scrapedash.
///
/// Defines the TOML-serializable configuration structure with the sections
/// `[source]`, `[server]`, `[display]`, and `[logging]`.
///
/// Every field has a built-in default. Users only need to set the values
/// they want to override.
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::analytics::load_log::{EventLog, expand_home};
use crate::loader::{DEFAULT_REPORT_PATH, FileSource, HttpSource, ReportSource};
use crate::render::DisplayOptions;
use crate::view::DEFAULT_SCREENSHOT_MIME;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level scrapedash configuration.
///
/// Maps directly to `~/.scrapedash/config.toml` and `.scrapedash.toml`.
/// Missing sections and fields fall back to built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapedashConfig {
    pub source: SourceConfig,
    pub server: ServerConfig,
    pub display: DisplayConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [source]
// ---------------------------------------------------------------------------

/// Where the report comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Base URL of the report host.
    pub url: String,
    /// Resource path appended to `url`.
    pub path: String,
    /// Local report file. When non-empty it is used instead of `url`.
    pub file: String,
    /// HTTP request timeout (milliseconds).
    pub timeout_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:3000".to_string(),
            path: DEFAULT_REPORT_PATH.to_string(),
            file: String::new(),
            timeout_ms: 30_000,
        }
    }
}

impl SourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Build the configured report source.
    pub fn build(&self) -> Box<dyn ReportSource> {
        if self.file.trim().is_empty() {
            Box::new(HttpSource::from_parts(&self.url, &self.path, self.timeout()))
        } else {
            Box::new(FileSource::new(expand_home(self.file.trim())))
        }
    }
}

// ---------------------------------------------------------------------------
// [server]
// ---------------------------------------------------------------------------

/// Embedded web dashboard settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address for `scrapedash serve`.
    pub addr: String,
    /// Open the dashboard in the default browser on start.
    pub open_browser: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:9747".to_string(),
            open_browser: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [display]
// ---------------------------------------------------------------------------

/// Page layout constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub image_max_width_px: u32,
    pub screenshot_max_width_px: u32,
    /// MIME type of `screenshotData`.
    pub screenshot_mime: String,
    pub responsive_charts: bool,
    /// Auto-refresh interval of the loading page (seconds).
    pub loading_refresh_secs: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        let opts = DisplayOptions::default();
        Self {
            image_max_width_px: opts.image_max_width_px,
            screenshot_max_width_px: opts.screenshot_max_width_px,
            screenshot_mime: DEFAULT_SCREENSHOT_MIME.to_string(),
            responsive_charts: opts.responsive_charts,
            loading_refresh_secs: opts.loading_refresh_secs,
        }
    }
}

impl DisplayConfig {
    pub fn to_options(&self) -> DisplayOptions {
        DisplayOptions {
            image_max_width_px: self.image_max_width_px,
            screenshot_max_width_px: self.screenshot_max_width_px,
            screenshot_mime: self.screenshot_mime.clone(),
            responsive_charts: self.responsive_charts,
            loading_refresh_secs: self.loading_refresh_secs.max(1),
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Diagnostic logging and load-event recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    /// `RUST_LOG` takes precedence when set.
    pub level: String,
    /// Emit diagnostics as JSON lines instead of human-readable text.
    pub json: bool,
    /// Record every completed fetch to the load-event log.
    pub events: bool,
    /// Load-event log path. `~` is expanded to the home directory.
    pub events_path: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            events: true,
            events_path: "~/.scrapedash/load-events.jsonl".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn events_file(&self) -> PathBuf {
        expand_home(&self.events_path)
    }

    /// The event log, if recording is enabled.
    pub fn event_log(&self) -> Option<EventLog> {
        self.events.then(|| EventLog::new(self.events_file()))
    }
}

// ---------------------------------------------------------------------------
// Default TOML content
// ---------------------------------------------------------------------------

impl ScrapedashConfig {
    /// Annotated default config file content, written by `scrapedash config init`.
    pub fn default_toml() -> String {
        r#"# scrapedash configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (SCRAPEDASH_*)
#   2. Project config (.scrapedash.toml in current directory)
#   3. User global config (~/.scrapedash/config.toml)
#   4. Built-in defaults

[source]
url = "http://127.0.0.1:3000"
path = "/scrapedData.json"
file = ""                             # Read a local report file instead of url + path
timeout_ms = 30000

[server]
addr = "127.0.0.1:9747"
open_browser = true

[display]
image_max_width_px = 300
screenshot_max_width_px = 600
screenshot_mime = "image/jpeg"
responsive_charts = true
loading_refresh_secs = 2

[logging]
level = "info"                        # error | warn | info | debug | trace (RUST_LOG overrides)
json = false
events = true
events_path = "~/.scrapedash/load-events.jsonl"
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_toml_parses_back() {
        let config: ScrapedashConfig = toml::from_str(&ScrapedashConfig::default_toml()).unwrap();
        assert_eq!(config, ScrapedashConfig::default());
    }

    #[test]
    fn empty_toml_produces_defaults() {
        let config: ScrapedashConfig = toml::from_str("").unwrap();
        assert_eq!(config.source.path, "/scrapedData.json");
        assert_eq!(config.server.addr, "127.0.0.1:9747");
        assert!(config.logging.events);
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config: ScrapedashConfig = toml::from_str(
            r#"
[source]
file = "./scrapedData.json"

[display]
image_max_width_px = 200
"#,
        )
        .unwrap();
        assert_eq!(config.source.file, "./scrapedData.json");
        assert_eq!(config.source.timeout_ms, 30_000);
        assert_eq!(config.display.image_max_width_px, 200);
        assert_eq!(config.display.screenshot_max_width_px, 600);
    }

    #[test]
    fn source_prefers_file_when_set() {
        let mut source = SourceConfig::default();
        assert_eq!(source.build().describe(), "http://127.0.0.1:3000/scrapedData.json");

        source.file = "/tmp/report.json".to_string();
        assert_eq!(source.build().describe(), "/tmp/report.json");
    }

    #[test]
    fn display_options_floor_refresh_interval() {
        let display = DisplayConfig {
            loading_refresh_secs: 0,
            ..DisplayConfig::default()
        };
        assert_eq!(display.to_options().loading_refresh_secs, 1);
    }

    #[test]
    fn event_log_follows_flag() {
        let mut logging = LoggingConfig::default();
        assert!(logging.event_log().is_some());
        logging.events = false;
        assert!(logging.event_log().is_none());
    }
}
