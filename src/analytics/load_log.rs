//! Load event log: one JSONL line per completed report fetch.
//!
//! Records which source was read, how the fetch ended, and how long it took.
//! `scrapedash history` reads this file back.
//!
//! Default location: `~/.scrapedash/load-events.jsonl`

use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Event entry
// ---------------------------------------------------------------------------

/// How a fetch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadOutcome {
    Loaded,
    Failed,
    /// The result arrived after the loader was unmounted and was discarded.
    Cancelled,
}

impl std::fmt::Display for LoadOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Loaded => write!(f, "loaded"),
            Self::Failed => write!(f, "failed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A single load event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadEvent {
    pub timestamp: String,
    pub source: String,
    pub outcome: LoadOutcome,
    pub latency_ms: u64,
    /// Failure reason (only set for failed loads).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub reason: Option<String>,
}

// ---------------------------------------------------------------------------
// Log handle
// ---------------------------------------------------------------------------

/// Append-only JSONL event log at a fixed path.
#[derive(Debug, Clone)]
pub struct EventLog {
    path: PathBuf,
}

impl EventLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record a completed fetch.
    ///
    /// Best-effort: failures are logged at debug level and otherwise ignored.
    pub fn record(&self, source: &str, outcome: LoadOutcome, latency_ms: u64, reason: Option<String>) {
        let event = LoadEvent {
            timestamp: Utc::now().to_rfc3339(),
            source: source.to_string(),
            outcome,
            latency_ms,
            reason,
        };
        if let Err(e) = self.append(&event) {
            tracing::debug!(path = %self.path.display(), error = %e, "failed to write load event");
        }
    }

    /// Read all events, oldest first. Malformed lines are skipped; a missing
    /// file yields an empty list.
    pub fn read_all(&self) -> Vec<LoadEvent> {
        let Ok(file) = fs::File::open(&self.path) else {
            return Vec::new();
        };

        BufReader::new(file)
            .lines()
            .map_while(Result::ok)
            .filter_map(|line| serde_json::from_str::<LoadEvent>(&line).ok())
            .collect()
    }

    fn append(&self, event: &LoadEvent) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let json = serde_json::to_string(event)?;
        writeln!(file, "{json}")?;

        Ok(())
    }
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Log in a fresh directory that does not exist yet, so `record` has to
    /// create it. The directory is removed when the guard drops.
    fn temp_log() -> (tempfile::TempDir, EventLog) {
        let dir = tempfile::tempdir().unwrap();
        let log = EventLog::new(dir.path().join("nested").join("load-events.jsonl"));
        (dir, log)
    }

    #[test]
    fn record_then_read_back() {
        let (_dir, log) = temp_log();
        log.record("http://a/scrapedData.json", LoadOutcome::Loaded, 12, None);
        log.record("http://a/scrapedData.json", LoadOutcome::Failed, 30, Some("HTTP 500".into()));

        let events = log.read_all();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].outcome, LoadOutcome::Loaded);
        assert_eq!(events[1].reason.as_deref(), Some("HTTP 500"));
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let (_dir, log) = temp_log();
        log.record("f.json", LoadOutcome::Loaded, 1, None);
        let mut file = OpenOptions::new().append(true).open(log.path()).unwrap();
        writeln!(file, "not json").unwrap();
        log.record("f.json", LoadOutcome::Cancelled, 2, None);

        let events = log.read_all();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].outcome, LoadOutcome::Cancelled);
    }

    #[test]
    fn missing_file_reads_empty() {
        assert!(EventLog::new("/nonexistent/dir/events.jsonl").read_all().is_empty());
    }

    #[test]
    fn reason_omitted_when_none() {
        let event = LoadEvent {
            timestamp: "2025-01-01T00:00:00Z".into(),
            source: "s".into(),
            outcome: LoadOutcome::Loaded,
            latency_ms: 5,
            reason: None,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(!json.contains("reason"));
        assert!(json.contains("\"outcome\":\"loaded\""));
    }

    #[test]
    fn expand_home_leaves_plain_paths() {
        assert_eq!(expand_home("/var/log/x.jsonl"), PathBuf::from("/var/log/x.jsonl"));
    }
}
