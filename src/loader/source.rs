//! Report sources: where the JSON document comes from.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::report::Report;

use super::LoadFailure;

/// Default resource path on the report host.
pub const DEFAULT_REPORT_PATH: &str = "/scrapedData.json";

/// Something that can produce a report with a single read.
pub trait ReportSource: Send + Sync {
    /// Human-readable location, for logs and health output.
    fn describe(&self) -> String;

    /// Perform one read. No retries.
    fn fetch(&self) -> Result<Report, LoadFailure>;
}

// ---------------------------------------------------------------------------
// HTTP
// ---------------------------------------------------------------------------

/// Plain `GET` of a JSON resource via `ureq`. No headers, query parameters,
/// or authentication are added.
#[derive(Debug, Clone)]
pub struct HttpSource {
    url: String,
    timeout: Duration,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }

    /// Join a base URL and a resource path, normalising the slash between them.
    pub fn from_parts(base_url: &str, path: &str, timeout: Duration) -> Self {
        let base = base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Self::new(format!("{base}/{path}"), timeout)
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ReportSource for HttpSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    fn fetch(&self) -> Result<Report, LoadFailure> {
        let resp = ureq::get(&self.url)
            .timeout(self.timeout)
            .call()
            .map_err(|e| match e {
                ureq::Error::Status(code, _) => LoadFailure::Status(code),
                ureq::Error::Transport(t) => LoadFailure::Transport(t.to_string()),
            })?;

        // Stream the body; into_string caps responses at 10 MB and screenshots
        // can exceed that.
        serde_json::from_reader(resp.into_reader()).map_err(|e| {
            if e.is_io() {
                LoadFailure::Transport(format!("failed reading response body: {e}"))
            } else {
                LoadFailure::Malformed(e.to_string())
            }
        })
    }
}

// ---------------------------------------------------------------------------
// File
// ---------------------------------------------------------------------------

/// A report stored on local disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ReportSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self) -> Result<Report, LoadFailure> {
        let text = fs::read_to_string(&self.path)
            .map_err(|e| LoadFailure::Io(format!("{}: {e}", self.path.display())))?;
        Report::from_json(&text).map_err(|e| LoadFailure::Malformed(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Target parsing
// ---------------------------------------------------------------------------

/// Build a source from a command-line target: `http(s)://` URLs are fetched
/// as-is, anything else is treated as a file path.
pub fn source_from_target(target: &str, timeout: Duration) -> Box<dyn ReportSource> {
    if is_http_url(target) {
        Box::new(HttpSource::new(target, timeout))
    } else {
        Box::new(FileSource::new(target))
    }
}

fn is_http_url(target: &str) -> bool {
    let lower = target.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
