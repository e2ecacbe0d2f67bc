//! Scrape/audit report model.
//!
//! The report is produced externally (a crawler plus a Lighthouse run) and
//! delivered as a single JSON document, by default at `/scrapedData.json`.
//! Field names on the wire are camelCase.
//!
//! A report is either fully present or not loaded at all: every field except
//! `images` is required, so a document missing e.g. `lighthouseReport` fails
//! to parse instead of producing a half-populated value.
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// One page's scrape and audit results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub page_title: String,
    pub element_counts: ElementCounts,
    pub lighthouse_report: LighthouseReport,
    /// Optional gallery. Absent and empty are treated the same.
    #[serde(default)]
    pub images: Vec<ImageEntry>,
}

/// Counts of selected element kinds found on the scraped page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementCounts {
    pub links: u64,
    pub buttons: u64,
    pub paragraphs: u64,
    pub images: u64,
}

/// Lighthouse category scores (expected range 0–100) and the page screenshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LighthouseReport {
    pub performance: f64,
    pub accessibility: f64,
    pub best_practices: f64,
    pub seo: f64,
    /// Raw image bytes as base64 text, without a `data:` prefix.
    pub screenshot_data: String,
}

/// A captioned image reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageEntry {
    pub description: String,
    pub url: String,
}

impl Report {
    /// Parse a report from JSON text.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Scores outside the 0–100 range. Used for diagnostics only; nothing
    /// rejects such a report.
    pub fn out_of_range_scores(&self) -> Vec<(&'static str, f64)> {
        let lh = &self.lighthouse_report;
        [
            ("performance", lh.performance),
            ("accessibility", lh.accessibility),
            ("bestPractices", lh.best_practices),
            ("seo", lh.seo),
        ]
        .into_iter()
        .filter(|(_, v)| !(0.0..=100.0).contains(v))
        .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
