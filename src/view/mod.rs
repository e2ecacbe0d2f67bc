//! Report → dashboard view mapping.
//!
//! [`map_report_to_view`] is the only entry point. It is pure: the same
//! report always yields the same view, and nothing here touches I/O.
//!
//! Tiers are assigned per metric slot, not computed from values. A perfect
//! SEO score of 100 is still shown as `poor`.

pub mod chart;

use std::fmt;

use serde::Serialize;

use crate::report::{ImageEntry, Report};

pub use chart::{ChartDataset, ChartKind, Rgba, Series};

/// MIME type assumed for `screenshotData` unless configured otherwise.
pub const DEFAULT_SCREENSHOT_MIME: &str = "image/jpeg";

/// Element-count palette, one colour per category in order.
const ELEMENT_PALETTE: [Rgba; 4] = [
    Rgba::new(255, 99, 132, 0.2),
    Rgba::new(54, 162, 235, 0.2),
    Rgba::new(255, 206, 86, 0.2),
    Rgba::new(75, 192, 192, 0.2),
];

/// Single colour used for every point of the Lighthouse radar.
const LIGHTHOUSE_COLOR: Rgba = Rgba::new(75, 192, 192, 0.2);

const ELEMENT_LABELS: [&str; 4] = ["Links", "Buttons", "Paragraphs", "Images"];
const LIGHTHOUSE_LABELS: [&str; 4] = ["Performance", "Accessibility", "Best Practices", "SEO"];

// ---------------------------------------------------------------------------
// View types
// ---------------------------------------------------------------------------

/// Qualitative label used to style a summary card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Excellent,
    Good,
    Average,
    Poor,
}

impl Tier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Average => "average",
            Self::Poor => "poor",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A metric value: element counts are integers, scores are numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Count(u64),
    Score(f64),
}

impl MetricValue {
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Count(n) => n as f64,
            Self::Score(s) => s,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(n) => write!(f, "{n}"),
            // Whole scores print without a trailing ".0"
            Self::Score(s) if s.fract() == 0.0 && s.abs() < 1e15 => write!(f, "{}", *s as i64),
            Self::Score(s) => write!(f, "{s}"),
        }
    }
}

/// One summary card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryMetric {
    pub label: &'static str,
    pub value: MetricValue,
    pub tier: Tier,
}

/// Base64 screenshot payload plus its MIME type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Screenshot {
    pub mime: String,
    pub data: String,
}

impl Screenshot {
    /// `data:` URI suitable for an `<img src>`.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, self.data)
    }

    pub fn is_empty(&self) -> bool {
        self.data.trim().is_empty()
    }
}

/// Everything the dashboard displays for a loaded report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub page_title: String,
    pub summary_metrics: Vec<SummaryMetric>,
    pub element_chart: ChartDataset,
    pub lighthouse_chart: ChartDataset,
    pub images: Vec<ImageEntry>,
    pub screenshot: Screenshot,
}

impl DashboardView {
    /// "Total X: n" lines for the four element metrics.
    pub fn element_summary(&self) -> Vec<String> {
        self.summary_metrics
            .iter()
            .take(ELEMENT_LABELS.len())
            .map(|m| format!("{}: {}", m.label, m.value))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Mapping
// ---------------------------------------------------------------------------

/// Map a loaded report to its dashboard view, using the default screenshot
/// MIME type.
pub fn map_report_to_view(report: &Report) -> DashboardView {
    map_report_to_view_with_mime(report, DEFAULT_SCREENSHOT_MIME)
}

/// Map a loaded report to its dashboard view.
pub fn map_report_to_view_with_mime(report: &Report, screenshot_mime: &str) -> DashboardView {
    DashboardView {
        page_title: report.page_title.clone(),
        summary_metrics: summary_metrics(report),
        element_chart: element_chart(report),
        lighthouse_chart: lighthouse_chart(report),
        images: report.images.clone(),
        screenshot: Screenshot {
            mime: screenshot_mime.to_string(),
            data: report.lighthouse_report.screenshot_data.clone(),
        },
    }
}

/// The eight summary cards, in display order.
pub fn summary_metrics(report: &Report) -> Vec<SummaryMetric> {
    let ec = &report.element_counts;
    let lh = &report.lighthouse_report;

    let metric = |label, value, tier| SummaryMetric { label, value, tier };

    vec![
        metric("Total Links", MetricValue::Count(ec.links), Tier::Excellent),
        metric("Total Buttons", MetricValue::Count(ec.buttons), Tier::Good),
        metric("Total Paragraphs", MetricValue::Count(ec.paragraphs), Tier::Average),
        metric("Total Images", MetricValue::Count(ec.images), Tier::Good),
        metric("Performance Score", MetricValue::Score(lh.performance), Tier::Excellent),
        metric("Accessibility Score", MetricValue::Score(lh.accessibility), Tier::Good),
        metric("Best Practices Score", MetricValue::Score(lh.best_practices), Tier::Average),
        metric("SEO Score", MetricValue::Score(lh.seo), Tier::Poor),
    ]
}

/// Element-count distribution (doughnut).
pub fn element_chart(report: &Report) -> ChartDataset {
    let ec = &report.element_counts;
    ChartDataset {
        kind: ChartKind::Doughnut,
        title: "Element Counts".to_string(),
        category_labels: labels(&ELEMENT_LABELS),
        series: Series {
            name: "Element Counts".to_string(),
            values: vec![
                ec.links as f64,
                ec.buttons as f64,
                ec.paragraphs as f64,
                ec.images as f64,
            ],
            fill_colors: ELEMENT_PALETTE.to_vec(),
            stroke_colors: ELEMENT_PALETTE.iter().map(|c| c.with_alpha(1.0)).collect(),
            border_width: 1,
        },
    }
}

/// Lighthouse quality profile (radar).
pub fn lighthouse_chart(report: &Report) -> ChartDataset {
    let lh = &report.lighthouse_report;
    let n = LIGHTHOUSE_LABELS.len();
    ChartDataset {
        kind: ChartKind::Radar,
        title: "Lighthouse Report".to_string(),
        category_labels: labels(&LIGHTHOUSE_LABELS),
        series: Series {
            name: "Lighthouse Scores".to_string(),
            values: vec![lh.performance, lh.accessibility, lh.best_practices, lh.seo],
            fill_colors: vec![LIGHTHOUSE_COLOR; n],
            stroke_colors: vec![LIGHTHOUSE_COLOR.with_alpha(1.0); n],
            border_width: 1,
        },
    }
}

fn labels(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
