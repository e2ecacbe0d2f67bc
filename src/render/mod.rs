//! Rendering: chart drawing and page composition.
//!
//! Chart drawing capabilities are not registered globally. A
//! [`RenderContext`] is built once at startup with the chart kinds it can
//! draw, then handed to whatever renders pages:
//!
//! ```rust,ignore
//! let ctx = RenderContext::with_standard_charts(DisplayOptions::default());
//! let html = page::render_page(&ctx, &loader.state())?;
//! ```

pub mod page;
mod svg;

use std::collections::HashSet;

use thiserror::Error;

use crate::view::{ChartDataset, ChartKind, DEFAULT_SCREENSHOT_MIME};

// ---------------------------------------------------------------------------
// Options and errors
// ---------------------------------------------------------------------------

/// Display constraints applied when composing a page.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayOptions {
    /// Max display width of gallery images (aspect ratio preserved).
    pub image_max_width_px: u32,
    /// Max display width of the screenshot (aspect ratio preserved).
    pub screenshot_max_width_px: u32,
    /// MIME type used for the screenshot `data:` URI.
    pub screenshot_mime: String,
    /// Whether charts scale with their container.
    pub responsive_charts: bool,
    /// Seconds between reloads of the loading placeholder page.
    pub loading_refresh_secs: u32,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            image_max_width_px: 300,
            screenshot_max_width_px: 600,
            screenshot_mime: DEFAULT_SCREENSHOT_MIME.to_string(),
            responsive_charts: true,
            loading_refresh_secs: 2,
        }
    }
}

/// Per-chart display hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartHints {
    pub responsive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("no renderer registered for {0} charts")]
    UnregisteredChart(ChartKind),
    #[error("chart '{title}' has {labels} labels but {values} values and {colors} colours")]
    ShapeMismatch {
        title: String,
        labels: usize,
        values: usize,
        colors: usize,
    },
}

// ---------------------------------------------------------------------------
// Render context
// ---------------------------------------------------------------------------

/// Explicitly initialised set of drawing capabilities plus display options.
#[derive(Debug, Clone)]
pub struct RenderContext {
    charts: HashSet<ChartKind>,
    options: DisplayOptions,
}

impl RenderContext {
    /// A context that can draw no charts yet.
    pub fn new(options: DisplayOptions) -> Self {
        Self {
            charts: HashSet::new(),
            options,
        }
    }

    /// A context with every chart kind the dashboard uses.
    pub fn with_standard_charts(options: DisplayOptions) -> Self {
        let mut ctx = Self::new(options);
        ctx.register(ChartKind::Doughnut);
        ctx.register(ChartKind::Radar);
        ctx
    }

    pub fn register(&mut self, kind: ChartKind) -> &mut Self {
        self.charts.insert(kind);
        self
    }

    pub fn is_registered(&self, kind: ChartKind) -> bool {
        self.charts.contains(&kind)
    }

    pub fn options(&self) -> &DisplayOptions {
        &self.options
    }

    /// Hints derived from the display options.
    pub fn default_hints(&self) -> ChartHints {
        ChartHints {
            responsive: self.options.responsive_charts,
        }
    }

    /// Draw a chart as an inline SVG element.
    pub fn draw_chart(&self, dataset: &ChartDataset, hints: ChartHints) -> Result<String, RenderError> {
        if !self.is_registered(dataset.kind) {
            return Err(RenderError::UnregisteredChart(dataset.kind));
        }
        check_shape(dataset)?;

        Ok(match dataset.kind {
            ChartKind::Doughnut => svg::doughnut(dataset, hints),
            ChartKind::Radar => svg::radar(dataset, hints),
        })
    }

    /// An `<img>` constrained to `max_width_px`, height following the
    /// aspect ratio.
    pub fn draw_image(&self, src: &str, alt: &str, max_width_px: u32) -> String {
        format!(
            r#"<img src="{}" alt="{}" style="width:100%;max-width:{}px;height:auto">"#,
            escape_html(src),
            escape_html(alt),
            max_width_px
        )
    }
}

fn check_shape(dataset: &ChartDataset) -> Result<(), RenderError> {
    let labels = dataset.category_labels.len();
    let values = dataset.series.values.len();
    let colors = dataset
        .series
        .fill_colors
        .len()
        .min(dataset.series.stroke_colors.len());

    if labels == values && colors >= labels {
        Ok(())
    } else {
        Err(RenderError::ShapeMismatch {
            title: dataset.title.clone(),
            labels,
            values,
            colors,
        })
    }
}

/// Escape text for HTML element content and attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{Rgba, Series};

    fn dataset(kind: ChartKind, values: Vec<f64>) -> ChartDataset {
        let n = values.len();
        ChartDataset {
            kind,
            title: "T".to_string(),
            category_labels: (0..n).map(|i| format!("c{i}")).collect(),
            series: Series {
                name: "S".to_string(),
                values,
                fill_colors: vec![Rgba::new(1, 2, 3, 0.2); n],
                stroke_colors: vec![Rgba::new(1, 2, 3, 1.0); n],
                border_width: 1,
            },
        }
    }

    #[test]
    fn empty_context_refuses_charts() {
        let ctx = RenderContext::new(DisplayOptions::default());
        let err = ctx
            .draw_chart(&dataset(ChartKind::Radar, vec![1.0]), ctx.default_hints())
            .unwrap_err();
        assert_eq!(err, RenderError::UnregisteredChart(ChartKind::Radar));
        assert_eq!(err.to_string(), "no renderer registered for radar charts");
    }

    #[test]
    fn registration_is_explicit() {
        let mut ctx = RenderContext::new(DisplayOptions::default());
        ctx.register(ChartKind::Doughnut);
        assert!(ctx.is_registered(ChartKind::Doughnut));
        assert!(!ctx.is_registered(ChartKind::Radar));

        let hints = ctx.default_hints();
        assert!(ctx.draw_chart(&dataset(ChartKind::Doughnut, vec![1.0, 2.0]), hints).is_ok());
        assert!(ctx.draw_chart(&dataset(ChartKind::Radar, vec![1.0, 2.0]), hints).is_err());
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        let ctx = RenderContext::with_standard_charts(DisplayOptions::default());
        let mut ds = dataset(ChartKind::Doughnut, vec![1.0, 2.0]);
        ds.series.values.push(3.0);
        assert!(matches!(
            ctx.draw_chart(&ds, ctx.default_hints()),
            Err(RenderError::ShapeMismatch { labels: 2, values: 3, .. })
        ));
    }

    #[test]
    fn image_is_width_constrained_and_escaped() {
        let ctx = RenderContext::new(DisplayOptions::default());
        let html = ctx.draw_image("https://x/a.png?q=1&r=2", "A \"quoted\" <caption>", 300);
        assert!(html.contains("max-width:300px"));
        assert!(html.contains("height:auto"));
        assert!(html.contains("q=1&amp;r=2"));
        assert!(html.contains("A &quot;quoted&quot; &lt;caption&gt;"));
    }

    #[test]
    fn escape_html_handles_all_specials() {
        assert_eq!(escape_html(r#"<a href='x'>&"#), "&lt;a href=&#39;x&#39;&gt;&amp;");
        assert_eq!(escape_html("plain"), "plain");
    }
}
