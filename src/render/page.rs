//! HTML page composition for each load state.
//!
//! Every state renders a complete document. While loading, the page holds
//! only the placeholder; once loaded, all sections are emitted together.

use std::fmt::Write;

use super::{RenderContext, RenderError, escape_html};
use crate::loader::{LoadFailure, LoadState};
use crate::view::{DashboardView, map_report_to_view_with_mime};

/// Render the page for the given load state.
pub fn render_page(ctx: &RenderContext, state: &LoadState) -> Result<String, RenderError> {
    match state {
        LoadState::Loading => Ok(render_loading(ctx)),
        LoadState::Failed(failure) => Ok(render_failed(failure)),
        LoadState::Loaded(report) => {
            let view = map_report_to_view_with_mime(report, &ctx.options().screenshot_mime);
            render_dashboard(ctx, &view)
        }
    }
}

/// Placeholder shown until the report arrives.
pub fn render_loading(ctx: &RenderContext) -> String {
    let refresh = format!(
        r#"<meta http-equiv="refresh" content="{}">"#,
        ctx.options().loading_refresh_secs
    );
    document("Loading", &refresh, r#"<div class="loading">Loading...</div>"#)
}

/// Error state with the failure reason and a retry affordance.
pub fn render_failed(failure: &LoadFailure) -> String {
    let body = format!(
        r#"<div class="error card">
  <h2>Report unavailable</h2>
  <p class="reason">{}</p>
  <form method="post" action="/reload"><button type="submit">Retry</button></form>
</div>"#,
        escape_html(&failure.to_string())
    );
    document("Report unavailable", "", &body)
}

/// Full dashboard for a loaded report.
pub fn render_dashboard(ctx: &RenderContext, view: &DashboardView) -> Result<String, RenderError> {
    let opts = ctx.options();
    let hints = ctx.default_hints();

    // Draw charts first so an error leaves nothing half-written.
    let element_svg = ctx.draw_chart(&view.element_chart, hints)?;
    let lighthouse_svg = ctx.draw_chart(&view.lighthouse_chart, hints)?;

    let mut body = String::new();
    let _ = write!(body, "<h1>{}</h1>", escape_html(&view.page_title));

    body.push_str(r#"<div class="total-container">"#);
    for metric in &view.summary_metrics {
        let _ = write!(
            body,
            r#"<div class="total-card {}"><h2>{}</h2><p>{}</p></div>"#,
            metric.tier,
            escape_html(metric.label),
            escape_html(&metric.value.to_string())
        );
    }
    body.push_str("</div>");

    let _ = write!(
        body,
        r#"<div class="grid-container"><div class="card"><h2>{}</h2>{}</div><div class="card"><h2>{}</h2>{}</div></div>"#,
        escape_html(&view.element_chart.title),
        element_svg,
        escape_html(&view.lighthouse_chart.title),
        lighthouse_svg
    );

    body.push_str(r#"<div class="grid-container gallery">"#);
    for image in &view.images {
        let _ = write!(
            body,
            r#"<div class="card"><h2>{}</h2>{}</div>"#,
            escape_html(&image.description),
            ctx.draw_image(&image.url, &image.description, opts.image_max_width_px)
        );
    }
    body.push_str("</div>");

    body.push_str(r#"<div class="section"><h2>Summary</h2>"#);
    for line in view.element_summary() {
        let _ = write!(body, "<p>{}</p>", escape_html(&line));
    }
    body.push_str("</div>");

    body.push_str(r#"<div class="section screenshot"><h2>Screenshots</h2>"#);
    if !view.screenshot.is_empty() {
        body.push_str(&ctx.draw_image(
            &view.screenshot.data_uri(),
            "Lighthouse Screenshot",
            opts.screenshot_max_width_px,
        ));
    }
    body.push_str("</div>");

    Ok(document(&view.page_title, "", &body))
}

fn document(title: &str, head_extra: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
{head_extra}
<title>{}</title>
<style>{STYLE}</style>
</head>
<body>
<div class="app">
{body}
</div>
</body>
</html>"#,
        escape_html(title)
    )
}

const STYLE: &str = r#"
:root {
  --bg: #0d1117;
  --surface: #161b22;
  --border: #30363d;
  --text: #e6edf3;
  --text-muted: #8b949e;
  --accent: #58a6ff;
  --green: #3fb950;
  --yellow: #d29922;
  --red: #f85149;
  --cyan: #39d2c0;
  --radius: 8px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
}
* { margin: 0; padding: 0; box-sizing: border-box; }
body { background: var(--bg); color: var(--text); font-family: var(--font); font-size: 14px; line-height: 1.5; }
.app { max-width: 1200px; margin: 0 auto; padding: 20px; }
h1 { text-align: center; margin-bottom: 20px; font-size: 24px; font-weight: 600; }
.loading { text-align: center; padding: 80px 0; color: var(--text-muted); font-size: 18px; }
.card { background: var(--surface); border: 1px solid var(--border); border-radius: var(--radius); padding: 20px; }
.card h2, .section h2 { font-size: 16px; font-weight: 600; margin-bottom: 16px; }
.total-container { display: grid; grid-template-columns: repeat(auto-fit, minmax(200px, 1fr)); gap: 16px; margin-bottom: 24px; }
.total-card { background: var(--surface); border: 1px solid var(--border); border-left-width: 4px; border-radius: var(--radius); padding: 16px; }
.total-card h2 { font-size: 13px; color: var(--text-muted); font-weight: 500; }
.total-card p { font-size: 28px; font-weight: 700; }
.total-card.excellent { border-left-color: var(--green); }
.total-card.good { border-left-color: var(--cyan); }
.total-card.average { border-left-color: var(--yellow); }
.total-card.poor { border-left-color: var(--red); }
.grid-container { display: grid; grid-template-columns: repeat(auto-fit, minmax(320px, 1fr)); gap: 16px; margin-bottom: 24px; }
.section { margin-top: 40px; }
.screenshot { text-align: center; }
.error { max-width: 600px; margin: 80px auto; border-color: var(--red); }
.error .reason { color: var(--red); margin-bottom: 16px; font-family: monospace; }
button { padding: 8px 16px; border: none; border-radius: 6px; background: var(--accent); color: #fff; font-weight: 500; cursor: pointer; }
"#;
