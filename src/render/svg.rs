//! Inline SVG chart drawing.
//!
//! Callers validate the dataset shape first (see `RenderContext::draw_chart`),
//! so every category here has a value and a fill/stroke colour pair.

use std::f64::consts::{FRAC_PI_2, TAU};
use std::fmt::Write;

use super::{ChartHints, escape_html};
use crate::view::ChartDataset;

/// Radar scale maximum; scores are expected in 0–100.
const RADAR_MAX: f64 = 100.0;
/// Grid ring spacing on the radar scale.
const RADAR_STEP: f64 = 20.0;

const EMPTY_RING: &str = "#30363d";
const TEXT: &str = "#8b949e";

fn open_svg(out: &mut String, width: u32, height: u32, title: &str, hints: ChartHints) {
    let size = if hints.responsive {
        r#"width="100%" preserveAspectRatio="xMidYMid meet""#.to_string()
    } else {
        format!(r#"width="{width}" height="{height}""#)
    };
    let _ = write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}" {size} role="img" aria-label="{}">"#,
        escape_html(title)
    );
}

fn fmt_value(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v:.1}")
    }
}

// ---------------------------------------------------------------------------
// Doughnut
// ---------------------------------------------------------------------------

const DOUGHNUT_W: u32 = 340;
const DOUGHNUT_H: u32 = 200;
const RING_CX: f64 = 100.0;
const RING_CY: f64 = 100.0;
const RING_R: f64 = 70.0;
const RING_WIDTH: f64 = 40.0;

/// Ring segments drawn as dashed circle strokes, legend on the right.
pub(super) fn doughnut(dataset: &ChartDataset, hints: ChartHints) -> String {
    let mut out = String::new();
    open_svg(&mut out, DOUGHNUT_W, DOUGHNUT_H, &dataset.title, hints);

    let total: f64 = dataset.series.values.iter().filter(|v| **v > 0.0).sum();
    let circumference = TAU * RING_R;

    if total <= 0.0 {
        let _ = write!(
            out,
            r#"<circle cx="{RING_CX}" cy="{RING_CY}" r="{RING_R}" fill="none" stroke="{EMPTY_RING}" stroke-width="{RING_WIDTH}"/>"#
        );
        let _ = write!(
            out,
            r#"<text x="{RING_CX}" y="{RING_CY}" text-anchor="middle" dominant-baseline="middle" fill="{TEXT}" font-size="12">No data</text>"#
        );
    } else {
        let mut offset = 0.0;
        let mut boundaries = Vec::new();
        for (_, value, fill, stroke) in dataset.points() {
            if value <= 0.0 {
                continue;
            }
            let len = value / total * circumference;
            let _ = write!(
                out,
                r#"<circle cx="{RING_CX}" cy="{RING_CY}" r="{RING_R}" fill="none" stroke="{fill}" stroke-width="{RING_WIDTH}" stroke-dasharray="{:.3} {:.3}" stroke-dashoffset="{:.3}" transform="rotate(-90 {RING_CX} {RING_CY})"/>"#,
                len,
                circumference - len,
                -offset
            );
            boundaries.push((offset / circumference * TAU - FRAC_PI_2, stroke));
            offset += len;
        }

        // Segment borders, only meaningful with two or more segments
        if boundaries.len() > 1 {
            let inner = RING_R - RING_WIDTH / 2.0;
            let outer = RING_R + RING_WIDTH / 2.0;
            for (angle, stroke) in boundaries {
                let (sin, cos) = angle.sin_cos();
                let _ = write!(
                    out,
                    r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{stroke}" stroke-width="{}"/>"#,
                    RING_CX + inner * cos,
                    RING_CY + inner * sin,
                    RING_CX + outer * cos,
                    RING_CY + outer * sin,
                    dataset.series.border_width
                );
            }
        }
    }

    // Legend
    for (i, (label, value, fill, stroke)) in dataset.points().enumerate() {
        let y = 40 + i as u32 * 28;
        let _ = write!(
            out,
            r#"<rect x="200" y="{}" width="14" height="14" fill="{fill}" stroke="{stroke}" stroke-width="{}"/><text x="222" y="{}" fill="{TEXT}" font-size="13">{}: {}</text>"#,
            y,
            dataset.series.border_width,
            y + 12,
            escape_html(label),
            fmt_value(value)
        );
    }

    out.push_str("</svg>");
    out
}

// ---------------------------------------------------------------------------
// Radar
// ---------------------------------------------------------------------------

const RADAR_W: u32 = 340;
const RADAR_H: u32 = 300;
const RADAR_CX: f64 = 170.0;
const RADAR_CY: f64 = 150.0;
const RADAR_R: f64 = 100.0;

fn radar_point(i: usize, n: usize, radius: f64) -> (f64, f64) {
    let angle = i as f64 / n as f64 * TAU - FRAC_PI_2;
    let (sin, cos) = angle.sin_cos();
    (RADAR_CX + radius * cos, RADAR_CY + radius * sin)
}

fn polygon_points(n: usize, radius_of: impl Fn(usize) -> f64) -> String {
    (0..n)
        .map(|i| {
            let (x, y) = radar_point(i, n, radius_of(i));
            format!("{x:.2},{y:.2}")
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Grid rings on a fixed 0–100 scale, one axis per category. Values are
/// clamped to the scale when drawn.
pub(super) fn radar(dataset: &ChartDataset, hints: ChartHints) -> String {
    let mut out = String::new();
    open_svg(&mut out, RADAR_W, RADAR_H, &dataset.title, hints);

    let n = dataset.category_labels.len();
    if n == 0 {
        out.push_str("</svg>");
        return out;
    }

    // Grid
    let mut level = RADAR_STEP;
    while level <= RADAR_MAX {
        let r = level / RADAR_MAX * RADAR_R;
        let _ = write!(
            out,
            r#"<polygon points="{}" fill="none" stroke="{EMPTY_RING}" stroke-width="1"/>"#,
            polygon_points(n, |_| r)
        );
        let (_, y) = radar_point(0, n, r);
        let _ = write!(
            out,
            r#"<text x="{:.2}" y="{:.2}" fill="{TEXT}" font-size="9">{}</text>"#,
            RADAR_CX + 3.0,
            y + 3.0,
            fmt_value(level)
        );
        level += RADAR_STEP;
    }

    // Axes and labels
    for (i, label) in dataset.category_labels.iter().enumerate() {
        let (x, y) = radar_point(i, n, RADAR_R);
        let _ = write!(
            out,
            r#"<line x1="{RADAR_CX}" y1="{RADAR_CY}" x2="{x:.2}" y2="{y:.2}" stroke="{EMPTY_RING}" stroke-width="1"/>"#
        );
        let (lx, ly) = radar_point(i, n, RADAR_R + 18.0);
        let anchor = if (lx - RADAR_CX).abs() < 1.0 {
            "middle"
        } else if lx > RADAR_CX {
            "start"
        } else {
            "end"
        };
        let _ = write!(
            out,
            r#"<text x="{lx:.2}" y="{:.2}" text-anchor="{anchor}" fill="{TEXT}" font-size="12">{}</text>"#,
            ly + 4.0,
            escape_html(label)
        );
    }

    // Data polygon: first colour pair styles the area
    let values = &dataset.series.values;
    let scaled = |i: usize| values[i].clamp(0.0, RADAR_MAX) / RADAR_MAX * RADAR_R;
    let fill = dataset.series.fill_colors[0];
    let stroke = dataset.series.stroke_colors[0];
    let _ = write!(
        out,
        r#"<polygon points="{}" fill="{fill}" stroke="{stroke}" stroke-width="{}"/>"#,
        polygon_points(n, scaled),
        dataset.series.border_width
    );

    for (i, (label, value, _, stroke)) in dataset.points().enumerate() {
        let (x, y) = radar_point(i, n, scaled(i));
        let _ = write!(
            out,
            r#"<circle cx="{x:.2}" cy="{y:.2}" r="3" fill="{stroke}"><title>{}: {}</title></circle>"#,
            escape_html(label),
            fmt_value(value)
        );
    }

    out.push_str("</svg>");
    out
}
