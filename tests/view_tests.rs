/// View mapping tests.
///
/// Covers the fixed summary tiers, chart shapes and palettes, and the
/// screenshot data URI for complete reports.
use scrapedash::report::Report;
use scrapedash::view::{ChartKind, MetricValue, Rgba, Tier, map_report_to_view, map_report_to_view_with_mime};

fn sample(seo: f64, images: &str) -> Report {
    let json = format!(
        r#"{{
            "pageTitle": "Example Domain",
            "elementCounts": {{"links": 12, "buttons": 3, "paragraphs": 8, "images": 2}},
            "lighthouseReport": {{
                "performance": 91, "accessibility": 78, "bestPractices": 83, "seo": {seo},
                "screenshotData": "/9j/4AAQSkZJRg=="
            }}
            {images}
        }}"#
    );
    Report::from_json(&json).unwrap()
}

// ---------------------------------------------------------------------------
// Summary metrics
// ---------------------------------------------------------------------------

#[test]
fn summary_has_eight_metrics_in_fixed_order() {
    let view = map_report_to_view(&sample(64.0, ""));
    let labels: Vec<&str> = view.summary_metrics.iter().map(|m| m.label).collect();
    assert_eq!(
        labels,
        [
            "Total Links",
            "Total Buttons",
            "Total Paragraphs",
            "Total Images",
            "Performance Score",
            "Accessibility Score",
            "Best Practices Score",
            "SEO Score",
        ]
    );
    assert_eq!(view.summary_metrics[0].value, MetricValue::Count(12));
    assert_eq!(view.summary_metrics[7].value, MetricValue::Score(64.0));
}

#[test]
fn tiers_do_not_depend_on_values() {
    let expected = [
        Tier::Excellent,
        Tier::Good,
        Tier::Average,
        Tier::Good,
        Tier::Excellent,
        Tier::Good,
        Tier::Average,
        Tier::Poor,
    ];
    for seo in [0.0, 64.0, 100.0] {
        let view = map_report_to_view(&sample(seo, ""));
        let tiers: Vec<Tier> = view.summary_metrics.iter().map(|m| m.tier).collect();
        assert_eq!(tiers, expected, "seo={seo}");
    }
}

#[test]
fn perfect_seo_is_still_poor() {
    let view = map_report_to_view(&sample(100.0, ""));
    let seo = &view.summary_metrics[7];
    assert_eq!(seo.label, "SEO Score");
    assert_eq!(seo.tier, Tier::Poor);
    assert_eq!(seo.value.to_string(), "100");
}

#[test]
fn example_report_maps_links_to_card_and_chart() {
    let report = Report::from_json(
        r#"{
            "pageTitle": "Example",
            "elementCounts": {"links": 10, "buttons": 2, "paragraphs": 5, "images": 3},
            "lighthouseReport": {
                "performance": 90, "accessibility": 80, "bestPractices": 70, "seo": 60,
                "screenshotData": "aGVsbG8="
            },
            "images": []
        }"#,
    )
    .unwrap();
    let view = map_report_to_view(&report);

    let first = &view.summary_metrics[0];
    assert_eq!(first.label, "Total Links");
    assert_eq!(first.value, MetricValue::Count(10));
    assert_eq!(first.tier, Tier::Excellent);

    let (label, value, _, _) = view.element_chart.points().next().unwrap();
    assert_eq!(label, "Links");
    assert_eq!(value, 10.0);

    assert_eq!(view.page_title, "Example");
    assert!(view.images.is_empty());
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

#[test]
fn element_chart_is_doughnut_with_four_colours() {
    let view = map_report_to_view(&sample(64.0, ""));
    let chart = &view.element_chart;
    assert_eq!(chart.kind, ChartKind::Doughnut);
    assert_eq!(chart.category_labels, ["Links", "Buttons", "Paragraphs", "Images"]);
    assert_eq!(chart.series.values, [12.0, 3.0, 8.0, 2.0]);
    assert_eq!(chart.series.fill_colors.len(), 4);
    assert_eq!(chart.series.fill_colors[0], Rgba::new(255, 99, 132, 0.2));
    assert_eq!(chart.series.stroke_colors[0], Rgba::new(255, 99, 132, 1.0));
    assert_eq!(chart.series.border_width, 1);
    assert_eq!(chart.total(), 25.0);
}

#[test]
fn lighthouse_chart_is_radar_in_category_order() {
    let view = map_report_to_view(&sample(64.0, ""));
    let chart = &view.lighthouse_chart;
    assert_eq!(chart.kind, ChartKind::Radar);
    assert_eq!(chart.title, "Lighthouse Report");
    assert_eq!(chart.series.name, "Lighthouse Scores");
    assert_eq!(
        chart.category_labels,
        ["Performance", "Accessibility", "Best Practices", "SEO"]
    );
    assert_eq!(chart.series.values, [91.0, 78.0, 83.0, 64.0]);
}

#[test]
fn chart_values_mirror_summary_values() {
    let view = map_report_to_view(&sample(64.0, ""));
    let summary: Vec<f64> = view.summary_metrics.iter().map(|m| m.value.as_f64()).collect();
    assert_eq!(summary[..4], view.element_chart.series.values[..]);
    assert_eq!(summary[4..], view.lighthouse_chart.series.values[..]);
}

// ---------------------------------------------------------------------------
// Images and screenshot
// ---------------------------------------------------------------------------

#[test]
fn missing_images_maps_to_empty_gallery() {
    let view = map_report_to_view(&sample(64.0, ""));
    assert!(view.images.is_empty());
}

#[test]
fn images_keep_document_order() {
    let images = r#", "images": [
        {"description": "Logo", "url": "https://example.com/logo.png"},
        {"description": "Hero", "url": "https://example.com/hero.jpg"}
    ]"#;
    let view = map_report_to_view(&sample(64.0, images));
    let descriptions: Vec<&str> = view.images.iter().map(|i| i.description.as_str()).collect();
    assert_eq!(descriptions, ["Logo", "Hero"]);
}

#[test]
fn screenshot_uses_jpeg_data_uri_by_default() {
    let view = map_report_to_view(&sample(64.0, ""));
    assert_eq!(view.screenshot.data_uri(), "data:image/jpeg;base64,/9j/4AAQSkZJRg==");
}

#[test]
fn screenshot_mime_can_be_overridden() {
    let view = map_report_to_view_with_mime(&sample(64.0, ""), "image/png");
    assert!(view.screenshot.data_uri().starts_with("data:image/png;base64,"));
}

#[test]
fn view_serializes_with_camel_case_keys() {
    let view = map_report_to_view(&sample(64.0, ""));
    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["pageTitle"], "Example Domain");
    assert_eq!(json["summaryMetrics"][7]["tier"], "poor");
    assert_eq!(json["elementChart"]["kind"], "doughnut");
}
