//! JSON API handlers for the web dashboard.

use std::thread::JoinHandle;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::loader::{LoadState, TransitionError};
use crate::view::map_report_to_view_with_mime;

use super::{Dashboard, Reply};

// ---------------------------------------------------------------------------
// JSON response types
// ---------------------------------------------------------------------------

/// `GET /api/state` body.
#[derive(Debug, Serialize)]
struct StateResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

impl From<&LoadState> for StateResponse {
    fn from(state: &LoadState) -> Self {
        Self {
            status: state.name(),
            reason: state.failure().map(|f| f.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    version: &'static str,
    source: String,
    state: &'static str,
    charts_registered: bool,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn json_reply<T: Serialize>(status: u16, data: &T) -> Result<Reply> {
    let body = serde_json::to_string(data).context("failed to serialize JSON response")?;
    Ok(Reply::json(status, body))
}

pub(super) fn retry(dashboard: &Dashboard) -> Result<JoinHandle<()>, TransitionError> {
    dashboard.loader.retry()
}

// ---------------------------------------------------------------------------
// API Handlers
// ---------------------------------------------------------------------------

/// `GET /api/state`: current load state.
pub fn get_state(dashboard: &Dashboard) -> Result<Reply> {
    let state = dashboard.loader.state();
    json_reply(200, &StateResponse::from(&state))
}

/// `GET /api/view`: the mapped dashboard view, once loaded.
pub fn get_view(dashboard: &Dashboard) -> Result<Reply> {
    let state = dashboard.loader.state();
    match state.report() {
        Some(report) => {
            let mime = &dashboard.render.options().screenshot_mime;
            json_reply(200, &map_report_to_view_with_mime(report, mime))
        }
        None => json_reply(503, &StateResponse::from(&state)),
    }
}

/// `POST /api/reload`: explicit retry of a failed load.
pub fn post_reload(dashboard: &Dashboard) -> Result<Reply> {
    match retry(dashboard) {
        // Fetch runs detached; clients poll /api/state
        Ok(_handle) => json_reply(
            200,
            &serde_json::json!({ "success": true, "status": "loading" }),
        ),
        Err(e) => json_reply(
            409,
            &serde_json::json!({ "success": false, "error": e.to_string() }),
        ),
    }
}

/// `GET /api/health`: source, state, and version.
pub fn get_health(dashboard: &Dashboard) -> Result<Reply> {
    use crate::view::ChartKind;

    let render = &dashboard.render;
    let resp = HealthResponse {
        version: env!("CARGO_PKG_VERSION"),
        source: dashboard.loader.source_description(),
        state: dashboard.loader.state().name(),
        charts_registered: render.is_registered(ChartKind::Doughnut)
            && render.is_registered(ChartKind::Radar),
    };
    json_reply(200, &resp)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::LoadFailure;

    #[test]
    fn state_response_omits_reason_unless_failed() {
        let json = serde_json::to_string(&StateResponse::from(&LoadState::Loading)).unwrap();
        assert_eq!(json, r#"{"status":"loading"}"#);

        let failed = LoadState::Failed(LoadFailure::Status(502));
        let json = serde_json::to_string(&StateResponse::from(&failed)).unwrap();
        assert_eq!(
            json,
            r#"{"status":"failed","reason":"server responded with HTTP 502"}"#
        );
    }

    #[test]
    fn health_response_serializes() {
        let resp = HealthResponse {
            version: "0.1.0",
            source: "http://127.0.0.1:3000/scrapedData.json".to_string(),
            state: "loaded",
            charts_registered: true,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"state\":\"loaded\""));
        assert!(json.contains("\"charts_registered\":true"));
    }
}
