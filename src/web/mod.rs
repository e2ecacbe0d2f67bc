//! Embedded web dashboard.
//!
//! A lightweight HTTP server (sync, via `tiny_http`) that serves:
//! - The dashboard page for the current load state
//! - JSON endpoints for the load state, the mapped view, and retry
//!
//! Launched via `scrapedash serve` (default: `http://127.0.0.1:9747`).

mod api;

use std::io::Cursor;

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};
use tracing::{info, warn};

use crate::loader::ReportLoader;
use crate::render::{RenderContext, page};

/// Everything a request handler needs: the loader and the render context.
pub struct Dashboard {
    pub loader: ReportLoader,
    pub render: RenderContext,
}

impl Dashboard {
    pub fn new(loader: ReportLoader, render: RenderContext) -> Self {
        Self { loader, render }
    }
}

/// A transport-independent response.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
    /// Redirect target for 3xx replies.
    pub location: Option<String>,
}

impl Reply {
    pub fn html(status: u16, body: String) -> Self {
        Self {
            status,
            content_type: "text/html; charset=utf-8",
            body: body.into_bytes(),
            location: None,
        }
    }

    pub fn json(status: u16, body: String) -> Self {
        Self {
            status,
            content_type: "application/json; charset=utf-8",
            body: body.into_bytes(),
            location: None,
        }
    }

    pub fn redirect(to: &str) -> Self {
        Self {
            status: 303,
            content_type: "text/plain; charset=utf-8",
            body: Vec::new(),
            location: Some(to.to_string()),
        }
    }

    pub fn body_str(&self) -> &str {
        std::str::from_utf8(&self.body).unwrap_or("")
    }

    fn into_response(self) -> Response<Cursor<Vec<u8>>> {
        let mut resp = Response::from_data(self.body).with_status_code(StatusCode(self.status));
        if let Ok(h) = Header::from_bytes("Content-Type", self.content_type) {
            resp = resp.with_header(h);
        }
        if let Some(location) = self.location
            && let Ok(h) = Header::from_bytes("Location", location.as_bytes())
        {
            resp = resp.with_header(h);
        }
        resp
    }
}

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Mount the loader and serve the dashboard on `addr`.
///
/// Blocks the current thread. Requests are handled sequentially; an error in
/// one request becomes a JSON 500 without stopping the server.
pub fn serve(addr: &str, dashboard: &Dashboard, open: bool) -> Result<()> {
    let server = Server::http(addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    // Page and fetch start together; the page shows the placeholder until
    // the fetch lands.
    dashboard.loader.mount();

    info!(%addr, source = %dashboard.loader.source_description(), "dashboard running");
    println!("scrapedash dashboard running at http://{addr}");
    println!("Press Ctrl+C to stop.\n");

    if open {
        let url = format!("http://{addr}");
        if let Err(e) = open_browser(&url) {
            warn!(error = %e, "could not open browser");
        }
    }

    for request in server.incoming_requests() {
        handle(dashboard, request);
    }

    dashboard.loader.unmount();
    Ok(())
}

fn handle(dashboard: &Dashboard, request: Request) {
    let method = request.method().clone();
    let url = request.url().to_string();

    let reply = dispatch(dashboard, &method, &url).unwrap_or_else(|e| {
        let body = serde_json::json!({ "error": format!("{e:#}") }).to_string();
        Reply::json(500, body)
    });
    let status = reply.status;

    if let Err(e) = request.respond(reply.into_response()) {
        warn!(%method, %url, error = %e, "failed to send response");
    }

    info!(%method, %url, status, "request");
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Dispatch a request to the matching handler.
pub fn dispatch(dashboard: &Dashboard, method: &Method, url: &str) -> Result<Reply> {
    // Strip query string for path matching
    let path = url.split('?').next().unwrap_or(url);

    match (method, path) {
        // Page
        (&Method::Get, "/") | (&Method::Get, "/index.html") => serve_page(dashboard),
        (&Method::Post, "/reload") => {
            // Outcome is visible on the page either way
            let _ = api::retry(dashboard);
            Ok(Reply::redirect("/"))
        }

        // API
        (&Method::Get, "/api/state") => api::get_state(dashboard),
        (&Method::Get, "/api/view") => api::get_view(dashboard),
        (&Method::Post, "/api/reload") => api::post_reload(dashboard),
        (&Method::Get, "/api/health") => api::get_health(dashboard),

        _ => Ok(not_found()),
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn serve_page(dashboard: &Dashboard) -> Result<Reply> {
    let state = dashboard.loader.state();
    let html = page::render_page(&dashboard.render, &state).context("failed to render page")?;
    Ok(Reply::html(200, html))
}

fn not_found() -> Reply {
    Reply::json(404, r#"{"error": "not found"}"#.to_string())
}

/// Attempt to open a URL in the system default browser.
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    Ok(())
}
