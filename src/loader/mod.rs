//! Report loading and the dashboard load-state machine.
//!
//! The dashboard is always in exactly one [`LoadState`]:
//!
//! ```text
//!            data_arrived
//!  Loading ───────────────▶ Loaded
//!     │  ▲
//!     │  │ retry (explicit only)
//!     ▼  │
//!    Failed
//!          fetch_failed
//! ```
//!
//! `Loaded` is terminal. Nothing retries on its own: a failed load stays
//! failed until someone calls [`ReportLoader::retry`].
//!
//! [`ReportLoader`] owns the shared state. Mounting issues a single fetch on
//! a background thread; unmounting cancels delivery so a late response never
//! writes the state.

pub mod source;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::analytics::load_log::{EventLog, LoadOutcome};
use crate::report::Report;

pub use source::{DEFAULT_REPORT_PATH, FileSource, HttpSource, ReportSource, source_from_target};

// ---------------------------------------------------------------------------
// Failures and transition errors
// ---------------------------------------------------------------------------

/// Why a report could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadFailure {
    /// Connection refused, DNS failure, timeout, truncated body.
    #[error("network error: {0}")]
    Transport(String),
    /// The server answered with a non-2xx status.
    #[error("server responded with HTTP {0}")]
    Status(u16),
    /// The body was not a valid report (bad JSON or a missing field).
    #[error("malformed report: {0}")]
    Malformed(String),
    /// Reading a local report file failed.
    #[error("could not read report: {0}")]
    Io(String),
}

/// Event driving a [`LoadState`] transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateEvent {
    DataArrived,
    FetchFailed,
    Retry,
}

impl fmt::Display for StateEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DataArrived => write!(f, "data-arrived"),
            Self::FetchFailed => write!(f, "fetch-failed"),
            Self::Retry => write!(f, "retry"),
        }
    }
}

/// An event arrived in a state that does not accept it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot apply {event} while {from}")]
pub struct TransitionError {
    pub from: &'static str,
    pub event: StateEvent,
}

// ---------------------------------------------------------------------------
// Load state
// ---------------------------------------------------------------------------

/// Observable state of the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Loading,
    Loaded(Arc<Report>),
    Failed(LoadFailure),
}

impl LoadState {
    /// Lowercase state name, as exposed by the state API.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Loaded(_) => "loaded",
            Self::Failed(_) => "failed",
        }
    }

    pub fn report(&self) -> Option<&Report> {
        match self {
            Self::Loaded(report) => Some(report),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&LoadFailure> {
        match self {
            Self::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    /// `Loading → Loaded`.
    pub fn data_arrived(&mut self, report: Report) -> Result<(), TransitionError> {
        self.expect_loading(StateEvent::DataArrived)?;
        *self = Self::Loaded(Arc::new(report));
        Ok(())
    }

    /// `Loading → Failed`.
    pub fn fetch_failed(&mut self, failure: LoadFailure) -> Result<(), TransitionError> {
        self.expect_loading(StateEvent::FetchFailed)?;
        *self = Self::Failed(failure);
        Ok(())
    }

    /// `Failed → Loading`.
    pub fn retry(&mut self) -> Result<(), TransitionError> {
        match self {
            Self::Failed(_) => {
                *self = Self::Loading;
                Ok(())
            }
            other => Err(TransitionError {
                from: other.name(),
                event: StateEvent::Retry,
            }),
        }
    }

    fn expect_loading(&self, event: StateEvent) -> Result<(), TransitionError> {
        match self {
            Self::Loading => Ok(()),
            other => Err(TransitionError {
                from: other.name(),
                event,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Loader
// ---------------------------------------------------------------------------

/// Cloneable handle to the shared load state and its source.
#[derive(Clone)]
pub struct ReportLoader {
    inner: Arc<Inner>,
}

struct Inner {
    source: Box<dyn ReportSource>,
    state: Mutex<LoadState>,
    mounted: AtomicBool,
    cancelled: AtomicBool,
    events: Option<EventLog>,
}

impl ReportLoader {
    /// Create a loader in the `Loading` state. No fetch is issued until
    /// [`mount`](Self::mount) or [`load_blocking`](Self::load_blocking).
    pub fn new(source: Box<dyn ReportSource>) -> Self {
        Self::with_event_log(source, None)
    }

    /// Create a loader that records every completed fetch to `events`.
    pub fn with_event_log(source: Box<dyn ReportSource>, events: Option<EventLog>) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                state: Mutex::new(LoadState::Loading),
                mounted: AtomicBool::new(false),
                cancelled: AtomicBool::new(false),
                events,
            }),
        }
    }

    /// Issue the initial fetch on a background thread.
    ///
    /// Only the first call issues a fetch; later calls return `None`.
    pub fn mount(&self) -> Option<JoinHandle<()>> {
        if self.inner.mounted.swap(true, Ordering::SeqCst) {
            return None;
        }
        Some(self.spawn_fetch())
    }

    /// Issue the initial fetch on the current thread and return the
    /// resulting state. If the loader was already mounted, returns the
    /// current state without fetching again.
    pub fn load_blocking(&self) -> LoadState {
        if !self.inner.mounted.swap(true, Ordering::SeqCst) {
            self.inner.run_fetch();
        }
        self.state()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> LoadState {
        self.inner.lock().clone()
    }

    /// Explicitly retry a failed load: `Failed → Loading`, then one new
    /// fetch on a background thread.
    pub fn retry(&self) -> Result<JoinHandle<()>, TransitionError> {
        if self.is_unmounted() {
            return Err(TransitionError {
                from: "unmounted",
                event: StateEvent::Retry,
            });
        }
        self.inner.lock().retry()?;
        info!(source = %self.inner.source.describe(), "retrying report load");
        Ok(self.spawn_fetch())
    }

    /// Cancel delivery of any pending fetch. The state is left as-is.
    pub fn unmount(&self) {
        let _state = self.inner.lock();
        self.inner.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_unmounted(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Description of the configured source.
    pub fn source_description(&self) -> String {
        self.inner.source.describe()
    }

    fn spawn_fetch(&self) -> JoinHandle<()> {
        let inner = Arc::clone(&self.inner);
        thread::spawn(move || inner.run_fetch())
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, LoadState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn run_fetch(&self) {
        let source = self.source.describe();
        debug!(%source, "fetching report");

        let started = Instant::now();
        let result = self.source.fetch();
        let latency_ms = started.elapsed().as_millis() as u64;

        // Checked under the lock so an unmount cannot slip in before the write
        let mut state = self.lock();
        if self.cancelled.load(Ordering::SeqCst) {
            drop(state);
            debug!(%source, "loader unmounted, discarding fetch result");
            self.record(&source, LoadOutcome::Cancelled, latency_ms, None);
            return;
        }

        match result {
            Ok(report) => {
                for (field, value) in report.out_of_range_scores() {
                    warn!(field, value, "lighthouse score outside 0-100");
                }
                let title = report.page_title.clone();
                match state.data_arrived(report) {
                    Ok(()) => {
                        info!(%source, latency_ms, page_title = %title, "report loaded");
                        drop(state);
                        self.record(&source, LoadOutcome::Loaded, latency_ms, None);
                    }
                    Err(e) => warn!(%source, error = %e, "dropping fetch result"),
                }
            }
            Err(failure) => {
                let reason = failure.to_string();
                match state.fetch_failed(failure) {
                    Ok(()) => {
                        warn!(%source, latency_ms, %reason, "report load failed");
                        drop(state);
                        self.record(&source, LoadOutcome::Failed, latency_ms, Some(reason));
                    }
                    Err(e) => warn!(%source, error = %e, "dropping fetch failure"),
                }
            }
        }
    }

    fn record(&self, source: &str, outcome: LoadOutcome, latency_ms: u64, reason: Option<String>) {
        if let Some(log) = &self.events {
            log.record(source, outcome, latency_ms, reason);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> Report {
        Report::from_json(
            r#"{
                "pageTitle": "T",
                "elementCounts": {"links": 1, "buttons": 1, "paragraphs": 1, "images": 1},
                "lighthouseReport": {
                    "performance": 1, "accessibility": 1, "bestPractices": 1, "seo": 1,
                    "screenshotData": ""
                }
            }"#,
        )
        .unwrap()
    }

    /// Unmounts its own loader in the middle of the fetch, just before the
    /// result would be written.
    struct UnmountingSource {
        loader: Arc<std::sync::OnceLock<ReportLoader>>,
    }

    impl ReportSource for UnmountingSource {
        fn describe(&self) -> String {
            "unmounting".to_string()
        }

        fn fetch(&self) -> Result<Report, LoadFailure> {
            if let Some(loader) = self.loader.get() {
                loader.unmount();
            }
            Ok(sample_report())
        }
    }

    #[test]
    fn unmount_during_fetch_leaves_state_untouched() {
        let slot = Arc::new(std::sync::OnceLock::new());
        let loader = ReportLoader::new(Box::new(UnmountingSource {
            loader: Arc::clone(&slot),
        }));
        let _ = slot.set(loader.clone());

        let state = loader.load_blocking();
        assert_eq!(state, LoadState::Loading);
        assert!(loader.is_unmounted());
    }

    #[test]
    fn loading_accepts_data() {
        let mut state = LoadState::Loading;
        state.data_arrived(sample_report()).unwrap();
        assert_eq!(state.name(), "loaded");
        assert_eq!(state.report().unwrap().page_title, "T");
    }

    #[test]
    fn loaded_is_terminal() {
        let mut state = LoadState::Loading;
        state.data_arrived(sample_report()).unwrap();

        let err = state.data_arrived(sample_report()).unwrap_err();
        assert_eq!(err.from, "loaded");
        assert_eq!(err.event, StateEvent::DataArrived);

        assert!(state.fetch_failed(LoadFailure::Status(500)).is_err());
        assert!(state.retry().is_err());
        assert_eq!(state.name(), "loaded");
    }

    #[test]
    fn failed_only_leaves_via_retry() {
        let mut state = LoadState::Loading;
        state.fetch_failed(LoadFailure::Status(404)).unwrap();
        assert_eq!(state.failure(), Some(&LoadFailure::Status(404)));

        assert!(state.data_arrived(sample_report()).is_err());
        state.retry().unwrap();
        assert_eq!(state, LoadState::Loading);
    }

    #[test]
    fn retry_rejected_while_loading() {
        let mut state = LoadState::Loading;
        let err = state.retry().unwrap_err();
        assert_eq!(err.to_string(), "cannot apply retry while loading");
    }

    #[test]
    fn failure_messages() {
        assert_eq!(
            LoadFailure::Status(404).to_string(),
            "server responded with HTTP 404"
        );
        assert!(
            LoadFailure::Malformed("missing field `seo`".into())
                .to_string()
                .starts_with("malformed report")
        );
    }
}
