//! Load history aggregation for `scrapedash history`.

use super::load_log::{LoadEvent, LoadOutcome};

/// Aggregated view over recorded load events.
#[derive(Debug, Default, PartialEq)]
pub struct HistorySummary {
    pub total: usize,
    pub loaded: usize,
    pub failed: usize,
    pub cancelled: usize,
    /// Mean latency of successful loads, in milliseconds.
    pub avg_loaded_latency_ms: Option<u64>,
    /// Most recent failure reason, if any load ever failed.
    pub last_failure: Option<String>,
}

impl HistorySummary {
    /// Percentage of completed (non-cancelled) fetches that loaded.
    pub fn success_pct(&self) -> f64 {
        let completed = self.loaded + self.failed;
        if completed == 0 {
            0.0
        } else {
            (self.loaded as f64 / completed as f64) * 100.0
        }
    }
}

/// Summarise events (oldest first, as read from the log).
pub fn summarize(events: &[LoadEvent]) -> HistorySummary {
    let mut summary = HistorySummary {
        total: events.len(),
        ..HistorySummary::default()
    };

    let mut latency_sum = 0u64;
    for event in events {
        match event.outcome {
            LoadOutcome::Loaded => {
                summary.loaded += 1;
                latency_sum += event.latency_ms;
            }
            LoadOutcome::Failed => {
                summary.failed += 1;
                if let Some(reason) = &event.reason {
                    summary.last_failure = Some(reason.clone());
                }
            }
            LoadOutcome::Cancelled => summary.cancelled += 1,
        }
    }

    if summary.loaded > 0 {
        summary.avg_loaded_latency_ms = Some(latency_sum / summary.loaded as u64);
    }

    summary
}

/// The `limit` most recent events, newest first.
pub fn recent(events: &[LoadEvent], limit: usize) -> Vec<&LoadEvent> {
    events.iter().rev().take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(outcome: LoadOutcome, latency_ms: u64, reason: Option<&str>) -> LoadEvent {
        LoadEvent {
            timestamp: "2025-01-01T00:00:00Z".to_string(),
            source: "http://localhost/scrapedData.json".to_string(),
            outcome,
            latency_ms,
            reason: reason.map(str::to_string),
        }
    }

    #[test]
    fn empty_history() {
        let s = summarize(&[]);
        assert_eq!(s, HistorySummary::default());
        assert_eq!(s.success_pct(), 0.0);
    }

    #[test]
    fn counts_outcomes_and_latency() {
        let events = vec![
            event(LoadOutcome::Loaded, 100, None),
            event(LoadOutcome::Failed, 5, Some("server responded with HTTP 500")),
            event(LoadOutcome::Loaded, 300, None),
            event(LoadOutcome::Cancelled, 50, None),
            event(LoadOutcome::Failed, 7, Some("network error: refused")),
        ];
        let s = summarize(&events);
        assert_eq!(s.total, 5);
        assert_eq!((s.loaded, s.failed, s.cancelled), (2, 2, 1));
        assert_eq!(s.avg_loaded_latency_ms, Some(200));
        assert_eq!(s.last_failure.as_deref(), Some("network error: refused"));
        assert!((s.success_pct() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn recent_is_newest_first() {
        let events = vec![
            event(LoadOutcome::Loaded, 1, None),
            event(LoadOutcome::Loaded, 2, None),
            event(LoadOutcome::Loaded, 3, None),
        ];
        let latest: Vec<u64> = recent(&events, 2).iter().map(|e| e.latency_ms).collect();
        assert_eq!(latest, vec![3, 2]);
    }
}
