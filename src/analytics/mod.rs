//! Load analytics: the JSONL event log and its aggregation.

pub mod history;
pub mod load_log;
