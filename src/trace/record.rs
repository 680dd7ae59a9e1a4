use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::hooks::{dump_args, HookValue};

/// One observed hook firing. Immutable once captured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceRecord {
    pub action: String,
    /// Seconds since the Unix epoch, microsecond resolution.
    pub timestamp: f64,
    /// Dump of the argument list, rendered at capture time.
    pub arguments: String,
    pub arg_count: usize,
}

impl TraceRecord {
    pub fn capture(action: &str, args: &[HookValue]) -> Self {
        Self::capture_at(action, args, Utc::now())
    }

    pub fn capture_at(action: &str, args: &[HookValue], at: DateTime<Utc>) -> Self {
        Self {
            action: action.to_string(),
            timestamp: epoch_seconds(at),
            arguments: dump_args(args),
            arg_count: args.len(),
        }
    }
}

fn epoch_seconds(at: DateTime<Utc>) -> f64 {
    at.timestamp() as f64 + f64::from(at.timestamp_subsec_micros()) / 1_000_000.0
}

/// Insertion-ordered, append-only list of records for one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraceList {
    records: Vec<TraceRecord>,
}

impl TraceList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: TraceRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TraceRecord> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[TraceRecord] {
        &self.records
    }
}

impl<'a> IntoIterator for &'a TraceList {
    type Item = &'a TraceRecord;
    type IntoIter = std::slice::Iter<'a, TraceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
