//! Bounded log of events the router could not place.
//!
//! Unrecognized methods and events missing their (workspace, thread)
//! attribution land here instead of crashing the client. The buffer keeps
//! the most recent entries only.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

/// Default number of diagnostic entries retained.
const DEFAULT_CAPACITY: usize = 256;

/// One unrouted event, kept verbatim for debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticEntry {
    /// Method name as received
    pub method: String,
    /// Raw payload text
    pub payload: String,
    /// When the entry was recorded
    pub recorded_at: DateTime<Utc>,
}

/// Ring buffer of unrouted-event diagnostics.
#[derive(Debug)]
pub struct DiagnosticsLog {
    entries: VecDeque<DiagnosticEntry>,
    capacity: usize,
}

impl Default for DiagnosticsLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl DiagnosticsLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY)),
            capacity: capacity.max(1),
        }
    }

    /// Record one unrouted event, evicting the oldest entry when full.
    pub fn record(&mut self, method: impl Into<String>, payload: impl Into<String>) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(DiagnosticEntry {
            method: method.into(),
            payload: payload.into(),
            recorded_at: Utc::now(),
        });
    }

    pub fn entries(&self) -> impl Iterator<Item = &DiagnosticEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_read_back() {
        let mut log = DiagnosticsLog::default();
        log.record("odd_event", r#"{"x": 1}"#);
        assert_eq!(log.len(), 1);

        let entry = log.entries().next().unwrap();
        assert_eq!(entry.method, "odd_event");
        assert_eq!(entry.payload, r#"{"x": 1}"#);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut log = DiagnosticsLog::with_capacity(2);
        log.record("first", "{}");
        log.record("second", "{}");
        log.record("third", "{}");

        assert_eq!(log.len(), 2);
        let methods: Vec<_> = log.entries().map(|e| e.method.as_str()).collect();
        assert_eq!(methods, vec!["second", "third"]);
    }
}
