//! Time-windowed duplicate suppression.
//!
//! Several game clients can write the same physical chat log, so one event may
//! appear more than once a few milliseconds apart. Lines are keyed by their
//! content (the text after the timestamp) and compared against a bounded
//! history of recently accepted lines.

use std::collections::VecDeque;

use chrono::Timelike;
use waksense_types::{DedupSettings, DedupStats};

use super::parser::split_timestamp;

#[derive(Debug, Clone, PartialEq, Eq)]
struct DedupEntry {
    timestamp_ms: i64,
    content: String,
}

pub struct DuplicateSuppressor {
    window_ms: i64,
    capacity: usize,
    enabled: bool,
    history: VecDeque<DedupEntry>,
    total_messages: u64,
    duplicates_detected: u64,
}

impl Default for DuplicateSuppressor {
    fn default() -> Self {
        Self::new(DedupSettings::default())
    }
}

impl DuplicateSuppressor {
    pub fn new(settings: DedupSettings) -> Self {
        let capacity = settings.capacity.max(1);
        Self {
            window_ms: settings.window_ms.max(0),
            capacity,
            enabled: settings.enabled,
            history: VecDeque::with_capacity(capacity),
            total_messages: 0,
            duplicates_detected: 0,
        }
    }

    /// Decide whether a raw line is new information.
    ///
    /// Lines without a parseable `HH:MM:SS,mmm - ` prefix are always accepted.
    pub fn accept(&mut self, line: &str) -> bool {
        self.total_messages += 1;
        if !self.enabled {
            return true;
        }

        let Some((time, content)) = split_timestamp(line.trim()) else {
            return true;
        };
        let timestamp_ms = i64::from(time.num_seconds_from_midnight()) * 1000
            + i64::from(time.nanosecond() / 1_000_000);

        let duplicate = self.history.iter().any(|entry| {
            entry.content == content && (timestamp_ms - entry.timestamp_ms).abs() <= self.window_ms
        });
        if duplicate {
            self.duplicates_detected += 1;
            tracing::trace!(content, "duplicate line suppressed");
            return false;
        }

        self.history.push_back(DedupEntry {
            timestamp_ms,
            content: content.to_string(),
        });
        if self.history.len() > self.capacity {
            self.history.pop_front();
        }
        true
    }

    pub fn stats(&self) -> DedupStats {
        let duplicate_rate = if self.total_messages > 0 {
            self.duplicates_detected as f64 / self.total_messages as f64 * 100.0
        } else {
            0.0
        };
        DedupStats {
            total_messages: self.total_messages,
            duplicates_detected: self.duplicates_detected,
            messages_processed: self.history.len(),
            duplicate_window_ms: self.window_ms,
            duplicate_rate,
        }
    }

    /// Clear counters and history.
    pub fn reset_stats(&mut self) {
        self.total_messages = 0;
        self.duplicates_detected = 0;
        self.history.clear();
    }
}
