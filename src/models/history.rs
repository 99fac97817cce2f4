//! Lookup history entries and the bounded-list rule.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A past lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub tracking_number: String,
    pub carrier_name: String,
    pub timestamp: DateTime<Utc>,
}

impl HistoryRecord {
    pub fn new(tracking_number: impl Into<String>, carrier_name: impl Into<String>) -> Self {
        Self {
            tracking_number: tracking_number.into(),
            carrier_name: carrier_name.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Insert `entry` at the front of `history`.
///
/// An existing entry with the same tracking number is replaced, so the list
/// stays unique and the newest lookup leads. Entries past `capacity` are
/// dropped from the back.
pub fn push_history(history: &mut Vec<HistoryRecord>, entry: HistoryRecord, capacity: usize) {
    history.retain(|r| r.tracking_number != entry.tracking_number);
    history.insert(0, entry);
    history.truncate(capacity);
}
