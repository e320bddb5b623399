//! Outcome record of one script-manager phase.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Success,
    Error,
    Skipped,
}

/// A single line of progress reported while processing a script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEntry {
    pub status: EntryStatus,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Ordered entries produced by a validation or automatic run.
///
/// The run is successful iff no entry has [`EntryStatus::Error`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    entries: Vec<ProgressEntry>,
}

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entry(&mut self, status: EntryStatus, message: impl Into<String>) {
        self.entries.push(ProgressEntry {
            status,
            message: message.into(),
            timestamp: Utc::now(),
        });
    }

    pub fn success(mut self, message: impl Into<String>) -> Self {
        self.add_entry(EntryStatus::Success, message);
        self
    }

    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.add_entry(EntryStatus::Error, message);
        self
    }

    pub fn is_success(&self) -> bool {
        self.entries.iter().all(|e| e.status != EntryStatus::Error)
    }

    pub fn entries(&self) -> &[ProgressEntry] {
        &self.entries
    }

    /// Message of the first error entry, if any.
    pub fn first_error(&self) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.status == EntryStatus::Error)
            .map(|e| e.message.as_str())
    }
}
