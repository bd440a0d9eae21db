//! Audit records kept by the command manager.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How notable an audited action is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Routine tag edits on a single picture
    Fine,
    /// Renames, moves and deletions
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Fine => write!(f, "FINE"),
            Severity::Info => write!(f, "INFO"),
        }
    }
}

/// One entry of the append-only audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    pub message: String,
}

impl AuditRecord {
    /// Create a record stamped with the current time.
    pub fn now(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            severity,
            message: message.into(),
        }
    }

    /// Same record, relabeled as the undo of the action.
    pub(crate) fn undone(severity: Severity, description: &str) -> Self {
        Self::now(severity, format!("Undo: {}", description))
    }

    /// Same record, relabeled as the redo of the action.
    pub(crate) fn redone(severity: Severity, description: &str) -> Self {
        Self::now(severity, format!("Redo: {}", description))
    }
}

impl fmt::Display for AuditRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.severity,
            self.message
        )
    }
}
