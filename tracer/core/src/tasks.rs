//! Remote Task Types
//!
//! Types for tracking one remote execution job from submission to its
//! terminal outcome. This module defines the data structures; the Runner
//! handles orchestration.
//!
//! # Design Philosophy
//!
//! Task identifiers are issued by the execution service and treated as
//! opaque strings — nothing here ever mints one locally. A task moves
//! forward only: `pending` into exactly one terminal status, after which
//! its result is consumed and the task is discarded. Unknown status
//! strings coming off the wire are preserved verbatim rather than coerced,
//! so a newer service can introduce outcomes without breaking older
//! clients: everything that is not `pending` ends the poll loop.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque task identifier issued by the execution service
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(pub String);

impl TaskId {
    /// Create a task ID from a server-issued string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of a remote task
///
/// `pending` is the only status that keeps a poll loop alive; every other
/// value — including strings this client has never seen — is terminal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    /// Queued or still executing on the service
    Pending,
    /// Finished; the response carries a journal payload
    Completed,
    /// The service gave up on the job
    Timeout,
    /// The service reported a failure (or the client failed to reach it)
    Error,
    /// A status string this client does not recognize, kept verbatim
    Other(String),
}

impl TaskStatus {
    /// Parse a wire status string
    ///
    /// Matching is exact: the service emits lowercase statuses, and anything
    /// unrecognized must survive untouched for the UI to show.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "pending" => Self::Pending,
            "completed" => Self::Completed,
            "timeout" => Self::Timeout,
            "error" => Self::Error,
            _ => Self::Other(s.to_string()),
        }
    }

    /// The wire representation
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Timeout => "timeout",
            Self::Error => "error",
            Self::Other(s) => s,
        }
    }

    /// Status icon (for UI display)
    #[must_use]
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Pending => "...",
            Self::Completed => "[+]",
            Self::Timeout => "[t]",
            Self::Error => "[!]",
            Self::Other(_) => "[?]",
        }
    }

    /// Human-readable label
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Pending => "Pending",
            Self::Completed => "Completed",
            Self::Timeout => "Timed out",
            Self::Error => "Error",
            Self::Other(s) => s,
        }
    }

    /// Whether this status ends polling
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Whether the task is still running on the service
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl From<String> for TaskStatus {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One response body from the result endpoint
///
/// Deserialization is lenient by design: every field except `status` may be
/// missing, and `result` is kept as raw JSON — the journal normalizer, not
/// serde, decides what shape it has.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Wire status
    pub status: TaskStatus,
    /// Journal-shaped payload, present on completed responses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Human-readable message, present on error and timeout responses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Seconds the job has been running, present while pending
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_seconds: Option<f64>,
}

impl StatusSnapshot {
    /// Snapshot synthesized when a poll query never reached the service
    ///
    /// Deliberately shaped like a server-reported error: callers cannot tell
    /// the two apart. See the crate docs for why this ambiguity is kept.
    #[must_use]
    pub fn connection_failure() -> Self {
        Self {
            status: TaskStatus::Error,
            result: None,
            message: Some("Failed to connect to server".to_string()),
            elapsed_seconds: None,
        }
    }
}

/// A submitted remote execution job
#[derive(Clone, Debug, PartialEq)]
pub struct Task {
    /// Server-issued identifier
    pub id: TaskId,
    /// Current status; moves forward only
    pub status: TaskStatus,
    /// Raw journal payload from the terminal response
    pub result: Option<Value>,
    /// Message from the terminal response
    pub message: Option<String>,
    /// When this client submitted the job
    pub submitted_at: DateTime<Utc>,
}

impl Task {
    /// Create a freshly submitted, pending task
    #[must_use]
    pub fn new(id: TaskId) -> Self {
        Self {
            id,
            status: TaskStatus::Pending,
            result: None,
            message: None,
            submitted_at: Utc::now(),
        }
    }

    /// Apply a terminal snapshot
    ///
    /// Pending snapshots are ignored: status never moves backwards.
    pub fn resolve(&mut self, snapshot: &StatusSnapshot) {
        if !snapshot.status.is_terminal() {
            return;
        }
        self.status = snapshot.status.clone();
        self.result = snapshot.result.clone();
        self.message = snapshot.message.clone();
    }
}
