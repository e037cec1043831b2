//! Runner Updates
//!
//! Messages sent from the core to UI surfaces. These represent everything
//! a surface needs to follow a run: submission outcome, per-poll progress,
//! and exactly one terminal message per run.
//!
//! # Design Philosophy
//!
//! Surfaces are pure renderers. The core decides when a run is over and
//! what its result looks like; the surface just displays what it is told.
//! Every update carries the generation it was issued under, so a surface
//! can apply the same staleness rule the Runner does: updates from a
//! generation older than the latest `Submitted` belong to a superseded
//! run.
//!
//! Updates travel over an in-process channel and carry the normalized
//! journal and display tree directly, so the enum is not serialized.

use crate::journal::{DisplayTree, Journal};
use crate::tasks::{StatusSnapshot, TaskId};

/// Everything produced by a run that reached its terminal status
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedRun {
    /// The task this run tracked
    pub task_id: TaskId,
    /// The terminal response, verbatim
    pub snapshot: StatusSnapshot,
    /// Normalized journal, when the terminal response carried a payload
    pub journal: Option<Journal>,
    /// Rendered display tree for `journal`
    pub display: Option<DisplayTree>,
}

/// Outcome of one [`crate::Runner::run`] call
#[derive(Clone, Debug, PartialEq)]
pub enum RunOutcome {
    /// The run reached its terminal status and owns the current-task slot
    Resolved(Box<ResolvedRun>),
    /// A newer submission started before this run resolved; its result
    /// was discarded and nothing was applied to shared state
    Superseded,
}

/// Updates from the core to a UI surface
///
/// Per run the sequence is: `Submitted` (or `SubmitFailed`, which ends the
/// run), zero or more `Progress`, then exactly one of `Resolved` or
/// `Superseded`.
#[derive(Clone, Debug, PartialEq)]
pub enum RunUpdate {
    // ============================================
    // Submission
    // ============================================
    /// The service accepted the job and polling is about to start
    Submitted {
        /// Generation this run was issued under
        generation: u64,
        /// Server-issued task identifier
        task_id: TaskId,
    },

    /// Submission failed; no polling was started
    SubmitFailed {
        /// Generation this run was issued under
        generation: u64,
        /// Human-readable failure description
        message: String,
    },

    // ============================================
    // Polling
    // ============================================
    /// The task is still pending on the service
    Progress {
        /// Generation this run was issued under
        generation: u64,
        /// Task being polled
        task_id: TaskId,
        /// Seconds the job has been running, when the service reports it
        elapsed_seconds: Option<f64>,
    },

    // ============================================
    // Terminal
    // ============================================
    /// The run resolved and its result was applied
    Resolved {
        /// Generation this run was issued under
        generation: u64,
        /// The full result
        run: Box<ResolvedRun>,
    },

    /// The run was invalidated by a newer submission
    Superseded {
        /// Generation of the discarded run
        generation: u64,
    },
}

impl RunUpdate {
    /// The generation this update was issued under
    #[must_use]
    pub fn generation(&self) -> u64 {
        match self {
            Self::Submitted { generation, .. }
            | Self::SubmitFailed { generation, .. }
            | Self::Progress { generation, .. }
            | Self::Resolved { generation, .. }
            | Self::Superseded { generation } => *generation,
        }
    }

    /// Whether this update ends its run
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::SubmitFailed { .. } | Self::Resolved { .. } | Self::Superseded { .. }
        )
    }
}
