//! Submission Error Taxonomy
//!
//! Typed errors for the submit boundary. Service internals speak
//! `anyhow::Result`; the [`crate::Runner`] converts whatever comes back
//! into one of these variants before it reaches a caller.
//!
//! Poll-time failures are deliberately absent here: a status query that
//! never reaches the service resolves the poll loop with a synthetic
//! terminal error snapshot instead of an `Err` (see [`crate::poller`]).

use thiserror::Error;

/// Why a submission did not yield a task identifier
///
/// Whatever the variant, the contract is the same: surface the failure to
/// the user, do not retry, and do not start polling.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The service answered with a non-success status and a reason
    /// (for example HTTP 503 when saturated).
    #[error("submission rejected: {message}")]
    Rejected {
        /// The service's `message` field, or a generic fallback
        message: String,
    },

    /// The service reported success but the response carried no `task_id`.
    #[error("submission accepted but no task id was returned")]
    MissingTaskId,

    /// The request never completed: connection failure, timeout, or an
    /// undecodable response body.
    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

impl SubmitError {
    /// Collapse a service-layer error into the typed taxonomy
    ///
    /// The HTTP implementation attaches `Rejected`/`MissingTaskId` to the
    /// `anyhow` chain it returns; anything else is a transport failure.
    #[must_use]
    pub fn from_service(err: anyhow::Error) -> Self {
        match err.downcast::<Self>() {
            Ok(typed) => typed,
            Err(other) => Self::Transport(other),
        }
    }
}
