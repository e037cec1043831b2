//! Task Status Polling
//!
//! The submit-then-poll half of the protocol: after a task is accepted,
//! its status is queried repeatedly until any non-`pending` status comes
//! back. Polling is indefinite - no attempt cap, no backoff - and the
//! timeout that ends a long job is the service's, not ours.
//!
//! # Design Philosophy
//!
//! At most one status query is in flight at any time: the next query is
//! scheduled only after the previous response is observed, with a fixed
//! sleep in between. A query that never reaches the service does not end
//! the loop with an `Err`; it resolves it with a synthetic terminal
//! snapshot carrying `{status: error, message: "Failed to connect to
//! server"}`. That snapshot is indistinguishable from a genuine
//! server-reported error - a long-standing ambiguity in the protocol that
//! is kept and pinned by tests rather than fixed.
//!
//! Cancellation does not exist at this layer. The [`crate::Runner`] wraps
//! the loop with a generation counter and discards stale resolutions.

use std::time::Duration;

use crate::service::ExecutionService;
use crate::tasks::{StatusSnapshot, TaskId};

/// Default delay between status queries
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Poll loop state
///
/// The machine has exactly one transition: `Polling` to `Resolved`, taken
/// on the first non-`pending` response (synthetic connection-failure
/// snapshots included). There is no way back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollState {
    /// Queries are still being issued
    Polling,
    /// A terminal snapshot has been observed; no further queries
    Resolved,
}

/// Incremental poll driver for one task
///
/// [`Poller::tick`] exposes every response - pending ones included - so an
/// orchestrator can surface progress and check for cancellation between
/// queries. Callers that only want the terminal snapshot use
/// [`poll_for_results`].
pub struct Poller<'a, S: ExecutionService + ?Sized> {
    service: &'a S,
    id: &'a TaskId,
    interval: Duration,
    state: PollState,
    queries_issued: u32,
}

impl<'a, S: ExecutionService + ?Sized> Poller<'a, S> {
    /// Create a poller for a task
    pub fn new(service: &'a S, id: &'a TaskId, interval: Duration) -> Self {
        Self {
            service,
            id,
            interval,
            state: PollState::Polling,
            queries_issued: 0,
        }
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> PollState {
        self.state
    }

    /// Whether a terminal snapshot has been observed
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.state == PollState::Resolved
    }

    /// Status queries issued so far
    #[must_use]
    pub fn queries_issued(&self) -> u32 {
        self.queries_issued
    }

    /// Issue the next status query and return its snapshot
    ///
    /// Every tick after the first sleeps the interval before querying, so
    /// the wait always starts after the previous response was observed.
    /// A transport failure is converted into the synthetic terminal error
    /// snapshot. Once resolved the poller must not be ticked again;
    /// polling stops strictly at the first terminal snapshot.
    pub async fn tick(&mut self) -> StatusSnapshot {
        debug_assert_eq!(self.state, PollState::Polling, "tick after resolution");

        if self.queries_issued > 0 {
            tokio::time::sleep(self.interval).await;
        }
        self.queries_issued += 1;

        let snapshot = match self.service.fetch_status(self.id).await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                tracing::warn!(task = %self.id, error = %err, "status query failed, resolving as error");
                StatusSnapshot::connection_failure()
            }
        };

        if snapshot.status.is_terminal() {
            self.state = PollState::Resolved;
            tracing::debug!(
                task = %self.id,
                status = %snapshot.status,
                queries = self.queries_issued,
                "poll resolved"
            );
        } else if let Some(elapsed) = snapshot.elapsed_seconds {
            tracing::debug!(task = %self.id, elapsed_seconds = elapsed, "task still pending");
        }

        snapshot
    }
}

/// Poll a task until it reaches a terminal status
///
/// Resolves only on a non-`pending` status and surfaces that snapshot
/// verbatim - `completed`, `timeout`, `error`, and any future status
/// string alike. Never fails: connection failures resolve as a terminal
/// error snapshot.
pub async fn poll_for_results<S: ExecutionService + ?Sized>(
    service: &S,
    id: &TaskId,
    interval: Duration,
) -> StatusSnapshot {
    let mut poller = Poller::new(service, id, interval);
    loop {
        let snapshot = poller.tick().await;
        if poller.is_resolved() {
            return snapshot;
        }
    }
}
