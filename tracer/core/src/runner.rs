//! Runner - Run Orchestration
//!
//! Ties the protocol together: submit, poll, normalize, render, publish.
//! One client session tracks at most one task; the Runner owns that
//! single current-task slot and the generation counter that keeps it
//! consistent.
//!
//! # Design Philosophy
//!
//! The Runner is UI-agnostic. Surfaces receive [`RunUpdate`]s over a
//! channel and render what they are told; callers that drive a run
//! directly get the same result back from [`Runner::run`].
//!
//! Every submission bumps the generation counter. A run compares its
//! generation with the current one after every await; once a newer
//! submission exists, the older run resolves [`RunOutcome::Superseded`]
//! and touches neither the slot nor the channel's terminal message. That
//! comparison is the only consistency discipline in the crate - late poll
//! responses can never overwrite newer state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc;

use crate::config::RunnerConfig;
use crate::error::SubmitError;
use crate::journal::{normalize_value, render_journal};
use crate::messages::{ResolvedRun, RunOutcome, RunUpdate};
use crate::poller::Poller;
use crate::service::ExecutionService;
use crate::tasks::{Task, TaskId};

/// Capacity of the update channel to the UI surface
const UPDATE_CHANNEL_CAPACITY: usize = 100;

/// Headless run orchestrator
///
/// All methods take `&self`; wrap the Runner in an [`Arc`] to drive runs
/// from one task while cancelling from another.
pub struct Runner<S: ExecutionService> {
    /// The remote service
    service: Arc<S>,
    /// Configuration
    config: RunnerConfig,
    /// Monotonically increasing run counter; the latest submission owns
    /// the shared state
    generation: AtomicU64,
    /// The single current-task slot visible to the UI
    current: RwLock<Option<Task>>,
    /// Channel to the UI surface
    tx: mpsc::Sender<RunUpdate>,
}

impl<S: ExecutionService> Runner<S> {
    /// Create a Runner and the update receiver for its UI surface
    pub fn new(service: S, config: RunnerConfig) -> (Self, mpsc::Receiver<RunUpdate>) {
        let (tx, rx) = mpsc::channel(UPDATE_CHANNEL_CAPACITY);
        let runner = Self {
            service: Arc::new(service),
            config,
            generation: AtomicU64::new(0),
            current: RwLock::new(None),
            tx,
        };
        (runner, rx)
    }

    /// The configuration this Runner was built with
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Snapshot of the current task, if any
    pub fn current_task(&self) -> Option<Task> {
        self.current.read().clone()
    }

    /// Invalidate any in-flight run
    ///
    /// Bumps the generation so still-running poll loops resolve
    /// [`RunOutcome::Superseded`], and clears the task slot.
    pub fn cancel_active(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *self.current.write() = None;
        tracing::debug!(generation, "active run cancelled");
    }

    /// Submit source text without polling for the result
    ///
    /// On failure no status query is ever issued; the caller surfaces the
    /// error and stops. Starting a submission invalidates any in-flight
    /// run, same as [`Runner::run`].
    pub async fn submit_task(&self, source: &str, debug: bool) -> Result<TaskId, SubmitError> {
        let generation = self.next_generation();
        self.submit_inner(generation, source, debug).await
    }

    /// Run source text end to end: submit, poll, normalize, render
    ///
    /// Emits `Submitted`, then `Progress` per pending response, then
    /// exactly one of `Resolved`/`Superseded` on the update channel. The
    /// terminal snapshot is surfaced verbatim; when it carries a result
    /// payload the normalized journal and its display tree ride along.
    pub async fn run(&self, source: &str, debug: bool) -> Result<RunOutcome, SubmitError> {
        let generation = self.next_generation();
        let task_id = self.submit_inner(generation, source, debug).await?;
        if self.is_stale(generation) {
            return self.supersede(generation).await;
        }

        let mut poller = Poller::new(
            self.service.as_ref(),
            &task_id,
            self.config.poll_interval(),
        );
        let snapshot = loop {
            let snapshot = poller.tick().await;
            if self.is_stale(generation) {
                return self.supersede(generation).await;
            }
            if poller.is_resolved() {
                break snapshot;
            }
            self.send(RunUpdate::Progress {
                generation,
                task_id: task_id.clone(),
                elapsed_seconds: snapshot.elapsed_seconds,
            })
            .await;
        };

        // This generation still owns the slot; apply the terminal state.
        {
            let mut slot = self.current.write();
            if let Some(task) = slot.as_mut() {
                if task.id == task_id {
                    task.resolve(&snapshot);
                }
            }
        }

        let (journal, display) = match &snapshot.result {
            Some(payload) => {
                let journal = normalize_value(payload);
                let display = render_journal(&journal);
                (Some(journal), Some(display))
            }
            None => (None, None),
        };

        tracing::info!(
            task = %task_id,
            status = %snapshot.status,
            generation,
            "run resolved"
        );
        let run = Box::new(ResolvedRun {
            task_id,
            snapshot,
            journal,
            display,
        });
        self.send(RunUpdate::Resolved {
            generation,
            run: run.clone(),
        })
        .await;
        Ok(RunOutcome::Resolved(run))
    }

    /// Bump and return the new current generation
    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Whether a newer generation has started since `generation`
    fn is_stale(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != generation
    }

    async fn supersede(&self, generation: u64) -> Result<RunOutcome, SubmitError> {
        tracing::debug!(generation, "run superseded, result discarded");
        self.send(RunUpdate::Superseded { generation }).await;
        Ok(RunOutcome::Superseded)
    }

    async fn submit_inner(
        &self,
        generation: u64,
        source: &str,
        debug: bool,
    ) -> Result<TaskId, SubmitError> {
        match self.service.submit(source, debug).await {
            Ok(task_id) => {
                if !self.is_stale(generation) {
                    *self.current.write() = Some(Task::new(task_id.clone()));
                }
                self.send(RunUpdate::Submitted {
                    generation,
                    task_id: task_id.clone(),
                })
                .await;
                Ok(task_id)
            }
            Err(err) => {
                let err = SubmitError::from_service(err);
                tracing::warn!(error = %err, "submission failed, no polling started");
                self.send(RunUpdate::SubmitFailed {
                    generation,
                    message: err.to_string(),
                })
                .await;
                Err(err)
            }
        }
    }

    async fn send(&self, update: RunUpdate) {
        // A closed or full channel means no surface is listening; the run
        // itself still completes.
        if self.tx.send(update).await.is_err() {
            tracing::debug!("update channel closed, surface detached");
        }
    }
}
