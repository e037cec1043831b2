//! Execution Service Traits
//!
//! Trait definition for the remote execution service. This abstraction lets
//! the Runner and poll loop work against any transport - the HTTP client in
//! production, scripted mocks in tests - without changing core logic.
//!
//! # Design Philosophy
//!
//! The trait mirrors the service's three endpoints one to one. Errors are
//! `anyhow::Result` at this layer; the typed [`crate::SubmitError`]
//! taxonomy is applied at the Runner boundary, and poll-time failures are
//! absorbed by the poll loop itself.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::tasks::{StatusSnapshot, TaskId};

/// Load and health snapshot of the execution service
///
/// Mirrors the service's status endpoint. UIs use this to warn before
/// submitting to a saturated service; nothing in the core gates on it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServiceStatus {
    /// Jobs currently queued or running
    pub active_tasks: u32,
    /// Service host memory usage, percent
    pub memory_usage: f64,
    /// Service host CPU usage, percent
    pub cpu_usage: f64,
    /// Size of the service's worker pool
    pub max_workers: u32,
}

/// The remote execution service
///
/// Implement this trait to point the core at a different transport. The
/// contract per method is what the Runner and poll loop rely on; see each
/// method's docs.
#[async_trait]
pub trait ExecutionService: Send + Sync {
    /// Service name for logs (e.g. "stepwise-http")
    fn name(&self) -> &str;

    /// Submit source text for execution
    ///
    /// Exactly one network call, no retries. Success means the service
    /// accepted the job and issued an identifier; any failure - rejection,
    /// transport error, or a success response without an id - is an `Err`,
    /// and the caller must not start polling.
    async fn submit(&self, source: &str, debug: bool) -> anyhow::Result<TaskId>;

    /// Query the current status of a submitted task
    ///
    /// Returns whatever the service reports, pending or terminal. Transport
    /// failures are `Err`; the poll loop converts them into a synthetic
    /// terminal error snapshot rather than propagating.
    async fn fetch_status(&self, id: &TaskId) -> anyhow::Result<StatusSnapshot>;

    /// Probe the service's load
    async fn service_status(&self) -> anyhow::Result<ServiceStatus>;

    /// Check if the service is reachable
    async fn is_available(&self) -> bool {
        self.service_status().await.is_ok()
    }
}
