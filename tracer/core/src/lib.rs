//! Tracer Core - Headless Client for the Stepwise Execution Service
//!
//! This crate is the core of the stepwise tracer client: it submits source
//! snippets to a remote execution service, tracks the resulting job through
//! its pending and terminal states, and turns the service's recorded
//! execution trace (the "journal") into a renderable tree. It is completely
//! independent of any UI framework and can drive a TUI, web UI, native GUI,
//! or run headless for testing.
//!
//! # Architecture
//!
//! ```text
//!  source text
//!      │
//!      ▼
//! ┌──────────────┐   POST /api/submit    ┌─────────────────────┐
//! │   Runner     │ ────────────────────► │                     │
//! │              │      task id          │  Execution Service  │
//! │  generation  │ ◄──────────────────── │  (remote, out of    │
//! │  counter,    │                       │   process)          │
//! │  task slot   │   GET /api/result/id  │                     │
//! │              │ ─────── loop ───────► │                     │
//! └──────┬───────┘   terminal snapshot   └─────────────────────┘
//!        │
//!        ▼
//! ┌──────────────┐        ┌──────────────┐        ┌─────────────┐
//! │  Normalizer  │ ─────► │   Renderer   │ ─────► │ UI surface  │
//! │ (any raw     │Journal │ (kind table, │Display │ (not this   │
//! │  payload →   │        │  dump        │ Tree   │  crate)     │
//! │  one shape)  │        │  fallback)   │        │             │
//! └──────────────┘        └──────────────┘        └─────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`Runner`]: Orchestrates one run end to end and owns the current-task slot
//! - [`ExecutionService`]: Trait over the remote service, the seam tests mock
//! - [`Journal`]: The canonical execution trace for one completed task
//! - [`DisplayTree`]: The renderer's UI-neutral output
//! - [`RunUpdate`]: Messages sent from the core to a UI surface
//!
//! # Design Philosophy
//!
//! Two functions in this crate are total by contract and the rest of the
//! design leans on that: [`normalize_journal`] accepts any string and always
//! produces a valid [`Journal`], and [`render_journal`] accepts any journal
//! and always produces a [`DisplayTree`]. Malformed payloads become
//! synthetic error events; unknown event kinds render through a structural
//! dump. Nothing in this core is fatal to the process.
//!
//! The poll loop is deliberately simple: one status query in flight at a
//! time, a fixed sleep after each response, and any non-`pending` status is
//! terminal. Cancellation lives one level up - every submission bumps the
//! [`Runner`]'s generation counter, and a poll response from a stale
//! generation is discarded instead of overwriting newer state.
//!
//! # Quick Start
//!
//! ```ignore
//! use tracer_core::{HttpExecutionService, Runner, RunnerConfig, RunOutcome};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = RunnerConfig::default();
//!     let service = HttpExecutionService::new(&config.base_url, config.request_timeout());
//!     let (runner, mut rx) = Runner::new(service, config);
//!
//!     // Drive a run; rx receives Submitted/Progress/Resolved updates.
//!     match runner.run("print(1)", false).await {
//!         Ok(RunOutcome::Resolved(run)) => {
//!             if let Some(display) = &run.display {
//!                 println!("{}", display.to_text());
//!             }
//!         }
//!         Ok(RunOutcome::Superseded) => {}
//!         Err(e) => eprintln!("failed to submit: {e}"),
//!     }
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`config`]: Runner configuration and TOML file loading
//! - [`error`]: Typed submission error taxonomy
//! - [`journal`]: Journal data model, normalization, and rendering
//! - [`messages`]: Updates sent from the core to UI surfaces
//! - [`poller`]: The submit-then-poll status loop
//! - [`runner`]: Run orchestration, generation counter, current-task slot
//! - [`service`]: Execution service trait and the HTTP implementation
//! - [`tasks`]: Task identifiers, statuses, and status snapshots
//!
//! # No UI Dependencies
//!
//! This crate has **zero** dependencies on any UI framework. It's pure
//! protocol and data-model logic that can be used anywhere.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod journal;
pub mod messages;
pub mod poller;
pub mod runner;
pub mod service;
pub mod tasks;

// Re-exports for convenience
pub use config::{ConfigError, RunnerConfig};
pub use error::SubmitError;
pub use journal::{
    count_events, normalize_journal, normalize_value, render_journal, DisplayNode, DisplayTree,
    EventKind, Journal, JournalEvent, JournalMetadata,
};
pub use messages::{ResolvedRun, RunOutcome, RunUpdate};
pub use poller::{poll_for_results, PollState, Poller, DEFAULT_POLL_INTERVAL};
pub use runner::Runner;
pub use service::{ExecutionService, HttpExecutionService, ServiceStatus};
pub use tasks::{StatusSnapshot, Task, TaskId, TaskStatus};
