//! Execution Service Abstraction
//!
//! The seam between this crate and the remote execution service. The
//! [`ExecutionService`] trait defines the three calls the core makes
//! (submit, status query, load probe); [`HttpExecutionService`] is the
//! production implementation, and tests substitute mocks.

pub mod http;
pub mod traits;

pub use http::HttpExecutionService;
pub use traits::{ExecutionService, ServiceStatus};
