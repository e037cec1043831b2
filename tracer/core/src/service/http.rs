//! HTTP Execution Service Implementation
//!
//! Reqwest client for the stepwise execution service.
//!
//! # Service API
//!
//! - `POST /api/submit` - submit source text, returns a task id
//! - `GET /api/result/{task_id}` - query task status
//! - `GET /api/status` - service load probe
//!
//! Result responses are parsed from the body regardless of the HTTP status
//! code: the service reports unknown task ids as 404 with a regular
//! `{status, message}` body, and that body is the answer.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde_json::Value;

use super::traits::{ExecutionService, ServiceStatus};
use crate::error::SubmitError;
use crate::tasks::{StatusSnapshot, TaskId};

/// HTTP client for the execution service
#[derive(Clone)]
pub struct HttpExecutionService {
    /// Base URL, without a trailing slash
    base_url: String,
    /// HTTP client
    http_client: reqwest::Client,
}

impl HttpExecutionService {
    /// Create a new client against a base URL
    ///
    /// `timeout` applies per request; the poll loop issues many requests,
    /// each individually bounded by it.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    /// Get the submit endpoint URL
    fn submit_url(&self) -> String {
        format!("{}/api/submit", self.base_url)
    }

    /// Get the result endpoint URL for a task
    fn result_url(&self, id: &TaskId) -> String {
        format!("{}/api/result/{}", self.base_url, id)
    }

    /// Get the status endpoint URL
    fn status_url(&self) -> String {
        format!("{}/api/status", self.base_url)
    }
}

impl Default for HttpExecutionService {
    fn default() -> Self {
        Self::new("http://localhost:5000", Duration::from_secs(30))
    }
}

/// Extract the rejection message from a failure body
///
/// The service rejects with `{"status": "error", "message": ...}`; an
/// unparsable body falls back to the HTTP status line.
fn rejection_message(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("execution service returned {status}"))
}

#[async_trait]
impl ExecutionService for HttpExecutionService {
    fn name(&self) -> &str {
        "stepwise-http"
    }

    async fn submit(&self, source: &str, debug: bool) -> anyhow::Result<TaskId> {
        let body = serde_json::json!({
            "data": source,
            "is_debug": debug,
        });

        let response = self
            .http_client
            .post(self.submit_url())
            .json(&body)
            .send()
            .await
            .context("submit request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = rejection_message(status, &body);
            tracing::warn!(%status, %message, "submission rejected");
            return Err(SubmitError::Rejected { message }.into());
        }

        let data: Value = response
            .json()
            .await
            .context("submit response was not JSON")?;

        match data.get("task_id").and_then(Value::as_str) {
            Some(id) => {
                tracing::debug!(task = %id, "submission accepted");
                Ok(TaskId::new(id))
            }
            None => {
                tracing::warn!("submit response carried no task_id");
                Err(SubmitError::MissingTaskId.into())
            }
        }
    }

    async fn fetch_status(&self, id: &TaskId) -> anyhow::Result<StatusSnapshot> {
        let response = self
            .http_client
            .get(self.result_url(id))
            .send()
            .await
            .context("status query failed")?;

        // Terminal error bodies (unknown task id included) arrive with
        // non-2xx codes; the body is still the snapshot.
        let body = response
            .text()
            .await
            .context("status response had no body")?;
        let snapshot: StatusSnapshot =
            serde_json::from_str(&body).context("status response was not a snapshot")?;

        tracing::debug!(task = %id, status = %snapshot.status, "status query answered");
        Ok(snapshot)
    }

    async fn service_status(&self) -> anyhow::Result<ServiceStatus> {
        let response = self
            .http_client
            .get(self.status_url())
            .send()
            .await
            .context("service status query failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("execution service returned {status}: {body}");
        }

        let status: ServiceStatus = response
            .json()
            .await
            .context("service status response was not JSON")?;
        Ok(status)
    }
}
