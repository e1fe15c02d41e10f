//! Per-lab input/output snapshots.
//!
//! One `LabSnapshot` exists per catalog entry at all times (absent storage
//! entries become empty snapshots). `update_input` never touches the output,
//! `clear_output` never touches the input, and every mutation is written
//! through to storage so snapshots survive restarts.
//!
//! The data layer does not prevent overlapping calculations; the UI disables
//! submission while the task state is `Calculating`.

use super::{AppInner, NmlApp};
use crate::error::ClientError;
use crate::lab::Lab;
use crate::state::server::ServerTaskState;
use log::{error, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

/// Flat key/value mapping submitted to a lab endpoint.
pub type LabInput = Map<String, Value>;

/// Structured remote-call failure stored in place of a normal output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputError {
    pub status: u16,
    #[serde(rename = "statusText")]
    pub status_text: String,
    pub detail: Value,
}

/// Result of a calculation: either the server payload or a captured error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LabOutput {
    Error { error: OutputError },
    Result(Map<String, Value>),
}

impl LabOutput {
    pub fn is_error(&self) -> bool {
        matches!(self, LabOutput::Error { .. })
    }
}

/// Persisted {input, output} pair for one lab.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabSnapshot {
    pub input: Option<LabInput>,
    pub output: Option<LabOutput>,
}

/// Request-shaping options supplied by matrix-style forms.
#[derive(Debug, Clone, Default)]
pub struct CalculateOptions {
    /// JSON-encode non-scalar values (matrices, vectors) as query parameters.
    pub json: bool,
    /// Input keys excluded from the request (e.g. client-only size fields).
    pub skip_keys: Vec<&'static str>,
}

impl AppInner {
    /// Returns a copy of the lab's current snapshot.
    pub fn lab_snapshot(&self, lab_id: &str) -> LabSnapshot {
        self.labs.get(lab_id).cloned().unwrap_or_default()
    }

    /// Replaces the lab's input, keeping the output, and persists.
    pub fn update_input(&mut self, lab: &Lab, input: LabInput) {
        let snapshot = self.labs.entry(lab.client_url.to_string()).or_default();
        snapshot.input = Some(input);
        self.persist_snapshot(lab.client_url);
    }

    /// Nulls the lab's output, keeping the input, and persists.
    pub fn clear_output(&mut self, lab: &Lab) {
        let snapshot = self.labs.entry(lab.client_url.to_string()).or_default();
        snapshot.output = None;
        self.persist_snapshot(lab.client_url);
    }

    /// Records the outcome of a calculation and returns to `Idle`.
    ///
    /// Success payloads are stored as-is; failures become a structured
    /// `OutputError` in place of the output.
    pub fn apply_calculate_result(
        &mut self,
        lab_id: &str,
        result: Result<LabOutput, ClientError>,
    ) {
        self.update_task_state(ServerTaskState::Idle);

        let output = match result {
            Ok(output) => output,
            Err(ClientError::Api {
                status,
                status_text,
                detail,
            }) => LabOutput::Error {
                error: OutputError {
                    status,
                    status_text,
                    detail,
                },
            },
            Err(e) => {
                // Transport-level failure: no HTTP status to report.
                LabOutput::Error {
                    error: OutputError {
                        status: 0,
                        status_text: "Unknown Error".to_string(),
                        detail: Value::String(e.to_string()),
                    },
                }
            }
        };

        let snapshot = self.labs.entry(lab_id.to_string()).or_default();
        snapshot.output = Some(output);
        self.persist_snapshot(lab_id);
    }

    fn persist_snapshot(&mut self, lab_id: &str) {
        let Some(snapshot) = self.labs.get(lab_id).cloned() else {
            return;
        };
        if let Err(e) = self.storage.set_json(&format!("lab-{lab_id}"), &snapshot) {
            warn!("Failed to persist snapshot for '{}': {}", lab_id, e);
        }
    }
}

impl NmlApp {
    /// Submits the lab's current input to the server.
    ///
    /// No-op when no input has been recorded. The configured pacing delay is
    /// applied to success and error paths alike so perceived latency does not
    /// depend on how fast the call failed.
    pub fn calculate(&self, lab: &'static Lab, options: CalculateOptions) {
        let (input, api_url, http, delay) = self.with_inner(|inner| {
            (
                inner.lab_snapshot(lab.client_url).input,
                inner.server.api_url.clone(),
                inner.http.clone(),
                inner.config.server.calculation_delay_ms,
            )
        });

        let Some(input) = input else {
            return;
        };
        let Some(api_url) = api_url else {
            error!("Calculate dispatched with no API URL set");
            return;
        };

        self.with_inner(|inner| inner.update_task_state(ServerTaskState::Calculating));

        let app = self.clone();
        self.runtime().spawn(async move {
            let result = http.calculate_lab(&api_url, lab, &input, &options).await;
            tokio::time::sleep(Duration::from_millis(delay)).await;
            app.with_inner(|inner| inner.apply_calculate_result(lab.client_url, result));
        });
    }
}
