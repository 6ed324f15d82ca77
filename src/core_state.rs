//! Shared application state managed by Tauri.
//!
//! `CoreState` owns the single [`WorkflowState`] behind a `Mutex` and is the
//! only place it is mutated. Command handlers call the operations here and
//! hand the resulting [`WorkflowSnapshot`] back to the frontend; nothing
//! reads or writes the workflow ad hoc.

use std::sync::Mutex;

use thiserror::Error;

use crate::remote::{GeneratorClient, ProcessSuccess, RemoteError};
use crate::workflow::{self, SelectedFile, WorkflowSnapshot, WorkflowState};

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Internal state lock poisoned")]
    LockPoisoned,
}

/// Everything the submission request needs, cloned out of the store so the
/// HTTP call runs without holding the lock.
#[derive(Debug, Clone)]
pub struct SubmissionPayload {
    pub file: SelectedFile,
    pub disease_name: String,
    pub source_url: String,
}

/// Global application state. Wrapped in `Arc` at startup and shared with
/// every command handler via `tauri::State`.
pub struct CoreState {
    workflow: Mutex<WorkflowState>,
}

impl CoreState {
    pub fn new() -> Self {
        Self {
            workflow: Mutex::new(WorkflowState::new()),
        }
    }

    fn with_workflow<T>(
        &self,
        f: impl FnOnce(&mut WorkflowState) -> T,
    ) -> Result<T, CoreError> {
        let mut guard = self.workflow.lock().map_err(|_| CoreError::LockPoisoned)?;
        Ok(f(&mut guard))
    }

    /// Read the full snapshot for the frontend.
    pub fn snapshot(&self) -> Result<WorkflowSnapshot, CoreError> {
        self.with_workflow(|w| w.snapshot())
    }

    /// Offer a picked file to the store.
    ///
    /// Acceptable files are stored and confirmed in the status line.
    /// Rejected files (wrong media type, empty) leave the store's file slot
    /// empty and set the matching rejection message.
    pub fn select_file(&self, file: SelectedFile) -> Result<WorkflowSnapshot, CoreError> {
        self.with_workflow(|w| {
            if !workflow::is_file_acceptable(&file) {
                tracing::warn!(file = %file.name, media_type = %file.media_type, "Rejected non-CSV file");
                w.set_selected_file(None);
                w.status_message = workflow::MSG_FILE_REJECTED.to_string();
            } else if file.bytes.is_empty() {
                tracing::warn!(file = %file.name, "Rejected empty file");
                w.set_selected_file(None);
                w.status_message = workflow::MSG_FILE_EMPTY.to_string();
            } else {
                tracing::info!(file = %file.name, size = file.bytes.len(), "Base file selected");
                w.status_message = workflow::selection_message(&file.name);
                w.set_selected_file(Some(file));
            }
            w.snapshot()
        })
    }

    /// Clear the selected file (and with it any previous result).
    pub fn clear_file(&self) -> Result<WorkflowSnapshot, CoreError> {
        self.with_workflow(|w| {
            w.set_selected_file(None);
            w.status_message = workflow::MSG_WELCOME.to_string();
            w.snapshot()
        })
    }

    pub fn set_disease_name(&self, value: String) -> Result<WorkflowSnapshot, CoreError> {
        self.with_workflow(|w| {
            w.set_disease_name(value);
            w.snapshot()
        })
    }

    pub fn set_source_url(&self, value: String) -> Result<WorkflowSnapshot, CoreError> {
        self.with_workflow(|w| {
            w.set_source_url(value);
            w.snapshot()
        })
    }

    /// Result identifier of the last successful submission, if any.
    pub fn result_id(&self) -> Result<Option<String>, CoreError> {
        self.with_workflow(|w| w.result_id.clone())
    }

    /// Overwrite the status line (used by download preconditions).
    pub fn set_status(&self, message: &str) -> Result<WorkflowSnapshot, CoreError> {
        self.with_workflow(|w| {
            w.status_message = message.to_string();
            w.snapshot()
        })
    }

    /// Atomically gate a submission attempt.
    ///
    /// Re-checks `can_submit` under the lock — this is what makes rapid
    /// repeated triggers safe: the second caller sees `is_submitting` and
    /// gets `None`. On success the in-flight flag is set, any previous
    /// result is cleared, and the payload is cloned out.
    pub fn begin_submission(&self) -> Result<Option<SubmissionPayload>, CoreError> {
        self.with_workflow(|w| {
            if !workflow::can_submit(w) {
                w.status_message = workflow::MSG_INCOMPLETE.to_string();
                return None;
            }
            w.is_submitting = true;
            w.result_id = None;
            w.status_message = workflow::MSG_SUBMITTING.to_string();
            // can_submit guarantees the file is present.
            w.selected_file.as_ref().map(|file| SubmissionPayload {
                file: file.clone(),
                disease_name: w.disease_name.clone(),
                source_url: w.source_url.clone(),
            })
        })
    }

    /// Apply a submission outcome. Both arms drop the in-flight flag so the
    /// user can retry manually after a failure.
    pub fn finish_submission(
        &self,
        outcome: Result<ProcessSuccess, RemoteError>,
    ) -> Result<WorkflowSnapshot, CoreError> {
        self.with_workflow(|w| {
            match outcome {
                Ok(success) => {
                    tracing::info!(file_id = %success.file_id, "Submission succeeded");
                    w.result_id = Some(success.file_id);
                    w.status_message = workflow::success_message(&success.message);
                }
                Err(err) => {
                    tracing::warn!(error = %err, "Submission failed");
                    w.status_message = workflow::failure_message(&err.to_string());
                }
            }
            w.is_submitting = false;
            w.snapshot()
        })
    }

    /// Run one full submission cycle against the given client.
    ///
    /// Blocking; callers on an async runtime should wrap this in
    /// `spawn_blocking`. The network call happens with the state lock
    /// released.
    pub fn run_submission(
        &self,
        client: &dyn GeneratorClient,
    ) -> Result<WorkflowSnapshot, CoreError> {
        let Some(payload) = self.begin_submission()? else {
            tracing::warn!("Submission blocked by precondition check");
            return self.snapshot();
        };
        let outcome = client.process(&payload.file, &payload.disease_name, &payload.source_url);
        self.finish_submission(outcome)
    }
}

impl Default for CoreState {
    fn default() -> Self {
        Self::new()
    }
}
