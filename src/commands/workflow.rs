//! Wizard workflow IPC commands.
//!
//! Every command returns the fresh [`WorkflowSnapshot`] so the frontend can
//! re-render from a single value. File picking and URL opening are delegated
//! to the dialog and shell plugins; the path and the click are all that
//! crosses the IPC boundary.

use std::path::Path;
use std::sync::Arc;

use tauri::{AppHandle, State};
use tauri_plugin_shell::ShellExt;

use crate::config;
use crate::core_state::CoreState;
use crate::remote::HttpGeneratorClient;
use crate::workflow::{self, SelectedFile, WorkflowSnapshot};

/// Read the current workflow snapshot (called on load and after navigation).
#[tauri::command]
pub fn get_workflow(state: State<'_, Arc<CoreState>>) -> Result<WorkflowSnapshot, String> {
    state.snapshot().map_err(|e| e.to_string())
}

/// Offer a picked file to the workflow.
///
/// Reads the file from disk, declares its media type from the extension,
/// and lets the store accept or reject it. A rejected file never enters the
/// store; the snapshot's status line explains why.
#[tauri::command]
pub fn select_file(
    state: State<'_, Arc<CoreState>>,
    file_path: String,
) -> Result<WorkflowSnapshot, String> {
    let path = Path::new(&file_path);

    // Security: verify file exists and is a regular file
    if !path.exists() {
        return Err(format!("File not found: {file_path}"));
    }
    if !path.is_file() {
        return Err("Path is not a regular file".into());
    }

    let file = SelectedFile::read(path).map_err(|e| format!("Could not read file: {e}"))?;
    state.select_file(file).map_err(|e| e.to_string())
}

/// Drop the selected file, returning the wizard to the first step.
#[tauri::command]
pub fn clear_file(state: State<'_, Arc<CoreState>>) -> Result<WorkflowSnapshot, String> {
    state.clear_file().map_err(|e| e.to_string())
}

#[tauri::command]
pub fn set_disease_name(
    state: State<'_, Arc<CoreState>>,
    value: String,
) -> Result<WorkflowSnapshot, String> {
    state.set_disease_name(value).map_err(|e| e.to_string())
}

#[tauri::command]
pub fn set_source_url(
    state: State<'_, Arc<CoreState>>,
    value: String,
) -> Result<WorkflowSnapshot, String> {
    state.set_source_url(value).map_err(|e| e.to_string())
}

/// Submit the workflow to the processing service.
///
/// The gate check, in-flight flag, and outcome application all happen inside
/// `CoreState::run_submission`; this command only moves the blocking HTTP
/// call off the async runtime. Repeated invocations while a request is in
/// flight are refused at the gate and issue no second request.
#[tauri::command]
pub async fn submit_workflow(
    state: State<'_, Arc<CoreState>>,
) -> Result<WorkflowSnapshot, String> {
    let core = state.inner().clone();
    tauri::async_runtime::spawn_blocking(move || {
        let client = HttpGeneratorClient::from_config();
        core.run_submission(&client)
    })
    .await
    .map_err(|e| format!("Submission task failed: {e}"))?
    .map_err(|e| e.to_string())
}

/// Open the generated result in the host's download handler.
///
/// Requires a result from a successful submission; otherwise only the status
/// line changes. The response is never inspected here.
#[tauri::command]
pub async fn download_result(
    app: AppHandle,
    state: State<'_, Arc<CoreState>>,
) -> Result<WorkflowSnapshot, String> {
    let Some(file_id) = state.result_id().map_err(|e| e.to_string())? else {
        tracing::warn!("Download requested with no result available");
        return state
            .set_status(workflow::MSG_NO_RESULT)
            .map_err(|e| e.to_string());
    };

    let url = config::download_url(&config::api_base_url(), &file_id);
    tracing::info!(%url, "Opening result download");
    app.shell()
        .open(&url, None)
        .map_err(|e| format!("Could not open download: {e}"))?;

    state.snapshot().map_err(|e| e.to_string())
}

/// Open the empty template CSV. Available in every workflow state.
#[tauri::command]
pub async fn download_template(app: AppHandle) -> Result<(), String> {
    let url = config::template_url(&config::api_base_url());
    tracing::info!(%url, "Opening template download");
    app.shell()
        .open(&url, None)
        .map_err(|e| format!("Could not open download: {e}"))
}
