//! Wizard workflow core — types and pure derivation functions.
//!
//! Holds the state accumulated across the three wizard steps (base CSV,
//! disease name, reference URL) plus the submission outcome, and derives
//! everything the frontend displays from it: the current step, whether
//! submission is allowed, and the single status line. Nothing here touches
//! the network or the filesystem beyond reading the picked file.

use std::path::Path;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Status messages
// ---------------------------------------------------------------------------

/// Shown on a fresh session before any interaction.
pub const MSG_WELCOME: &str =
    "Welcome! Pick a base CSV file to get started, or download the template.";

/// Shown when a non-CSV file is offered.
pub const MSG_FILE_REJECTED: &str =
    "That file is not a CSV. Please choose a .csv file (or start from the template).";

/// Shown when a zero-byte file is offered.
pub const MSG_FILE_EMPTY: &str =
    "The selected file is empty. Please choose a CSV with at least a header row.";

/// Shown when submit is triggered without all inputs in place.
pub const MSG_INCOMPLETE: &str =
    "Cannot submit yet — complete all steps: base CSV, disease name, and source URL.";

/// Shown between submission start and its resolution.
pub const MSG_SUBMITTING: &str =
    "Generating profiles… this can take a minute for long reference pages.";

/// Shown when download is requested with no result available.
pub const MSG_NO_RESULT: &str = "No result to download yet — submit the workflow first.";

/// Status line for a newly selected file.
pub fn selection_message(file_name: &str) -> String {
    format!("Selected \"{file_name}\". Now provide the disease name and a source URL.")
}

/// Status line for a successful submission, embedding the server's text.
pub fn success_message(server_message: &str) -> String {
    format!("Success: {server_message}")
}

/// Status line for a failed submission, embedding whatever detail we have.
pub fn failure_message(detail: &str) -> String {
    format!("Submission failed: {detail}")
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A file the user picked: name, binary content, and declared media type.
///
/// The content is held in memory for the lifetime of the selection (base
/// cohort CSVs are small) so the submission payload never re-reads the disk.
/// Bytes are not serialized to the frontend; it only ever sees the name via
/// [`WorkflowSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub bytes: Vec<u8>,
    pub media_type: String,
}

impl SelectedFile {
    /// Read a file from disk, declaring its media type from the extension.
    pub fn read(path: &Path) -> std::io::Result<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unnamed")
            .to_string();
        let bytes = std::fs::read(path)?;
        let media_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Ok(Self {
            name,
            bytes,
            media_type,
        })
    }
}

/// Wizard progress, derived from [`WorkflowState`] and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    /// No base file selected yet.
    AwaitingFile,
    /// File selected; disease name or source URL still missing.
    AwaitingContext,
    /// All inputs present; ready to submit (or a submission is in flight).
    ReadyOrSubmitting,
    /// A result is available for download.
    Completed,
}

impl WizardStep {
    /// Numeric index for the frontend's progress indicator (0–3).
    pub fn index(self) -> u8 {
        match self {
            WizardStep::AwaitingFile => 0,
            WizardStep::AwaitingContext => 1,
            WizardStep::ReadyOrSubmitting => 2,
            WizardStep::Completed => 3,
        }
    }
}

/// All state accumulated in one wizard session.
///
/// Mutated only through [`crate::core_state::CoreState`] operations; the
/// derivation functions below never write to it.
#[derive(Debug, Clone)]
pub struct WorkflowState {
    pub selected_file: Option<SelectedFile>,
    pub disease_name: String,
    pub source_url: String,
    /// Server-issued identifier of the generated file. Present only after a
    /// successful submission; cleared whenever the selected file changes.
    pub result_id: Option<String>,
    pub is_submitting: bool,
    pub status_message: String,
}

impl WorkflowState {
    pub fn new() -> Self {
        Self {
            selected_file: None,
            disease_name: String::new(),
            source_url: String::new(),
            result_id: None,
            is_submitting: false,
            status_message: MSG_WELCOME.to_string(),
        }
    }

    /// Replace (or clear) the selected file. Always invalidates any previous
    /// result: the generated artifact belonged to the old base file.
    pub fn set_selected_file(&mut self, file: Option<SelectedFile>) {
        self.selected_file = file;
        self.result_id = None;
    }

    /// Editing context fields does not invalidate an existing result; the
    /// result stays downloadable until a different base file is chosen.
    pub fn set_disease_name(&mut self, value: String) {
        self.disease_name = value;
    }

    pub fn set_source_url(&mut self, value: String) {
        self.source_url = value;
    }

    pub fn snapshot(&self) -> WorkflowSnapshot {
        let step = derive_step(self);
        WorkflowSnapshot {
            file_name: self.selected_file.as_ref().map(|f| f.name.clone()),
            disease_name: self.disease_name.clone(),
            source_url: self.source_url.clone(),
            result_id: self.result_id.clone(),
            is_submitting: self.is_submitting,
            status_message: self.status_message.clone(),
            step,
            step_index: step.index(),
            can_submit: can_submit(self),
        }
    }
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self::new()
    }
}

/// The value handed to the frontend after every command. The UI renders this
/// and nothing else; all decisions are made here in Rust. Serialize-only:
/// snapshots flow one way, Rust to frontend.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowSnapshot {
    pub file_name: Option<String>,
    pub disease_name: String,
    pub source_url: String,
    pub result_id: Option<String>,
    pub is_submitting: bool,
    pub status_message: String,
    pub step: WizardStep,
    pub step_index: u8,
    pub can_submit: bool,
}

// ---------------------------------------------------------------------------
// Derivation & validation
// ---------------------------------------------------------------------------

/// Derive the wizard step. Total over all reachable states; precedence
/// matters: a present result means Completed even if context fields were
/// edited afterwards.
pub fn derive_step(state: &WorkflowState) -> WizardStep {
    if state.result_id.is_some() {
        WizardStep::Completed
    } else if state.selected_file.is_some()
        && !state.disease_name.trim().is_empty()
        && !state.source_url.trim().is_empty()
    {
        WizardStep::ReadyOrSubmitting
    } else if state.selected_file.is_some() {
        WizardStep::AwaitingContext
    } else {
        WizardStep::AwaitingFile
    }
}

/// Whether a picked file may enter the store: declared media type must be
/// CSV, with an extension fallback for platforms that report a generic type.
pub fn is_file_acceptable(file: &SelectedFile) -> bool {
    file.media_type == "text/csv" || file.name.to_ascii_lowercase().ends_with(".csv")
}

/// Whether submission is permitted: all three inputs present and no request
/// currently in flight.
pub fn can_submit(state: &WorkflowState) -> bool {
    state.selected_file.is_some()
        && !state.disease_name.trim().is_empty()
        && !state.source_url.trim().is_empty()
        && !state.is_submitting
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn csv_file() -> SelectedFile {
        SelectedFile {
            name: "patients.csv".into(),
            bytes: b"disease,age\n".to_vec(),
            media_type: "text/csv".into(),
        }
    }

    fn ready_state() -> WorkflowState {
        let mut state = WorkflowState::new();
        state.set_selected_file(Some(csv_file()));
        state.set_disease_name("Diabetes".into());
        state.set_source_url("https://example.org/ref".into());
        state
    }

    #[test]
    fn fresh_state_awaits_file_with_welcome() {
        let state = WorkflowState::new();
        assert_eq!(derive_step(&state), WizardStep::AwaitingFile);
        assert_eq!(derive_step(&state).index(), 0);
        assert_eq!(state.status_message, MSG_WELCOME);
    }

    #[test]
    fn file_only_awaits_context() {
        let mut state = WorkflowState::new();
        state.set_selected_file(Some(csv_file()));
        assert_eq!(derive_step(&state), WizardStep::AwaitingContext);
        assert_eq!(derive_step(&state).index(), 1);
    }

    #[test]
    fn file_plus_one_context_field_still_awaits_context() {
        let mut state = WorkflowState::new();
        state.set_selected_file(Some(csv_file()));
        state.set_disease_name("Diabetes".into());
        assert_eq!(derive_step(&state), WizardStep::AwaitingContext);
    }

    #[test]
    fn all_inputs_ready_and_submittable() {
        let state = ready_state();
        assert_eq!(derive_step(&state), WizardStep::ReadyOrSubmitting);
        assert_eq!(derive_step(&state).index(), 2);
        assert!(can_submit(&state));
    }

    #[test]
    fn whitespace_context_does_not_count() {
        let mut state = ready_state();
        state.set_disease_name("   ".into());
        assert_eq!(derive_step(&state), WizardStep::AwaitingContext);
        assert!(!can_submit(&state));
    }

    #[test]
    fn result_means_completed_regardless_of_other_fields() {
        let mut state = ready_state();
        state.result_id = Some("abc123".into());
        assert_eq!(derive_step(&state), WizardStep::Completed);
        assert_eq!(derive_step(&state).index(), 3);

        // Completed wins even if inputs are cleared without touching the
        // result (not reachable through the store ops, but the deriver is
        // total over all states).
        state.disease_name.clear();
        state.source_url.clear();
        assert_eq!(derive_step(&state), WizardStep::Completed);
    }

    #[test]
    fn editing_context_after_success_keeps_result() {
        let mut state = ready_state();
        state.result_id = Some("abc123".into());
        state.set_disease_name("Influenza".into());
        state.set_source_url("https://example.org/other".into());
        assert_eq!(state.result_id.as_deref(), Some("abc123"));
        assert_eq!(derive_step(&state), WizardStep::Completed);
    }

    #[test]
    fn new_file_clears_result() {
        let mut state = ready_state();
        state.result_id = Some("abc123".into());
        state.set_selected_file(Some(csv_file()));
        assert!(state.result_id.is_none());
    }

    #[test]
    fn clearing_file_clears_result() {
        let mut state = ready_state();
        state.result_id = Some("abc123".into());
        state.set_selected_file(None);
        assert!(state.result_id.is_none());
        assert_eq!(derive_step(&state), WizardStep::AwaitingFile);
    }

    #[test]
    fn cannot_submit_with_any_input_missing() {
        let mut no_file = ready_state();
        no_file.set_selected_file(None);
        assert!(!can_submit(&no_file));

        let mut no_disease = ready_state();
        no_disease.set_disease_name(String::new());
        assert!(!can_submit(&no_disease));

        let mut no_url = ready_state();
        no_url.set_source_url(String::new());
        assert!(!can_submit(&no_url));
    }

    #[test]
    fn cannot_submit_while_in_flight() {
        let mut state = ready_state();
        state.is_submitting = true;
        assert!(!can_submit(&state));
        // Still shown as the ready/submitting step.
        assert_eq!(derive_step(&state), WizardStep::ReadyOrSubmitting);
    }

    #[test]
    fn csv_media_type_is_acceptable() {
        assert!(is_file_acceptable(&csv_file()));
    }

    #[test]
    fn csv_extension_fallback_is_acceptable() {
        let file = SelectedFile {
            name: "EXPORT.CSV".into(),
            bytes: b"x\n".to_vec(),
            media_type: "application/octet-stream".into(),
        };
        assert!(is_file_acceptable(&file));
    }

    #[test]
    fn non_csv_media_types_are_rejected() {
        for (name, media_type) in [
            ("report.pdf", "application/pdf"),
            ("notes.txt", "text/plain"),
            ("data.xlsx", "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
            ("image.png", "image/png"),
            ("archive", "application/octet-stream"),
        ] {
            let file = SelectedFile {
                name: name.into(),
                bytes: vec![0u8; 4],
                media_type: media_type.into(),
            };
            assert!(!is_file_acceptable(&file), "accepted {name}");
        }
    }

    #[test]
    fn selected_file_read_declares_csv_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patients.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"disease,age\nFlu,40\n").unwrap();

        let file = SelectedFile::read(&path).unwrap();
        assert_eq!(file.name, "patients.csv");
        assert_eq!(file.media_type, "text/csv");
        assert_eq!(file.bytes, b"disease,age\nFlu,40\n");
        assert!(is_file_acceptable(&file));
    }

    #[test]
    fn snapshot_reflects_state_and_hides_bytes() {
        let state = ready_state();
        let snap = state.snapshot();
        assert_eq!(snap.file_name.as_deref(), Some("patients.csv"));
        assert_eq!(snap.disease_name, "Diabetes");
        assert_eq!(snap.step, WizardStep::ReadyOrSubmitting);
        assert_eq!(snap.step_index, 2);
        assert!(snap.can_submit);

        let json = serde_json::to_string(&snap).unwrap();
        assert!(json.contains("\"step\":\"ready_or_submitting\""));
        assert!(!json.contains("bytes"));
    }

    #[test]
    fn status_builders_embed_their_argument() {
        assert!(selection_message("patients.csv").contains("patients.csv"));
        assert!(success_message("Appended 10 rows").contains("Appended 10 rows"));
        assert!(failure_message("Invalid URL").contains("Invalid URL"));
    }
}
