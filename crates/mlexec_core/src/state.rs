use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::render::{render_output, RenderKey};
use crate::view_model::AppViewModel;
use crate::AlgorithmId;

pub type Generation = u64;
pub type RequestId = u64;

pub const DEFAULT_BACKEND_ORIGIN: &str = "http://127.0.0.1:5000";
pub const GUIDANCE_MESSAGE: &str = "Please select a code and upload a file.";
pub const EXECUTION_ERROR_MESSAGE: &str = "Error executing code.";
pub const NO_FILE_PLACEHOLDER: &str = "No file selected";

/// Extensions offered by the file picker. Advisory only.
pub const ACCEPTED_EXTENSIONS: [&str; 4] = ["xlsx", "xls", "csv", "txt"];

/// A user-chosen local file. Contents are read lazily by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub path: PathBuf,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Builds a handle whose display name is the path's final component.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { name, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn has_accepted_extension(&self) -> bool {
        self.path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                ACCEPTED_EXTENSIONS
                    .iter()
                    .any(|accepted| accepted.eq_ignore_ascii_case(ext))
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PreviewState {
    #[default]
    Empty,
    Pending,
    Ready(String),
    Unavailable(String),
}

/// Snapshot of what was actually sent. Its algorithm decides how the
/// eventual result is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRecord {
    pub algorithm: AlgorithmId,
    pub file: UploadedFile,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionResult {
    Payload(Value),
    Notice(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    Completed(Value),
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    backend_origin: String,
    selected: Option<AlgorithmId>,
    file: Option<UploadedFile>,
    preview: PreviewState,
    file_generation: Generation,
    submission: Option<SubmissionRecord>,
    last_request_id: RequestId,
    in_flight: Option<RequestId>,
    result: Option<ExecutionResult>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_origin(DEFAULT_BACKEND_ORIGIN)
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_origin(origin: impl Into<String>) -> Self {
        Self {
            backend_origin: origin.into(),
            selected: None,
            file: None,
            preview: PreviewState::Empty,
            file_generation: 0,
            submission: None,
            last_request_id: 0,
            in_flight: None,
            result: None,
            dirty: false,
        }
    }

    pub fn view(&self) -> AppViewModel {
        let render_key = RenderKey::from(self.submission.as_ref());
        let preview = match &self.preview {
            PreviewState::Empty => NO_FILE_PLACEHOLDER.to_string(),
            PreviewState::Pending => String::new(),
            PreviewState::Ready(text) => text.clone(),
            PreviewState::Unavailable(reason) => format!("Preview unavailable: {reason}"),
        };
        AppViewModel {
            selected: self.selected,
            selected_label: self.selected.map(AlgorithmId::label),
            file_name: self.file.as_ref().map(|file| file.name.clone()),
            preview,
            preview_pending: self.preview == PreviewState::Pending,
            can_execute: self.can_execute(),
            in_flight: self.in_flight.is_some(),
            render_key,
            output: render_output(render_key, self.result.as_ref(), &self.backend_origin),
            dirty: self.dirty,
        }
    }

    pub fn selected(&self) -> Option<AlgorithmId> {
        self.selected
    }

    pub fn file(&self) -> Option<&UploadedFile> {
        self.file.as_ref()
    }

    pub fn preview(&self) -> &PreviewState {
        &self.preview
    }

    pub fn submission(&self) -> Option<&SubmissionRecord> {
        self.submission.as_ref()
    }

    pub fn result(&self) -> Option<&ExecutionResult> {
        self.result.as_ref()
    }

    pub fn backend_origin(&self) -> &str {
        &self.backend_origin
    }

    pub fn file_generation(&self) -> Generation {
        self.file_generation
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn can_execute(&self) -> bool {
        self.selected.is_some() && self.file.is_some()
    }

    /// Returns whether anything changed since the last call and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn select(&mut self, algorithm: AlgorithmId) {
        self.selected = Some(algorithm);
        self.mark_dirty();
    }

    /// Replaces the file and invalidates its preview in one step.
    pub(crate) fn replace_file(&mut self, file: UploadedFile) -> Generation {
        self.file_generation += 1;
        self.file = Some(file);
        self.preview = PreviewState::Pending;
        self.mark_dirty();
        self.file_generation
    }

    /// Applies a decode completion. Stale generations are dropped.
    pub(crate) fn apply_preview(
        &mut self,
        generation: Generation,
        decoded: Result<String, String>,
    ) -> bool {
        if generation != self.file_generation {
            return false;
        }
        self.preview = match decoded {
            Ok(text) => PreviewState::Ready(text),
            Err(reason) => PreviewState::Unavailable(reason),
        };
        self.mark_dirty();
        true
    }

    pub(crate) fn set_notice(&mut self, text: impl Into<String>) {
        self.result = Some(ExecutionResult::Notice(text.into()));
        self.mark_dirty();
    }

    /// Snapshots the current selection into a submission and makes it the
    /// render key. Returns `None` when either half is missing.
    pub(crate) fn begin_submission(&mut self) -> Option<(RequestId, SubmissionRecord)> {
        let algorithm = self.selected?;
        let file = self.file.clone()?;
        let record = SubmissionRecord { algorithm, file };
        self.last_request_id += 1;
        self.in_flight = Some(self.last_request_id);
        self.submission = Some(record.clone());
        self.mark_dirty();
        Some((self.last_request_id, record))
    }

    /// Applies a backend response. Anything but the latest request is dropped.
    /// A null `output` counts as no output at all.
    pub(crate) fn apply_outcome(
        &mut self,
        request_id: RequestId,
        outcome: ExecutionOutcome,
    ) -> bool {
        if request_id != self.last_request_id {
            return false;
        }
        self.in_flight = None;
        self.result = match outcome {
            ExecutionOutcome::Completed(Value::Null) => None,
            ExecutionOutcome::Completed(value) => Some(ExecutionResult::Payload(value)),
            ExecutionOutcome::Failed => {
                Some(ExecutionResult::Notice(EXECUTION_ERROR_MESSAGE.to_string()))
            }
        };
        self.mark_dirty();
        true
    }
}
