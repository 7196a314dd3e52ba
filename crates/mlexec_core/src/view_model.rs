use crate::{AlgorithmId, OutputView, RenderKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppViewModel {
    pub selected: Option<AlgorithmId>,
    pub selected_label: Option<&'static str>,
    pub file_name: Option<String>,
    /// Decoded file text, or a placeholder when no file is picked.
    pub preview: String,
    pub preview_pending: bool,
    pub can_execute: bool,
    pub in_flight: bool,
    pub render_key: RenderKey,
    pub output: OutputView,
    pub dirty: bool,
}
