//! Mlexec core: pure state machine, result rendering and view-model helpers.
mod algorithm;
mod effect;
mod msg;
mod render;
mod state;
mod update;
mod view_model;

pub use algorithm::{AlgorithmId, UnknownAlgorithm};
pub use effect::Effect;
pub use msg::Msg;
pub use render::{
    image_reference, render_output, OutputView, RenderKey, GENERAL_HEADING,
    NO_OUTPUT_PLACEHOLDER, SPECIFIC_HEADING, TREE_IMAGE_ALT,
};
pub use state::{
    AppState, ExecutionOutcome, ExecutionResult, Generation, PreviewState, RequestId,
    SubmissionRecord, UploadedFile, ACCEPTED_EXTENSIONS, DEFAULT_BACKEND_ORIGIN,
    EXECUTION_ERROR_MESSAGE, GUIDANCE_MESSAGE, NO_FILE_PLACEHOLDER,
};
pub use update::update;
pub use view_model::AppViewModel;
