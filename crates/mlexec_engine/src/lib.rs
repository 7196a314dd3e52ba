//! Mlexec engine: file intake and backend submission on a background runtime.
mod decode;
mod engine;
mod execute;
mod preview;
mod types;

pub use decode::{decode_text, read_preview, DecodeError, DecodedText};
pub use engine::{EngineConfig, EngineError, EngineHandle};
pub use execute::{
    extract_output, ChannelEventSink, EventSink, ExecuteSettings, Executor, ReqwestExecutor,
    EXECUTE_PATH,
};
pub use preview::{prepare_preview_content, MAX_PREVIEW_CONTENT};
pub use types::{
    EngineEvent, ExecuteError, ExecutionRequest, ExecutionStage, FailureKind, Generation,
    RequestId,
};
