use std::fmt;
use std::path::PathBuf;

use serde_json::Value;

use crate::decode::{DecodeError, DecodedText};

pub type RequestId = u64;
pub type Generation = u64;

/// Everything needed to submit one file to the execution service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    pub request_id: RequestId,
    /// Value for the `selectedCode` form part.
    pub selected_code: String,
    pub file_name: String,
    pub file_path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStage {
    ReadingFile,
    Uploading,
    AwaitingResponse,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Progress {
        request_id: RequestId,
        stage: ExecutionStage,
    },
    PreviewDecoded {
        generation: Generation,
        result: Result<DecodedText, DecodeError>,
    },
    ExecutionCompleted {
        request_id: RequestId,
        result: Result<Value, ExecuteError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ExecuteError {
    pub kind: FailureKind,
    pub message: String,
}

impl ExecuteError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    FileRead,
    InvalidEndpoint,
    HttpStatus(u16),
    Timeout,
    MalformedBody,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::FileRead => write!(f, "file read error"),
            FailureKind::InvalidEndpoint => write!(f, "invalid endpoint"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::MalformedBody => write!(f, "malformed response body"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
