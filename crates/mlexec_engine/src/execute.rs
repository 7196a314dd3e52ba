use std::time::Duration;

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use url::Url;

use crate::{EngineEvent, ExecuteError, ExecutionRequest, ExecutionStage, FailureKind};

pub const EXECUTE_PATH: &str = "execute";
const FILE_PART: &str = "file";
const CODE_PART: &str = "selectedCode";
const OUTPUT_FIELD: &str = "output";
const ERROR_BODY_SNIPPET: usize = 512;

#[derive(Debug, Clone)]
pub struct ExecuteSettings {
    /// Scheme, host and port of the execution service.
    pub origin: String,
    /// No timeout when `None`; a hung request simply stays pending.
    pub request_timeout: Option<Duration>,
}

impl ExecuteSettings {
    pub fn endpoint(&self) -> Result<Url, ExecuteError> {
        let raw = format!("{}/{}", self.origin.trim_end_matches('/'), EXECUTE_PATH);
        Url::parse(&raw)
            .map_err(|err| ExecuteError::new(FailureKind::InvalidEndpoint, format!("{raw}: {err}")))
    }
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

#[async_trait::async_trait]
pub trait Executor: Send + Sync {
    /// Submits one file and returns the response's `output` payload.
    async fn execute(
        &self,
        request: &ExecutionRequest,
        sink: &dyn EventSink,
    ) -> Result<Value, ExecuteError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestExecutor {
    settings: ExecuteSettings,
}

impl ReqwestExecutor {
    pub fn new(settings: ExecuteSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, ExecuteError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        builder
            .build()
            .map_err(|err| ExecuteError::new(FailureKind::Network, err.to_string()))
    }
}

#[async_trait::async_trait]
impl Executor for ReqwestExecutor {
    async fn execute(
        &self,
        request: &ExecutionRequest,
        sink: &dyn EventSink,
    ) -> Result<Value, ExecuteError> {
        let endpoint = self.settings.endpoint()?;
        let client = self.build_client()?;

        sink.emit(EngineEvent::Progress {
            request_id: request.request_id,
            stage: ExecutionStage::ReadingFile,
        });
        let content = tokio::fs::read(&request.file_path)
            .await
            .map(Bytes::from)
            .map_err(|err| {
                ExecuteError::new(
                    FailureKind::FileRead,
                    format!("{}: {err}", request.file_path.display()),
                )
            })?;

        let form = build_form(request, content);

        sink.emit(EngineEvent::Progress {
            request_id: request.request_id,
            stage: ExecutionStage::Uploading,
        });
        let response = client
            .post(endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        sink.emit(EngineEvent::Progress {
            request_id: request.request_id,
            stage: ExecutionStage::AwaitingResponse,
        });
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExecuteError::new(
                FailureKind::HttpStatus(status.as_u16()),
                format!("{status}: {}", snippet(&body)),
            ));
        }

        let body = response.bytes().await.map_err(map_reqwest_error)?;
        extract_output(&body)
    }
}

fn build_form(request: &ExecutionRequest, content: Bytes) -> Form {
    let len = content.len() as u64;
    let file_part =
        Part::stream_with_length(content, len).file_name(request.file_name.clone());
    Form::new()
        .part(FILE_PART, file_part)
        .text(CODE_PART, request.selected_code.clone())
}

/// Pulls the `output` field out of a JSON response body.
pub fn extract_output(body: &[u8]) -> Result<Value, ExecuteError> {
    let mut parsed: Value = serde_json::from_slice(body)
        .map_err(|err| ExecuteError::new(FailureKind::MalformedBody, err.to_string()))?;
    parsed
        .get_mut(OUTPUT_FIELD)
        .map(Value::take)
        .ok_or_else(|| {
            ExecuteError::new(
                FailureKind::MalformedBody,
                format!("response has no '{OUTPUT_FIELD}' field"),
            )
        })
}

fn snippet(body: &str) -> &str {
    if body.len() <= ERROR_BODY_SNIPPET {
        return body;
    }
    let mut end = ERROR_BODY_SNIPPET;
    while end > 0 && !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

fn map_reqwest_error(err: reqwest::Error) -> ExecuteError {
    if err.is_timeout() {
        return ExecuteError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ExecuteError::new(FailureKind::MalformedBody, err.to_string());
    }
    ExecuteError::new(FailureKind::Network, err.to_string())
}
