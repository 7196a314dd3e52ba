use std::future::Future;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;

use engine_logging::{engine_debug, engine_info};
use tokio_util::sync::CancellationToken;

use crate::decode::{read_preview, DecodeError, DecodedText};
use crate::execute::{ChannelEventSink, ExecuteSettings, Executor, ReqwestExecutor};
use crate::{EngineEvent, ExecutionRequest, Generation};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub execute: ExecuteSettings,
    pub max_preview_bytes: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start engine runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

enum EngineCommand {
    Decode { generation: Generation, path: PathBuf },
    Execute(ExecutionRequest),
}

/// Cheap handle for sending work to the background engine thread.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    /// Starts the engine thread. Events arrive on the returned receiver;
    /// the thread exits once every handle is dropped.
    pub fn new(config: EngineConfig) -> Result<(Self, mpsc::Receiver<EngineEvent>), EngineError> {
        let executor: Arc<dyn Executor> = Arc::new(ReqwestExecutor::new(config.execute));
        Self::with_executor(executor, config.max_preview_bytes)
    }

    pub fn with_executor(
        executor: Arc<dyn Executor>,
        max_preview_bytes: usize,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>), EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("mlexec-engine")
            .build()?;

        thread::spawn(move || {
            // Only the newest decode matters; each pick cancels the one before.
            let mut latest_decode: Option<CancellationToken> = None;
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::Decode { generation, path } => {
                        if let Some(previous) = latest_decode.take() {
                            previous.cancel();
                        }
                        let token = CancellationToken::new();
                        latest_decode = Some(token.clone());
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            let decode = read_preview(&path, max_preview_bytes);
                            handle_decode(generation, decode, token, event_tx).await;
                        });
                    }
                    EngineCommand::Execute(request) => {
                        let executor = executor.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            handle_execute(executor.as_ref(), request, event_tx).await;
                        });
                    }
                }
            }
            engine_debug!("engine command channel closed; shutting down runtime");
        });

        Ok((Self { cmd_tx }, event_rx))
    }

    pub fn decode(&self, generation: Generation, path: impl Into<PathBuf>) {
        let _ = self.cmd_tx.send(EngineCommand::Decode {
            generation,
            path: path.into(),
        });
    }

    pub fn execute(&self, request: ExecutionRequest) {
        let _ = self.cmd_tx.send(EngineCommand::Execute(request));
    }
}

/// Reports the decode unless a newer pick cancelled it first. A decode that
/// finishes after cancellation stays silent too.
async fn handle_decode<F>(
    generation: Generation,
    decode: F,
    token: CancellationToken,
    event_tx: mpsc::Sender<EngineEvent>,
) where
    F: Future<Output = Result<DecodedText, DecodeError>>,
{
    tokio::select! {
        biased;
        _ = token.cancelled() => {
            engine_debug!("decode generation={} cancelled by a newer pick", generation);
        }
        result = decode => {
            let _ = event_tx.send(EngineEvent::PreviewDecoded { generation, result });
        }
    }
}

async fn handle_execute(
    executor: &dyn Executor,
    request: ExecutionRequest,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    engine_info!(
        "execute request_id={} code={} file={}",
        request.request_id,
        request.selected_code,
        request.file_path.display()
    );
    let sink = ChannelEventSink::new(event_tx.clone());
    let result = executor.execute(&request, &sink).await;
    let _ = event_tx.send(EngineEvent::ExecutionCompleted {
        request_id: request.request_id,
        result,
    });
}
