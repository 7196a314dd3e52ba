use std::sync::mpsc;
use std::thread;

use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};
use mlexec_core::{Effect, ExecutionOutcome, Msg, ACCEPTED_EXTENSIONS};
use mlexec_engine::{EngineConfig, EngineError, EngineEvent, EngineHandle, ExecutionRequest};

use super::app::LoopEvent;

pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(
        config: EngineConfig,
        loop_tx: mpsc::Sender<LoopEvent>,
    ) -> Result<Self, EngineError> {
        let (engine, events) = EngineHandle::new(config)?;
        spawn_event_loop(events, loop_tx);
        Ok(Self { engine })
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::DecodePreview { generation, file } => {
                    if !file.has_accepted_extension() {
                        engine_warn!(
                            "{} is not one of the usual dataset types ({}); submitting anyway",
                            file.name,
                            ACCEPTED_EXTENSIONS.join(", ")
                        );
                    }
                    engine_debug!(
                        "DecodePreview generation={} path={}",
                        generation,
                        file.path.display()
                    );
                    self.engine.decode(generation, file.path);
                }
                Effect::SubmitExecution {
                    request_id,
                    submission,
                } => {
                    engine_info!(
                        "SubmitExecution request_id={} algorithm={} file={}",
                        request_id,
                        submission.algorithm,
                        submission.file.name
                    );
                    self.engine.execute(ExecutionRequest {
                        request_id,
                        selected_code: submission.algorithm.wire_value().to_string(),
                        file_name: submission.file.name,
                        file_path: submission.file.path,
                    });
                }
            }
        }
    }
}

fn spawn_event_loop(events: mpsc::Receiver<EngineEvent>, loop_tx: mpsc::Sender<LoopEvent>) {
    thread::spawn(move || {
        while let Ok(event) = events.recv() {
            let Some(msg) = map_event(event) else {
                continue;
            };
            if loop_tx.send(LoopEvent::Msg(msg)).is_err() {
                break;
            }
        }
    });
}

/// Translates engine events into core messages. Failure causes are logged
/// here and never reach the core.
pub(crate) fn map_event(event: EngineEvent) -> Option<Msg> {
    match event {
        EngineEvent::Progress { request_id, stage } => {
            engine_debug!("request_id={} stage={:?}", request_id, stage);
            None
        }
        EngineEvent::PreviewDecoded { generation, result } => Some(Msg::PreviewDecoded {
            generation,
            result: match result {
                Ok(decoded) => {
                    engine_debug!(
                        "Preview generation={} decoded as {}",
                        generation,
                        decoded.encoding_label
                    );
                    Ok(decoded.text)
                }
                Err(err) => {
                    engine_warn!("Preview generation={} failed: {}", generation, err);
                    Err(err.to_string())
                }
            },
        }),
        EngineEvent::ExecutionCompleted { request_id, result } => Some(Msg::ExecutionFinished {
            request_id,
            outcome: match result {
                Ok(output) => ExecutionOutcome::Completed(output),
                Err(err) => {
                    engine_error!("Error executing code (request_id={}): {}", request_id, err);
                    ExecutionOutcome::Failed
                }
            },
        }),
    }
}

#[cfg(test)]
mod tests {
    use mlexec_core::{ExecutionOutcome, Msg};
    use mlexec_engine::{
        DecodeError, DecodedText, EngineEvent, ExecuteError, ExecutionStage, FailureKind,
    };
    use serde_json::json;

    use super::map_event;

    #[test]
    fn progress_stays_in_the_log() {
        let event = EngineEvent::Progress {
            request_id: 1,
            stage: ExecutionStage::Uploading,
        };
        assert_eq!(map_event(event), None);
    }

    #[test]
    fn failures_collapse_to_failed_outcome() {
        let event = EngineEvent::ExecutionCompleted {
            request_id: 9,
            result: Err(ExecuteError {
                kind: FailureKind::HttpStatus(500),
                message: "Internal Server Error".to_string(),
            }),
        };
        assert_eq!(
            map_event(event),
            Some(Msg::ExecutionFinished {
                request_id: 9,
                outcome: ExecutionOutcome::Failed,
            })
        );
    }

    #[test]
    fn completed_output_is_forwarded_untouched() {
        let output = json!({"message": "tree built", "image_url": "static/tree.png"});
        let event = EngineEvent::ExecutionCompleted {
            request_id: 2,
            result: Ok(output.clone()),
        };
        assert_eq!(
            map_event(event),
            Some(Msg::ExecutionFinished {
                request_id: 2,
                outcome: ExecutionOutcome::Completed(output),
            })
        );
    }

    #[test]
    fn decode_results_keep_their_generation() {
        let ok = EngineEvent::PreviewDecoded {
            generation: 3,
            result: Ok(DecodedText {
                text: "a,b".to_string(),
                encoding_label: "UTF-8".to_string(),
            }),
        };
        assert_eq!(
            map_event(ok),
            Some(Msg::PreviewDecoded {
                generation: 3,
                result: Ok("a,b".to_string()),
            })
        );

        let failed = EngineEvent::PreviewDecoded {
            generation: 4,
            result: Err(DecodeError::ReadFailure {
                path: "x.csv".to_string(),
                message: "No such file".to_string(),
            }),
        };
        assert_eq!(
            map_event(failed),
            Some(Msg::PreviewDecoded {
                generation: 4,
                result: Err("failed to read x.csv: No such file".to_string()),
            })
        );
    }
}
