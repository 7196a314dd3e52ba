use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use mlexec_engine::{
    EngineEvent, EventSink, ExecuteSettings, ExecutionRequest, ExecutionStage, Executor,
    FailureKind, ReqwestExecutor,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct TestSink {
    events: Arc<Mutex<Vec<EngineEvent>>>,
}

impl TestSink {
    fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl EventSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn write_dataset(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn request(path: &Path, code: &str) -> ExecutionRequest {
    ExecutionRequest {
        request_id: 1,
        selected_code: code.to_string(),
        file_name: path.file_name().unwrap().to_string_lossy().into_owned(),
        file_path: path.to_path_buf(),
    }
}

fn executor_for(server: &MockServer) -> ReqwestExecutor {
    ReqwestExecutor::new(ExecuteSettings {
        origin: server.uri(),
        request_timeout: None,
    })
}

#[tokio::test]
async fn executor_posts_multipart_and_returns_output() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/execute"))
        .and(body_string_contains("name=\"selectedCode\""))
        .and(body_string_contains("FIND-S"))
        .and(body_string_contains("name=\"file\"; filename=\"train.csv\""))
        .and(body_string_contains("sunny,warm,yes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "output": {"message": "Most specific hypothesis is:", "hypothesis": ["sunny", "?"]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let file = write_dataset(&dir, "train.csv", "sky,temp,enjoy\nsunny,warm,yes\n");
    let sink = TestSink::new();

    let output = executor_for(&server)
        .execute(&request(&file, "FIND-S"), &sink)
        .await
        .expect("execute ok");

    assert_eq!(
        output,
        json!({"message": "Most specific hypothesis is:", "hypothesis": ["sunny", "?"]})
    );
    let stages = sink
        .take()
        .into_iter()
        .filter_map(|event| match event {
            EngineEvent::Progress { stage, .. } => Some(stage),
            _ => None,
        })
        .collect::<Vec<_>>();
    assert_eq!(
        stages,
        vec![
            ExecutionStage::ReadingFile,
            ExecutionStage::Uploading,
            ExecutionStage::AwaitingResponse,
        ]
    );
}

#[tokio::test]
async fn executor_fails_on_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/execute"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "output": "Error: No positive examples found in the dataset."
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let file = write_dataset(&dir, "neg.csv", "a,b\nx,no\n");

    let err = executor_for(&server)
        .execute(&request(&file, "FIND-S"), &TestSink::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(400));
    assert!(err.message.contains("No positive examples"));
}

#[tokio::test]
async fn executor_rejects_body_without_output() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/execute"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let file = write_dataset(&dir, "d.csv", "a,b\n");

    let err = executor_for(&server)
        .execute(&request(&file, "candidate-elimination"), &TestSink::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::MalformedBody);
}

#[tokio::test]
async fn executor_reports_unreadable_file_without_contacting_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("gone.csv");

    let err = executor_for(&server)
        .execute(&request(&missing, "ID3_algorithm"), &TestSink::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::FileRead);
}

#[tokio::test]
async fn executor_times_out_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/execute"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!({"output": {}})),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let file = write_dataset(&dir, "d.csv", "a,b\n");
    let executor = ReqwestExecutor::new(ExecuteSettings {
        origin: server.uri(),
        request_timeout: Some(Duration::from_millis(50)),
    });

    let err = executor
        .execute(&request(&file, "FIND-S"), &TestSink::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn executor_maps_refused_connection_to_network() {
    let dir = TempDir::new().unwrap();
    let file = write_dataset(&dir, "d.csv", "a,b\n");
    let executor = ReqwestExecutor::new(ExecuteSettings {
        origin: "http://127.0.0.1:1".to_string(),
        request_timeout: None,
    });

    let err = executor
        .execute(&request(&file, "FIND-S"), &TestSink::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Network);
}
