use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use anyhow::{bail, Context, Result};
use engine_logging::{engine_debug, engine_info};
use mlexec_core::{
    update, AlgorithmId, AppState, AppViewModel, Msg, OutputView, UploadedFile,
    EXECUTION_ERROR_MESSAGE,
};

use super::effects::EffectRunner;
use super::ui::commands::{parse_command, ShellCommand, HELP};
use super::ui::render;
use crate::config::AppConfig;

/// Everything the session loop reacts to.
pub enum LoopEvent {
    Msg(Msg),
    Input(String),
    InputClosed,
}

/// Owns the state and applies every message on one thread.
pub struct Session {
    state: AppState,
    runner: EffectRunner,
    loop_tx: mpsc::Sender<LoopEvent>,
    loop_rx: mpsc::Receiver<LoopEvent>,
}

impl Session {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let (loop_tx, loop_rx) = mpsc::channel();
        let runner = EffectRunner::new(config.engine_config(), loop_tx.clone())
            .context("starting engine")?;
        Ok(Self {
            state: AppState::with_origin(config.origin.clone()),
            runner,
            loop_tx,
            loop_rx,
        })
    }

    /// Applies one message and hands any effects to the engine. Returns the
    /// fresh view when the message changed something.
    pub fn dispatch_msg(&mut self, msg: Msg) -> Option<AppViewModel> {
        engine_debug!("dispatch {:?}", msg);
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let was_dirty = state.consume_dirty();
        let view = was_dirty.then(|| state.view());
        self.state = state;
        self.runner.enqueue(effects);
        view
    }

    pub fn view(&self) -> AppViewModel {
        self.state.view()
    }

    /// Blocks until no request is in flight and the preview has landed.
    /// There is no timeout unless one was configured for the engine.
    pub fn wait_until_settled(&mut self) {
        while self.state.is_in_flight() || self.view().preview_pending {
            match self.loop_rx.recv() {
                Ok(LoopEvent::Msg(msg)) => {
                    self.dispatch_msg(msg);
                }
                Ok(LoopEvent::Input(_)) | Ok(LoopEvent::InputClosed) => {}
                Err(_) => break,
            }
        }
    }
}

pub fn run_once(
    config: &AppConfig,
    algorithm: AlgorithmId,
    file: PathBuf,
    json: bool,
) -> Result<()> {
    let mut session = Session::new(config)?;
    session.dispatch_msg(Msg::AlgorithmSelected(algorithm));
    session.dispatch_msg(Msg::FilePicked(Some(UploadedFile::from_path(file))));
    session.dispatch_msg(Msg::ExecuteClicked);
    session.wait_until_settled();

    let view = session.view();
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&view.output).context("serializing output view")?
        );
    } else {
        println!("{}", render::render_output_panel(&view.output));
    }

    if let OutputView::Notice { text } = &view.output {
        if text == EXECUTION_ERROR_MESSAGE {
            bail!("execution failed; see the log for details");
        }
    }
    Ok(())
}

pub fn run_shell(config: &AppConfig) -> Result<()> {
    let mut session = Session::new(config)?;
    spawn_stdin_reader(session.loop_tx.clone());
    engine_info!("shell started against {}", config.origin);

    println!("{}", render::render(&session.view()));
    println!("\n{HELP}");
    prompt()?;

    while let Ok(event) = session.loop_rx.recv() {
        match event {
            LoopEvent::Msg(msg) => {
                if let Some(view) = session.dispatch_msg(msg) {
                    println!("\n{}", render::render(&view));
                    prompt()?;
                }
            }
            LoopEvent::Input(line) => {
                if !handle_line(&mut session, &line) {
                    break;
                }
                prompt()?;
            }
            LoopEvent::InputClosed => break,
        }
    }
    Ok(())
}

/// Returns `false` when the user asked to leave.
fn handle_line(session: &mut Session, line: &str) -> bool {
    let command = match parse_command(line) {
        Ok(command) => command,
        Err(message) => {
            println!("{message}");
            return true;
        }
    };

    let msg = match command {
        ShellCommand::Algorithms => {
            println!("{}", render::render_algorithms());
            return true;
        }
        ShellCommand::Help => {
            println!("{HELP}");
            return true;
        }
        ShellCommand::Show => {
            println!("{}", render::render(&session.view()));
            return true;
        }
        ShellCommand::Quit => return false,
        ShellCommand::Empty => return true,
        ShellCommand::Select(algorithm) => Msg::AlgorithmSelected(algorithm),
        ShellCommand::Open(path) => Msg::FilePicked(path.map(UploadedFile::from_path)),
        ShellCommand::Run => Msg::ExecuteClicked,
    };

    if let Some(view) = session.dispatch_msg(msg) {
        println!("{}", render::render(&view));
    }
    true
}

fn spawn_stdin_reader(loop_tx: mpsc::Sender<LoopEvent>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if loop_tx.send(LoopEvent::Input(line)).is_err() {
                return;
            }
        }
        let _ = loop_tx.send(LoopEvent::InputClosed);
    });
}

fn prompt() -> Result<()> {
    print!("mlexec> ");
    io::stdout().flush().context("flushing prompt")
}

#[cfg(test)]
mod tests {
    use mlexec_core::{AlgorithmId, Msg, OutputView, UploadedFile, GUIDANCE_MESSAGE};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::Session;
    use crate::config::AppConfig;

    struct Backend {
        server: MockServer,
        // Keeps the mock server reachable while the session blocks.
        runtime: tokio::runtime::Runtime,
    }

    impl Backend {
        fn start() -> Self {
            let runtime = tokio::runtime::Runtime::new().unwrap();
            let server = runtime.block_on(MockServer::start());
            Self { server, runtime }
        }

        fn respond(&self, code: &str, status: u16, body: serde_json::Value) {
            self.runtime.block_on(
                Mock::given(method("POST"))
                    .and(path("/execute"))
                    .and(body_string_contains(code))
                    .respond_with(ResponseTemplate::new(status).set_body_json(body))
                    .mount(&self.server),
            );
        }

        fn config(&self) -> AppConfig {
            AppConfig {
                origin: self.server.uri(),
                ..AppConfig::default()
            }
        }
    }

    fn dataset(dir: &TempDir) -> UploadedFile {
        let path = dir.path().join("enjoysport.csv");
        std::fs::write(&path, "sky,temp,enjoy\nsunny,warm,yes\n").unwrap();
        UploadedFile::from_path(path)
    }

    fn run(session: &mut Session, algorithm: AlgorithmId, file: UploadedFile) -> OutputView {
        session.dispatch_msg(Msg::AlgorithmSelected(algorithm));
        session.dispatch_msg(Msg::FilePicked(Some(file)));
        session.dispatch_msg(Msg::ExecuteClicked);
        session.wait_until_settled();
        session.view().output
    }

    #[test]
    fn find_s_round_trip_through_mock_backend() {
        let backend = Backend::start();
        backend.respond(
            "FIND-S",
            200,
            json!({"output": {"message": "done", "hypothesis": ["x", "y"]}}),
        );
        let dir = TempDir::new().unwrap();
        let mut session = Session::new(&backend.config()).unwrap();

        let output = run(&mut session, AlgorithmId::FindS, dataset(&dir));

        assert_eq!(
            output,
            OutputView::FindS {
                message: "\"done\"".to_string(),
                hypothesis: "[\"x\",\"y\"]".to_string(),
            }
        );
        assert_eq!(session.view().preview, "sky,temp,enjoy\nsunny,warm,yes\n");
    }

    #[test]
    fn id3_round_trip_builds_image_reference() {
        let backend = Backend::start();
        backend.respond(
            "ID3_algorithm",
            200,
            json!({"output": {"message": "tree built", "image_url": "static/tree.png"}}),
        );
        let dir = TempDir::new().unwrap();
        let mut session = Session::new(&backend.config()).unwrap();

        let output = run(&mut session, AlgorithmId::Id3, dataset(&dir));

        assert_eq!(
            output,
            OutputView::Id3 {
                heading: "tree built".to_string(),
                image_ref: Some(format!("{}/static/tree.png", backend.server.uri())),
            }
        );
    }

    #[test]
    fn backend_error_becomes_fixed_notice() {
        let backend = Backend::start();
        backend.respond(
            "candidate-elimination",
            500,
            json!({"output": "Error: boom"}),
        );
        let dir = TempDir::new().unwrap();
        let mut session = Session::new(&backend.config()).unwrap();

        let output = run(&mut session, AlgorithmId::CandidateElimination, dataset(&dir));

        assert_eq!(
            output,
            OutputView::Notice {
                text: "Error executing code.".to_string()
            }
        );
    }

    #[test]
    fn execute_without_file_never_reaches_backend() {
        let backend = Backend::start();
        backend.runtime.block_on(
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(200))
                .expect(0)
                .mount(&backend.server),
        );
        let mut session = Session::new(&backend.config()).unwrap();

        session.dispatch_msg(Msg::AlgorithmSelected(AlgorithmId::FindS));
        let view = session.dispatch_msg(Msg::ExecuteClicked).expect("state changed");

        assert!(!view.in_flight);
        assert_eq!(
            view.output,
            OutputView::Notice {
                text: GUIDANCE_MESSAGE.to_string()
            }
        );
        backend.runtime.block_on(backend.server.verify());
    }
}
