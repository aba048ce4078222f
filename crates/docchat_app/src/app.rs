use std::io::{self, BufRead, Write};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc};
use std::thread;

use docchat_core::{update, AppState, Msg, SelectedFile, UploadStatus};
use docchat_engine::{load_attachment, EngineHandle, ServiceSettings};
use engine_logging::{engine_info, engine_warn};

use crate::effects::EffectRunner;
use crate::input::{parse_line, Command};
use crate::render::Renderer;

const STILL_WAITING: &str = "Still waiting for the previous answer; question not sent.";

/// Everything the dispatcher thread reacts to.
pub enum AppEvent {
    Command(Command),
    Msg(Msg),
    InputClosed,
}

pub fn run(settings: ServiceSettings, initial_file: Option<PathBuf>) -> anyhow::Result<()> {
    engine_info!("Starting docchat against {}", settings.base_url);
    let engine = Arc::new(EngineHandle::new(settings)?);
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>();
    let runner = EffectRunner::new(engine, event_tx.clone());
    let mut session = Session::new(runner, Renderer::new(io::stdout()));

    session.show_status()?;
    if let Some(path) = initial_file {
        session.open(&path)?;
    }
    spawn_input_reader(event_tx);

    let mut input_open = true;
    for event in event_rx {
        match event {
            AppEvent::Command(command) => {
                if session.handle_command(command)?.is_break() {
                    break;
                }
            }
            AppEvent::Msg(msg) => session.dispatch(msg)?,
            AppEvent::InputClosed => input_open = false,
        }
        // Piped input ends early; finish outstanding requests before leaving.
        if !input_open && !session.is_busy() {
            break;
        }
    }
    engine_info!("Session ended");
    Ok(())
}

fn spawn_input_reader(event_tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    engine_warn!("Failed to read input: {}", err);
                    break;
                }
            };
            if event_tx.send(AppEvent::Command(parse_line(&line))).is_err() {
                return;
            }
        }
        let _ = event_tx.send(AppEvent::InputClosed);
    });
}

/// Owns the state on the dispatcher thread.
pub(crate) struct Session<W: Write> {
    state: AppState,
    runner: EffectRunner,
    renderer: Renderer<W>,
}

impl<W: Write> Session<W> {
    pub fn new(runner: EffectRunner, renderer: Renderer<W>) -> Self {
        Self {
            state: AppState::new(),
            runner,
            renderer,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.state.ingestion().status() == UploadStatus::Uploading
            || self.state.conversation().is_pending()
    }

    pub fn dispatch(&mut self, msg: Msg) -> io::Result<()> {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let notifications = self.runner.run(effects);
        let was_dirty = state.consume_dirty();
        let view = state.view();
        self.state = state;

        if was_dirty {
            self.renderer.render(&view)?;
        }
        for notification in &notifications {
            self.renderer.alert(notification)?;
        }
        Ok(())
    }

    pub fn handle_command(&mut self, command: Command) -> io::Result<ControlFlow<()>> {
        match command {
            Command::Open(path) => self.open(&path)?,
            Command::Upload => self.dispatch(Msg::UploadClicked)?,
            Command::Draft(text) => self.dispatch(Msg::DraftChanged(text))?,
            Command::Send => self.dispatch(Msg::QuerySubmitted)?,
            // The draft belongs to the outstanding question until it settles.
            Command::Ask(_) if self.state.conversation().is_pending() => {
                self.renderer.message(STILL_WAITING)?;
            }
            Command::Ask(text) => {
                self.dispatch(Msg::DraftChanged(text))?;
                self.dispatch(Msg::QuerySubmitted)?;
            }
            Command::Status => self.show_status()?,
            Command::Help => self.renderer.help()?,
            Command::Quit => return Ok(ControlFlow::Break(())),
            Command::Invalid(reason) => self.renderer.message(&reason)?,
            Command::Empty => {}
        }
        Ok(ControlFlow::Continue(()))
    }

    pub fn open(&mut self, path: &Path) -> io::Result<()> {
        match load_attachment(path) {
            Ok(attachment) => self.dispatch(Msg::FileSelected(SelectedFile::new(
                attachment.file_name,
                attachment.media_type,
                attachment.bytes,
            ))),
            Err(err) => {
                engine_warn!("Could not open {:?}: {}", path, err);
                self.renderer.message(&err.to_string())
            }
        }
    }

    pub fn show_status(&mut self) -> io::Result<()> {
        self.renderer.render_full(&self.state.view())
    }

    #[cfg(test)]
    fn output(&self) -> &W {
        self.renderer.get_ref()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Mutex;
    use std::time::Duration;

    use docchat_engine::{Answer, Attachment, DocumentService, ServiceError, UploadReceipt};
    use tempfile::TempDir;

    use super::*;

    const WAIT: Duration = Duration::from_secs(5);

    /// Records every request; queries fail until something was uploaded.
    #[derive(Default)]
    struct FakeService {
        uploads: Mutex<Vec<String>>,
        questions: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl DocumentService for FakeService {
        async fn upload(&self, attachment: &Attachment) -> Result<UploadReceipt, ServiceError> {
            self.uploads.lock().unwrap().push(attachment.file_name.clone());
            Ok(UploadReceipt {
                message: "you are ready for chat!".to_string(),
                document_id: None,
                fingerprint: "abcdef0123456789".to_string(),
            })
        }

        async fn query(
            &self,
            question: &str,
            _document_id: Option<&str>,
        ) -> Result<Answer, ServiceError> {
            self.questions.lock().unwrap().push(question.to_string());
            if self.uploads.lock().unwrap().is_empty() {
                return Err(ServiceError {
                    kind: docchat_engine::FailureKind::NoDocument,
                    message: "400 Bad Request".to_string(),
                });
            }
            Ok(Answer {
                response: format!("answer to {question}"),
            })
        }
    }

    struct Harness {
        session: Session<Vec<u8>>,
        events: mpsc::Receiver<AppEvent>,
        service: Arc<FakeService>,
    }

    impl Harness {
        fn new() -> Self {
            let service = Arc::new(FakeService::default());
            let engine = Arc::new(EngineHandle::with_service(service.clone()).unwrap());
            let (event_tx, events) = mpsc::channel();
            let runner = EffectRunner::new(engine, event_tx);
            Self {
                session: Session::new(runner, Renderer::new(Vec::new())),
                events,
                service,
            }
        }

        fn command(&mut self, command: Command) {
            let flow = self.session.handle_command(command).unwrap();
            assert!(flow.is_continue());
        }

        /// Feeds completions back until nothing is outstanding.
        fn settle(&mut self) {
            while self.session.is_busy() {
                match self.events.recv_timeout(WAIT).expect("completion") {
                    AppEvent::Msg(msg) => self.session.dispatch(msg).unwrap(),
                    AppEvent::Command(_) | AppEvent::InputClosed => {}
                }
            }
        }

        fn output(&self) -> String {
            String::from_utf8(self.session.output().clone()).unwrap()
        }
    }

    #[test]
    fn question_before_upload_asks_for_a_pdf() {
        let mut harness = Harness::new();
        harness.command(Command::Ask("What is this about?".to_string()));
        harness.settle();

        let output = harness.output();
        assert!(output.contains("[!] Upload a PDF first."));
        assert_eq!(
            harness.session.state.conversation().draft(),
            "What is this about?"
        );
        assert!(harness.session.state.conversation().transcript().is_empty());
    }

    #[test]
    fn open_upload_and_ask() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("doc.pdf");
        fs::write(&path, b"%PDF-1.4").unwrap();

        let mut harness = Harness::new();
        harness.command(Command::Open(path));
        harness.command(Command::Upload);
        harness.command(Command::Upload);
        harness.settle();

        harness.command(Command::Ask("Summarize section 1".to_string()));
        harness.command(Command::Send);
        harness.settle();

        assert_eq!(*harness.service.uploads.lock().unwrap(), vec!["doc.pdf"]);
        assert_eq!(
            *harness.service.questions.lock().unwrap(),
            vec!["Summarize section 1"]
        );
        let output = harness.output();
        assert!(output.contains("[i] you are ready for chat!"));
        assert!(output.contains("bot> answer to Summarize section 1"));
        assert_eq!(harness.session.state.conversation().draft(), "");
    }

    #[test]
    fn missing_file_is_reported_without_state_change() {
        let temp = TempDir::new().unwrap();
        let mut harness = Harness::new();
        harness.command(Command::Open(temp.path().join("absent.pdf")));

        assert!(harness.output().contains("cannot read"));
        assert!(harness.session.state.ingestion().selected_file().is_none());
    }

    #[test]
    fn asking_while_pending_keeps_the_outstanding_draft() {
        let mut harness = Harness::new();
        harness.command(Command::Ask("first question".to_string()));
        harness.command(Command::Ask("second question".to_string()));
        harness.settle();

        assert!(harness.output().contains(STILL_WAITING));
        assert_eq!(
            *harness.service.questions.lock().unwrap(),
            vec!["first question"]
        );
        assert_eq!(
            harness.session.state.conversation().draft(),
            "first question"
        );
    }

    #[test]
    fn quit_breaks_the_loop() {
        let mut harness = Harness::new();
        let flow = harness.session.handle_command(Command::Quit).unwrap();
        assert!(flow.is_break());
    }
}
