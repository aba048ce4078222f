use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use engine_logging::engine_error;

use crate::service::{DocumentService, ReqwestDocumentService, ServiceSettings};
use crate::{Attachment, EngineError, EngineEvent, RequestId};

enum EngineCommand {
    Upload {
        request_id: RequestId,
        attachment: Attachment,
    },
    Query {
        request_id: RequestId,
        question: String,
        document_id: Option<String>,
    },
}

/// Runs service requests on a background tokio runtime.
///
/// Every accepted command produces exactly one completion event. Requests are
/// never cancelled; dropping the handle stops the worker.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Mutex<mpsc::Receiver<EngineEvent>>,
}

impl EngineHandle {
    pub fn new(settings: ServiceSettings) -> Result<Self, EngineError> {
        let service = ReqwestDocumentService::new(settings)?;
        Self::with_service(Arc::new(service))
    }

    pub fn with_service(service: Arc<dyn DocumentService>) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Runtime::new()?;

        thread::Builder::new()
            .name("docchat-engine".to_string())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    let service = service.clone();
                    let event_tx = event_tx.clone();
                    runtime.spawn(async move {
                        let event = handle_command(service.as_ref(), command).await;
                        if event_tx.send(event).is_err() {
                            engine_error!("Engine event dropped: receiver gone");
                        }
                    });
                }
            })?;

        Ok(Self {
            cmd_tx,
            event_rx: Mutex::new(event_rx),
        })
    }

    pub fn upload(&self, request_id: RequestId, attachment: Attachment) -> Result<(), EngineError> {
        self.send(EngineCommand::Upload {
            request_id,
            attachment,
        })
    }

    pub fn query(
        &self,
        request_id: RequestId,
        question: impl Into<String>,
        document_id: Option<String>,
    ) -> Result<(), EngineError> {
        self.send(EngineCommand::Query {
            request_id,
            question: question.into(),
            document_id,
        })
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }

    /// Blocks until the next completion. `None` once the worker is gone.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.recv_timeout(timeout).ok()
    }

    fn send(&self, command: EngineCommand) -> Result<(), EngineError> {
        self.cmd_tx.send(command).map_err(|_| EngineError::Stopped)
    }
}

async fn handle_command(service: &dyn DocumentService, command: EngineCommand) -> EngineEvent {
    match command {
        EngineCommand::Upload {
            request_id,
            attachment,
        } => EngineEvent::UploadCompleted {
            request_id,
            result: service.upload(&attachment).await,
        },
        EngineCommand::Query {
            request_id,
            question,
            document_id,
        } => EngineEvent::QueryCompleted {
            request_id,
            result: service.query(&question, document_id.as_deref()).await,
        },
    }
}
