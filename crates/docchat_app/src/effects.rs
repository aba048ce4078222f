use std::sync::{mpsc, Arc};
use std::thread;

use docchat_core::{
    DocumentId, Effect, Msg, Notification, QueryFailure, UploadFailure, UploadReceipt,
};
use docchat_engine::{Attachment, EngineEvent, EngineHandle, FailureKind, ServiceError};
use engine_logging::{engine_error, engine_info, engine_warn};

use crate::app::AppEvent;

/// Hands request effects to the engine and feeds completions back as messages.
pub struct EffectRunner {
    engine: Arc<EngineHandle>,
    event_tx: mpsc::Sender<AppEvent>,
}

impl EffectRunner {
    pub fn new(engine: Arc<EngineHandle>, event_tx: mpsc::Sender<AppEvent>) -> Self {
        let runner = Self { engine, event_tx };
        runner.spawn_event_loop();
        runner
    }

    /// Starts every request effect and returns the notifications to show.
    pub fn run(&self, effects: Vec<Effect>) -> Vec<Notification> {
        let mut notifications = Vec::new();
        for effect in effects {
            match effect {
                Effect::Upload { request_id, file } => {
                    engine_info!(
                        "Upload request_id={} file={} bytes={}",
                        request_id,
                        file.name,
                        file.byte_len()
                    );
                    let attachment = Attachment {
                        file_name: file.name.clone(),
                        media_type: file.media_type.clone(),
                        bytes: file.bytes.to_vec(),
                    };
                    if let Err(err) = self.engine.upload(request_id, attachment) {
                        engine_error!("Upload {} not started: {}", request_id, err);
                        self.settle_locally(Msg::UploadFinished {
                            request_id,
                            result: Err(UploadFailure::Transport),
                        });
                    }
                }
                Effect::Query {
                    request_id,
                    question,
                    document,
                } => {
                    engine_info!(
                        "Query request_id={} question_len={}",
                        request_id,
                        question.len()
                    );
                    let document_id = document.map(|id| id.as_str().to_string());
                    if let Err(err) = self.engine.query(request_id, question, document_id) {
                        engine_error!("Query {} not started: {}", request_id, err);
                        self.settle_locally(Msg::QueryFinished {
                            request_id,
                            result: Err(QueryFailure::Transport),
                        });
                    }
                }
                Effect::Notify(notification) => notifications.push(notification),
            }
        }
        notifications
    }

    // Delivered through the channel so the settlement still arrives after
    // the current dispatch, like a real completion.
    fn settle_locally(&self, msg: Msg) {
        let _ = self.event_tx.send(AppEvent::Msg(msg));
    }

    fn spawn_event_loop(&self) {
        let engine = self.engine.clone();
        let event_tx = self.event_tx.clone();
        thread::spawn(move || {
            while let Some(event) = engine.recv() {
                if event_tx.send(AppEvent::Msg(map_event(event))).is_err() {
                    break;
                }
            }
        });
    }
}

pub(crate) fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::UploadCompleted { request_id, result } => Msg::UploadFinished {
            request_id,
            result: result
                .map(|receipt| UploadReceipt {
                    message: receipt.message,
                    document: receipt.document_id.map(DocumentId::new),
                    fingerprint: Some(receipt.fingerprint),
                })
                .map_err(|err| {
                    engine_warn!("Upload {} failed: {}", request_id, err);
                    map_upload_error(&err)
                }),
        },
        EngineEvent::QueryCompleted { request_id, result } => Msg::QueryFinished {
            request_id,
            result: result.map(|answer| answer.response).map_err(|err| {
                engine_warn!("Query {} failed: {}", request_id, err);
                map_query_error(&err)
            }),
        },
    }
}

fn map_upload_error(err: &ServiceError) -> UploadFailure {
    match err.kind {
        FailureKind::HttpStatus(status) => UploadFailure::Service { status },
        FailureKind::MalformedResponse | FailureKind::TooLarge { .. } => {
            UploadFailure::MalformedResponse
        }
        FailureKind::InvalidUrl
        | FailureKind::NoDocument
        | FailureKind::Timeout
        | FailureKind::Network => UploadFailure::Transport,
    }
}

fn map_query_error(err: &ServiceError) -> QueryFailure {
    match err.kind {
        FailureKind::NoDocument => QueryFailure::NoDocument,
        FailureKind::HttpStatus(status) => QueryFailure::Service { status },
        FailureKind::MalformedResponse | FailureKind::TooLarge { .. } => {
            QueryFailure::MalformedResponse
        }
        FailureKind::InvalidUrl | FailureKind::Timeout | FailureKind::Network => {
            QueryFailure::Transport
        }
    }
}
