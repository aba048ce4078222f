use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use docchat_engine::{
    Answer, Attachment, DocumentService, EngineEvent, EngineHandle, FailureKind, ServiceError,
    ServiceSettings, UploadReceipt,
};
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WAIT: Duration = Duration::from_secs(5);

fn pdf() -> Attachment {
    Attachment {
        file_name: "doc.pdf".to_string(),
        media_type: "application/pdf".to_string(),
        bytes: b"%PDF".to_vec(),
    }
}

/// Answers every query with its own question and counts calls.
#[derive(Default)]
struct EchoService {
    queries: AtomicUsize,
}

#[async_trait::async_trait]
impl DocumentService for EchoService {
    async fn upload(&self, attachment: &Attachment) -> Result<UploadReceipt, ServiceError> {
        Ok(UploadReceipt {
            message: format!("got {}", attachment.file_name),
            document_id: Some("doc-1".to_string()),
            fingerprint: "00".to_string(),
        })
    }

    async fn query(
        &self,
        question: &str,
        document_id: Option<&str>,
    ) -> Result<Answer, ServiceError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        Ok(Answer {
            response: format!("{question} @ {}", document_id.unwrap_or("none")),
        })
    }
}

#[test]
fn commands_complete_with_their_request_ids() {
    let service = Arc::new(EchoService::default());
    let engine = EngineHandle::with_service(service.clone()).unwrap();

    engine.upload(1, pdf()).unwrap();
    let event = engine.recv_timeout(WAIT).expect("upload event");
    assert_eq!(
        event,
        EngineEvent::UploadCompleted {
            request_id: 1,
            result: Ok(UploadReceipt {
                message: "got doc.pdf".to_string(),
                document_id: Some("doc-1".to_string()),
                fingerprint: "00".to_string(),
            }),
        }
    );

    engine.query(7, "why?", Some("doc-1".to_string())).unwrap();
    let event = engine.recv_timeout(WAIT).expect("query event");
    assert_eq!(
        event,
        EngineEvent::QueryCompleted {
            request_id: 7,
            result: Ok(Answer {
                response: "why? @ doc-1".to_string(),
            }),
        }
    );
    assert_eq!(service.queries.load(Ordering::SeqCst), 1);
    assert!(engine.try_recv().is_none());
}

#[test]
fn failures_arrive_as_events() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let server = runtime.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({"detail": "no doc"})))
            .mount(&server)
            .await;
        server
    });

    let settings = ServiceSettings::new(Url::parse(&server.uri()).unwrap());
    let engine = EngineHandle::new(settings).unwrap();
    engine.query(3, "anything", None).unwrap();

    match engine.recv_timeout(WAIT).expect("query event") {
        EngineEvent::QueryCompleted { request_id, result } => {
            assert_eq!(request_id, 3);
            assert_eq!(result.unwrap_err().kind, FailureKind::NoDocument);
        }
        other => panic!("unexpected event {other:?}"),
    }
}
