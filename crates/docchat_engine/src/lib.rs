//! Docchat engine: remote document service client and effect execution.
mod attachment;
mod classify;
mod engine;
mod service;
mod types;

pub use attachment::{load_attachment, media_type_for, LoadError, PDF_MEDIA_TYPE};
pub use classify::classify_query_failure;
pub use engine::EngineHandle;
pub use service::{DocumentService, ReqwestDocumentService, ServiceSettings, DEFAULT_BASE_URL};
pub use types::{
    Answer, Attachment, EngineError, EngineEvent, FailureKind, RequestId, ServiceError,
    UploadReceipt,
};
