//! Docchat core: pure session state machine and view-model helpers.
mod conversation;
mod effect;
mod ingestion;
mod msg;
mod state;
mod types;
mod update;
mod view_model;

pub use conversation::ConversationController;
pub use effect::{Effect, Notification, Severity};
pub use ingestion::{IngestionController, UploadStatus};
pub use msg::Msg;
pub use state::AppState;
pub use types::{
    DocumentId, IngestedDocument, QueryFailure, RequestId, SelectedFile, Turn, UploadFailure,
    UploadReceipt, NO_DOCUMENT_TEXT, QUERY_FAILED_TEXT, UPLOAD_FAILED_TEXT,
};
pub use update::update;
pub use view_model::{AppViewModel, ConversationView, IngestionView, SelectedFileView};
