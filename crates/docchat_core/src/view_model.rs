use crate::{DocumentId, IngestedDocument, Turn, UploadStatus};

/// Immutable snapshot handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub ingestion: IngestionView,
    pub conversation: ConversationView,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IngestionView {
    pub selected_file: Option<SelectedFileView>,
    pub status: UploadStatus,
    pub ingested: Option<IngestedDocument>,
    pub can_upload: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFileView {
    pub name: String,
    pub media_type: String,
    pub byte_len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConversationView {
    pub draft: String,
    pub pending: bool,
    pub pending_question: Option<String>,
    pub turns: Vec<Turn>,
    pub document: Option<DocumentId>,
    pub can_send: bool,
}
