use std::fmt;
use std::sync::Arc;

/// Identifies one issued request. Allocated per controller, starting at 1.
pub type RequestId = u64;

pub const UPLOAD_FAILED_TEXT: &str = "Failed to upload file";
pub const NO_DOCUMENT_TEXT: &str = "Upload a PDF first.";
pub const QUERY_FAILED_TEXT: &str =
    "Could not get an answer from the service. If you have not uploaded a PDF yet, upload one first.";

/// A document picked by the user, held in memory until it is uploaded.
#[derive(Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub media_type: String,
    pub bytes: Arc<[u8]>,
}

impl SelectedFile {
    pub fn new(
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }
}

// File contents stay out of debug output and logs.
impl fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedFile")
            .field("name", &self.name)
            .field("media_type", &self.media_type)
            .field("byte_len", &self.bytes.len())
            .finish()
    }
}

/// Service-issued handle for the document the service currently answers from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One question/answer pair of the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub request: String,
    pub response: String,
}

/// Successful `/upload` outcome as reported back to the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    /// Confirmation text, shown to the user verbatim.
    pub message: String,
    pub document: Option<DocumentId>,
    /// Hex digest of the uploaded bytes.
    pub fingerprint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestedDocument {
    pub file_name: String,
    pub document: Option<DocumentId>,
    pub fingerprint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFailure {
    Service { status: u16 },
    Transport,
    MalformedResponse,
}

impl UploadFailure {
    /// Every upload failure collapses to the same notification text.
    pub fn user_message(&self) -> &'static str {
        UPLOAD_FAILED_TEXT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryFailure {
    /// The service has no ingested document to answer from.
    NoDocument,
    Service { status: u16 },
    Transport,
    MalformedResponse,
}

impl QueryFailure {
    pub fn user_message(&self) -> &'static str {
        match self {
            QueryFailure::NoDocument => NO_DOCUMENT_TEXT,
            QueryFailure::Service { .. }
            | QueryFailure::Transport
            | QueryFailure::MalformedResponse => QUERY_FAILED_TEXT,
        }
    }
}
