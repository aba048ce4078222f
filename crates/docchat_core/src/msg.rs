use crate::{QueryFailure, RequestId, SelectedFile, UploadFailure, UploadReceipt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User picked a document; replaces any previous selection.
    FileSelected(SelectedFile),
    /// User asked to upload the selected document.
    UploadClicked,
    /// User edited the question input.
    DraftChanged(String),
    /// User submitted the current draft as a question.
    QuerySubmitted,
    /// The `/upload` request identified by `request_id` settled.
    UploadFinished {
        request_id: RequestId,
        result: Result<UploadReceipt, UploadFailure>,
    },
    /// The `/query` request identified by `request_id` settled.
    QueryFinished {
        request_id: RequestId,
        result: Result<String, QueryFailure>,
    },
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
