use engine_logging::{engine_debug, engine_info, engine_warn};

use crate::view_model::{IngestionView, SelectedFileView};
use crate::{Effect, IngestedDocument, RequestId, SelectedFile, UploadFailure, UploadReceipt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadStatus {
    #[default]
    Idle,
    Uploading,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct InFlightUpload {
    request_id: RequestId,
    file_name: String,
}

/// Result of settling the in-flight upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum UploadOutcome {
    Succeeded {
        ingested: IngestedDocument,
        message: String,
    },
    Failed(UploadFailure),
}

/// Owns the selected document and the upload lifecycle.
///
/// `Uploading` holds exactly while one upload request is outstanding; a second
/// submit during that time is refused here, not only by a disabled control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionController {
    selected: Option<SelectedFile>,
    status: UploadStatus,
    in_flight: Option<InFlightUpload>,
    ingested: Option<IngestedDocument>,
    next_request_id: RequestId,
}

impl Default for IngestionController {
    fn default() -> Self {
        Self {
            selected: None,
            status: UploadStatus::Idle,
            in_flight: None,
            ingested: None,
            next_request_id: 1,
        }
    }
}

impl IngestionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> UploadStatus {
        self.status
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    pub fn in_flight_request(&self) -> Option<RequestId> {
        self.in_flight.as_ref().map(|upload| upload.request_id)
    }

    /// Replaces the selection unconditionally. A settled status returns to
    /// `Idle`; an outstanding upload keeps `Uploading` until it settles.
    pub fn select_file(&mut self, file: SelectedFile) {
        engine_info!(
            "File selected name={} media_type={} bytes={}",
            file.name,
            file.media_type,
            file.byte_len()
        );
        self.selected = Some(file);
        if self.status != UploadStatus::Uploading {
            self.status = UploadStatus::Idle;
        }
    }

    /// Issues the upload effect for the current selection, if allowed.
    pub fn submit_upload(&mut self) -> Option<Effect> {
        if self.status == UploadStatus::Uploading {
            engine_debug!(
                "Upload refused: request {:?} still outstanding",
                self.in_flight_request()
            );
            return None;
        }
        let Some(file) = self.selected.clone() else {
            engine_info!("Upload ignored: no file selected");
            return None;
        };

        let request_id = self.next_request_id;
        self.next_request_id += 1;
        self.status = UploadStatus::Uploading;
        self.in_flight = Some(InFlightUpload {
            request_id,
            file_name: file.name.clone(),
        });
        Some(Effect::Upload { request_id, file })
    }

    pub(crate) fn finish_upload(
        &mut self,
        request_id: RequestId,
        result: Result<UploadReceipt, UploadFailure>,
    ) -> Option<UploadOutcome> {
        let in_flight = match self.in_flight.take() {
            Some(upload) if upload.request_id == request_id => upload,
            other => {
                engine_warn!(
                    "Ignoring settlement for upload {} (outstanding: {:?})",
                    request_id,
                    other.as_ref().map(|upload| upload.request_id)
                );
                self.in_flight = other;
                return None;
            }
        };

        match result {
            Ok(receipt) => {
                self.status = UploadStatus::Succeeded;
                let ingested = IngestedDocument {
                    file_name: in_flight.file_name,
                    document: receipt.document,
                    fingerprint: receipt.fingerprint,
                };
                self.ingested = Some(ingested.clone());
                Some(UploadOutcome::Succeeded {
                    ingested,
                    message: receipt.message,
                })
            }
            Err(failure) => {
                engine_warn!(
                    "Upload {} of {} failed: {:?}",
                    request_id,
                    in_flight.file_name,
                    failure
                );
                self.status = UploadStatus::Failed;
                Some(UploadOutcome::Failed(failure))
            }
        }
    }

    pub fn view(&self) -> IngestionView {
        IngestionView {
            selected_file: self.selected.as_ref().map(|file| SelectedFileView {
                name: file.name.clone(),
                media_type: file.media_type.clone(),
                byte_len: file.byte_len(),
            }),
            status: self.status,
            ingested: self.ingested.clone(),
            can_upload: self.selected.is_some() && self.status != UploadStatus::Uploading,
        }
    }
}
