use engine_logging::engine_info;

use crate::conversation::QueryOutcome;
use crate::ingestion::UploadOutcome;
use crate::{AppState, Effect, Msg, Notification};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FileSelected(file) => {
            state.ingestion_mut().select_file(file);
            state.mark_dirty();
            Vec::new()
        }
        Msg::UploadClicked => match state.ingestion_mut().submit_upload() {
            Some(effect) => {
                state.mark_dirty();
                vec![effect]
            }
            None => Vec::new(),
        },
        Msg::DraftChanged(text) => {
            if state.conversation_mut().update_draft(text) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::QuerySubmitted => match state.conversation_mut().submit_query() {
            Some(effect) => {
                state.mark_dirty();
                vec![effect]
            }
            None => Vec::new(),
        },
        Msg::UploadFinished { request_id, result } => {
            match state.ingestion_mut().finish_upload(request_id, result) {
                Some(UploadOutcome::Succeeded { ingested, message }) => {
                    engine_info!(
                        "Document {} ingested (handle: {:?})",
                        ingested.file_name,
                        ingested.document
                    );
                    state.conversation_mut().document_ingested(ingested.document);
                    state.mark_dirty();
                    vec![Effect::Notify(Notification::info(message))]
                }
                Some(UploadOutcome::Failed(failure)) => {
                    state.mark_dirty();
                    vec![Effect::Notify(Notification::error(failure.user_message()))]
                }
                None => Vec::new(),
            }
        }
        Msg::QueryFinished { request_id, result } => {
            match state.conversation_mut().finish_query(request_id, result) {
                Some(QueryOutcome::Answered) => {
                    state.mark_dirty();
                    Vec::new()
                }
                Some(QueryOutcome::Failed(failure)) => {
                    state.mark_dirty();
                    vec![Effect::Notify(Notification::error(failure.user_message()))]
                }
                None => Vec::new(),
            }
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
