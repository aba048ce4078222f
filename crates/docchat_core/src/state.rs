use crate::view_model::AppViewModel;
use crate::{ConversationController, IngestionController};

/// Both controllers side by side. They share nothing; `update` is the only
/// place that passes information from one to the other.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    ingestion: IngestionController,
    conversation: ConversationController,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ingestion(&self) -> &IngestionController {
        &self.ingestion
    }

    pub fn conversation(&self) -> &ConversationController {
        &self.conversation
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            ingestion: self.ingestion.view(),
            conversation: self.conversation.view(),
        }
    }

    /// Returns whether anything changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn ingestion_mut(&mut self) -> &mut IngestionController {
        &mut self.ingestion
    }

    pub(crate) fn conversation_mut(&mut self) -> &mut ConversationController {
        &mut self.conversation
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
