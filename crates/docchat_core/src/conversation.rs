use engine_logging::{engine_debug, engine_warn};

use crate::view_model::ConversationView;
use crate::{DocumentId, Effect, QueryFailure, RequestId, Turn};

#[derive(Debug, Clone, PartialEq, Eq)]
struct InFlightQuery {
    request_id: RequestId,
    question: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum QueryOutcome {
    Answered,
    Failed(QueryFailure),
}

/// Owns the draft, the append-only transcript and the single in-flight query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationController {
    draft: String,
    transcript: Vec<Turn>,
    in_flight: Option<InFlightQuery>,
    document: Option<DocumentId>,
    next_request_id: RequestId,
}

impl Default for ConversationController {
    fn default() -> Self {
        Self {
            draft: String::new(),
            transcript: Vec::new(),
            in_flight: None,
            document: None,
            next_request_id: 1,
        }
    }
}

impl ConversationController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight_request(&self) -> Option<RequestId> {
        self.in_flight.as_ref().map(|query| query.request_id)
    }

    /// Returns whether the draft changed.
    pub fn update_draft(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        if self.draft == text {
            return false;
        }
        self.draft = text;
        true
    }

    /// Records the handle of the most recently ingested document. `None`
    /// means the service issued no handle, which also invalidates an old one.
    pub fn document_ingested(&mut self, document: Option<DocumentId>) {
        self.document = document;
    }

    /// Issues the query effect for the current draft. Blank drafts and
    /// submissions while a query is outstanding are dropped, not queued.
    pub fn submit_query(&mut self) -> Option<Effect> {
        if self.draft.trim().is_empty() {
            return None;
        }
        if let Some(query) = &self.in_flight {
            engine_debug!("Query dropped: request {} still outstanding", query.request_id);
            return None;
        }

        let request_id = self.next_request_id;
        self.next_request_id += 1;
        let question = self.draft.clone();
        self.in_flight = Some(InFlightQuery {
            request_id,
            question: question.clone(),
        });
        Some(Effect::Query {
            request_id,
            question,
            document: self.document.clone(),
        })
    }

    pub(crate) fn finish_query(
        &mut self,
        request_id: RequestId,
        result: Result<String, QueryFailure>,
    ) -> Option<QueryOutcome> {
        let in_flight = match self.in_flight.take() {
            Some(query) if query.request_id == request_id => query,
            other => {
                engine_warn!(
                    "Ignoring settlement for query {} (outstanding: {:?})",
                    request_id,
                    other.as_ref().map(|query| query.request_id)
                );
                self.in_flight = other;
                return None;
            }
        };

        match result {
            Ok(response) => {
                self.transcript.push(Turn {
                    request: in_flight.question,
                    response,
                });
                self.draft.clear();
                Some(QueryOutcome::Answered)
            }
            Err(failure) => {
                engine_warn!("Query {} failed: {:?}", request_id, failure);
                Some(QueryOutcome::Failed(failure))
            }
        }
    }

    pub fn view(&self) -> ConversationView {
        ConversationView {
            draft: self.draft.clone(),
            pending: self.is_pending(),
            pending_question: self.in_flight.as_ref().map(|query| query.question.clone()),
            turns: self.transcript.clone(),
            document: self.document.clone(),
            can_send: !self.is_pending() && !self.draft.trim().is_empty(),
        }
    }
}
