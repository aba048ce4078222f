use std::sync::Once;

use docchat_core::{
    update, AppState, Effect, Msg, Notification, QueryFailure, Turn, NO_DOCUMENT_TEXT,
    QUERY_FAILED_TEXT,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn ask(state: AppState, question: &str) -> (AppState, Vec<Effect>) {
    let (state, _) = update(state, Msg::DraftChanged(question.to_string()));
    update(state, Msg::QuerySubmitted)
}

fn answer(state: AppState, request_id: u64, response: &str) -> AppState {
    let (state, effects) = update(
        state,
        Msg::QueryFinished {
            request_id,
            result: Ok(response.to_string()),
        },
    );
    assert!(effects.is_empty());
    state
}

#[test]
fn blank_drafts_issue_nothing() {
    init_logging();
    for draft in ["", " ", "\t\n  "] {
        let (state, effects) = ask(AppState::new(), draft);
        assert!(effects.is_empty());
        let view = state.view().conversation;
        assert!(view.turns.is_empty());
        assert!(!view.pending);
        assert!(!view.can_send);
    }
}

#[test]
fn submit_sends_literal_draft_and_sets_pending() {
    init_logging();
    let (state, effects) = ask(AppState::new(), "  What is this about? ");

    assert_eq!(
        effects,
        vec![Effect::Query {
            request_id: 1,
            question: "  What is this about? ".to_string(),
            document: None,
        }]
    );
    let view = state.view().conversation;
    assert!(view.pending);
    assert!(!view.can_send);
    assert_eq!(view.draft, "  What is this about? ");
    assert_eq!(
        view.pending_question.as_deref(),
        Some("  What is this about? ")
    );
}

#[test]
fn submissions_while_pending_are_dropped() {
    init_logging();
    let (mut state, effects) = ask(AppState::new(), "first");
    assert_eq!(effects.len(), 1);

    for _ in 0..10 {
        let (next, effects) = update(state, Msg::QuerySubmitted);
        assert!(effects.is_empty());
        state = next;
    }
    let (state, effects) = ask(state, "second");
    assert!(effects.is_empty());
    assert_eq!(state.conversation().in_flight_request(), Some(1));

    let state = answer(state, 1, "one");
    assert_eq!(
        state.view().conversation.turns,
        vec![Turn {
            request: "first".to_string(),
            response: "one".to_string(),
        }]
    );
}

#[test]
fn success_appends_turn_and_clears_draft() {
    init_logging();
    let (state, _) = ask(AppState::new(), "Summarize section 1");
    let state = answer(state, 1, "Section 1 covers...");

    let view = state.view().conversation;
    assert_eq!(
        view.turns,
        vec![Turn {
            request: "Summarize section 1".to_string(),
            response: "Section 1 covers...".to_string(),
        }]
    );
    assert_eq!(view.draft, "");
    assert!(!view.pending);
}

#[test]
fn transcript_is_append_only_in_submission_order() {
    init_logging();
    let mut state = AppState::new();
    let mut expected = Vec::new();

    for n in 1..=4u64 {
        let question = format!("question {n}");
        let response = format!("answer {n}");
        let (next, effects) = ask(state, &question);
        assert_eq!(effects.len(), 1);
        state = answer(next, n, &response);

        expected.push(Turn {
            request: question,
            response,
        });
        assert_eq!(state.conversation().transcript(), expected.as_slice());
    }

    // A failure in between leaves earlier turns untouched.
    let (state, _) = ask(state, "question 5");
    let (state, _) = update(
        state,
        Msg::QueryFinished {
            request_id: 5,
            result: Err(QueryFailure::Transport),
        },
    );
    assert_eq!(state.conversation().transcript(), expected.as_slice());
}

#[test]
fn failure_preserves_draft_and_transcript() {
    init_logging();
    let (state, _) = ask(AppState::new(), "What is this about?");
    let (state, effects) = update(
        state,
        Msg::QueryFinished {
            request_id: 1,
            result: Err(QueryFailure::NoDocument),
        },
    );

    assert_eq!(
        effects,
        vec![Effect::Notify(Notification::error(NO_DOCUMENT_TEXT))]
    );
    let view = state.view().conversation;
    assert!(view.turns.is_empty());
    assert_eq!(view.draft, "What is this about?");
    assert!(!view.pending);
    assert!(view.can_send);
}

#[test]
fn generic_failures_use_the_fallback_message() {
    init_logging();
    for failure in [
        QueryFailure::Service { status: 503 },
        QueryFailure::Transport,
        QueryFailure::MalformedResponse,
    ] {
        let (state, _) = ask(AppState::new(), "hello");
        let (state, effects) = update(
            state,
            Msg::QueryFinished {
                request_id: 1,
                result: Err(failure),
            },
        );
        assert_eq!(
            effects,
            vec![Effect::Notify(Notification::error(QUERY_FAILED_TEXT))]
        );
        assert!(!state.view().conversation.pending);
    }
}

#[test]
fn retry_after_failure_resends_preserved_draft() {
    init_logging();
    let (state, _) = ask(AppState::new(), "retry me");
    let (state, _) = update(
        state,
        Msg::QueryFinished {
            request_id: 1,
            result: Err(QueryFailure::Transport),
        },
    );
    let (_state, effects) = update(state, Msg::QuerySubmitted);

    assert_eq!(
        effects,
        vec![Effect::Query {
            request_id: 2,
            question: "retry me".to_string(),
            document: None,
        }]
    );
}

#[test]
fn answer_is_recorded_against_question_at_submit_time() {
    init_logging();
    let (state, _) = ask(AppState::new(), "original");
    let (state, _) = update(state, Msg::DraftChanged("edited while waiting".to_string()));
    let state = answer(state, 1, "reply");

    assert_eq!(state.view().conversation.turns[0].request, "original");
}

#[test]
fn stale_query_settlement_is_ignored() {
    init_logging();
    let (mut state, _) = ask(AppState::new(), "hello");
    assert!(state.consume_dirty());

    let (mut state, effects) = update(
        state,
        Msg::QueryFinished {
            request_id: 42,
            result: Ok("nope".to_string()),
        },
    );
    assert!(effects.is_empty());
    assert!(state.view().conversation.pending);
    assert!(state.view().conversation.turns.is_empty());
    assert!(!state.consume_dirty());
}

#[test]
fn unchanged_draft_does_not_mark_dirty() {
    init_logging();
    let (mut state, _) = update(AppState::new(), Msg::DraftChanged("same".to_string()));
    assert!(state.consume_dirty());

    let (mut state, _) = update(state, Msg::DraftChanged("same".to_string()));
    assert!(!state.consume_dirty());
}
