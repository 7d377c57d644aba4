use std::sync::Once;

use reportgen_core::{
    update, AppState, Effect, FileDescriptor, Msg, Phase, PhaseView, Stage, SubmissionError,
    GENERIC_FAILURE_MESSAGE,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(reportgen_logging::initialize_for_tests);
}

fn sample_file() -> FileDescriptor {
    FileDescriptor::from_path("/uploads/notes.txt", 2048)
}

fn with_inputs(file: Option<FileDescriptor>, topic: &str) -> AppState {
    let mut state = AppState::new();
    if let Some(file) = file {
        state = update(state, Msg::FileSelected(file)).0;
    }
    update(state, Msg::TopicChanged(topic.to_string())).0
}

fn submitted() -> (AppState, u64) {
    let state = with_inputs(Some(sample_file()), "  blockchain scalability ");
    let (state, effects) = update(state, Msg::SubmitClicked);
    let request_id = match effects.as_slice() {
        [Effect::SubmitPipeline { request_id, .. }] => *request_id,
        other => panic!("unexpected effects {other:?}"),
    };
    (state, request_id)
}

#[test]
fn submit_gate_covers_all_quadrants() {
    init_logging();
    assert!(!with_inputs(None, "").can_submit());
    assert!(!with_inputs(None, "topic").can_submit());
    assert!(!with_inputs(Some(sample_file()), "   ").can_submit());
    assert!(with_inputs(Some(sample_file()), "topic").can_submit());

    assert!(with_inputs(Some(sample_file()), "topic").view().can_submit);
    assert!(!with_inputs(Some(sample_file()), "\t").view().can_submit);
}

#[test]
fn submit_dispatches_one_request_with_trimmed_topic() {
    init_logging();
    let state = with_inputs(Some(sample_file()), "  blockchain scalability ");

    let (mut next, effects) = update(state, Msg::SubmitClicked);

    assert_eq!(
        effects,
        vec![Effect::SubmitPipeline {
            request_id: 1,
            file: sample_file(),
            topic: "blockchain scalability".to_string(),
        }]
    );
    assert_eq!(*next.phase(), Phase::Submitting);
    assert_eq!(next.in_flight(), Some(1));
    assert!(!next.can_submit());
    assert!(next.view().busy);
    assert!(next.consume_dirty());
}

#[test]
fn submit_without_inputs_is_ignored() {
    init_logging();
    let state = with_inputs(None, "topic");
    let (next, effects) = update(state, Msg::SubmitClicked);

    assert!(effects.is_empty());
    assert_eq!(*next.phase(), Phase::Idle);
}

#[test]
fn second_submit_while_in_flight_is_noop() {
    init_logging();
    let (state, request_id) = submitted();
    let (state, effects) = update(state, Msg::SubmitClicked);
    assert!(effects.is_empty());

    let (state, _) = update(
        state,
        Msg::StageReached {
            request_id,
            stage: Stage::Researching,
        },
    );
    let (state, effects) = update(state, Msg::SubmitClicked);
    assert!(effects.is_empty());
    assert_eq!(*state.phase(), Phase::Stage(Stage::Researching));
    assert_eq!(state.in_flight(), Some(request_id));
}

#[test]
fn stages_only_move_forward() {
    init_logging();
    let (state, request_id) = submitted();
    let stage = |state, stage| update(state, Msg::StageReached { request_id, stage }).0;

    let state = stage(state, Stage::Processing);
    let state = stage(state, Stage::Analyzing);
    let mut state = stage(state, Stage::Researching);

    assert_eq!(*state.phase(), Phase::Stage(Stage::Analyzing));
    assert_eq!(
        state.view().phase,
        PhaseView::Stage {
            index: 3,
            total: 4,
            label: "Analyzing content...",
        }
    );
    assert!(state.consume_dirty());
}

#[test]
fn backend_failure_surfaces_message() {
    init_logging();
    let (state, request_id) = submitted();
    let (state, _) = update(
        state,
        Msg::PipelineFailed {
            request_id,
            error: SubmissionError::backend(Some("rate limited")),
        },
    );

    assert_eq!(
        *state.phase(),
        Phase::Failed(SubmissionError::BackendReported("rate limited".into()))
    );
    assert_eq!(
        state.view().phase,
        PhaseView::Failed {
            message: "rate limited".into()
        }
    );
    assert_eq!(state.in_flight(), None);
}

#[test]
fn backend_failure_without_message_uses_generic_text() {
    assert_eq!(
        SubmissionError::backend(None).message(),
        GENERIC_FAILURE_MESSAGE
    );
    assert_eq!(
        SubmissionError::backend(Some("  ")).message(),
        GENERIC_FAILURE_MESSAGE
    );
}

#[test]
fn transport_failure_ends_in_failed_with_message() {
    init_logging();
    let (state, request_id) = submitted();
    let (state, _) = update(
        state,
        Msg::StageReached {
            request_id,
            stage: Stage::Processing,
        },
    );
    let (state, _) = update(
        state,
        Msg::PipelineFailed {
            request_id,
            error: SubmissionError::Transport("error sending request: connection refused".into()),
        },
    );

    match state.view().phase {
        PhaseView::Failed { message } => assert!(message.contains("connection refused")),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[test]
fn inputs_are_locked_while_in_flight() {
    init_logging();
    let (state, _) = submitted();
    let (state, _) = update(state, Msg::FileCleared);
    let (state, _) = update(state, Msg::TopicChanged(String::new()));
    let (state, effects) = update(
        state,
        Msg::FileSelected(FileDescriptor::from_path("/uploads/other.pdf", 1)),
    );

    assert!(effects.is_empty());
    assert_eq!(state.candidate(), Some(&sample_file()));
    assert_eq!(state.topic(), "  blockchain scalability ");
}

#[test]
fn cancel_returns_to_idle_and_ignores_late_events() {
    init_logging();
    let (state, request_id) = submitted();
    let (state, effects) = update(state, Msg::CancelClicked);

    assert_eq!(effects, vec![Effect::CancelPipeline { request_id }]);
    assert_eq!(*state.phase(), Phase::Idle);
    assert!(state.can_submit());

    let (state, _) = update(
        state,
        Msg::PipelineFailed {
            request_id,
            error: SubmissionError::Transport("late".into()),
        },
    );
    assert_eq!(*state.phase(), Phase::Idle);

    let (_, effects) = update(state, Msg::CancelClicked);
    assert!(effects.is_empty());
}

#[test]
fn resubmit_after_cancel_uses_fresh_request_id() {
    init_logging();
    let (state, first) = submitted();
    let (state, _) = update(state, Msg::CancelClicked);
    let (state, effects) = update(state, Msg::SubmitClicked);
    let second = match effects.as_slice() {
        [Effect::SubmitPipeline { request_id, .. }] => *request_id,
        other => panic!("unexpected effects {other:?}"),
    };
    assert_ne!(first, second);

    let (state, _) = update(
        state,
        Msg::StageReached {
            request_id: first,
            stage: Stage::Writing,
        },
    );
    assert_eq!(*state.phase(), Phase::Submitting);
}
