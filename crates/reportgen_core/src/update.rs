use crate::{AppState, Effect, Msg, Phase};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        // Inputs are locked while a request is in flight so the request
        // always has a valid candidate and topic behind it.
        Msg::FileSelected(_) | Msg::FileCleared | Msg::TopicChanged(_)
            if state.in_flight().is_some() =>
        {
            Vec::new()
        }
        Msg::FileSelected(file) => match state.accept_file(file) {
            Ok(()) => Vec::new(),
            Err(err) => vec![Effect::FileRejected(err)],
        },
        Msg::FileCleared => {
            state.clear_file();
            Vec::new()
        }
        Msg::TopicChanged(topic) => {
            state.set_topic(topic);
            Vec::new()
        }
        Msg::SubmitClicked => {
            if !matches!(state.phase(), Phase::Idle) || !state.can_submit() {
                return (state, Vec::new());
            }
            let (file, topic) = match state.candidate() {
                Some(file) => (file.clone(), state.topic().trim().to_string()),
                None => return (state, Vec::new()),
            };
            let request_id = state.begin_request();
            vec![Effect::SubmitPipeline {
                request_id,
                file,
                topic,
            }]
        }
        Msg::CancelClicked => match state.abandon_request() {
            Some(request_id) => vec![Effect::CancelPipeline { request_id }],
            None => Vec::new(),
        },
        Msg::StageReached { request_id, stage } => {
            if state.is_current(request_id) {
                state.apply_stage(stage);
            }
            Vec::new()
        }
        Msg::PipelineSucceeded { request_id, result } => {
            if state.is_current(request_id) {
                state.finish(Phase::Succeeded(result));
            }
            Vec::new()
        }
        Msg::PipelineFailed { request_id, error } => {
            if state.is_current(request_id) {
                state.finish(Phase::Failed(error));
            }
            Vec::new()
        }
        Msg::ResetClicked => {
            state.reset();
            Vec::new()
        }
        Msg::ExportRequested(format) => state
            .export_artifact(format)
            .map(Effect::SaveArtifact)
            .into_iter()
            .collect(),
        Msg::ViewResultClicked => {
            state.set_overlay(true);
            Vec::new()
        }
        Msg::OverlayClosed | Msg::OverlayClickedOutside => {
            state.set_overlay(false);
            Vec::new()
        }
        Msg::Tick => Vec::new(),
    };

    (state, effects)
}
