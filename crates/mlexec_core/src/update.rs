use crate::{AppState, Effect, Msg, GUIDANCE_MESSAGE};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::AlgorithmSelected(algorithm) => {
            state.select(algorithm);
            Vec::new()
        }
        Msg::FilePicked(None) => Vec::new(),
        Msg::FilePicked(Some(file)) => {
            let generation = state.replace_file(file.clone());
            vec![Effect::DecodePreview { generation, file }]
        }
        Msg::PreviewDecoded { generation, result } => {
            state.apply_preview(generation, result);
            Vec::new()
        }
        Msg::ExecuteClicked => match state.begin_submission() {
            Some((request_id, submission)) => vec![Effect::SubmitExecution {
                request_id,
                submission,
            }],
            None => {
                state.set_notice(GUIDANCE_MESSAGE);
                Vec::new()
            }
        },
        Msg::ExecutionFinished {
            request_id,
            outcome,
        } => {
            state.apply_outcome(request_id, outcome);
            Vec::new()
        }
    };

    (state, effects)
}
