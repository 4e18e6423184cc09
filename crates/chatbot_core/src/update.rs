use crate::{Effect, Msg, SessionState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: SessionState, msg: Msg) -> (SessionState, Vec<Effect>) {
    let effects = match msg {
        Msg::InputChanged(text) => {
            state.set_input(text);
            Vec::new()
        }
        Msg::Submitted => submit(&mut state),
        Msg::FileSelected(file) => {
            state.stage_attachment(file);
            Vec::new()
        }
        Msg::AttachmentCleared => {
            state.clear_attachment();
            Vec::new()
        }
        Msg::AlertDismissed => {
            state.dismiss_alert();
            Vec::new()
        }
        Msg::ResponseArrived { request_id, result } => {
            state.apply_response(request_id, result);
            Vec::new()
        }
        Msg::Tick { now_ms } => state.apply_tick(now_ms),
        Msg::QuitRequested => state.shutdown(),
    };

    (state, effects)
}

fn submit(state: &mut SessionState) -> Vec<Effect> {
    if state.input().trim().is_empty() {
        return Vec::new();
    }
    // One request and one reveal at a time; the user resubmits later.
    if state.is_busy() || state.is_revealing() {
        return Vec::new();
    }

    let (request_id, question, attachment) = state.begin_request();
    match attachment {
        Some(file) => vec![Effect::SendUpload {
            request_id,
            question,
            file,
        }],
        None => vec![Effect::SendChat {
            request_id,
            message: question,
        }],
    }
}
