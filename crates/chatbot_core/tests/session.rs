use std::sync::Once;

use chatbot_core::{
    update, AttachedFile, Effect, ErrorKind, Msg, Sender, SessionState,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(chat_logging::initialize_for_tests);
}

fn submit_question(state: SessionState, input: &str) -> (SessionState, Vec<Effect>) {
    let (state, _) = update(state, Msg::InputChanged(input.to_string()));
    update(state, Msg::Submitted)
}

fn respond(state: SessionState, request_id: u64, text: &str) -> (SessionState, Vec<Effect>) {
    update(
        state,
        Msg::ResponseArrived {
            request_id,
            result: Ok(text.to_string()),
        },
    )
}

fn fail(state: SessionState, request_id: u64, kind: ErrorKind) -> (SessionState, Vec<Effect>) {
    update(
        state,
        Msg::ResponseArrived {
            request_id,
            result: Err(kind),
        },
    )
}

fn tick(state: SessionState, now_ms: u64) -> (SessionState, Vec<Effect>) {
    update(state, Msg::Tick { now_ms })
}

fn pdf(name: &str) -> AttachedFile {
    AttachedFile {
        name: name.to_string(),
        mime: "application/pdf".to_string(),
        bytes: b"%PDF-1.4".to_vec(),
    }
}

#[test]
fn empty_input_never_submits() {
    init_logging();
    let state = SessionState::new();

    let (state, effects) = submit_question(state, "");
    assert!(effects.is_empty());
    assert!(state.view().messages.is_empty());

    let (state, effects) = submit_question(state, "   \n  ");
    assert!(effects.is_empty());
    assert!(state.view().messages.is_empty());
    assert!(!state.view().busy);
}

#[test]
fn submit_appends_user_message_and_emits_chat_effect() {
    init_logging();
    let state = SessionState::new();

    let (state, effects) = submit_question(state, "¿Qué es NICSP 1?");
    let view = state.view();

    assert_eq!(view.messages.len(), 1);
    assert_eq!(view.messages[0].sender, Sender::User);
    assert_eq!(view.messages[0].text, "¿Qué es NICSP 1?");
    assert_eq!(view.messages[0].attachment_name, None);
    assert!(view.busy);
    assert!(view.input.is_empty());
    assert_eq!(
        effects,
        vec![Effect::SendChat {
            request_id: 1,
            message: "¿Qué es NICSP 1?".to_string(),
        }]
    );
}

#[test]
fn response_is_revealed_and_ends_verbatim() {
    init_logging();
    let state = SessionState::new();
    let (state, _effects) = submit_question(state, "¿Qué es NICSP 1?");

    let (state, _effects) = respond(state, 1, "NICSP 1 trata de...");
    let view = state.view();
    assert!(!view.busy);
    assert_eq!(view.messages.len(), 2);
    assert_eq!(view.messages[1].sender, Sender::Bot);
    // The reveal has not ticked yet; the bot message starts empty.
    assert_eq!(view.messages[1].text, "");

    // Far beyond the reveal duration the full text must be shown, exactly.
    let (state, _effects) = tick(state, 60_000);
    assert_eq!(state.view().messages[1].text, "NICSP 1 trata de...");
}

#[test]
fn empty_response_becomes_error_message() {
    init_logging();
    let state = SessionState::new();
    let (state, _effects) = submit_question(state, "hola");

    let (state, _effects) = respond(state, 1, "   \n");
    let view = state.view();

    assert!(!view.busy);
    assert_eq!(view.messages.len(), 2);
    assert_eq!(view.messages[1].sender, Sender::Bot);
    assert_eq!(view.messages[1].text, ErrorKind::EmptyResponse.user_text());
}

#[test]
fn error_kinds_map_to_distinct_messages() {
    init_logging();
    let state = SessionState::new();
    let (state, _effects) = submit_question(state, "hola");
    let (state, _effects) = fail(state, 1, ErrorKind::QuotaExceeded);

    let quota_text = state.view().messages[1].text.clone();
    assert_eq!(quota_text, ErrorKind::QuotaExceeded.user_text());
    assert_ne!(quota_text, ErrorKind::Generic.user_text());
    assert_ne!(quota_text, ErrorKind::ServerError.user_text());

    // Every error path leaves the session resubmittable.
    let (state, effects) = submit_question(state, "otra pregunta");
    assert_eq!(effects.len(), 1);
    assert!(state.view().busy);
}

#[test]
fn submission_rejected_while_request_in_flight() {
    init_logging();
    let state = SessionState::new();
    let (state, _effects) = submit_question(state, "primera");

    let (state, effects) = submit_question(state, "segunda");
    assert!(effects.is_empty());
    assert_eq!(state.view().messages.len(), 1);
}

#[test]
fn submission_rejected_while_revealing_then_accepted() {
    init_logging();
    let state = SessionState::new();
    let (state, _effects) = submit_question(state, "primera");
    let (state, _effects) = respond(state, 1, "hola");

    // Reveal in progress: new submissions are dropped.
    let (state, effects) = submit_question(state, "segunda");
    assert!(effects.is_empty());
    assert_eq!(state.view().messages.len(), 2);

    // Once the reveal finishes the session accepts input again.
    let (state, _effects) = tick(state, 60_000);
    let (state, effects) = submit_question(state, "segunda");
    assert_eq!(effects.len(), 1);
    assert_eq!(state.view().messages.len(), 3);
}

#[test]
fn non_pdf_attachment_rejected_with_alert() {
    init_logging();
    let state = SessionState::new();

    let file = AttachedFile {
        name: "notas.txt".to_string(),
        mime: "text/plain".to_string(),
        bytes: vec![1, 2, 3],
    };
    let (mut state, effects) = update(state, Msg::FileSelected(file));
    let view = state.view();

    assert!(effects.is_empty());
    assert!(view.messages.is_empty());
    assert_eq!(view.attachment_name, None);
    assert!(view.alert.is_some());
    assert!(state.consume_dirty());

    let (state, _effects) = update(state, Msg::AlertDismissed);
    assert_eq!(state.view().alert, None);
}

#[test]
fn pdf_attachment_submits_multipart_effect() {
    init_logging();
    let state = SessionState::new();

    let (state, _effects) = update(state, Msg::FileSelected(pdf("nicsp.pdf")));
    assert_eq!(state.view().attachment_name.as_deref(), Some("nicsp.pdf"));
    assert_eq!(state.view().alert, None);

    let (state, effects) = submit_question(state, "resume esto");
    let view = state.view();

    assert_eq!(
        effects,
        vec![Effect::SendUpload {
            request_id: 1,
            question: "resume esto".to_string(),
            file: pdf("nicsp.pdf"),
        }]
    );
    // The displayed user message carries both the question and the filename.
    assert_eq!(view.messages[0].text, "resume esto");
    assert_eq!(view.messages[0].attachment_name.as_deref(), Some("nicsp.pdf"));
    // The staged file is consumed by the submission.
    assert_eq!(view.attachment_name, None);
}

#[test]
fn attachment_can_be_cleared_before_submitting() {
    init_logging();
    let state = SessionState::new();

    let (state, _effects) = update(state, Msg::FileSelected(pdf("nicsp.pdf")));
    let (state, effects) = update(state, Msg::AttachmentCleared);
    assert!(effects.is_empty());
    assert_eq!(state.view().attachment_name, None);

    // Without an attachment the submission goes over the JSON endpoint.
    let (_state, effects) = submit_question(state, "hola");
    assert!(matches!(effects[0], Effect::SendChat { .. }));
}

#[test]
fn stale_response_is_ignored() {
    init_logging();
    let state = SessionState::new();
    let (state, _effects) = submit_question(state, "hola");
    let (state, _effects) = fail(state, 1, ErrorKind::CannotConnect);
    assert_eq!(state.view().messages.len(), 2);

    // A late completion for the already-resolved request changes nothing.
    let (state, effects) = respond(state, 1, "tarde");
    assert!(effects.is_empty());
    assert_eq!(state.view().messages.len(), 2);
    assert!(!state.view().busy);
}

#[test]
fn quit_cancels_pending_request() {
    init_logging();
    let state = SessionState::new();
    let (state, _effects) = submit_question(state, "hola");

    let (state, effects) = update(state, Msg::QuitRequested);
    assert_eq!(effects, vec![Effect::CancelRequest { request_id: 1 }]);
    assert!(!state.view().busy);
}
