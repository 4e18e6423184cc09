use chatbot_core::{
    update, Effect, ErrorKind, Msg, SessionState, DOTS_INTERVAL_MS, REQUEST_TIMEOUT_MS,
    REVEAL_INTERVAL_MS, SLOW_CONNECTION_AFTER_MS,
};

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

fn tick(state: SessionState, now_ms: u64) -> (SessionState, Vec<Effect>) {
    update(state, Msg::Tick { now_ms })
}

#[test]
fn reveal_is_monotonic_and_terminates_exactly() {
    let full_text = "NICSP 1 presenta los estados financieros según lo acordado.";
    let total_chars = full_text.chars().count();

    let state = SessionState::new();
    let (state, _effects) = submit_question(state, "¿Qué es NICSP 1?");
    let (mut state, _effects) = respond(state, 1, full_text);

    // Drive the clock in uneven steps; revealed lengths must never shrink
    // and every intermediate text must be a prefix of the full reply.
    let mut revealed_chars = 0usize;
    let mut now = 0u64;
    while revealed_chars < total_chars {
        now += 7;
        let (next, _effects) = tick(state, now);
        state = next;

        let text = state.view().messages[1].text.clone();
        let chars = text.chars().count();
        assert!(chars >= revealed_chars, "reveal went backwards");
        assert!(full_text.starts_with(&text), "not a prefix: {text:?}");
        revealed_chars = chars;

        assert!(now < 60_000, "reveal never terminated");
    }

    assert_eq!(state.view().messages[1].text, full_text);

    // Further ticks change nothing once the reveal is done.
    let (state, _effects) = tick(state, now + 10_000);
    assert_eq!(state.view().messages[1].text, full_text);
}

#[test]
fn reveal_follows_the_tick_interval() {
    let state = SessionState::new();
    let (state, _effects) = submit_question(state, "hola");
    // Anchor the reveal at t=1000.
    let (state, _effects) = tick(state, 1_000);
    let (state, _effects) = respond(state, 1, "señal");

    let (state, _effects) = tick(state, 1_000 + 3 * REVEAL_INTERVAL_MS);
    assert_eq!(state.view().messages[1].text, "señ");

    let (state, _effects) = tick(state, 1_000 + 5 * REVEAL_INTERVAL_MS);
    assert_eq!(state.view().messages[1].text, "señal");
}

#[test]
fn dots_cycle_while_busy_and_reset_when_resolved() {
    let state = SessionState::new();
    let (state, _effects) = submit_question(state, "hola");
    assert_eq!(state.view().dots, 0);

    let (state, _effects) = tick(state, DOTS_INTERVAL_MS - 100);
    assert_eq!(state.view().dots, 0);

    let (state, _effects) = tick(state, DOTS_INTERVAL_MS);
    assert_eq!(state.view().dots, 1);

    let (state, _effects) = tick(state, 2 * DOTS_INTERVAL_MS);
    assert_eq!(state.view().dots, 2);

    // The counter is bounded: 0 → 1 → 2 → 0.
    let (state, _effects) = tick(state, 3 * DOTS_INTERVAL_MS);
    assert_eq!(state.view().dots, 0);

    let (state, _effects) = tick(state, 4 * DOTS_INTERVAL_MS);
    let (state, _effects) = respond(state, 1, "hola");
    assert_eq!(state.view().dots, 0);
    assert!(!state.view().busy);
}

#[test]
fn slow_connection_flag_sets_and_clears() {
    let state = SessionState::new();
    let (state, _effects) = submit_question(state, "hola");

    let (state, _effects) = tick(state, SLOW_CONNECTION_AFTER_MS - 1);
    assert!(!state.view().slow_connection);

    let (state, _effects) = tick(state, SLOW_CONNECTION_AFTER_MS);
    assert!(state.view().slow_connection);

    // Resolution clears the warning without waiting for another tick.
    let (state, _effects) = respond(state, 1, "hola");
    assert!(!state.view().slow_connection);
}

#[test]
fn timeout_appends_single_error_and_cancels_request() {
    let state = SessionState::new();
    let (state, _effects) = submit_question(state, "hola");

    let (state, effects) = tick(state, REQUEST_TIMEOUT_MS - 1);
    assert!(effects.is_empty());
    assert_eq!(state.view().messages.len(), 1);

    let (state, effects) = tick(state, REQUEST_TIMEOUT_MS);
    let view = state.view();
    assert_eq!(effects, vec![Effect::CancelRequest { request_id: 1 }]);
    assert_eq!(view.messages.len(), 2);
    assert_eq!(view.messages[1].text, ErrorKind::Timeout.user_text());
    assert!(!view.busy);
    assert!(!view.slow_connection);
    assert_eq!(view.dots, 0);

    // Exactly one timeout message, ever.
    let (state, effects) = tick(state, REQUEST_TIMEOUT_MS + 1_000);
    assert!(effects.is_empty());
    assert_eq!(state.view().messages.len(), 2);

    // A late reply from the abandoned request must not start a reveal.
    let (state, _effects) = respond(state, 1, "respuesta tardía");
    let (state, _effects) = tick(state, REQUEST_TIMEOUT_MS + 5_000);
    assert_eq!(state.view().messages.len(), 2);

    // The session is resubmittable after the timeout.
    let (state, effects) = submit_question(state, "otra");
    assert_eq!(effects.len(), 1);
    assert!(state.view().busy);
}

#[test]
fn clock_never_steps_backwards() {
    let state = SessionState::new();
    let (state, _effects) = submit_question(state, "hola");
    let (state, _effects) = tick(state, 2 * DOTS_INTERVAL_MS);
    assert_eq!(state.view().dots, 2);

    // A stale tick must not rewind the animation.
    let (state, _effects) = tick(state, DOTS_INTERVAL_MS);
    assert_eq!(state.view().dots, 2);
}
