use crate::{AttachedFile, ErrorKind, RequestId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the question input box (full replacement text).
    InputChanged(String),
    /// User submitted the current question input.
    Submitted,
    /// User picked a file to attach to the next question.
    FileSelected(AttachedFile),
    /// User removed the staged attachment without submitting.
    AttachmentCleared,
    /// User dismissed the current alert banner.
    AlertDismissed,
    /// The request layer resolved an outbound request.
    ResponseArrived {
        request_id: RequestId,
        result: Result<String, ErrorKind>,
    },
    /// Clock tick from the shell; drives every timer in the session.
    Tick { now_ms: u64 },
    /// Session teardown; aborts whatever is still in flight.
    QuitRequested,
}
