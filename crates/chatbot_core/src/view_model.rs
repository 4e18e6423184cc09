use crate::{MessageId, Sender};

/// Empty-state greeting shown before the first message.
pub const GREETING: &str = "¡Hola! Pregúntame sobre las NICSP";
/// Placeholder for the question input box.
pub const INPUT_PLACEHOLDER: &str = "Haz una pregunta sobre las NICSP...";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionViewModel {
    pub messages: Vec<MessageView>,
    pub input: String,
    pub busy: bool,
    /// Bounded 0..=2 counter rendering "." / ".." / "..." while busy.
    pub dots: u8,
    pub slow_connection: bool,
    pub attachment_name: Option<String>,
    pub alert: Option<String>,
    pub can_submit: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageView {
    pub id: MessageId,
    pub sender: Sender,
    pub text: String,
    pub attachment_name: Option<String>,
}
