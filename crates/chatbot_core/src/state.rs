use crate::view_model::{MessageView, SessionViewModel};
use crate::Effect;

pub type MessageId = u64;
pub type RequestId = u64;

/// One character of a bot reply is revealed every 18 ms.
pub const REVEAL_INTERVAL_MS: u64 = 18;
/// The loading indicator cycles "." → ".." → "..." every 500 ms.
pub const DOTS_INTERVAL_MS: u64 = 500;
/// After 10 s of waiting the slow-connection warning is shown.
pub const SLOW_CONNECTION_AFTER_MS: u64 = 10_000;
/// An unresolved request is abandoned after 120 s.
pub const REQUEST_TIMEOUT_MS: u64 = 120_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub sender: Sender,
    pub text: String,
    /// Filename shown alongside a user question that carried a PDF.
    pub attachment_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachedFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl AttachedFile {
    pub fn is_pdf(&self) -> bool {
        self.mime.eq_ignore_ascii_case("application/pdf")
    }
}

/// Tagged failure categories produced by the request layer.
///
/// Presentation text lives in [`ErrorKind::user_text`] and nowhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Timeout,
    CannotConnect,
    ServerError,
    QuotaExceeded,
    InvalidCredentials,
    EmptyResponse,
    Generic,
}

impl ErrorKind {
    /// The bot message shown to the user for this failure.
    pub fn user_text(self) -> &'static str {
        match self {
            ErrorKind::Timeout => "La consulta tardó demasiado tiempo. Intenta de nuevo.",
            ErrorKind::CannotConnect => {
                "No se pudo conectar con el servidor. Verifica que el backend esté corriendo."
            }
            ErrorKind::ServerError => "El servidor tuvo un error interno. Intenta de nuevo.",
            ErrorKind::QuotaExceeded => {
                "Se agotó la cuota del servicio de IA. Intenta más tarde."
            }
            ErrorKind::InvalidCredentials => {
                "Las credenciales del servicio de IA no son válidas."
            }
            ErrorKind::EmptyResponse => "No se pudo generar una respuesta.",
            ErrorKind::Generic => "Error al conectar con el servidor",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingRequest {
    request_id: RequestId,
    started_at_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TypingReveal {
    message_id: MessageId,
    full_text: String,
    total_chars: usize,
    started_at_ms: u64,
    revealed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionState {
    now_ms: u64,
    input: String,
    attachment: Option<AttachedFile>,
    alert: Option<String>,
    messages: Vec<Message>,
    next_message_id: MessageId,
    next_request_id: RequestId,
    pending: Option<PendingRequest>,
    reveal: Option<TypingReveal>,
    dots: u8,
    slow_connection: bool,
    dirty: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> SessionViewModel {
        SessionViewModel {
            messages: self
                .messages
                .iter()
                .map(|message| MessageView {
                    id: message.id,
                    sender: message.sender,
                    text: message.text.clone(),
                    attachment_name: message.attachment_name.clone(),
                })
                .collect(),
            input: self.input.clone(),
            busy: self.pending.is_some(),
            dots: self.dots,
            slow_connection: self.slow_connection,
            attachment_name: self.attachment.as_ref().map(|file| file.name.clone()),
            alert: self.alert.clone(),
            can_submit: !self.input.trim().is_empty()
                && self.pending.is_none()
                && self.reveal.is_none(),
        }
    }

    /// Returns whether a render is due and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        let dirty = self.dirty;
        self.dirty = false;
        dirty
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn input(&self) -> &str {
        &self.input
    }

    pub(crate) fn set_input(&mut self, text: String) {
        if self.input != text {
            self.input = text;
            self.mark_dirty();
        }
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub(crate) fn is_revealing(&self) -> bool {
        self.reveal.is_some()
    }

    pub(crate) fn stage_attachment(&mut self, file: AttachedFile) {
        if !file.is_pdf() {
            self.alert = Some(format!("Solo se admiten archivos PDF: {}", file.name));
            self.mark_dirty();
            return;
        }
        self.attachment = Some(file);
        self.alert = None;
        self.mark_dirty();
    }

    pub(crate) fn clear_attachment(&mut self) {
        if self.attachment.take().is_some() {
            self.mark_dirty();
        }
    }

    pub(crate) fn dismiss_alert(&mut self) {
        if self.alert.take().is_some() {
            self.mark_dirty();
        }
    }

    /// Moves the session into the busy state: appends the user message,
    /// consumes the input and the staged attachment, and allocates a request.
    pub(crate) fn begin_request(&mut self) -> (RequestId, String, Option<AttachedFile>) {
        let question = std::mem::take(&mut self.input);
        let attachment = self.attachment.take();

        let id = self.alloc_message_id();
        self.messages.push(Message {
            id,
            sender: Sender::User,
            text: question.clone(),
            attachment_name: attachment.as_ref().map(|file| file.name.clone()),
        });

        self.next_request_id += 1;
        let request_id = self.next_request_id;
        self.pending = Some(PendingRequest {
            request_id,
            started_at_ms: self.now_ms,
        });
        self.dots = 0;
        self.slow_connection = false;
        self.mark_dirty();

        (request_id, question, attachment)
    }

    /// Resolution of the pending request. Stale request ids (timed out or
    /// cancelled requests completing late) are ignored.
    pub(crate) fn apply_response(&mut self, request_id: RequestId, result: Result<String, ErrorKind>) {
        match &self.pending {
            Some(pending) if pending.request_id == request_id => {}
            _ => return,
        }
        self.finish_request();

        match result {
            Ok(text) if !text.trim().is_empty() => self.begin_reveal(text),
            Ok(_) => self.push_bot_error(ErrorKind::EmptyResponse),
            Err(kind) => self.push_bot_error(kind),
        }
    }

    /// Advances every session timer to `now_ms`: request deadline,
    /// slow-connection flag, loading dots, and the typing reveal.
    pub(crate) fn apply_tick(&mut self, now_ms: u64) -> Vec<Effect> {
        // The shell's clock is monotonic; never step backwards.
        let now = self.now_ms.max(now_ms);
        self.now_ms = now;

        let mut effects = Vec::new();
        if let Some(pending) = &self.pending {
            let elapsed = now.saturating_sub(pending.started_at_ms);
            if elapsed >= REQUEST_TIMEOUT_MS {
                let request_id = pending.request_id;
                self.finish_request();
                self.push_bot_error(ErrorKind::Timeout);
                effects.push(Effect::CancelRequest { request_id });
            } else {
                let dots = ((elapsed / DOTS_INTERVAL_MS) % 3) as u8;
                if dots != self.dots {
                    self.dots = dots;
                    self.mark_dirty();
                }
                let slow = elapsed >= SLOW_CONNECTION_AFTER_MS;
                if slow != self.slow_connection {
                    self.slow_connection = slow;
                    self.mark_dirty();
                }
            }
        }
        self.advance_reveal(now);
        effects
    }

    /// Tears the session down: the in-flight request is cancelled and the
    /// reveal stops where it is. History is memory-only and simply dropped.
    pub(crate) fn shutdown(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if let Some(pending) = self.pending.take() {
            effects.push(Effect::CancelRequest {
                request_id: pending.request_id,
            });
        }
        self.reveal = None;
        self.dots = 0;
        self.slow_connection = false;
        effects
    }

    fn finish_request(&mut self) {
        self.pending = None;
        self.dots = 0;
        self.slow_connection = false;
        self.mark_dirty();
    }

    fn begin_reveal(&mut self, full_text: String) {
        // At most one reveal may mutate the message list; an unfinished one
        // is completed before a new one starts.
        self.complete_reveal();
        let id = self.alloc_message_id();
        self.messages.push(Message {
            id,
            sender: Sender::Bot,
            text: String::new(),
            attachment_name: None,
        });
        self.reveal = Some(TypingReveal {
            message_id: id,
            total_chars: full_text.chars().count(),
            full_text,
            started_at_ms: self.now_ms,
            revealed: 0,
        });
        self.mark_dirty();
    }

    fn complete_reveal(&mut self) {
        let Some(reveal) = self.reveal.take() else {
            return;
        };
        if let Some(message) = self.messages.iter_mut().find(|m| m.id == reveal.message_id) {
            message.text = reveal.full_text;
        }
        self.mark_dirty();
    }

    fn advance_reveal(&mut self, now: u64) {
        let Some(reveal) = self.reveal.as_mut() else {
            return;
        };
        let elapsed = now.saturating_sub(reveal.started_at_ms);
        let target = ((elapsed / REVEAL_INTERVAL_MS) as usize).min(reveal.total_chars);
        if target <= reveal.revealed {
            return;
        }
        reveal.revealed = target;
        let prefix: String = reveal.full_text.chars().take(target).collect();
        let message_id = reveal.message_id;
        let done = reveal.revealed == reveal.total_chars;

        if let Some(message) = self.messages.iter_mut().find(|m| m.id == message_id) {
            message.text = prefix;
        }
        if done {
            self.reveal = None;
        }
        self.mark_dirty();
    }

    fn push_bot_error(&mut self, kind: ErrorKind) {
        let id = self.alloc_message_id();
        self.messages.push(Message {
            id,
            sender: Sender::Bot,
            text: kind.user_text().to_string(),
            attachment_name: None,
        });
        self.mark_dirty();
    }

    fn alloc_message_id(&mut self) -> MessageId {
        self.next_message_id += 1;
        self.next_message_id
    }
}
