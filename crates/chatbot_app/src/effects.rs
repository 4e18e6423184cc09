use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use chat_logging::chat_info;
use chatbot_core::{Effect, ErrorKind, Msg};
use chatbot_engine::{
    BackendError, BackendSettings, ChatRequest, EngineEvent, EngineHandle, FailureKind,
    FilePayload,
};

/// Bridges the pure session core to the request engine: effects become
/// engine commands, engine events come back as session messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(
        settings: BackendSettings,
        msg_tx: mpsc::Sender<Msg>,
    ) -> Result<Self, BackendError> {
        let engine = EngineHandle::new(settings)?;
        let runner = Self { engine };
        runner.spawn_event_pump(msg_tx);
        Ok(runner)
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SendChat {
                    request_id,
                    message,
                } => {
                    chat_info!("SendChat request_id={} len={}", request_id, message.len());
                    self.engine.send(
                        request_id,
                        ChatRequest {
                            question: message,
                            attachment: None,
                        },
                    );
                }
                Effect::SendUpload {
                    request_id,
                    question,
                    file,
                } => {
                    chat_info!(
                        "SendUpload request_id={} file={} bytes={}",
                        request_id,
                        file.name,
                        file.bytes.len()
                    );
                    self.engine.send(
                        request_id,
                        ChatRequest {
                            question,
                            attachment: Some(FilePayload {
                                filename: file.name,
                                mime: file.mime,
                                bytes: file.bytes,
                            }),
                        },
                    );
                }
                Effect::CancelRequest { request_id } => {
                    chat_info!("CancelRequest request_id={}", request_id);
                    self.engine.cancel(request_id);
                }
            }
        }
    }

    fn spawn_event_pump(&self, msg_tx: mpsc::Sender<Msg>) {
        let engine = self.engine.clone();
        thread::spawn(move || loop {
            if let Some(event) = engine.try_recv() {
                match event {
                    EngineEvent::RequestCompleted { request_id, result } => {
                        let result = result.map_err(|err| map_failure(err.kind));
                        if msg_tx
                            .send(Msg::ResponseArrived { request_id, result })
                            .is_err()
                        {
                            break;
                        }
                    }
                }
            } else {
                thread::sleep(Duration::from_millis(20));
            }
        });
    }
}

fn map_failure(kind: FailureKind) -> ErrorKind {
    match kind {
        FailureKind::Network => ErrorKind::CannotConnect,
        FailureKind::Timeout => ErrorKind::Timeout,
        FailureKind::QuotaExceeded => ErrorKind::QuotaExceeded,
        FailureKind::InvalidCredentials => ErrorKind::InvalidCredentials,
        FailureKind::Server(_) => ErrorKind::ServerError,
        FailureKind::HttpStatus(_)
        | FailureKind::InvalidRequest
        | FailureKind::InvalidResponse
        | FailureKind::Cancelled => ErrorKind::Generic,
    }
}
