use std::collections::HashMap;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use chat_logging::chat_warn;
use tokio_util::sync::CancellationToken;

use crate::backend::{Backend, BackendSettings, ReqwestBackend};
use crate::{BackendError, ChatRequest, EngineEvent, FailureKind, RequestId};

enum EngineCommand {
    Send {
        request_id: RequestId,
        request: ChatRequest,
    },
    Cancel {
        request_id: RequestId,
    },
}

/// Handle to the request runner: commands in, completion events out.
///
/// Requests run on a tokio runtime owned by a dedicated thread; each holds a
/// cancellation token until it completes, so cancelling a finished request is
/// a no-op.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
}

impl EngineHandle {
    pub fn new(settings: BackendSettings) -> Result<Self, BackendError> {
        let backend = Arc::new(ReqwestBackend::new(settings)?);
        Ok(Self::with_backend(backend))
    }

    /// Runs the engine over any backend implementation (used by tests).
    pub fn with_backend(backend: Arc<dyn Backend>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            let inflight: Arc<Mutex<HashMap<RequestId, CancellationToken>>> =
                Arc::new(Mutex::new(HashMap::new()));

            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::Send {
                        request_id,
                        request,
                    } => {
                        let token = CancellationToken::new();
                        inflight
                            .lock()
                            .expect("lock inflight requests")
                            .insert(request_id, token.clone());

                        let backend = backend.clone();
                        let event_tx = event_tx.clone();
                        let inflight = inflight.clone();
                        runtime.spawn(async move {
                            let result = tokio::select! {
                                _ = token.cancelled() => Err(BackendError::new(
                                    FailureKind::Cancelled,
                                    "request cancelled",
                                )),
                                result = backend.send(&request) => result,
                            };
                            inflight
                                .lock()
                                .expect("lock inflight requests")
                                .remove(&request_id);
                            if let Err(err) = &result {
                                chat_warn!("request {} failed: {}", request_id, err);
                            }
                            let _ = event_tx.send(EngineEvent::RequestCompleted {
                                request_id,
                                result,
                            });
                        });
                    }
                    EngineCommand::Cancel { request_id } => {
                        let token = inflight
                            .lock()
                            .expect("lock inflight requests")
                            .remove(&request_id);
                        if let Some(token) = token {
                            token.cancel();
                        }
                    }
                }
            }
        });

        Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        }
    }

    pub fn send(&self, request_id: RequestId, request: ChatRequest) {
        let _ = self.cmd_tx.send(EngineCommand::Send {
            request_id,
            request,
        });
    }

    pub fn cancel(&self, request_id: RequestId) {
        let _ = self.cmd_tx.send(EngineCommand::Cancel { request_id });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }
}
