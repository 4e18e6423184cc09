//! Chatbot engine: request execution and failure classification.
mod backend;
mod engine;
mod types;

pub use backend::{Backend, BackendSettings, ReqwestBackend, BASE_URL_ENV};
pub use engine::EngineHandle;
pub use types::{BackendError, ChatRequest, EngineEvent, FailureKind, FilePayload, RequestId};
