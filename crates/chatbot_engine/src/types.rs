use std::fmt;

pub type RequestId = u64;

/// One outbound question, optionally carrying a PDF to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub question: String,
    pub attachment: Option<FilePayload>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePayload {
    pub filename: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    RequestCompleted {
        request_id: RequestId,
        result: Result<String, BackendError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct BackendError {
    pub kind: FailureKind,
    pub message: String,
}

impl BackendError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The request never reached the server.
    Network,
    /// The transport-level timeout expired.
    Timeout,
    /// The backend reported an exhausted quota (429 or quota wording).
    QuotaExceeded,
    /// The backend rejected the service credentials (401/403 or key wording).
    InvalidCredentials,
    /// 5xx from the backend.
    Server(u16),
    /// Any other non-success status.
    HttpStatus(u16),
    /// The request could not be built (bad attachment MIME type).
    InvalidRequest,
    /// A success response that did not decode as `{"response": ...}`.
    InvalidResponse,
    /// The request was aborted before completing.
    Cancelled,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::QuotaExceeded => write!(f, "quota exceeded"),
            FailureKind::InvalidCredentials => write!(f, "invalid credentials"),
            FailureKind::Server(code) => write!(f, "server error {code}"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::InvalidRequest => write!(f, "invalid request"),
            FailureKind::InvalidResponse => write!(f, "invalid response body"),
            FailureKind::Cancelled => write!(f, "cancelled"),
        }
    }
}
