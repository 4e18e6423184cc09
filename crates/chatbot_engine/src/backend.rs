use std::time::Duration;

use reqwest::multipart;
use serde::{Deserialize, Serialize};

use crate::{BackendError, ChatRequest, FailureKind};

/// Environment variable overriding the backend base URL.
pub const BASE_URL_ENV: &str = "CHATBOT_BACKEND_URL";

const DEFAULT_BASE_URL: &str = "http://localhost:5000";

#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Transport-level backstop to the session's own 120 s deadline.
    pub request_timeout: Duration,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
        }
    }
}

impl BackendSettings {
    /// Resolves the base URL from the environment, falling back to localhost.
    pub fn from_env() -> Self {
        let base_url = std::env::var(BASE_URL_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            base_url,
            ..Self::default()
        }
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

#[derive(Serialize)]
struct ChatBody<'a> {
    message: &'a str,
}

#[derive(Deserialize)]
struct ReplyBody {
    response: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    async fn send(&self, request: &ChatRequest) -> Result<String, BackendError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    settings: BackendSettings,
    client: reqwest::Client,
}

impl ReqwestBackend {
    pub fn new(settings: BackendSettings) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| BackendError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.settings.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait::async_trait]
impl Backend for ReqwestBackend {
    async fn send(&self, request: &ChatRequest) -> Result<String, BackendError> {
        let response = match &request.attachment {
            None => self
                .client
                .post(self.endpoint("chat"))
                .json(&ChatBody {
                    message: &request.question,
                })
                .send()
                .await
                .map_err(map_reqwest_error)?,
            Some(file) => {
                let part = multipart::Part::bytes(file.bytes.clone())
                    .file_name(file.filename.clone())
                    .mime_str(&file.mime)
                    .map_err(|err| {
                        BackendError::new(FailureKind::InvalidRequest, err.to_string())
                    })?;
                let form = multipart::Form::new()
                    .part("file", part)
                    .text("question", request.question.clone());
                self.client
                    .post(self.endpoint("upload"))
                    .multipart(form)
                    .send()
                    .await
                    .map_err(map_reqwest_error)?
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_http_failure(status.as_u16(), &body));
        }

        let reply: ReplyBody = response
            .json()
            .await
            .map_err(|err| BackendError::new(FailureKind::InvalidResponse, err.to_string()))?;
        Ok(reply.response)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        return BackendError::new(FailureKind::Timeout, err.to_string());
    }
    BackendError::new(FailureKind::Network, err.to_string())
}

/// Classifies a non-success status together with the optional
/// `{"error": string}` body the backend may attach.
fn classify_http_failure(status: u16, body: &str) -> BackendError {
    let error_field = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error);

    let kind = match error_field.as_deref() {
        Some(error) => classify_error_field(error, status),
        None => classify_status(status),
    };
    let message = error_field.unwrap_or_else(|| format!("http status {status}"));
    BackendError::new(kind, message)
}

fn classify_error_field(error: &str, status: u16) -> FailureKind {
    let lowered = error.to_ascii_lowercase();
    if lowered.contains("quota") || lowered.contains("rate limit") {
        return FailureKind::QuotaExceeded;
    }
    if lowered.contains("api_key")
        || lowered.contains("api key")
        || lowered.contains("authentication")
        || lowered.contains("credencial")
    {
        return FailureKind::InvalidCredentials;
    }
    classify_status(status)
}

fn classify_status(status: u16) -> FailureKind {
    match status {
        429 => FailureKind::QuotaExceeded,
        401 | 403 => FailureKind::InvalidCredentials,
        500..=599 => FailureKind::Server(status),
        _ => FailureKind::HttpStatus(status),
    }
}
