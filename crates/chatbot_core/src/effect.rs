use crate::{AttachedFile, RequestId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Ask the backend a plain question over the JSON endpoint.
    SendChat {
        request_id: RequestId,
        message: String,
    },
    /// Ask the backend about an attached document over the multipart endpoint.
    SendUpload {
        request_id: RequestId,
        question: String,
        file: AttachedFile,
    },
    /// Abort an in-flight request (deadline expired or session teardown).
    CancelRequest { request_id: RequestId },
}
