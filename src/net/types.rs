//! Wire DTOs and error types for the chat API boundary.
//!
//! DESIGN
//! ======
//! `Message` mirrors the server's camelCase JSON exactly so history fetches and
//! send responses deserialize without adapters. The client never edits a
//! `Message` in place; new ones only arrive from the server.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};

// =============================================================================
// ALLOWED UPLOAD TYPES
// =============================================================================

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_PPT: &str = "application/vnd.ms-powerpoint";
pub const MIME_PPTX: &str = "application/vnd.openxmlformats-officedocument.presentationml.presentation";
pub const MIME_DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Exact set of MIME types the upload form accepts.
pub const ALLOWED_UPLOAD_MIME_TYPES: [&str; 4] = [MIME_PDF, MIME_PPT, MIME_PPTX, MIME_DOCX];

/// Whether `mime` is one of the accepted upload types. Comparison is exact.
#[must_use]
pub fn is_allowed_upload_mime(mime: &str) -> bool {
    ALLOWED_UPLOAD_MIME_TYPES.contains(&mime)
}

/// Best-effort MIME type from a file extension, used when a file comes from
/// disk rather than a browser picker.
#[must_use]
pub fn mime_for_file_name(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => MIME_PDF,
        "ppt" => MIME_PPT,
        "pptx" => MIME_PPTX,
        "docx" => MIME_DOCX,
        "txt" => "text/plain",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        _ => "application/octet-stream",
    }
}

// =============================================================================
// USERS + MESSAGES
// =============================================================================

/// The authenticated user as reported by the user provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
}

/// A chat message owned by the remote API.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Server-assigned identifier.
    pub id: i64,
    /// Message body.
    pub content: String,
    /// `true` when the assistant authored the message.
    pub is_bot: bool,
    /// Conversation this message belongs to.
    pub session_id: String,
    /// Server timestamp, passed through untouched.
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Body of `POST /api/chat`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest<'a> {
    pub content: &'a str,
    pub session_id: &'a str,
    pub is_bot: bool,
}

impl<'a> SendMessageRequest<'a> {
    /// Build a user-authored message request.
    #[must_use]
    pub fn user(content: &'a str, session_id: &'a str) -> Self {
        Self { content, session_id, is_bot: false }
    }
}

/// A file chosen for upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    #[must_use]
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { file_name: file_name.into(), mime_type: mime_type.into(), bytes }
    }
}

/// Acknowledgement body from `POST /api/upload`. The server shape is open, so
/// it is kept as raw JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UploadAck(pub serde_json::Value);

// =============================================================================
// ERRORS
// =============================================================================

/// Failures produced by the HTTP transport.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The request could not be sent or the body could not be read.
    #[error("request failed: {0}")]
    Request(String),

    /// The server answered with a non-success status.
    #[error("server responded with status {status}")]
    Status { status: u16, body: String },

    /// The response body did not match the expected shape.
    #[error("response parse failed: {0}")]
    Parse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

/// Upload rejections, client-side or server-side.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("unsupported file type: {mime}")]
    UnsupportedType { mime: String },

    #[error("could not read file: {0}")]
    Read(String),

    #[error("upload failed: {0}")]
    Transport(#[from] TransportError),
}

/// Which write operation a lifecycle or busy error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Send,
    Upload,
}

impl OperationKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Send => "send",
            Self::Upload => "upload",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by the message exchange and the widget.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    /// No user or no session id; dependent operations are disabled.
    #[error("no active chat session")]
    NoSession,

    /// Another operation of the same kind is still pending.
    #[error("a {0} request is already in flight")]
    Busy(OperationKind),

    /// The draft was empty after trimming.
    #[error("message is empty")]
    EmptyMessage,

    #[error("failed to fetch messages: {0}")]
    Fetch(TransportError),

    #[error("failed to send message: {0}")]
    Send(TransportError),

    #[error(transparent)]
    Upload(#[from] UploadError),
}

impl ChatError {
    /// Short user-facing text for notifications.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NoSession => "Please sign in to start chatting.",
            Self::Busy(_) => "Please wait for the current request to finish.",
            Self::EmptyMessage => "Type a message first.",
            Self::Fetch(_) => "Failed to fetch messages.",
            Self::Send(_) => "Failed to send message.",
            Self::Upload(UploadError::UnsupportedType { .. }) => {
                "Please upload a PDF, PowerPoint, or Word document."
            }
            Self::Upload(_) => "Failed to upload file.",
        }
    }
}
