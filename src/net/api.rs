//! REST client for the chat API.
//!
//! `ChatApi` is the seam the exchange controller talks to; `HttpChatApi` is the
//! `reqwest` implementation. Responses are read as text first and parsed by
//! pure helpers so status/parse handling is testable without a server.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::time::Duration;

use reqwest::header::{COOKIE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;

use super::types::{Message, SendMessageRequest, TransportError, UploadAck, UploadFile};
use crate::config::ClientConfig;

// =============================================================================
// TRAIT
// =============================================================================

/// Remote messaging API. Enables mocking in tests.
#[async_trait::async_trait]
pub trait ChatApi: Send + Sync {
    /// `GET /api/messages/{session_id}`.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] on request failure, non-2xx status, or a
    /// malformed body.
    async fn fetch_messages(&self, session_id: &str) -> Result<Vec<Message>, TransportError>;

    /// `POST /api/chat` with a user-authored message.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] on request failure, non-2xx status, or a
    /// malformed body.
    async fn send_message(&self, content: &str, session_id: &str) -> Result<Message, TransportError>;

    /// `POST /api/upload` as multipart form data.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] on request failure or non-2xx status.
    async fn upload_file(&self, file: &UploadFile, session_id: &str) -> Result<UploadAck, TransportError>;
}

// =============================================================================
// ENDPOINTS
// =============================================================================

/// History URL with `session_id` percent-encoded as a single path segment.
fn messages_endpoint(base_url: &str, session_id: &str) -> Result<reqwest::Url, TransportError> {
    let mut url = reqwest::Url::parse(&format!("{base_url}/api/messages"))
        .map_err(|e| TransportError::Request(format!("invalid base url {base_url}: {e}")))?;
    url.path_segments_mut()
        .map_err(|()| TransportError::Request(format!("base url {base_url} cannot carry a path")))?
        .push(session_id);
    Ok(url)
}

fn chat_endpoint(base_url: &str) -> String {
    format!("{base_url}/api/chat")
}

fn upload_endpoint(base_url: &str) -> String {
    format!("{base_url}/api/upload")
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

pub struct HttpChatApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpChatApi {
    /// Build a client from typed config. The session token, when present, is
    /// attached to every request as the `session_token` cookie.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::HttpClientBuild`] if the token is not a valid
    /// header value or the client fails to build.
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = config.session_token.as_deref() {
            let cookie = HeaderValue::from_str(&format!("session_token={token}"))
                .map_err(|e| TransportError::HttpClientBuild(e.to_string()))?;
            headers.insert(COOKIE, cookie);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| TransportError::HttpClientBuild(e.to_string()))?;

        Ok(Self { http, base_url: config.base_url.clone() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn read_response(response: reqwest::Response) -> Result<String, TransportError> {
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;
        check_status(status, text)
    }
}

#[async_trait::async_trait]
impl ChatApi for HttpChatApi {
    async fn fetch_messages(&self, session_id: &str) -> Result<Vec<Message>, TransportError> {
        let response = self
            .http
            .get(messages_endpoint(&self.base_url, session_id)?)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;
        let text = Self::read_response(response).await?;
        parse_json(&text)
    }

    async fn send_message(&self, content: &str, session_id: &str) -> Result<Message, TransportError> {
        let response = self
            .http
            .post(chat_endpoint(&self.base_url))
            .json(&SendMessageRequest::user(content, session_id))
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;
        let text = Self::read_response(response).await?;
        parse_json(&text)
    }

    async fn upload_file(&self, file: &UploadFile, session_id: &str) -> Result<UploadAck, TransportError> {
        let part = reqwest::multipart::Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.mime_type)
            .map_err(|e| TransportError::Request(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("sessionId", session_id.to_owned());

        let response = self
            .http
            .post(upload_endpoint(&self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;
        let text = Self::read_response(response).await?;
        parse_upload_ack(&text)
    }
}

// =============================================================================
// PARSING
// =============================================================================

fn check_status(status: u16, body: String) -> Result<String, TransportError> {
    if (200..300).contains(&status) {
        Ok(body)
    } else {
        Err(TransportError::Status { status, body })
    }
}

fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T, TransportError> {
    serde_json::from_str(text).map_err(|e| TransportError::Parse(e.to_string()))
}

/// Upload acks are informational; an empty body counts as success.
fn parse_upload_ack(text: &str) -> Result<UploadAck, TransportError> {
    if text.trim().is_empty() {
        return Ok(UploadAck(serde_json::Value::Null));
    }
    parse_json(text)
}
