//! Message exchange controller: history reads, message sends, file uploads.
//!
//! ARCHITECTURE
//! ============
//! All calls are scoped by a session id. Reads go through a per-session
//! history cache; writes invalidate that cache only after the server reports
//! success, so the refetch that follows always observes the write.
//!
//! ERROR HANDLING
//! ==============
//! Nothing retries. A failed send rejects to the caller with no side effects;
//! a failed upload also emits an error notification. Both leave the session
//! usable for the next explicit attempt.

#[cfg(test)]
#[path = "exchange_test.rs"]
mod exchange_test;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use super::lifecycle::{InFlight, RequestState, RequestTracker};
use crate::net::api::ChatApi;
use crate::net::types::{ChatError, Message, OperationKind, UploadAck, UploadError, UploadFile};
use crate::notify::{Notification, Notifier};

#[derive(Debug, Default)]
struct CachedHistory {
    messages: Option<Vec<Message>>,
    stale: bool,
    generation: u64,
}

#[derive(Debug, Default)]
struct HistoryCache {
    entries: HashMap<String, CachedHistory>,
    /// Bumped by every eviction. A fetch that started before an eviction
    /// never writes its result back.
    evictions: u64,
}

pub struct MessageExchange {
    api: Arc<dyn ChatApi>,
    notifier: Arc<dyn Notifier>,
    requests: RequestTracker,
    cache: Mutex<HistoryCache>,
}

impl MessageExchange {
    #[must_use]
    pub fn new(api: Arc<dyn ChatApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self { api, notifier, requests: RequestTracker::new(), cache: Mutex::new(HistoryCache::default()) }
    }

    #[must_use]
    pub fn request_state(&self, kind: OperationKind) -> RequestState {
        self.requests.state(kind)
    }

    /// Return a settled send/upload state to `Idle`.
    pub fn acknowledge(&self, kind: OperationKind) {
        self.requests.reset(kind);
    }

    // =========================================================================
    // READ
    // =========================================================================

    /// History for `session_id` in server order. Served from cache while the
    /// entry is fresh; otherwise fetched and cached.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::NoSession`] for an empty id and
    /// [`ChatError::Fetch`] when the transport fails.
    pub async fn fetch_history(&self, session_id: &str) -> Result<Vec<Message>, ChatError> {
        if session_id.is_empty() {
            return Err(ChatError::NoSession);
        }
        if let Some(fresh) = self.cached_history(session_id) {
            return Ok(fresh);
        }

        let (generation, evictions) = {
            let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
            let generation = cache.entries.get(session_id).map_or(0, |entry| entry.generation);
            (generation, cache.evictions)
        };
        let messages = self.api.fetch_messages(session_id).await.map_err(|e| {
            tracing::warn!(%session_id, error = %e, "history fetch failed");
            ChatError::Fetch(e)
        })?;
        tracing::debug!(%session_id, count = messages.len(), "history fetched");

        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if cache.evictions != evictions {
            tracing::debug!(%session_id, "history evicted mid-fetch; not cached");
            return Ok(messages);
        }
        let entry = cache.entries.entry(session_id.to_owned()).or_default();
        entry.messages = Some(messages.clone());
        // An invalidation that landed mid-flight keeps the entry stale.
        entry.stale = entry.generation != generation;
        Ok(messages)
    }

    /// Cached history if present and not stale.
    #[must_use]
    pub fn cached_history(&self, session_id: &str) -> Option<Vec<Message>> {
        let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache
            .entries
            .get(session_id)
            .filter(|entry| !entry.stale)
            .and_then(|entry| entry.messages.clone())
    }

    /// Mark the cached history for `session_id` stale so the next read refetches.
    pub fn invalidate(&self, session_id: &str) {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = cache.entries.entry(session_id.to_owned()).or_default();
        entry.stale = true;
        entry.generation += 1;
        tracing::debug!(%session_id, generation = entry.generation, "history invalidated");
    }

    /// Number of invalidations `session_id` has seen.
    #[must_use]
    pub fn generation(&self, session_id: &str) -> u64 {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .get(session_id)
            .map_or(0, |entry| entry.generation)
    }

    /// Drop everything cached for `session_id`, including any fetch result
    /// still in flight.
    pub fn evict(&self, session_id: &str) {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.entries.remove(session_id);
        cache.evictions += 1;
    }

    // =========================================================================
    // WRITES
    // =========================================================================

    /// Post a user message. On success the session's history is invalidated
    /// and a success notification fires.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::NoSession`], [`ChatError::Busy`] while another send
    /// is pending, or [`ChatError::Send`] when the transport fails.
    pub async fn send_message(&self, content: &str, session_id: &str) -> Result<Message, ChatError> {
        if session_id.is_empty() {
            return Err(ChatError::NoSession);
        }
        let in_flight = self.begin_send()?;
        self.send_claimed(in_flight, content, session_id).await
    }

    /// Claim the send slot ahead of [`Self::send_claimed`], so a caller can
    /// admit the request and update its own state under one lock.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Busy`] while another send is pending.
    pub fn begin_send(&self) -> Result<InFlight<'_>, ChatError> {
        self.requests.begin(OperationKind::Send)
    }

    /// Send with a slot already claimed by [`Self::begin_send`].
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::NoSession`] or [`ChatError::Send`] when the
    /// transport fails.
    pub async fn send_claimed(
        &self,
        in_flight: InFlight<'_>,
        content: &str,
        session_id: &str,
    ) -> Result<Message, ChatError> {
        if session_id.is_empty() {
            return Err(ChatError::NoSession);
        }
        match self.api.send_message(content, session_id).await {
            Ok(message) => {
                in_flight.succeed();
                self.invalidate(session_id);
                tracing::info!(%session_id, message_id = message.id, "message sent");
                self.notifier
                    .notify(Notification::success("Message sent", "Your message has been sent."));
                Ok(message)
            }
            Err(e) => {
                in_flight.fail();
                tracing::warn!(%session_id, error = %e, "message send failed");
                Err(ChatError::Send(e))
            }
        }
    }

    /// Upload `file` as multipart form data. Success invalidates history and
    /// notifies; failure notifies an error. The MIME allow-list is enforced by
    /// the caller before this point.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::NoSession`], [`ChatError::Busy`] while another
    /// upload is pending, or [`ChatError::Upload`] when the transport fails.
    pub async fn upload_file(&self, file: &UploadFile, session_id: &str) -> Result<UploadAck, ChatError> {
        if session_id.is_empty() {
            return Err(ChatError::NoSession);
        }
        let in_flight = self.requests.begin(OperationKind::Upload)?;

        match self.api.upload_file(file, session_id).await {
            Ok(ack) => {
                in_flight.succeed();
                self.invalidate(session_id);
                tracing::info!(%session_id, file_name = %file.file_name, bytes = file.bytes.len(), "file uploaded");
                self.notifier.notify(Notification::success(
                    "File uploaded",
                    format!("{} has been uploaded.", file.file_name),
                ));
                Ok(ack)
            }
            Err(e) => {
                in_flight.fail();
                tracing::warn!(%session_id, file_name = %file.file_name, error = %e, "file upload failed");
                let err = ChatError::Upload(UploadError::Transport(e));
                self.notifier.notify(Notification::error("Upload failed", err.user_message()));
                Err(err)
            }
        }
    }
}
