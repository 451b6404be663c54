//! Chat widget composition root.
//!
//! ARCHITECTURE
//! ============
//! `ChatWidget` owns the form state (draft text, selected file) and wires the
//! session manager, exchange controller, tutorial, and connectivity flag
//! together. Every method takes `&self` so a UI can share one widget across
//! event handlers; locks are never held across an await.
//!
//! ORDERING
//! ========
//! - `submit` clears the draft before the send is dispatched.
//! - History is refetched only after a write reports success.
//! - The upload MIME gate runs before the exchange is touched.

#[cfg(test)]
#[path = "widget_test.rs"]
mod widget_test;

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::net::api::ChatApi;
use crate::net::types::{
    ChatError, Message, OperationKind, UploadAck, UploadError, UploadFile, User, is_allowed_upload_mime,
    mime_for_file_name,
};
use crate::notify::{Notification, Notifier};
use crate::state::connectivity::Connectivity;
use crate::state::exchange::MessageExchange;
use crate::state::lifecycle::RequestState;
use crate::state::session::{IdGenerator, SessionChange, SessionManager};
use crate::state::tutorial::{Tutorial, TutorialStep};
use crate::storage::{KeyValueStore, StoreError};

#[derive(Debug, Default)]
struct FormState {
    draft: String,
    selected_file: Option<String>,
}

pub struct ChatWidget {
    user: Mutex<Option<User>>,
    session: Mutex<SessionManager>,
    tutorial: Mutex<Tutorial>,
    form: Mutex<FormState>,
    store: Arc<dyn KeyValueStore>,
    exchange: MessageExchange,
    connectivity: Arc<Connectivity>,
    notifier: Arc<dyn Notifier>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ChatWidget {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, api: Arc<dyn ChatApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            user: Mutex::new(None),
            session: Mutex::new(SessionManager::new(store.clone())),
            tutorial: Mutex::new(Tutorial::new(store.clone())),
            form: Mutex::new(FormState::default()),
            store,
            exchange: MessageExchange::new(api, notifier.clone()),
            connectivity: Arc::new(Connectivity::new(true)),
            notifier,
        }
    }

    /// Replace the session id source. Intended to be called before the first
    /// `set_user`; ids persist to the store passed to [`Self::new`].
    #[must_use]
    pub fn with_id_generator(self, generate_id: IdGenerator) -> Self {
        *lock(&self.session) = SessionManager::with_id_generator(self.store.clone(), generate_id);
        self
    }

    // =========================================================================
    // USER + SESSION
    // =========================================================================

    /// Reconcile with the authenticated user. A session change evicts the
    /// previous session's cached history, resets the form, and reloads the
    /// tutorial for the new user.
    pub fn set_user(&self, user: Option<User>) -> SessionChange {
        let change = lock(&self.session).sync_user(user.as_ref());
        if change.changed() {
            if let Some(prev) = change.previous.as_ref() {
                self.exchange.evict(&prev.session_id);
            }
            *lock(&self.form) = FormState::default();
        }
        lock(&self.tutorial).load_for(user.as_ref());
        *lock(&self.user) = user;
        change
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        lock(&self.user).clone()
    }

    #[must_use]
    pub fn session_id(&self) -> String {
        lock(&self.session).session_id().to_owned()
    }

    /// Start a new conversation for the current user.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the stored id cannot be removed.
    pub fn reset_session(&self) -> Result<SessionChange, StoreError> {
        let user = self.user();
        if let Some(u) = user.as_ref() {
            let mut session = lock(&self.session);
            let old = session.session_id().to_owned();
            session.forget(u)?;
            self.exchange.evict(&old);
        }
        Ok(self.set_user(user))
    }

    fn active_session(&self) -> Result<String, ChatError> {
        let id = self.session_id();
        if id.is_empty() { Err(ChatError::NoSession) } else { Ok(id) }
    }

    // =========================================================================
    // HISTORY
    // =========================================================================

    /// Messages for the active session, fetched or served from cache.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::NoSession`] when signed out and
    /// [`ChatError::Fetch`] when the fetch fails.
    pub async fn messages(&self) -> Result<Vec<Message>, ChatError> {
        let session_id = self.active_session()?;
        self.exchange.fetch_history(&session_id).await
    }

    /// Last fetched messages if the cache is fresh. Never touches the network.
    #[must_use]
    pub fn cached_messages(&self) -> Option<Vec<Message>> {
        let session_id = self.session_id();
        if session_id.is_empty() {
            return None;
        }
        self.exchange.cached_history(&session_id)
    }

    async fn refresh_after_write(&self, session_id: &str) {
        if let Err(e) = self.exchange.fetch_history(session_id).await {
            tracing::warn!(%session_id, error = %e, "history refresh after write failed");
        }
    }

    // =========================================================================
    // TEXT FORM
    // =========================================================================

    pub fn set_draft(&self, text: impl Into<String>) {
        lock(&self.form).draft = text.into();
    }

    #[must_use]
    pub fn draft(&self) -> String {
        lock(&self.form).draft.clone()
    }

    /// Whether the send control should be enabled.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        !self.session_id().is_empty()
            && !lock(&self.form).draft.trim().is_empty()
            && !self.exchange.request_state(OperationKind::Send).is_pending()
    }

    /// Send the current draft. The draft is cleared before the request is
    /// dispatched; on success the history is refetched.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::EmptyMessage`] for a blank draft,
    /// [`ChatError::NoSession`] when signed out, [`ChatError::Busy`] while a
    /// send is pending, or [`ChatError::Send`] when the request fails.
    pub async fn submit(&self) -> Result<Message, ChatError> {
        let session_id = self.active_session()?;
        // Admission and the draft clear happen under the form lock, so a
        // rejected concurrent submit keeps its text.
        let (content, in_flight) = {
            let mut form = lock(&self.form);
            let content = form.draft.trim().to_owned();
            if content.is_empty() {
                return Err(ChatError::EmptyMessage);
            }
            let in_flight = self.exchange.begin_send()?;
            form.draft.clear();
            (content, in_flight)
        };

        match self.exchange.send_claimed(in_flight, &content, &session_id).await {
            Ok(message) => {
                self.refresh_after_write(&session_id).await;
                Ok(message)
            }
            Err(e) => {
                self.notifier.notify(Notification::error("Error", e.user_message()));
                Err(e)
            }
        }
    }

    // =========================================================================
    // FILE FORM
    // =========================================================================

    /// Name of the file currently being uploaded, if any.
    #[must_use]
    pub fn selected_file(&self) -> Option<String> {
        lock(&self.form).selected_file.clone()
    }

    /// Handle a file picked by the user: gate on MIME type, upload, then
    /// clear the selection whatever the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Upload`] with [`UploadError::UnsupportedType`]
    /// before any network call for a disallowed type, [`ChatError::NoSession`]
    /// when signed out, [`ChatError::Busy`] while an upload is pending, or
    /// [`ChatError::Upload`] when the request fails.
    pub async fn select_file(&self, file: UploadFile) -> Result<UploadAck, ChatError> {
        if !is_allowed_upload_mime(&file.mime_type) {
            let err = ChatError::Upload(UploadError::UnsupportedType { mime: file.mime_type.clone() });
            tracing::debug!(mime = %file.mime_type, "rejected upload type");
            self.notifier.notify(Notification::error("Invalid file type", err.user_message()));
            return Err(err);
        }
        let session_id = self.active_session()?;

        lock(&self.form).selected_file = Some(file.file_name.clone());
        let result = self.exchange.upload_file(&file, &session_id).await;
        lock(&self.form).selected_file = None;

        if result.is_ok() {
            self.refresh_after_write(&session_id).await;
        }
        result
    }

    // =========================================================================
    // STATUS
    // =========================================================================

    #[must_use]
    pub fn request_state(&self, kind: OperationKind) -> RequestState {
        self.exchange.request_state(kind)
    }

    #[must_use]
    pub fn connectivity(&self) -> &Arc<Connectivity> {
        &self.connectivity
    }

    #[must_use]
    pub fn is_online(&self) -> bool {
        self.connectivity.is_online()
    }

    // =========================================================================
    // TUTORIAL
    // =========================================================================

    /// Current tutorial step while the overlay is showing.
    #[must_use]
    pub fn tutorial_step(&self) -> Option<TutorialStep> {
        let tutorial = lock(&self.tutorial);
        tutorial.is_visible().then(|| tutorial.step())
    }

    /// # Errors
    ///
    /// Returns a [`StoreError`] if finishing the tutorial cannot be persisted.
    pub fn advance_tutorial(&self) -> Result<(), StoreError> {
        lock(&self.tutorial).advance()
    }

    pub fn tutorial_back(&self) {
        lock(&self.tutorial).back();
    }

    /// # Errors
    ///
    /// Returns a [`StoreError`] if the dismissal cannot be persisted.
    pub fn skip_tutorial(&self) -> Result<(), StoreError> {
        lock(&self.tutorial).dismiss()
    }
}

/// Read a file from disk into an [`UploadFile`], guessing its MIME type from
/// the extension.
///
/// # Errors
///
/// Returns [`UploadError::Read`] if the file cannot be read.
pub async fn load_upload_file(path: &Path) -> Result<UploadFile, UploadError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| UploadError::Read(format!("{}: {e}", path.display())))?;
    let file_name = path
        .file_name()
        .map_or_else(|| "upload".to_owned(), |n| n.to_string_lossy().into_owned());
    let mime = mime_for_file_name(&file_name);
    Ok(UploadFile::new(file_name, mime, bytes))
}
