//! Per-user chat session identity.
//!
//! DESIGN
//! ======
//! Each authenticated user gets one opaque session id per store, kept under
//! `chat_session_id_user_{user_id}`. The id is generated on first use and
//! persisted before it is handed out, so a reload with the same store returns
//! the same conversation. Keys are namespaced by user id, so switching users
//! on one store never leaks another user's session.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;

use crate::net::types::User;
use crate::storage::{KeyValueStore, StoreError};

pub const SESSION_KEY_PREFIX: &str = "chat_session_id_user_";

/// Store key holding the session id for `user_id`.
#[must_use]
pub fn session_key(user_id: &str) -> String {
    format!("{SESSION_KEY_PREFIX}{user_id}")
}

/// Source of fresh session ids.
pub type IdGenerator = Box<dyn Fn() -> String + Send + Sync>;

fn uuid_generator() -> IdGenerator {
    Box::new(|| uuid::Uuid::new_v4().to_string())
}

/// The user/session pair currently in effect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActiveSession {
    pub user_id: String,
    pub session_id: String,
}

/// Outcome of reconciling the session with a (possibly new) user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionChange {
    pub previous: Option<ActiveSession>,
    pub current: Option<ActiveSession>,
}

impl SessionChange {
    /// Whether the effective session id differs from before.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.previous.as_ref().map(|s| &s.session_id) != self.current.as_ref().map(|s| &s.session_id)
    }
}

pub struct SessionManager {
    store: Arc<dyn KeyValueStore>,
    generate_id: IdGenerator,
    current: Option<ActiveSession>,
}

impl SessionManager {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_id_generator(store, uuid_generator())
    }

    #[must_use]
    pub fn with_id_generator(store: Arc<dyn KeyValueStore>, generate_id: IdGenerator) -> Self {
        Self { store, generate_id, current: None }
    }

    /// Session id for `user`: empty when there is no user, otherwise the
    /// stored id, or a freshly generated one that is persisted first.
    ///
    /// A failed write is logged and the id is still returned, so the session
    /// works for this process even when persistence is unavailable.
    pub fn resolve(&self, user: Option<&User>) -> String {
        let Some(user) = user else {
            return String::new();
        };

        let key = session_key(&user.id);
        if let Some(existing) = self.store.get(&key).filter(|id| !id.trim().is_empty()) {
            tracing::debug!(user_id = %user.id, session_id = %existing, "reusing stored chat session");
            return existing;
        }

        let session_id = (self.generate_id)();
        if let Err(e) = self.store.set(&key, &session_id) {
            tracing::warn!(user_id = %user.id, error = %e, "failed to persist chat session id");
        }
        tracing::info!(user_id = %user.id, %session_id, "created chat session");
        session_id
    }

    /// Re-run lookup/generate for the current user and remember the result.
    pub fn sync_user(&mut self, user: Option<&User>) -> SessionChange {
        let current = user.map(|u| ActiveSession { user_id: u.id.clone(), session_id: self.resolve(Some(u)) });
        let previous = std::mem::replace(&mut self.current, current.clone());
        SessionChange { previous, current }
    }

    /// Active session id, or `""` when signed out.
    #[must_use]
    pub fn session_id(&self) -> &str {
        self.current.as_ref().map_or("", |s| s.session_id.as_str())
    }

    #[must_use]
    pub fn active(&self) -> Option<&ActiveSession> {
        self.current.as_ref()
    }

    /// Queries scoped by the session are enabled only with a user and an id.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.session_id().is_empty()
    }

    /// Drop the stored id for `user`. If `user` is active, the next
    /// `sync_user` starts a new conversation.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the removal cannot be persisted.
    pub fn forget(&mut self, user: &User) -> Result<(), StoreError> {
        self.store.remove(&session_key(&user.id))?;
        if self.current.as_ref().is_some_and(|s| s.user_id == user.id) {
            self.current = None;
        }
        Ok(())
    }
}
