//! First-run tutorial overlay state.
//!
//! Four fixed steps, shown once per user. Finishing or skipping writes
//! `tutorial_shown_user_{user_id} = "true"` so it stays dismissed.

#[cfg(test)]
#[path = "tutorial_test.rs"]
mod tutorial_test;

use std::sync::Arc;

use crate::net::types::User;
use crate::storage::{KeyValueStore, StoreError};

pub const TUTORIAL_KEY_PREFIX: &str = "tutorial_shown_user_";
const SHOWN: &str = "true";

#[must_use]
pub fn tutorial_key(user_id: &str) -> String {
    format!("{TUTORIAL_KEY_PREFIX}{user_id}")
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TutorialStep {
    #[default]
    Welcome,
    Messaging,
    Uploads,
    Ready,
}

impl TutorialStep {
    pub const ALL: [Self; 4] = [Self::Welcome, Self::Messaging, Self::Uploads, Self::Ready];

    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::Welcome => 0,
            Self::Messaging => 1,
            Self::Uploads => 2,
            Self::Ready => 3,
        }
    }

    #[must_use]
    pub fn next(self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }

    #[must_use]
    pub fn prev(self) -> Option<Self> {
        self.index().checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }

    #[must_use]
    pub fn is_last(self) -> bool {
        self.next().is_none()
    }

}

pub struct Tutorial {
    store: Arc<dyn KeyValueStore>,
    user_id: Option<String>,
    step: TutorialStep,
    visible: bool,
}

impl Tutorial {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store, user_id: None, step: TutorialStep::Welcome, visible: false }
    }

    /// Reset for `user`: visible from the first step unless already dismissed.
    pub fn load_for(&mut self, user: Option<&User>) {
        self.user_id = user.map(|u| u.id.clone());
        self.step = TutorialStep::Welcome;
        self.visible = self
            .user_id
            .as_deref()
            .is_some_and(|id| self.store.get(&tutorial_key(id)).as_deref() != Some(SHOWN));
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub fn step(&self) -> TutorialStep {
        self.step
    }

    /// Move forward one step; on the last step this dismisses the tutorial.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if dismissal cannot be persisted.
    pub fn advance(&mut self) -> Result<(), StoreError> {
        if !self.visible {
            return Ok(());
        }
        match self.step.next() {
            Some(next) => {
                self.step = next;
                Ok(())
            }
            None => self.dismiss(),
        }
    }

    /// Move back one step; a no-op on the first step.
    pub fn back(&mut self) {
        if let Some(prev) = self.step.prev() {
            self.step = prev;
        }
    }

    /// Hide the tutorial and remember that this user has seen it.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the flag cannot be persisted.
    pub fn dismiss(&mut self) -> Result<(), StoreError> {
        self.visible = false;
        if let Some(id) = self.user_id.as_deref() {
            self.store.set(&tutorial_key(id), SHOWN)?;
            tracing::debug!(user_id = %id, "tutorial dismissed");
        }
        Ok(())
    }
}
