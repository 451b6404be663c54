//! Request lifecycle tracking for write operations.
//!
//! DESIGN
//! ======
//! Each operation kind moves `Idle -> Pending -> Success | Error`. A settled
//! state counts as idle for admission: the next attempt may start from it.
//! Admission is a check-and-set under one lock, so two rapid triggers cannot
//! both reach the transport; the loser gets `ChatError::Busy`.
//!
//! The `InFlight` guard owns the pending slot. Settling it records the
//! outcome; dropping it unsettled (the future was dropped) returns to `Idle`.

#[cfg(test)]
#[path = "lifecycle_test.rs"]
mod lifecycle_test;

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::net::types::{ChatError, OperationKind};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RequestState {
    #[default]
    Idle,
    Pending,
    Success,
    Error,
}

impl RequestState {
    #[must_use]
    pub fn is_pending(self) -> bool {
        self == Self::Pending
    }
}

#[derive(Debug, Default)]
pub struct RequestTracker {
    states: Mutex<HashMap<OperationKind, RequestState>>,
}

impl RequestTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self, kind: OperationKind) -> RequestState {
        self.states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&kind)
            .copied()
            .unwrap_or_default()
    }

    /// Claim the pending slot for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Busy`] if an operation of the same kind is pending.
    pub fn begin(&self, kind: OperationKind) -> Result<InFlight<'_>, ChatError> {
        let mut states = self.states.lock().unwrap_or_else(PoisonError::into_inner);
        let slot = states.entry(kind).or_default();
        if slot.is_pending() {
            tracing::debug!(%kind, "rejecting duplicate request while pending");
            return Err(ChatError::Busy(kind));
        }
        *slot = RequestState::Pending;
        Ok(InFlight { tracker: self, kind, settled: false })
    }

    /// Return a settled operation to `Idle`. Pending operations are untouched.
    pub fn reset(&self, kind: OperationKind) {
        let mut states = self.states.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = states.get_mut(&kind) {
            if !slot.is_pending() {
                *slot = RequestState::Idle;
            }
        }
    }

    fn set(&self, kind: OperationKind, state: RequestState) {
        self.states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(kind, state);
    }
}

/// Pending-slot guard returned by [`RequestTracker::begin`].
#[must_use = "dropping the guard immediately releases the pending slot"]
pub struct InFlight<'a> {
    tracker: &'a RequestTracker,
    kind: OperationKind,
    settled: bool,
}

impl InFlight<'_> {
    pub fn succeed(mut self) {
        self.settle(RequestState::Success);
    }

    pub fn fail(mut self) {
        self.settle(RequestState::Error);
    }

    fn settle(&mut self, state: RequestState) {
        self.settled = true;
        self.tracker.set(self.kind, state);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.tracker.set(self.kind, RequestState::Idle);
        }
    }
}
