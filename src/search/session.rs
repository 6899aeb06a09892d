//! Search session state with a stale-response guard.
//!
//! Each `begin` issues a token one greater than the last; a completion is
//! installed only while its token is still the latest. A slow response
//! from a superseded search can never overwrite a newer one.

use std::sync::Mutex;

use tracing::debug;

use crate::models::SearchOutcome;

/// Ties an in-flight search to the session generation that started it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchToken(u64);

/// Where the search session currently stands.
#[derive(Debug)]
pub enum SessionState {
    Idle,
    Searching,
    Complete(SearchOutcome),
}

#[derive(Debug)]
struct Inner {
    latest: u64,
    state: SessionState,
}

/// Single-search-at-a-time session holder.
#[derive(Debug)]
pub struct SearchSession {
    inner: Mutex<Inner>,
}

impl SearchSession {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                latest: 0,
                state: SessionState::Idle,
            }),
        }
    }

    /// Start a new search, superseding any search still in flight.
    pub fn begin(&self) -> SearchToken {
        let mut inner = self.lock();
        inner.latest += 1;
        inner.state = SessionState::Searching;
        SearchToken(inner.latest)
    }

    /// Install the outcome for `token`. Returns false when a newer search
    /// or a clear superseded it, in which case the outcome is dropped.
    pub fn complete(&self, token: SearchToken, outcome: SearchOutcome) -> bool {
        let mut inner = self.lock();
        if token.0 != inner.latest {
            debug!(
                "Discarding stale search outcome (token {}, latest {})",
                token.0, inner.latest
            );
            return false;
        }
        inner.state = SessionState::Complete(outcome);
        true
    }

    /// Reset to idle. Also advances the generation so a response from
    /// before the clear cannot land afterwards.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.latest += 1;
        inner.state = SessionState::Idle;
    }

    /// Read the current state.
    pub fn with_state<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        f(&self.lock().state)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("session lock poisoned")
    }
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::new()
    }
}
