#![allow(dead_code)]

//! Auth Provider — the source of "who is signed in".
//!
//! Providers publish `AuthState` on a `watch` channel; the session follows it.

use tokio::sync::watch;
use tracing::info;

use crate::models::user::{AuthState, AuthUser};

pub trait AuthProvider: Send + Sync {
    /// The receiver starts at the provider's current state.
    fn subscribe(&self) -> watch::Receiver<AuthState>;
}

/// A provider driven by hand: the binary signs in a configured user with it,
/// and tests script sign-in/out sequences.
pub struct LocalAuth {
    tx: watch::Sender<AuthState>,
}

impl Default for LocalAuth {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalAuth {
    /// Starts in the loading state, as a provider restoring a session would.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(AuthState::loading());
        Self { tx }
    }

    pub fn current(&self) -> AuthState {
        self.tx.borrow().clone()
    }

    pub fn sign_in(&self, user: AuthUser) {
        info!("Auth: {} signed in", user.email);
        self.tx.send_replace(AuthState::signed_in(user));
    }

    pub fn sign_out(&self) {
        info!("Auth: signed out");
        self.tx.send_replace(AuthState::signed_out());
    }

    pub fn set_loading(&self) {
        self.tx.send_replace(AuthState::loading());
    }
}

impl AuthProvider for LocalAuth {
    fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.tx.subscribe()
    }
}
