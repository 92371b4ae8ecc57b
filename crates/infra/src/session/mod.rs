//! Session state broadcast
//!
//! [`SessionSignal`] is the [`SessionListener`] an application hands to the
//! API client. It turns login and logout into a `watch` channel so a UI
//! layer can route to the sign-in page when the session ends.

use std::sync::atomic::{AtomicU64, Ordering};

use ajok_core::{LogoutReason, SessionListener};
use tokio::sync::watch;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No session has been started or observed yet
    Anonymous,
    Active,
    SignedOut(LogoutReason),
}

impl SessionState {
    pub fn is_active(self) -> bool {
        self == SessionState::Active
    }
}

#[derive(Debug)]
pub struct SessionSignal {
    tx: watch::Sender<SessionState>,
    logouts: AtomicU64,
}

impl SessionSignal {
    pub fn new(initial: SessionState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx, logouts: AtomicU64::new(0) }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> SessionState {
        *self.tx.borrow()
    }

    /// Logout notifications received so far
    pub fn logouts(&self) -> u64 {
        self.logouts.load(Ordering::SeqCst)
    }
}

impl Default for SessionSignal {
    fn default() -> Self {
        Self::new(SessionState::Anonymous)
    }
}

impl SessionListener for SessionSignal {
    fn on_logout(&self, reason: LogoutReason) {
        self.logouts.fetch_add(1, Ordering::SeqCst);
        info!(?reason, "session ended");
        self.tx.send_replace(SessionState::SignedOut(reason));
    }

    fn on_login(&self) {
        self.tx.send_replace(SessionState::Active);
    }
}
