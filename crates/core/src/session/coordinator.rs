//! Single-flight access token refresh
//!
//! Every request that sees a 401 calls [`RefreshCoordinator::refreshed_token`].
//! The first caller while idle starts the one refresh call; everyone who
//! arrives before it settles is queued behind it. When the call settles the
//! queue is drained in arrival order with the same outcome:
//!
//! - success: the new access token is stored and handed to every waiter
//! - failure: both tokens are cleared, the [`SessionListener`] is told once
//!   if there was a session to end, and every waiter receives the error
//!
//! The refresh runs on its own task so a caller dropping its future cannot
//! leave the coordinator stuck in `Refreshing`.
//!
//! [`RefreshCoordinator::end_session`] (explicit logout) invalidates any
//! refresh in flight: queued waiters get [`RefreshError::SessionEnded`]
//! immediately and the stale result is discarded when it arrives.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use ajok_domain::constants::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use ajok_domain::{Credentials, RefreshedAccess, Result};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use super::credentials::{clear_credentials, load_credentials, refresh_token, save_credentials};
use super::ports::{LogoutReason, RefreshError, SessionListener, TokenRefresher, TokenStore};

type Outcome = std::result::Result<String, RefreshError>;

/// Coordinator state as seen from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPhase {
    Idle,
    Refreshing,
}

struct State {
    phase: RefreshPhase,
    waiters: VecDeque<oneshot::Sender<Outcome>>,
    /// Bumped when a refresh starts and when the session is ended; a refresh
    /// only commits if the generation it started with is still current.
    generation: u64,
    refreshes_started: u64,
}

struct Inner {
    store: Arc<dyn TokenStore>,
    refresher: Arc<dyn TokenRefresher>,
    listener: Arc<dyn SessionListener>,
    timeout: Duration,
    state: Mutex<State>,
    /// Serializes token writes between refresh completion and logout.
    commit: tokio::sync::Mutex<()>,
}

impl Inner {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn run(self: Arc<Self>, generation: u64) {
        let outcome = self.exchange().await;

        let _commit = self.commit.lock().await;
        if self.state().generation != generation {
            debug!(generation, "discarding refresh result for ended session");
            return;
        }

        let outcome = match outcome {
            Ok(refreshed) => self.persist(refreshed).await,
            Err(err) => Err(err),
        };

        if let Err(err) = &outcome {
            let had_session = self.has_credentials().await;
            warn!(error = %err, had_session, "token refresh failed; ending session");
            if let Err(clear_err) = clear_credentials(self.store.as_ref()).await {
                warn!(error = %clear_err, "failed to clear credentials after refresh failure");
            }
            if had_session {
                self.listener.on_logout(LogoutReason::from(err));
            }
        }

        let waiters = {
            let mut state = self.state();
            state.phase = RefreshPhase::Idle;
            std::mem::take(&mut state.waiters)
        };

        debug!(waiters = waiters.len(), success = outcome.is_ok(), "releasing queued requests");
        for waiter in waiters {
            // A waiter whose caller went away is simply skipped.
            let _ = waiter.send(outcome.clone());
        }
    }

    /// Unreadable stores count as holding a session.
    async fn has_credentials(&self) -> bool {
        match load_credentials(self.store.as_ref()).await {
            Ok(existing) => existing.access_token.is_some() || existing.refresh_token.is_some(),
            Err(_) => true,
        }
    }

    /// Read the refresh token and call the backend, bounded by the timeout.
    async fn exchange(&self) -> std::result::Result<RefreshedAccess, RefreshError> {
        let token = refresh_token(self.store.as_ref())
            .await
            .map_err(RefreshError::Store)?
            .ok_or(RefreshError::MissingRefreshToken)?;

        match tokio::time::timeout(self.timeout, self.refresher.refresh(&token)).await {
            Ok(result) => result,
            Err(_) => Err(RefreshError::TimedOut(self.timeout)),
        }
    }

    async fn persist(&self, refreshed: RefreshedAccess) -> Outcome {
        self.store.set(ACCESS_TOKEN_KEY, &refreshed.access).await.map_err(RefreshError::Store)?;
        if let Some(rotated) = &refreshed.refresh {
            self.store.set(REFRESH_TOKEN_KEY, rotated).await.map_err(RefreshError::Store)?;
        }
        info!(rotated = refreshed.refresh.is_some(), "access token refreshed");
        Ok(refreshed.access)
    }
}

/// Per-client single-flight refresh gate.
///
/// Cloning shares the same state.
#[derive(Clone)]
pub struct RefreshCoordinator {
    inner: Arc<Inner>,
}

impl RefreshCoordinator {
    pub fn new(
        store: Arc<dyn TokenStore>,
        refresher: Arc<dyn TokenRefresher>,
        listener: Arc<dyn SessionListener>,
        timeout: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                refresher,
                listener,
                timeout,
                state: Mutex::new(State {
                    phase: RefreshPhase::Idle,
                    waiters: VecDeque::new(),
                    generation: 0,
                    refreshes_started: 0,
                }),
                commit: tokio::sync::Mutex::new(()),
            }),
        }
    }

    /// Wait for a fresh access token after an authorization failure.
    ///
    /// Starts a refresh when idle, otherwise joins the one in flight.
    ///
    /// # Errors
    /// Returns the shared refresh failure. By the time it is returned the
    /// credentials are already cleared and the listener notified.
    pub async fn refreshed_token(&self) -> Outcome {
        let (tx, rx) = oneshot::channel();

        let started = {
            let mut state = self.inner.state();
            state.waiters.push_back(tx);
            match state.phase {
                RefreshPhase::Idle => {
                    state.phase = RefreshPhase::Refreshing;
                    state.generation += 1;
                    state.refreshes_started += 1;
                    Some(state.generation)
                }
                RefreshPhase::Refreshing => None,
            }
        };

        match started {
            Some(generation) => {
                debug!(generation, "starting token refresh");
                tokio::spawn(Arc::clone(&self.inner).run(generation));
            }
            None => debug!("token refresh in flight; request queued"),
        }

        rx.await.unwrap_or(Err(RefreshError::SessionEnded))
    }

    /// Start a new session with freshly issued credentials.
    ///
    /// Any refresh still in flight belongs to the previous session: its
    /// waiters get [`RefreshError::SessionEnded`] and its result is dropped.
    ///
    /// # Errors
    /// Returns error if the credentials cannot be persisted
    pub async fn begin_session(&self, credentials: &Credentials) -> Result<()> {
        let _commit = self.inner.commit.lock().await;
        self.invalidate_in_flight();

        save_credentials(self.inner.store.as_ref(), credentials).await?;
        info!("session started");
        self.inner.listener.on_login();
        Ok(())
    }

    /// End the session: clear credentials, cancel any refresh in flight, and
    /// notify the listener.
    ///
    /// Non-explicit reasons only notify when there was a session to end, so
    /// several requests failing at once produce a single logout.
    ///
    /// # Errors
    /// Returns error if the token store cannot be cleared
    pub async fn end_session(&self, reason: LogoutReason) -> Result<()> {
        let _commit = self.inner.commit.lock().await;
        self.invalidate_in_flight();

        let existing = load_credentials(self.inner.store.as_ref()).await?;
        let had_session = existing.access_token.is_some() || existing.refresh_token.is_some();

        clear_credentials(self.inner.store.as_ref()).await?;

        if had_session || reason == LogoutReason::UserInitiated {
            info!(?reason, "session ended");
            self.inner.listener.on_logout(reason);
        }
        Ok(())
    }

    fn invalidate_in_flight(&self) {
        let cancelled = {
            let mut state = self.inner.state();
            state.generation += 1;
            state.phase = RefreshPhase::Idle;
            std::mem::take(&mut state.waiters)
        };
        if !cancelled.is_empty() {
            debug!(waiters = cancelled.len(), "cancelling requests queued on a stale refresh");
        }
        for waiter in cancelled {
            let _ = waiter.send(Err(RefreshError::SessionEnded));
        }
    }

    pub fn phase(&self) -> RefreshPhase {
        self.inner.state().phase
    }

    /// Requests currently waiting on the refresh in flight.
    pub fn queued(&self) -> usize {
        self.inner.state().waiters.len()
    }

    /// Refresh calls started over the coordinator's lifetime.
    pub fn refreshes_started(&self) -> u64 {
        self.inner.state().refreshes_started
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tokio::sync::{Notify, RwLock};

    use super::*;

    #[derive(Default)]
    struct TestStore {
        values: RwLock<HashMap<String, String>>,
    }

    impl TestStore {
        fn with_tokens(access: &str, refresh: Option<&str>) -> Arc<Self> {
            let mut values = HashMap::new();
            values.insert(ACCESS_TOKEN_KEY.to_string(), access.to_string());
            if let Some(refresh) = refresh {
                values.insert(REFRESH_TOKEN_KEY.to_string(), refresh.to_string());
            }
            Arc::new(Self { values: RwLock::new(values) })
        }

        async fn value(&self, key: &str) -> Option<String> {
            self.values.read().await.get(key).cloned()
        }
    }

    #[async_trait]
    impl TokenStore for TestStore {
        async fn get(&self, key: &str) -> Result<Option<String>> {
            Ok(self.values.read().await.get(key).cloned())
        }

        async fn set(&self, key: &str, value: &str) -> Result<()> {
            self.values.write().await.insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn remove(&self, key: &str) -> Result<()> {
            self.values.write().await.remove(key);
            Ok(())
        }
    }

    /// Refresher that blocks until released, then returns a fixed outcome.
    struct GatedRefresher {
        gate: Notify,
        calls: AtomicUsize,
        outcome: std::result::Result<RefreshedAccess, RefreshError>,
    }

    impl GatedRefresher {
        fn succeeding(access: &str) -> Arc<Self> {
            Arc::new(Self {
                gate: Notify::new(),
                calls: AtomicUsize::new(0),
                outcome: Ok(RefreshedAccess { access: access.to_string(), refresh: None }),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                gate: Notify::new(),
                calls: AtomicUsize::new(0),
                outcome: Err(RefreshError::Rejected(message.to_string())),
            })
        }

        fn release(&self) {
            self.gate.notify_one();
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TokenRefresher for GatedRefresher {
        async fn refresh(
            &self,
            _refresh_token: &str,
        ) -> std::result::Result<RefreshedAccess, RefreshError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
            self.outcome.clone()
        }
    }

    #[derive(Default)]
    struct RecordingListener {
        reasons: std::sync::Mutex<Vec<LogoutReason>>,
    }

    impl RecordingListener {
        fn reasons(&self) -> Vec<LogoutReason> {
            self.reasons.lock().unwrap().clone()
        }
    }

    impl SessionListener for RecordingListener {
        fn on_logout(&self, reason: LogoutReason) {
            self.reasons.lock().unwrap().push(reason);
        }
    }

    fn coordinator(
        store: Arc<TestStore>,
        refresher: Arc<GatedRefresher>,
        listener: Arc<RecordingListener>,
    ) -> RefreshCoordinator {
        RefreshCoordinator::new(store, refresher, listener, Duration::from_secs(5))
    }

    async fn wait_for_queue(coordinator: &RefreshCoordinator, len: usize) {
        while coordinator.queued() < len {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn single_waiter_gets_new_token_and_store_is_updated() {
        let store = TestStore::with_tokens("stale", Some("refresh-1"));
        let refresher = GatedRefresher::succeeding("fresh");
        let listener = Arc::new(RecordingListener::default());
        let coordinator = coordinator(store.clone(), refresher.clone(), listener.clone());

        let waiter = tokio::spawn({
            let coordinator = coordinator.clone();
            async move { coordinator.refreshed_token().await }
        });
        wait_for_queue(&coordinator, 1).await;
        assert_eq!(coordinator.phase(), RefreshPhase::Refreshing);

        refresher.release();
        assert_eq!(waiter.await.unwrap(), Ok("fresh".to_string()));

        assert_eq!(store.value(ACCESS_TOKEN_KEY).await.as_deref(), Some("fresh"));
        assert_eq!(store.value(REFRESH_TOKEN_KEY).await.as_deref(), Some("refresh-1"));
        assert_eq!(coordinator.phase(), RefreshPhase::Idle);
        assert!(listener.reasons().is_empty());
    }

    #[tokio::test]
    async fn concurrent_waiters_share_one_refresh_in_arrival_order() {
        let store = TestStore::with_tokens("stale", Some("refresh-1"));
        let refresher = GatedRefresher::succeeding("fresh");
        let listener = Arc::new(RecordingListener::default());
        let coordinator = coordinator(store, refresher.clone(), listener);
        let released = Arc::new(std::sync::Mutex::new(Vec::new()));

        let mut handles = Vec::new();
        for index in 0..4 {
            let coordinator_clone = coordinator.clone();
            let released = released.clone();
            handles.push(tokio::spawn(async move {
                let token = coordinator_clone.refreshed_token().await;
                released.lock().unwrap().push(index);
                token
            }));
            wait_for_queue(&coordinator, index + 1).await;
        }

        refresher.release();
        for handle in handles {
            assert_eq!(handle.await.unwrap(), Ok("fresh".to_string()));
        }

        assert_eq!(refresher.calls(), 1);
        assert_eq!(coordinator.refreshes_started(), 1);
        assert_eq!(*released.lock().unwrap(), vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn failed_refresh_rejects_everyone_clears_tokens_and_logs_out_once() {
        let store = TestStore::with_tokens("stale", Some("revoked"));
        let refresher = GatedRefresher::failing("token_not_valid");
        let listener = Arc::new(RecordingListener::default());
        let coordinator = coordinator(store.clone(), refresher.clone(), listener.clone());

        let mut handles = Vec::new();
        for index in 0..3 {
            let coordinator_clone = coordinator.clone();
            handles.push(tokio::spawn(async move { coordinator_clone.refreshed_token().await }));
            wait_for_queue(&coordinator, index + 1).await;
        }

        refresher.release();
        for handle in handles {
            assert_eq!(
                handle.await.unwrap(),
                Err(RefreshError::Rejected("token_not_valid".to_string()))
            );
        }

        assert_eq!(store.value(ACCESS_TOKEN_KEY).await, None);
        assert_eq!(store.value(REFRESH_TOKEN_KEY).await, None);
        assert_eq!(listener.reasons(), vec![LogoutReason::RefreshRejected]);
        assert_eq!(coordinator.phase(), RefreshPhase::Idle);
    }

    #[tokio::test]
    async fn missing_refresh_token_fails_without_calling_backend() {
        let store = TestStore::with_tokens("stale", None);
        let refresher = GatedRefresher::succeeding("never");
        let listener = Arc::new(RecordingListener::default());
        let coordinator = coordinator(store.clone(), refresher.clone(), listener.clone());

        let outcome = coordinator.refreshed_token().await;

        assert_eq!(outcome, Err(RefreshError::MissingRefreshToken));
        assert_eq!(refresher.calls(), 0);
        assert_eq!(store.value(ACCESS_TOKEN_KEY).await, None);
        assert_eq!(listener.reasons(), vec![LogoutReason::MissingRefreshToken]);
    }

    #[tokio::test]
    async fn hung_refresh_times_out_as_failure() {
        let store = TestStore::with_tokens("stale", Some("refresh-1"));
        let refresher = GatedRefresher::succeeding("late");
        let listener = Arc::new(RecordingListener::default());
        let coordinator = RefreshCoordinator::new(
            store.clone(),
            refresher,
            listener.clone(),
            Duration::from_millis(50),
        );

        let outcome = coordinator.refreshed_token().await;

        assert_eq!(outcome, Err(RefreshError::TimedOut(Duration::from_millis(50))));
        assert_eq!(store.value(REFRESH_TOKEN_KEY).await, None);
        assert_eq!(listener.reasons(), vec![LogoutReason::RefreshTimedOut]);
    }

    #[tokio::test]
    async fn coordinator_is_reusable_after_a_refresh() {
        let store = TestStore::with_tokens("stale", Some("refresh-1"));
        let refresher = GatedRefresher::succeeding("fresh");
        let listener = Arc::new(RecordingListener::default());
        let coordinator = coordinator(store, refresher.clone(), listener);

        for round in 1..=2u64 {
            let waiter = tokio::spawn({
                let coordinator = coordinator.clone();
                async move { coordinator.refreshed_token().await }
            });
            wait_for_queue(&coordinator, 1).await;
            refresher.release();
            assert!(waiter.await.unwrap().is_ok());
            assert_eq!(coordinator.refreshes_started(), round);
        }
        assert_eq!(refresher.calls(), 2);
    }

    #[tokio::test]
    async fn logout_during_refresh_cancels_waiters_and_ignores_late_result() {
        let store = TestStore::with_tokens("stale", Some("refresh-1"));
        let refresher = GatedRefresher::succeeding("fresh");
        let listener = Arc::new(RecordingListener::default());
        let coordinator = coordinator(store.clone(), refresher.clone(), listener.clone());

        let waiter = tokio::spawn({
            let coordinator = coordinator.clone();
            async move { coordinator.refreshed_token().await }
        });
        wait_for_queue(&coordinator, 1).await;

        coordinator.end_session(LogoutReason::UserInitiated).await.unwrap();
        assert_eq!(waiter.await.unwrap(), Err(RefreshError::SessionEnded));
        assert_eq!(coordinator.phase(), RefreshPhase::Idle);

        // Let the stale refresh finish; it must not resurrect the session.
        refresher.release();
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(store.value(ACCESS_TOKEN_KEY).await, None);
        assert_eq!(listener.reasons(), vec![LogoutReason::UserInitiated]);
    }

    #[tokio::test]
    async fn login_during_refresh_keeps_the_new_credentials() {
        let store = TestStore::with_tokens("stale", Some("old-refresh"));
        let refresher = GatedRefresher::succeeding("from-old-session");
        let listener = Arc::new(RecordingListener::default());
        let coordinator = coordinator(store.clone(), refresher.clone(), listener.clone());

        let waiter = tokio::spawn({
            let coordinator = coordinator.clone();
            async move { coordinator.refreshed_token().await }
        });
        wait_for_queue(&coordinator, 1).await;

        coordinator.begin_session(&Credentials::new("new-access", "new-refresh")).await.unwrap();
        assert_eq!(waiter.await.unwrap(), Err(RefreshError::SessionEnded));

        refresher.release();
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(store.value(ACCESS_TOKEN_KEY).await.as_deref(), Some("new-access"));
        assert_eq!(store.value(REFRESH_TOKEN_KEY).await.as_deref(), Some("new-refresh"));
        assert!(listener.reasons().is_empty());
    }

    #[tokio::test]
    async fn failed_refresh_on_empty_store_does_not_signal_again() {
        let store = Arc::new(TestStore::default());
        let refresher = GatedRefresher::succeeding("never");
        let listener = Arc::new(RecordingListener::default());
        let coordinator = coordinator(store, refresher.clone(), listener.clone());

        let outcome = coordinator.refreshed_token().await;

        assert_eq!(outcome, Err(RefreshError::MissingRefreshToken));
        assert_eq!(refresher.calls(), 0);
        assert!(listener.reasons().is_empty());
    }

    #[tokio::test]
    async fn repeated_forced_logout_notifies_once() {
        let store = TestStore::with_tokens("fresh", Some("refresh-1"));
        let refresher = GatedRefresher::succeeding("unused");
        let listener = Arc::new(RecordingListener::default());
        let coordinator = coordinator(store, refresher, listener.clone());

        coordinator.end_session(LogoutReason::Unauthorized).await.unwrap();
        coordinator.end_session(LogoutReason::Unauthorized).await.unwrap();

        assert_eq!(listener.reasons(), vec![LogoutReason::Unauthorized]);
    }
}
