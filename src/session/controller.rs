use crate::logging::{CARD_FARMING_TAG, log_error_event, log_event};
use crate::metrics::Metrics;
use crate::models::session::StoredCredentials;
use crate::models::{CredentialPair, SessionConfig, SessionIdentity, SessionStatus, SessionView};
use crate::services::{SessionValidator, ValidationError};
use crate::store::{CREDENTIALS_KEY, KeyValueStore, load_json, save_json};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::timeout;

/// Reasons an `activate` or `submit` call did not produce a new status
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Both session tokens are required")]
    EmptyCredentials,

    #[error("A validation is already in progress")]
    ValidationInProgress,

    #[error("Validation result discarded: superseded by a newer request")]
    Superseded,
}

/// State machine for the stored session cookies
///
/// ```text
/// Unauthenticated ──activate/submit──▶ Validating ──▶ Authenticated(identity)
///        ▲                                   │
///        │                                   └──────▶ Invalid
///        └───────────────── clear ◀───── (any state)
/// ```
///
/// Only one validation runs at a time; `activate` and `submit` while
/// `Validating` return [`SessionError::ValidationInProgress`]. Each validation
/// carries a request token, and a result arriving after `clear` (or any newer
/// request) is dropped.
///
/// The controller is cheap to clone; clones drive the same state. It must be
/// used from within a tokio runtime because a failed submission schedules
/// the error message revert.
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<Inner>,
}

struct Inner {
    store: Arc<dyn KeyValueStore>,
    validator: Arc<dyn SessionValidator>,
    metrics: Arc<Metrics>,
    config: SessionConfig,

    /// Current view; its lock also serializes transitions with credential writes
    view_tx: watch::Sender<SessionView>,

    /// Token of the newest validation request, bumped by `clear` as well
    request_token: AtomicU64,

    /// Bumped whenever a pending error-message revert becomes stale
    error_epoch: AtomicU64,
}

/// Where a validation was started from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Activate,
    Submit,
}

impl SessionController {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        validator: Arc<dyn SessionValidator>,
        metrics: Arc<Metrics>,
        config: SessionConfig,
    ) -> Self {
        let (view_tx, _) = watch::channel(SessionView::default());

        Self {
            inner: Arc::new(Inner {
                store,
                validator,
                metrics,
                config,
                view_tx,
                request_token: AtomicU64::new(0),
                error_epoch: AtomicU64::new(0),
            }),
        }
    }

    /// Current status
    pub fn status(&self) -> SessionStatus {
        self.inner.view_tx.borrow().status.clone()
    }

    /// Current view snapshot
    pub fn view(&self) -> SessionView {
        self.inner.view_tx.borrow().clone()
    }

    /// Receiver that observes every view change
    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.inner.view_tx.subscribe()
    }

    /// The stored pair, if a valid one exists. Used to prefill the inputs.
    pub fn stored_credentials(&self) -> Option<CredentialPair> {
        self.inner.read_stored()
    }

    /// Validate whatever credentials are stored
    ///
    /// With nothing stored the controller stays `Unauthenticated` and the
    /// validator is not called. A failed validation leaves the stored pair in
    /// place; the user decides whether to clear it.
    pub async fn activate(&self) -> Result<SessionStatus, SessionError> {
        let Some(credentials) = self.inner.read_stored() else {
            self.inner.view_tx.send_modify(|view| view.has_credentials = false);
            tracing::debug!("No stored session credentials, staying unauthenticated");
            return Ok(self.status());
        };

        let token = self.inner.begin_validation()?;
        self.inner.view_tx.send_modify(|view| view.has_credentials = true);

        let result = self.inner.validate(&credentials).await;
        self.inner.finish(token, Origin::Activate, &credentials, result)
    }

    /// Validate a newly entered pair and store it if it is accepted
    ///
    /// Empty input is rejected before anything else happens. On rejection
    /// any previously stored pair is kept, the status becomes `Invalid` and
    /// the error message is shown for the configured display window.
    pub async fn submit(&self, sid: &str, sls: &str) -> Result<SessionStatus, SessionError> {
        let Some(credentials) = CredentialPair::new(sid, sls) else {
            tracing::debug!("Ignoring submit with an empty token");
            return Err(SessionError::EmptyCredentials);
        };

        let token = self.inner.begin_validation()?;

        let result = self.inner.validate(&credentials).await;
        self.inner.finish(token, Origin::Submit, &credentials, result)
    }

    /// Forget the stored pair and return to `Unauthenticated`
    ///
    /// Never fails: a storage error is logged and the in-memory state is
    /// reset regardless. Any in-flight validation result is discarded.
    pub fn clear(&self) {
        let inner = &self.inner;

        inner.view_tx.send_modify(|view| {
            inner.request_token.fetch_add(1, Ordering::SeqCst);
            inner.error_epoch.fetch_add(1, Ordering::SeqCst);

            if let Err(e) = inner.store.remove(CREDENTIALS_KEY) {
                inner.metrics.record_storage_failure();
                tracing::error!("Failed to remove stored credentials: {}", e);
                log_error_event(&format!("in (clear credentials): {}", e));
            }

            *view = SessionView::default();
        });

        tracing::info!("Session credentials cleared");
        log_event(&format!("{} Logged out", CARD_FARMING_TAG));
    }
}

impl Inner {
    fn read_stored(&self) -> Option<CredentialPair> {
        match load_json::<StoredCredentials>(self.store.as_ref(), CREDENTIALS_KEY) {
            Ok(stored) => stored.and_then(StoredCredentials::into_pair),
            Err(e) => {
                tracing::warn!("Ignoring unreadable stored credentials: {}", e);
                None
            }
        }
    }

    /// Move to `Validating` and take a request token, unless a validation is running
    fn begin_validation(&self) -> Result<u64, SessionError> {
        let mut token = None;

        self.view_tx.send_if_modified(|view| {
            if view.status.is_validating() {
                return false;
            }
            view.status = SessionStatus::Validating;
            token = Some(self.request_token.fetch_add(1, Ordering::SeqCst) + 1);
            true
        });

        match token {
            Some(token) => {
                self.metrics.record_validation_started();
                tracing::debug!("Validation {} started", token);
                Ok(token)
            }
            None => {
                tracing::debug!("Rejected validation request while another is in flight");
                Err(SessionError::ValidationInProgress)
            }
        }
    }

    async fn validate(&self, credentials: &CredentialPair) -> Result<SessionIdentity, ValidationError> {
        let limit = self.config.validation_timeout();

        match timeout(limit, self.validator.validate_session(credentials)).await {
            Ok(result) => result,
            Err(_) => Err(ValidationError::Timeout(limit)),
        }
    }

    /// Apply a validation result if its token is still current
    fn finish(
        self: &Arc<Self>,
        token: u64,
        origin: Origin,
        credentials: &CredentialPair,
        result: Result<SessionIdentity, ValidationError>,
    ) -> Result<SessionStatus, SessionError> {
        let mut applied = None;
        let mut revert_epoch = None;

        self.view_tx.send_if_modified(|view| {
            if self.request_token.load(Ordering::SeqCst) != token {
                return false;
            }

            match &result {
                Ok(identity) => {
                    if origin == Origin::Submit {
                        match save_json(self.store.as_ref(), CREDENTIALS_KEY, credentials) {
                            Ok(()) => view.has_credentials = true,
                            Err(e) => {
                                self.metrics.record_storage_failure();
                                tracing::error!("Failed to persist validated credentials: {}", e);
                                log_error_event(&format!("in (save credentials): {}", e));
                            }
                        }
                    }

                    self.error_epoch.fetch_add(1, Ordering::SeqCst);
                    view.show_validation_error = false;
                    view.status = SessionStatus::Authenticated(identity.clone());
                }
                Err(_) => {
                    view.status = SessionStatus::Invalid;
                    view.show_validation_error = true;
                    let epoch = self.error_epoch.fetch_add(1, Ordering::SeqCst) + 1;
                    // Activation errors stay up until the next outcome
                    if origin == Origin::Submit {
                        revert_epoch = Some(epoch);
                    }
                }
            }

            applied = Some(view.status.clone());
            true
        });

        let Some(status) = applied else {
            self.metrics.record_stale_response();
            tracing::debug!("Discarding stale validation result for request {}", token);
            return Err(SessionError::Superseded);
        };

        match &result {
            Ok(identity) => {
                self.metrics.record_validation_succeeded();
                tracing::info!("Session validated for {}", identity);
                log_event(&format!("{} Logged in as {}", CARD_FARMING_TAG, identity));
            }
            Err(e) => {
                if matches!(e, ValidationError::Rejected) {
                    self.metrics.record_validation_rejected();
                } else {
                    self.metrics.record_validation_failed();
                }
                tracing::warn!("Session validation failed: {}", e);
                log_error_event(&format!(
                    "{} Incorrect 'Card Farming' credentials ({})",
                    CARD_FARMING_TAG, e
                ));
            }
        }

        if let Some(epoch) = revert_epoch {
            self.schedule_error_revert(epoch);
        }

        Ok(status)
    }

    /// Hide the error message after the display window, unless superseded
    fn schedule_error_revert(self: &Arc<Self>, epoch: u64) {
        let inner = Arc::clone(self);
        let delay = self.config.error_display();

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            inner.view_tx.send_if_modified(|view| {
                if inner.error_epoch.load(Ordering::SeqCst) != epoch || !view.show_validation_error {
                    return false;
                }
                view.show_validation_error = false;
                true
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use async_trait::async_trait;

    struct AcceptAll;

    #[async_trait]
    impl SessionValidator for AcceptAll {
        async fn validate_session(
            &self,
            _credentials: &CredentialPair,
        ) -> Result<SessionIdentity, ValidationError> {
            Ok(SessionIdentity::new("tester"))
        }
    }

    fn create_controller(store: Arc<MemoryStore>) -> SessionController {
        SessionController::new(
            store,
            Arc::new(AcceptAll),
            Arc::new(Metrics::new()),
            SessionConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_submit_persists_pair() {
        let store = Arc::new(MemoryStore::new());
        let controller = create_controller(store.clone());

        let status = controller.submit("A", "B").await.unwrap();

        assert_eq!(status, SessionStatus::Authenticated(SessionIdentity::new("tester")));
        assert_eq!(controller.stored_credentials(), CredentialPair::new("A", "B"));
        assert!(controller.view().has_credentials);
    }

    #[tokio::test]
    async fn test_activate_without_credentials() {
        let controller = create_controller(Arc::new(MemoryStore::new()));

        let status = controller.activate().await.unwrap();

        assert_eq!(status, SessionStatus::Unauthenticated);
    }

    #[tokio::test]
    async fn test_clear_resets_view() {
        let store = Arc::new(MemoryStore::new());
        let controller = create_controller(store.clone());
        controller.submit("A", "B").await.unwrap();

        controller.clear();

        assert_eq!(controller.view(), SessionView::default());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_empty_token_rejected() {
        let controller = create_controller(Arc::new(MemoryStore::new()));
        assert_eq!(
            controller.submit("", "B").await,
            Err(SessionError::EmptyCredentials)
        );
    }
}
