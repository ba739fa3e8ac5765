use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use arc_swap::ArcSwapOption;
use chrono::Utc;
use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::contract::model::Session;
use crate::domain::error::DomainError;
use crate::domain::events::AuthChange;
use crate::domain::ports::AuthPort;

/// Callback invoked on every session transition.
pub type SessionListener = Arc<dyn Fn(AuthChange, Option<&Session>) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, SessionListener)>,
}

/// Registration handle returned by [`SessionManager::subscribe`].
/// Dropping it removes the listener.
#[must_use = "dropping the subscription unsubscribes the listener"]
pub struct Subscription {
    id: u64,
    listeners: Weak<Mutex<Listeners>>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.lock().entries.retain(|(id, _)| *id != self.id);
        }
    }
}

/// Tracks the authenticated identity and fans session transitions out to
/// listeners.
pub struct SessionManager {
    auth: Arc<dyn AuthPort>,
    current: ArcSwapOption<Session>,
    resolved: AtomicBool,
    listeners: Arc<Mutex<Listeners>>,
}

impl SessionManager {
    pub fn new(auth: Arc<dyn AuthPort>) -> Self {
        Self {
            auth,
            current: ArcSwapOption::empty(),
            resolved: AtomicBool::new(false),
            listeners: Arc::new(Mutex::new(Listeners::default())),
        }
    }

    /// Locally known session, without contacting the backend.
    pub fn current(&self) -> Option<Session> {
        self.current.load_full().map(|s| (*s).clone())
    }

    pub fn current_user_id(&self) -> Option<Uuid> {
        self.current.load().as_ref().map(|s| s.user_id())
    }

    /// Whether the startup lookup (or any later transition) has resolved.
    pub fn is_resolved(&self) -> bool {
        self.resolved.load(Ordering::Acquire)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().entries.len()
    }

    /// Register for session transitions. When the session has already been
    /// resolved the listener is invoked immediately with the current value.
    pub fn subscribe<F>(&self, on_change: F) -> Subscription
    where
        F: Fn(AuthChange, Option<&Session>) + Send + Sync + 'static,
    {
        let listener: SessionListener = Arc::new(on_change);
        let id = {
            let mut guard = self.listeners.lock();
            let id = guard.next_id;
            guard.next_id += 1;
            guard.entries.push((id, listener.clone()));
            id
        };

        if self.is_resolved() {
            let current = self.current.load_full();
            listener(AuthChange::InitialSession, current.as_deref());
        }

        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    /// Query the backend for the session it currently holds. An expired
    /// session is refreshed when a refresh token is available.
    #[instrument(name = "farm_dashboard.session.get_current_session", skip(self))]
    pub async fn get_current_session(&self) -> Result<Option<Session>, DomainError> {
        let stored = match self.auth.current_session().await {
            Ok(stored) => stored,
            Err(e) => {
                warn!("Session lookup failed, continuing signed out: {}", e);
                self.transition(AuthChange::InitialSession, None);
                return Ok(None);
            }
        };

        match stored {
            Some(session) if session.is_expired_at(Utc::now()) => {
                let Some(refresh_token) = session.refresh_token.as_deref() else {
                    info!("Stored session expired without refresh token");
                    self.transition(AuthChange::InitialSession, None);
                    return Ok(None);
                };
                match self.auth.refresh_session(refresh_token).await {
                    Ok(refreshed) => {
                        info!(user_id = %refreshed.user_id(), "Session refreshed");
                        self.transition(AuthChange::TokenRefreshed, Some(refreshed.clone()));
                        Ok(Some(refreshed))
                    }
                    Err(e) => {
                        warn!("Session refresh failed, continuing signed out: {}", e);
                        self.transition(AuthChange::InitialSession, None);
                        Ok(None)
                    }
                }
            }
            other => {
                debug!(signed_in = other.is_some(), "Resolved initial session");
                self.transition(AuthChange::InitialSession, other.clone());
                Ok(other)
            }
        }
    }

    #[instrument(name = "farm_dashboard.session.sign_in", skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, DomainError> {
        validate_credentials(email, password)?;

        let session = self.auth.sign_in_with_password(email.trim(), password).await?;
        info!(user_id = %session.user_id(), "Signed in");
        self.transition(AuthChange::SignedIn, Some(session.clone()));
        Ok(session)
    }

    /// Register a new account. The password pair is compared locally first;
    /// on mismatch the backend is never contacted.
    #[instrument(name = "farm_dashboard.session.sign_up", skip(self, password, confirm_password))]
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<Option<Session>, DomainError> {
        if password != confirm_password {
            return Err(DomainError::password_mismatch());
        }
        validate_credentials(email, password)?;

        let session = self.auth.sign_up(email.trim(), password).await?;
        match &session {
            Some(s) => {
                info!(user_id = %s.user_id(), "Signed up and signed in");
                self.transition(AuthChange::SignedIn, Some(s.clone()));
            }
            None => info!("Signed up, awaiting email confirmation"),
        }
        Ok(session)
    }

    #[instrument(name = "farm_dashboard.session.sign_out", skip(self))]
    pub async fn sign_out(&self) -> Result<(), DomainError> {
        let Some(session) = self.current.load_full() else {
            debug!("Sign-out without a session");
            return Ok(());
        };

        self.auth.sign_out(&session).await?;
        info!(user_id = %session.user_id(), "Signed out");
        self.transition(AuthChange::SignedOut, None);
        Ok(())
    }

    /// Apply a transition pushed by the backend (e.g. a token refresh done
    /// elsewhere, or a revoked session).
    pub fn handle_auth_event(&self, change: AuthChange, session: Option<Session>) {
        debug!(event = change.as_str(), "Auth event received");
        self.transition(change, session);
    }

    fn transition(&self, change: AuthChange, session: Option<Session>) {
        let session = session.map(Arc::new);
        self.current.store(session.clone());
        self.resolved.store(true, Ordering::Release);

        // Call listeners outside the lock so they may subscribe or unsubscribe.
        let listeners: Vec<SessionListener> = self
            .listeners
            .lock()
            .entries
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener(change, session.as_deref());
        }
    }
}

fn validate_credentials(email: &str, password: &str) -> Result<(), DomainError> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(DomainError::validation("email", "a valid email is required"));
    }
    if password.is_empty() {
        return Err(DomainError::validation("password", "password is required"));
    }
    Ok(())
}
