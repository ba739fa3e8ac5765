use async_trait::async_trait;

use crate::contract::model::Session;
use crate::domain::error::DomainError;

/// Transport-agnostic port for the backend's session-based authentication.
///
/// Implementations classify their own failures: rejected credentials map to
/// [`DomainError::InvalidCredentials`], transport failures to
/// [`DomainError::Network`], anything else the backend refuses to
/// [`DomainError::AuthRejected`].
#[async_trait]
pub trait AuthPort: Send + Sync {
    /// Session the backend currently holds for this client, if any.
    async fn current_session(&self) -> Result<Option<Session>, DomainError>;
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, DomainError>;
    /// Registers an account. Returns `None` when the backend requires an
    /// email confirmation before issuing a session.
    async fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>, DomainError>;
    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, DomainError>;
    async fn sign_out(&self, session: &Session) -> Result<(), DomainError>;
}
