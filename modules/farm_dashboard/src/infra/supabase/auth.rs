use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Method, StatusCode};
use tracing::{debug, instrument};

use super::client::{ApiError, SupabaseClient};
use super::dto::{PasswordGrantDto, RefreshGrantDto, TokenResponseDto};
use crate::contract::model::Session;
use crate::domain::error::DomainError;
use crate::domain::ports::AuthPort;

/// GoTrue adapter implementing the AuthPort. The issued session is kept on the
/// shared client so data requests run as the signed-in user.
pub struct SupabaseAuth {
    client: Arc<SupabaseClient>,
}

impl SupabaseAuth {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }

    async fn token_grant<B: serde::Serialize + ?Sized>(
        &self,
        grant_type: &str,
        body: &B,
    ) -> Result<TokenResponseDto, ApiError> {
        let mut url = self.client.endpoint(["auth", "v1", "token"])?;
        url.query_pairs_mut().append_pair("grant_type", grant_type);
        self.client
            .send_json(self.client.request(Method::POST, url).json(body))
            .await
    }
}

fn session_from(dto: TokenResponseDto) -> Result<Session, DomainError> {
    dto.into_session(Utc::now())
        .ok_or_else(|| DomainError::auth_rejected("response did not contain a session"))
}

/// Transport failures are network errors; anything the backend answered with
/// is a rejection.
fn rejected(e: ApiError) -> DomainError {
    match e {
        ApiError::Status { message, .. } => DomainError::auth_rejected(message),
        other => DomainError::network(other.to_string()),
    }
}

#[async_trait]
impl AuthPort for SupabaseAuth {
    async fn current_session(&self) -> Result<Option<Session>, DomainError> {
        Ok(self.client.session())
    }

    #[instrument(
        name = "farm_dashboard.supabase.auth.sign_in",
        skip_all,
        fields(base = %self.client.base_url())
    )]
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, DomainError> {
        let dto = self
            .token_grant("password", &PasswordGrantDto { email, password })
            .await
            .map_err(|e| match e {
                ApiError::Status { status, message }
                    if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED =>
                {
                    DomainError::invalid_credentials(message)
                }
                other => rejected(other),
            })?;
        let session = session_from(dto)?;
        self.client.store_session(Some(session.clone()));
        Ok(session)
    }

    #[instrument(
        name = "farm_dashboard.supabase.auth.sign_up",
        skip_all,
        fields(base = %self.client.base_url())
    )]
    async fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>, DomainError> {
        let url = self
            .client
            .endpoint(["auth", "v1", "signup"])
            .map_err(rejected)?;
        let dto: TokenResponseDto = self
            .client
            .send_json(
                self.client
                    .request(Method::POST, url)
                    .json(&PasswordGrantDto { email, password }),
            )
            .await
            .map_err(rejected)?;

        let session = dto.into_session(Utc::now());
        if session.is_some() {
            self.client.store_session(session.clone());
        } else {
            debug!("Sign-up response carried no session");
        }
        Ok(session)
    }

    #[instrument(
        name = "farm_dashboard.supabase.auth.refresh",
        skip_all,
        fields(base = %self.client.base_url())
    )]
    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, DomainError> {
        let dto = self
            .token_grant("refresh_token", &RefreshGrantDto { refresh_token })
            .await
            .map_err(rejected)?;
        let session = session_from(dto)?;
        self.client.store_session(Some(session.clone()));
        Ok(session)
    }

    #[instrument(
        name = "farm_dashboard.supabase.auth.sign_out",
        skip_all,
        fields(user_id = %session.user_id())
    )]
    async fn sign_out(&self, session: &Session) -> Result<(), DomainError> {
        let url = self
            .client
            .endpoint(["auth", "v1", "logout"])
            .map_err(rejected)?;
        let result = self
            .client
            .send(
                self.client
                    .request_with_token(Method::POST, url, &session.access_token),
            )
            .await;

        match result {
            Ok(_) => {}
            // Token already revoked or expired: the session is gone either way.
            Err(ApiError::Status { status, .. })
                if status == StatusCode::UNAUTHORIZED
                    || status == StatusCode::FORBIDDEN
                    || status == StatusCode::NOT_FOUND =>
            {
                debug!("Session was already invalid on the backend")
            }
            Err(e) => return Err(rejected(e)),
        }
        self.client.store_session(None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::time::Duration;
    use url::Url;
    use uuid::Uuid;

    fn auth(server: &MockServer) -> (SupabaseAuth, Arc<SupabaseClient>) {
        let client = Arc::new(
            SupabaseClient::new(
                Url::parse(&server.base_url()).unwrap(),
                "anon-key",
                Duration::from_secs(5),
            )
            .unwrap(),
        );
        (SupabaseAuth::new(client.clone()), client)
    }

    fn token_body(user_id: Uuid) -> serde_json::Value {
        json!({
            "access_token": "jwt-access",
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "jwt-refresh",
            "user": { "id": user_id, "email": "ana@farm.io" }
        })
    }

    #[tokio::test]
    async fn password_grant_stores_session() {
        let server = MockServer::start_async().await;
        let user_id = Uuid::new_v4();
        let m = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/auth/v1/token")
                    .query_param("grant_type", "password")
                    .json_body(json!({ "email": "ana@farm.io", "password": "secret" }));
                then.status(200).json_body(token_body(user_id));
            })
            .await;

        let (auth, client) = auth(&server);
        let session = auth
            .sign_in_with_password("ana@farm.io", "secret")
            .await
            .unwrap();
        assert_eq!(session.user_id(), user_id);
        assert_eq!(session.refresh_token.as_deref(), Some("jwt-refresh"));
        assert_eq!(client.session(), Some(session.clone()));
        assert_eq!(auth.current_session().await.unwrap(), Some(session));
        m.assert_async().await;
    }

    #[tokio::test]
    async fn bad_password_is_invalid_credentials() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/auth/v1/token");
                then.status(400).json_body(json!({
                    "error": "invalid_grant",
                    "error_description": "Invalid login credentials"
                }));
            })
            .await;

        let (auth, client) = auth(&server);
        let err = auth
            .sign_in_with_password("ana@farm.io", "nope")
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::invalid_credentials("Invalid login credentials"));
        assert!(client.session().is_none());
    }

    #[tokio::test]
    async fn unreachable_backend_is_network_error() {
        let client = Arc::new(
            SupabaseClient::new(
                Url::parse("http://127.0.0.1:9").unwrap(),
                "anon-key",
                Duration::from_secs(2),
            )
            .unwrap(),
        );
        let err = SupabaseAuth::new(client)
            .sign_in_with_password("ana@farm.io", "secret")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Network { .. }));
    }

    #[tokio::test]
    async fn sign_up_awaiting_confirmation_has_no_session() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/auth/v1/signup");
                then.status(200).json_body(json!({
                    "id": Uuid::new_v4(),
                    "email": "ana@farm.io",
                    "confirmation_sent_at": "2024-05-01T10:00:00Z"
                }));
            })
            .await;

        let (auth, client) = auth(&server);
        assert!(auth.sign_up("ana@farm.io", "secret").await.unwrap().is_none());
        assert!(client.session().is_none());
    }

    #[tokio::test]
    async fn sign_out_clears_session_even_if_token_was_revoked() {
        let server = MockServer::start_async().await;
        let m = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/auth/v1/logout")
                    .header("authorization", "Bearer jwt-access");
                then.status(401).json_body(json!({ "msg": "invalid JWT" }));
            })
            .await;

        let (auth, client) = auth(&server);
        let session = token_body(Uuid::new_v4());
        let session = serde_json::from_value::<TokenResponseDto>(session)
            .unwrap()
            .into_session(Utc::now())
            .unwrap();
        client.store_session(Some(session.clone()));

        auth.sign_out(&session).await.unwrap();
        assert!(client.session().is_none());
        m.assert_async().await;
    }
}
