use std::time::Duration;

use arc_swap::ArcSwapOption;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use thiserror::Error;
use tracing::{field::Empty, Instrument, Span};
use url::Url;

use crate::config::FarmDashboardConfig;
use crate::contract::model::Session;

/// Failure of a single backend request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response, or its body could not be read.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("invalid backend URL '{0}'")]
    Endpoint(String),
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::Status { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// HTTP client shared by the auth, rest and storage adapters.
///
/// Every request carries the public `apikey` header and a bearer token: the
/// current session's access token when signed in, the anon key otherwise.
pub struct SupabaseClient {
    http: reqwest::Client,
    base: Url,
    anon_key: String,
    session: ArcSwapOption<Session>,
}

impl SupabaseClient {
    pub fn new(base: Url, anon_key: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        if base.cannot_be_a_base() {
            anyhow::bail!("backend URL '{}' cannot be a base", base);
        }
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base,
            anon_key: anon_key.into(),
            session: ArcSwapOption::empty(),
        })
    }

    pub fn from_config(cfg: &FarmDashboardConfig) -> anyhow::Result<Self> {
        let base = Url::parse(&cfg.backend_url)
            .map_err(|e| anyhow::anyhow!("invalid backend_url '{}': {}", cfg.backend_url, e))?;
        Self::new(
            base,
            cfg.anon_key.clone(),
            Duration::from_secs(cfg.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Session whose access token authorizes requests.
    pub fn session(&self) -> Option<Session> {
        self.session.load_full().map(|s| (*s).clone())
    }

    pub fn store_session(&self, session: Option<Session>) {
        self.session.store(session.map(Arc::new));
    }

    /// Base URL with `segments` appended. Each segment is percent-encoded.
    pub fn endpoint<I>(&self, segments: I) -> Result<Url, ApiError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Endpoint(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let token = self
            .session
            .load()
            .as_ref()
            .map(|s| s.access_token.clone())
            .unwrap_or_else(|| self.anon_key.clone());
        self.request_with_token(method, url, &token)
    }

    pub fn request_with_token(&self, method: Method, url: Url, token: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
    }

    /// Send a request inside an `outgoing_http` span. Non-2xx responses are
    /// turned into [`ApiError::Status`] carrying the backend's message.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let req = builder.build()?;
        let span = tracing::info_span!(
            "outgoing_http",
            http.method = %req.method(),
            http.url = %req.url(),
            http.status_code = Empty,
            error = Empty,
        );

        async move {
            let response = self.http.execute(req).await?;
            let status = response.status();
            Span::current().record("http.status_code", status.as_u16());
            if status.is_success() {
                return Ok(response);
            }

            Span::current().record("error", true);
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::Status {
                status,
                message: error_message(status, &body),
            })
        }
        .instrument(span)
        .await
    }

    pub async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self.send(builder).await?;
        Ok(response.json::<T>().await?)
    }
}

/// Human-readable message out of a GoTrue / PostgREST / storage error body.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["msg", "message", "error_description", "error"] {
            if let Some(serde_json::Value::String(s)) = map.get(key) {
                return s.clone();
            }
        }
    }
    let body = body.trim();
    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::model::AuthUser;
    use httpmock::prelude::*;
    use uuid::Uuid;

    fn client(base: &str) -> SupabaseClient {
        SupabaseClient::new(Url::parse(base).unwrap(), "anon-key", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn error_message_prefers_backend_fields() {
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#),
            "Invalid login credentials"
        );
        assert_eq!(
            error_message(StatusCode::CONFLICT, r#"{"code":"23505","message":"duplicate key"}"#),
            "duplicate key"
        );
        assert_eq!(error_message(StatusCode::BAD_GATEWAY, "  "), "Bad Gateway");
        assert_eq!(error_message(StatusCode::BAD_GATEWAY, "upstream down"), "upstream down");
    }

    #[test]
    fn endpoint_appends_encoded_segments() {
        let c = client("http://backend.local/base/");
        let url = c.endpoint(["rest", "v1", "farms"]).unwrap();
        assert_eq!(url.as_str(), "http://backend.local/base/rest/v1/farms");

        let url = c.endpoint(["storage", "a b"]).unwrap();
        assert_eq!(url.path(), "/base/storage/a%20b");
    }

    #[tokio::test]
    async fn requests_use_anon_key_until_signed_in() {
        let server = MockServer::start_async().await;
        let anon = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/ping")
                    .header("apikey", "anon-key")
                    .header("authorization", "Bearer anon-key");
                then.status(200);
            })
            .await;
        let user = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/ping")
                    .header("authorization", "Bearer user-token");
                then.status(200);
            })
            .await;

        let c = client(&server.base_url());
        let url = c.endpoint(["ping"]).unwrap();
        c.send(c.request(Method::GET, url.clone())).await.unwrap();
        anon.assert_async().await;

        c.store_session(Some(Session {
            access_token: "user-token".into(),
            refresh_token: None,
            expires_at: None,
            user: AuthUser {
                id: Uuid::new_v4(),
                email: None,
            },
        }));
        c.send(c.request(Method::GET, url)).await.unwrap();
        user.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_becomes_status_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/fail");
                then.status(409)
                    .header("content-type", "application/json")
                    .body(r#"{"message":"duplicate key value"}"#);
            })
            .await;

        let c = client(&server.base_url());
        let url = c.endpoint(["fail"]).unwrap();
        let err = c.send(c.request(Method::POST, url)).await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::CONFLICT));
        assert_eq!(err.message(), "duplicate key value");
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_request_error() {
        let c = client("http://127.0.0.1:9");
        let url = c.endpoint(["ping"]).unwrap();
        let err = c.send(c.request(Method::GET, url)).await.unwrap_err();
        assert!(matches!(err, ApiError::Request(_)));
    }
}
