//! Auth Gateway
//!
//! The boundary between domain-level login/logout operations and the remote
//! service's wire protocol. The gateway owns the HTTP client, normalizes
//! transport and HTTP failures into [`AuthError`], and carries two pieces of
//! cross-cutting behavior:
//!
//! - every request defeats intermediary caches (some proxies answer repeated
//!   identical login calls with a stale 304), via no-cache headers plus a
//!   monotonically increasing `_t` query parameter
//! - every request attaches the persisted bearer token when one exists, and
//!   any 401 answer invalidates that token locally - not only on the login
//!   call - so the UI never keeps claiming a session the server rejected

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::AuthError;
use crate::session::{SessionStore, UserProfile};

const NO_CACHE: &str = "no-cache, no-store, must-revalidate";

/// Login form contents. Transient: built on submit, dropped once the
/// request resolves, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Successful login response body: the bearer token plus the user's profile
/// fields at the top level.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(flatten)]
    pub user: UserProfile,
}

/// Error body shape the remote service uses for 4xx/5xx answers.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// HTTP client for the remote authentication service.
///
/// Cheap to clone; clones share the connection pool, the session store and
/// the cache-buster counter.
#[derive(Clone)]
pub struct AuthGateway {
    client: Client,
    config: Config,
    store: SessionStore,
    // Seeded from the clock so values keep increasing across restarts
    request_seq: Arc<AtomicU64>,
}

impl AuthGateway {
    pub fn new(config: Config, store: SessionStore) -> Self {
        let seed = Utc::now().timestamp_millis().max(0) as u64;
        Self {
            client: Client::new(),
            config,
            store,
            request_seq: Arc::new(AtomicU64::new(seed)),
        }
    }

    /// Exchange credentials for a token and profile.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, AuthError> {
        let url = self.config.api_url("/auth/login");
        debug!(%url, username = %credentials.username, "sending login request");

        let response = self
            .prepare(self.client.post(&url))
            .json(credentials)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "login request failed to reach the server");
                AuthError::ConnectionError
            })?;

        let status = response.status();
        self.note_status(status);

        if status.is_success() {
            return response.json::<LoginResponse>().await.map_err(|e| {
                warn!(error = %e, "login response body did not match the expected shape");
                AuthError::server(status.as_u16(), "unexpected response body")
            });
        }

        let message = Self::error_message(response).await;
        debug!(status = status.as_u16(), %message, "login rejected");
        Err(match status {
            StatusCode::BAD_REQUEST => AuthError::InvalidCredentialsFormat(message),
            StatusCode::UNAUTHORIZED => AuthError::Unauthorized,
            StatusCode::TOO_MANY_REQUESTS => AuthError::RateLimited,
            _ => AuthError::server(status.as_u16(), message),
        })
    }

    /// Best-effort remote logout notification. Network failures are logged
    /// and dropped; the caller has already decided the local session ends.
    ///
    /// The token is passed in explicitly because the controller clears the
    /// store before this call resolves.
    pub async fn logout(&self, token: Option<String>) {
        let url = self.config.api_url("/auth/logout");
        let mut request = self.prepare_unauthenticated(self.client.post(&url));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        match request.send().await {
            Ok(response) => {
                self.note_status(response.status());
                if !response.status().is_success() {
                    debug!(status = response.status().as_u16(), "remote logout rejected");
                }
            }
            Err(e) => debug!(error = %e, "remote logout did not reach the server"),
        }
    }

    /// Cache-defeating headers, the `_t` disambiguator, the per-request
    /// timeout and the stored bearer token.
    fn prepare(&self, request: RequestBuilder) -> RequestBuilder {
        let mut request = self.prepare_unauthenticated(request);
        if let Some(token) = self.store.token() {
            request = request.bearer_auth(token);
        }
        request
    }

    fn prepare_unauthenticated(&self, request: RequestBuilder) -> RequestBuilder {
        let seq = self.request_seq.fetch_add(1, Ordering::Relaxed);
        request
            .header(CACHE_CONTROL, NO_CACHE)
            .header(PRAGMA, "no-cache")
            .query(&[("_t", seq)])
            .timeout(self.config.timeout())
    }

    /// On 401 from any endpoint, drop the persisted token.
    fn note_status(&self, status: StatusCode) {
        if status == StatusCode::UNAUTHORIZED {
            self.store.invalidate_token();
        }
    }

    /// Pull a human-readable message out of an error response: the body's
    /// `message` field when present, the raw body otherwise, the status line
    /// as a last resort.
    async fn error_message(response: Response) -> String {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if let Ok(body) = serde_json::from_str::<ErrorBody>(&text) {
            return body.message;
        }
        if !text.trim().is_empty() {
            return text.trim().to_string();
        }
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    }
}
