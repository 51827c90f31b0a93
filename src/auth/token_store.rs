// Token store and refresh coordinator
//
// Single source of truth for the bearer token and the only component allowed
// to call the backend refresh endpoint. The token lives in process memory
// only; the refresh token itself is an httpOnly cookie managed by reqwest's
// cookie jar and is never visible here.

use std::sync::{Arc, RwLock};

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use reqwest::Client;
use tokio::sync::Mutex;

use crate::endpoints;
use crate::error::{ApiError, Result};
use crate::models::{ApiEnvelope, EnvelopeStatus, TokenPayload};

/// The one pending refresh, observed by every concurrent caller
type SharedRefresh = Shared<BoxFuture<'static, Option<String>>>;

/// Handler invoked when refresh fails and the session must be reset
type ForcedLogoutCallback = Box<dyn Fn() + Send + Sync>;

/// In-memory access token plus coordinated refresh.
///
/// Construct once and share via `Arc`; the gateway and the session layer both
/// read the token through this store and never hold their own copy.
pub struct TokenStore {
    /// Current access token; `None` when logged out
    access_token: Arc<RwLock<Option<String>>>,

    /// In-flight refresh, if any. Installed and cleared under this mutex so
    /// two near-simultaneous 401 observers can never both start a network call
    inflight: Arc<Mutex<Option<SharedRefresh>>>,

    /// Single-slot forced-logout handler; re-registration replaces it
    forced_logout: Arc<RwLock<Option<ForcedLogoutCallback>>>,

    /// HTTP client shared with the gateway so the refresh cookie jar is common
    client: Client,

    /// Absolute URL of the refresh endpoint
    refresh_url: String,
}

impl TokenStore {
    /// Create a store for the backend at `api_base_url`.
    ///
    /// The client must have its cookie store enabled, otherwise the refresh
    /// cookie set at login never comes back.
    pub fn new(client: Client, api_base_url: &str) -> Self {
        Self {
            access_token: Arc::new(RwLock::new(None)),
            inflight: Arc::new(Mutex::new(None)),
            forced_logout: Arc::new(RwLock::new(None)),
            client,
            refresh_url: endpoints::join(api_base_url, endpoints::AUTH_REFRESH),
        }
    }

    /// Replace the in-memory token
    pub fn set_token(&self, token: Option<String>) {
        *self.access_token.write().expect("token lock poisoned") = token;
    }

    /// Current token, without blocking or touching the network
    pub fn token(&self) -> Option<String> {
        self.access_token.read().expect("token lock poisoned").clone()
    }

    /// Drop the in-memory token
    pub fn clear_token(&self) {
        self.set_token(None);
    }

    /// Register the forced-logout handler, replacing any previous one.
    /// Registering a no-op closure is the way to unregister.
    pub fn on_forced_logout<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        *self.forced_logout.write().expect("callback lock poisoned") = Some(Box::new(callback));
    }

    /// Coordinated token refresh.
    ///
    /// If a refresh is already in flight every caller awaits the same shared
    /// future, so at most one network call is ever outstanding. Resolves the
    /// new token on success. On any failure (transport error, error envelope,
    /// missing token field) the stored token is cleared, the forced-logout
    /// handler fires once for the cycle, and the result is `None` — this
    /// method never errors.
    pub async fn refresh(&self) -> Option<String> {
        let pending = {
            let mut inflight = self.inflight.lock().await;
            match inflight.as_ref() {
                Some(pending) => {
                    tracing::debug!("token refresh already in flight, awaiting shared result");
                    pending.clone()
                }
                None => {
                    let pending = Self::run_refresh(
                        self.client.clone(),
                        self.refresh_url.clone(),
                        Arc::clone(&self.access_token),
                        Arc::clone(&self.forced_logout),
                        Arc::clone(&self.inflight),
                    )
                    .boxed()
                    .shared();
                    *inflight = Some(pending.clone());
                    pending
                }
            }
        };

        pending.await
    }

    /// The single refresh cycle backing the shared future
    async fn run_refresh(
        client: Client,
        refresh_url: String,
        access_token: Arc<RwLock<Option<String>>>,
        forced_logout: Arc<RwLock<Option<ForcedLogoutCallback>>>,
        inflight: Arc<Mutex<Option<SharedRefresh>>>,
    ) -> Option<String> {
        let result = Self::request_new_token(&client, &refresh_url).await;

        let token = match result {
            Ok(token) => {
                *access_token.write().expect("token lock poisoned") = Some(token.clone());
                tracing::debug!("access token refreshed");
                Some(token)
            }
            Err(err) => {
                tracing::warn!("token refresh failed: {err}");
                *access_token.write().expect("token lock poisoned") = None;
                if let Some(callback) = forced_logout
                    .read()
                    .expect("callback lock poisoned")
                    .as_ref()
                {
                    callback();
                }
                None
            }
        };

        // Clear the in-flight slot before resolving so the next refresh call
        // starts a fresh cycle
        inflight.lock().await.take();

        token
    }

    /// Call the refresh endpoint. A bare POST, no body and no bearer header:
    /// this call authenticates via the httpOnly refresh cookie sent
    /// automatically by the client.
    async fn request_new_token(client: &Client, refresh_url: &str) -> Result<String> {
        let response = client.post(refresh_url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Api {
                status: status.as_u16(),
                message: format!("refresh endpoint returned {status}: {body}"),
                code: None,
            });
        }

        let envelope: ApiEnvelope<TokenPayload> = response
            .json()
            .await
            .map_err(|err| ApiError::Decode(format!("invalid refresh response: {err}")))?;

        match (envelope.status, envelope.data) {
            (EnvelopeStatus::Success, Some(payload)) if !payload.access_token.is_empty() => {
                Ok(payload.access_token)
            }
            _ => Err(ApiError::Decode(
                envelope
                    .message
                    .unwrap_or_else(|| "refresh response did not contain accessToken".to_string()),
            )),
        }
    }
}
