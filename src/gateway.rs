// Authenticated request gateway
//
// Every outgoing call goes through here: the current bearer token is attached,
// 401 responses trigger one coordinated refresh followed by a single retry,
// and every failure is normalized into ApiError. Cookies ride on every request
// so the backend's httpOnly refresh cookie stays available.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Client, Method, Request, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::auth::TokenStore;
use crate::config::Config;
use crate::endpoints;
use crate::error::{codes, ApiError, Result};
use crate::models::{ApiEnvelope, EnvelopeStatus};

/// Build the shared HTTP client: cookie store on, timeouts from config
pub fn build_http_client(config: &Config) -> anyhow::Result<Client> {
    Client::builder()
        .cookie_store(true)
        .connect_timeout(Duration::from_secs(config.http_connect_timeout))
        .timeout(Duration::from_secs(config.http_request_timeout))
        .build()
        .context("Failed to create HTTP client")
}

/// Gateway to the admin backend
pub struct ApiGateway {
    /// Shared HTTP client (same instance as the token store's, so the refresh
    /// cookie jar is common)
    client: Client,

    /// Base URL of the backend API
    base_url: String,

    /// Token store and refresh coordinator
    tokens: Arc<TokenStore>,
}

impl ApiGateway {
    pub fn new(client: Client, api_base_url: &str, tokens: Arc<TokenStore>) -> Self {
        Self {
            client,
            base_url: api_base_url.trim_end_matches('/').to_string(),
            tokens,
        }
    }

    /// Absolute URL for an endpoint path
    pub fn url(&self, path: &str) -> String {
        endpoints::join(&self.base_url, path)
    }

    /// Start building a request against the backend
    pub fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.client.request(method, self.url(path))
    }

    /// Execute a request with the 401 -> refresh -> retry protocol.
    ///
    /// Per request: attach the bearer token if one is held; on a 401 that is
    /// not the refresh endpoint itself, run one coordinated refresh and
    /// resubmit the original request exactly once with the new token. A 401
    /// on the retried attempt, or on the refresh endpoint, is terminal.
    pub async fn execute(&self, request: Request) -> Result<Response> {
        // Clone before the first send so the retry preserves method, URL,
        // headers and body byte-for-byte
        let retry = request.try_clone();
        let mut request = request;

        if let Some(token) = self.tokens.token() {
            request
                .headers_mut()
                .insert(AUTHORIZATION, bearer_header(&token)?);
        }

        let method = request.method().clone();
        let url = request.url().clone();
        tracing::debug!(method = %method, url = %url, "sending request");

        let response = self.client.execute(request).await?;
        let status = response.status();

        if status != StatusCode::UNAUTHORIZED {
            return Self::finish(response).await;
        }

        // A 401 from the refresh endpoint itself never triggers another
        // refresh
        if url.path().ends_with(endpoints::AUTH_REFRESH) {
            let message = Self::envelope_message(response)
                .await
                .unwrap_or_else(|| "Authentication required. Please login again.".to_string());
            return Err(ApiError::AuthRequired {
                message,
                code: codes::AUTH_REQUIRED,
            });
        }

        tracing::debug!(method = %method, url = %url, "got 401, attempting token refresh");

        let Some(token) = self.tokens.refresh().await else {
            // Forced logout was already triggered inside the coordinator
            return Err(ApiError::AuthRequired {
                message: "Token refresh failed. Please login again.".to_string(),
                code: codes::REFRESH_FAILED,
            });
        };

        let mut retry = retry.ok_or_else(|| {
            ApiError::Internal(anyhow::anyhow!("request body is not cloneable"))
        })?;
        retry
            .headers_mut()
            .insert(AUTHORIZATION, bearer_header(&token)?);

        tracing::debug!(method = %method, url = %url, "retrying request with refreshed token");

        // Single retry: whatever comes back is final, including another 401
        let response = self.client.execute(retry).await?;
        Self::finish(response).await
    }

    /// GET an endpoint and unwrap its envelope data
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let request = self.request(Method::GET, path).build()?;
        let response = self.execute(request).await?;
        Self::parse_envelope(response).await
    }

    /// POST a JSON body and unwrap the envelope data
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::POST, path).json(body).build()?;
        let response = self.execute(request).await?;
        Self::parse_envelope(response).await
    }

    /// POST with an empty body to an endpoint whose envelope carries no data
    pub async fn post_unit(&self, path: &str) -> Result<()> {
        let request = self
            .request(Method::POST, path)
            .json(&serde_json::json!({}))
            .build()?;
        let response = self.execute(request).await?;
        let status = response.status().as_u16();

        let envelope: ApiEnvelope<serde_json::Value> = response
            .json()
            .await
            .map_err(|err| ApiError::Decode(format!("invalid response envelope: {err}")))?;

        match envelope.status {
            EnvelopeStatus::Success => Ok(()),
            EnvelopeStatus::Error => Err(ApiError::Api {
                status,
                message: envelope
                    .message
                    .unwrap_or_else(|| "An error occurred".to_string()),
                code: None,
            }),
        }
    }

    /// Pass successes through; normalize everything else
    async fn finish(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = Self::envelope_message(response)
            .await
            .unwrap_or_else(|| format!("request failed with status {status}"));

        Err(ApiError::Api {
            status: status.as_u16(),
            message,
            code: None,
        })
    }

    /// Extract the envelope `message` from an error body, when there is one
    async fn envelope_message(response: Response) -> Option<String> {
        let body = response.text().await.unwrap_or_default();
        serde_json::from_str::<ApiEnvelope<serde_json::Value>>(&body)
            .ok()
            .and_then(|envelope| envelope.message)
    }

    /// Unwrap a success envelope into its data
    async fn parse_envelope<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status().as_u16();
        let envelope: ApiEnvelope<T> = response
            .json()
            .await
            .map_err(|err| ApiError::Decode(format!("invalid response envelope: {err}")))?;

        match (envelope.status, envelope.data) {
            (EnvelopeStatus::Success, Some(data)) => Ok(data),
            (_, _) => Err(ApiError::Api {
                status,
                message: envelope
                    .message
                    .unwrap_or_else(|| "response did not contain the expected data".to_string()),
                code: None,
            }),
        }
    }
}

fn bearer_header(token: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|_| ApiError::Internal(anyhow::anyhow!("access token is not a valid header value")))
}
