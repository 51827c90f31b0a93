// Session management layer
//
// Owns the login/logout/check-auth flows on top of the gateway and the token
// store. The access token only ever moves through the store; the refresh
// token stays in the backend-managed httpOnly cookie.

use std::sync::Arc;

use crate::auth::TokenStore;
use crate::endpoints;
use crate::error::Result;
use crate::gateway::ApiGateway;
use crate::models::{LoginRequest, RegisterData, RegisterRequest, TokenPayload, User};

pub struct SessionService {
    gateway: Arc<ApiGateway>,
    tokens: Arc<TokenStore>,
}

impl SessionService {
    pub fn new(gateway: Arc<ApiGateway>, tokens: Arc<TokenStore>) -> Self {
        Self { gateway, tokens }
    }

    /// Log in and return the authenticated user.
    ///
    /// The backend sets the refresh cookie on this response; the access token
    /// goes into the in-memory store. On any failure the token is cleared
    /// before the error propagates.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<User> {
        let payload: TokenPayload = match self
            .gateway
            .post_json(endpoints::AUTH_LOGIN, credentials)
            .await
        {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!("login failed: {err}");
                self.tokens.clear_token();
                return Err(err);
            }
        };

        self.tokens.set_token(Some(payload.access_token));

        match self.current_user().await {
            Ok(user) => {
                tracing::info!(email = %user.email, "login successful");
                Ok(user)
            }
            Err(err) => {
                self.tokens.clear_token();
                Err(err)
            }
        }
    }

    /// Register a new account, then log in with the same credentials
    pub async fn register(&self, credentials: &RegisterRequest) -> Result<User> {
        let created: RegisterData = self
            .gateway
            .post_json(endpoints::AUTH_REGISTER, credentials)
            .await?;
        tracing::info!(email = %created.email, "registration successful");

        self.login(&LoginRequest {
            email: credentials.email.clone(),
            password: credentials.password.clone(),
        })
        .await
    }

    /// Log out: revoke the refresh token server side and clear local state.
    /// Local state is cleared even when the API call fails.
    pub async fn logout(&self) {
        if let Err(err) = self.gateway.post_unit(endpoints::AUTH_LOGOUT).await {
            tracing::warn!("logout request failed: {err}");
        }
        self.tokens.clear_token();
    }

    /// Fetch the currently authenticated user
    pub async fn current_user(&self) -> Result<User> {
        self.gateway.get_json(endpoints::AUTH_ME).await
    }

    /// Determine whether a session exists.
    ///
    /// With no token in memory (fresh process) one coordinated refresh is
    /// attempted against the cookie; if that yields nothing the caller is
    /// simply unauthenticated. A token that no longer validates is cleared
    /// and also reported as `None` rather than an error.
    pub async fn check_auth(&self) -> Result<Option<User>> {
        if self.tokens.token().is_none() && self.tokens.refresh().await.is_none() {
            return Ok(None);
        }

        match self.current_user().await {
            Ok(user) => Ok(Some(user)),
            Err(err) => {
                tracing::warn!("auth check failed: {err}");
                self.tokens.clear_token();
                Ok(None)
            }
        }
    }
}
