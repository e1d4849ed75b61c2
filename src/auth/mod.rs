//! Login and token lifecycle.
//!
//! Tokens are plain values threaded through the calling loop; there is no
//! shared token cache. An expired token is replaced by a full re-login.

mod jwt;

use crate::api::ApiClient;
use crate::config::LoginConfig;
use crate::{Error, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};

const LOGIN_PATH: &str = "/api/authority/login";
const ENDPOINT_ENUM: i32 = 1;
const LOGIN_TYPE_ENUM: i32 = 2;

/// Access/refresh token pair returned by a successful login
///
/// Expiry values are Unix seconds. `None` means no known expiry: the token is
/// treated as valid until a request proves otherwise.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenPair {
    pub account_token: String,
    pub refresh_token: String,
    pub expires_at: Option<i64>,
    pub refresh_expires_at: Option<i64>,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("account_token_len", &self.account_token.len())
            .field("refresh_token_len", &self.refresh_token.len())
            .field("expires_at", &self.expires_at)
            .field("refresh_expires_at", &self.refresh_expires_at)
            .finish()
    }
}

impl TokenPair {
    pub fn new(account_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            account_token: account_token.into(),
            refresh_token: refresh_token.into(),
            expires_at: None,
            refresh_expires_at: None,
        }
    }

    /// Populate expiries from the tokens' JWT `exp` claims, when present
    pub fn with_jwt_expiry(mut self) -> Self {
        self.expires_at = jwt::expiry(&self.account_token);
        self.refresh_expires_at = jwt::expiry(&self.refresh_token);
        self
    }

    pub fn is_valid(&self) -> bool {
        is_unexpired(self.expires_at, Utc::now().timestamp())
    }

    pub fn is_refresh_valid(&self) -> bool {
        is_unexpired(self.refresh_expires_at, Utc::now().timestamp())
    }
}

fn is_unexpired(expires_at: Option<i64>, now: i64) -> bool {
    match expires_at {
        None | Some(0) => true,
        Some(exp) => now < exp,
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    phone_or_email: &'a str,
    code: &'a str,
    endpoint_enum: i32,
    login_type_enum: i32,
}

#[derive(Debug, Deserialize)]
struct LoginData {
    account_token: String,
    refresh_token: String,
}

/// Performs logins with the configured credentials
#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
    credentials: LoginConfig,
}

impl AuthService {
    pub fn new(api: ApiClient, credentials: LoginConfig) -> Self {
        Self { api, credentials }
    }

    /// Log in and return a fresh token pair
    /// Endpoint: POST /api/authority/login
    ///
    /// Fails on transport errors, non-2xx status, malformed body, or any
    /// business code other than 200. Never retries.
    pub async fn login(&self) -> Result<TokenPair> {
        let url = self.api.url(LOGIN_PATH);

        tracing::debug!(email = %self.credentials.phone_or_email, "Starting login process");

        let request = LoginRequest {
            phone_or_email: &self.credentials.phone_or_email,
            code: &self.credentials.code,
            endpoint_enum: ENDPOINT_ENUM,
            login_type_enum: LOGIN_TYPE_ENUM,
        };

        let response = self.api.http().post(&url).json(&request).send().await?;
        let envelope = ApiClient::read_envelope(response).await?;

        let user_role = envelope.user_role.clone();
        let req_id = envelope.req_id.clone();
        let data: LoginData = envelope.into_data()?;

        let tokens = TokenPair::new(data.account_token, data.refresh_token).with_jwt_expiry();

        tracing::info!(
            user_role = %user_role,
            req_id = %req_id,
            token_valid = tokens.is_valid(),
            refresh_valid = tokens.is_refresh_valid(),
            account_token_len = tokens.account_token.len(),
            "Login successful"
        );

        Ok(tokens)
    }

    /// Return `token` untouched if still valid, otherwise log in again
    pub async fn validate_and_refresh(&self, token: &TokenPair) -> Result<TokenPair> {
        if token.is_valid() {
            tracing::trace!("Token is still valid");
            return Ok(token.clone());
        }

        tracing::info!(expires_at = ?token.expires_at, "Token expired, attempting re-login");

        let fresh = self
            .login()
            .await
            .map_err(|e| Error::Relogin(Box::new(e)))?;

        tracing::info!(
            token_valid = fresh.is_valid(),
            account_token_len = fresh.account_token.len(),
            "Successfully re-logged in"
        );

        Ok(fresh)
    }
}
