//! Google OAuth 2.0 / OpenID Connect client.
//!
//! Handles the server side of the authorization-code flow: building the
//! consent URL, exchanging the callback code for tokens, and fetching the
//! userinfo profile. The verified profile is handed to
//! [`crate::services::auth::AuthService::login_external`]; nothing here
//! touches the database.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::config::GoogleOAuthConfig;
use crate::services::auth::ExternalProfile;

const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const USERINFO_ENDPOINT: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// Errors from the OAuth exchange.
#[derive(Debug, Error)]
pub enum GoogleError {
    /// Transport-level failure talking to Google.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Google rejected the code exchange.
    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    /// The userinfo response was unusable.
    #[error("userinfo error: {0}")]
    Userinfo(String),
}

/// Token response from the code exchange.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Userinfo response (OpenID Connect standard claims).
#[derive(Debug, Deserialize)]
struct UserinfoResponse {
    sub: String,
    email: Option<String>,
    name: Option<String>,
}

/// Client for Google's OAuth endpoints.
#[derive(Clone)]
pub struct GoogleClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: SecretString,
}

impl GoogleClient {
    /// Create a client from the configured credentials.
    #[must_use]
    pub fn new(config: &GoogleOAuthConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        }
    }

    /// The consent-screen URL to redirect the browser to.
    ///
    /// `state` is the CSRF token the callback must echo back.
    ///
    /// # Panics
    ///
    /// Panics if the static endpoint constant fails to parse, which cannot
    /// happen.
    #[must_use]
    pub fn authorization_url(&self, redirect_uri: &str, state: &str) -> String {
        let mut url = Url::parse(AUTH_ENDPOINT).expect("static endpoint url");
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", "openid email profile")
            .append_pair("state", state);
        url.into()
    }

    /// Exchange the authorization code and fetch the user's profile.
    ///
    /// # Errors
    ///
    /// Returns `GoogleError` when the exchange is rejected, the transport
    /// fails, or the userinfo payload is missing its subject.
    pub async fn fetch_profile(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<ExternalProfile, GoogleError> {
        let token = self.exchange_code(code, redirect_uri).await?;

        let response = self
            .http
            .get(USERINFO_ENDPOINT)
            .bearer_auth(&token.access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GoogleError::Userinfo(format!(
                "userinfo returned {}",
                response.status()
            )));
        }

        let info: UserinfoResponse = response
            .json()
            .await
            .map_err(|e| GoogleError::Userinfo(e.to_string()))?;

        if info.sub.is_empty() {
            return Err(GoogleError::Userinfo("empty subject".to_owned()));
        }

        Ok(ExternalProfile {
            subject: info.sub,
            email: info.email,
            name: info.name,
        })
    }

    /// POST the authorization code to the token endpoint.
    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenResponse, GoogleError> {
        let params = [
            ("code", code),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.expose_secret()),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ];

        let response = self.http.post(TOKEN_ENDPOINT).form(&params).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GoogleError::TokenExchange(format!("{status}: {body}")));
        }

        response
            .json()
            .await
            .map_err(|e| GoogleError::TokenExchange(e.to_string()))
    }
}

impl std::fmt::Debug for GoogleClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleClient")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}
