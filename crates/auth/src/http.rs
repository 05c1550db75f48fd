use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use askprompt_core::{AuthError, AuthSession, AuthUser, OAuthProvider, ProviderRedirect};
use chrono::Utc;
use parking_lot::RwLock;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};
use url::Url;

use crate::client::AuthClient;
use crate::pkce::{code_challenge, generate_urlsafe_token};

pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred. Please try again.";

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Project URL, e.g. `https://abc.supabase.co`. The auth API lives under `/auth/v1`.
    pub base_url: String,
    pub anon_key: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    user: UserPayload,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    id: String,
    email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorPayload {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

/// Client for a GoTrue-compatible auth API.
///
/// Keeps the signed-in session and the PKCE verifier of an in-progress
/// provider sign-in in memory; clones share both.
#[derive(Debug, Clone)]
pub struct HttpAuthClient {
    client: Client,
    auth_root: Url,
    anon_key: String,
    session: Arc<RwLock<Option<AuthSession>>>,
    pkce_verifier: Arc<RwLock<Option<String>>>,
}

impl HttpAuthClient {
    pub fn new(config: AuthConfig) -> Result<Self> {
        let base = config.base_url.trim_end_matches('/');
        let auth_root = Url::parse(&format!("{base}/auth/v1/"))
            .with_context(|| format!("invalid auth base url {}", config.base_url))?;

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(6))
            .timeout(Duration::from_secs(20))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            auth_root,
            anon_key: config.anon_key,
            session: Arc::new(RwLock::new(None)),
            pkce_verifier: Arc::new(RwLock::new(None)),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, AuthError> {
        self.auth_root.join(path).map_err(|err| {
            warn!(error = %err, path, "failed to build auth endpoint");
            AuthError::new(UNEXPECTED_ERROR)
        })
    }

    fn post(&self, url: Url) -> RequestBuilder {
        self.client
            .post(url)
            .header("apikey", self.anon_key.as_str())
            .bearer_auth(self.anon_key.as_str())
    }

    async fn exchange(&self, request: RequestBuilder) -> Result<AuthSession, AuthError> {
        let response = send(request).await?;
        let token: TokenResponse = response.json().await.map_err(|err| {
            warn!(error = %err, "unreadable token response");
            AuthError::new(UNEXPECTED_ERROR)
        })?;

        let session = AuthSession {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at: token
                .expires_in
                .map(|seconds| Utc::now() + chrono::Duration::seconds(seconds)),
            user: AuthUser {
                id: token.user.id,
                email: token.user.email,
            },
        };
        *self.session.write() = Some(session.clone());
        info!(user_id = %session.user.id, "signed in");
        Ok(session)
    }
}

impl AuthClient for HttpAuthClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let url = self.endpoint("token?grant_type=password")?;
        self.exchange(
            self.post(url)
                .json(&json!({ "email": email, "password": password })),
        )
        .await
    }

    async fn sign_in_with_provider(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
    ) -> Result<ProviderRedirect, AuthError> {
        let verifier = generate_urlsafe_token(48);
        let challenge = code_challenge(&verifier);

        let mut url = self.endpoint("authorize")?;
        url.query_pairs_mut()
            .append_pair("provider", provider.as_str())
            .append_pair("redirect_to", redirect_to)
            .append_pair("code_challenge", &challenge)
            .append_pair("code_challenge_method", "s256");

        *self.pkce_verifier.write() = Some(verifier);
        Ok(ProviderRedirect {
            provider,
            authorize_url: url.to_string(),
        })
    }

    async fn complete_provider_sign_in(&self, auth_code: &str) -> Result<AuthSession, AuthError> {
        let verifier = self
            .pkce_verifier
            .write()
            .take()
            .ok_or_else(|| AuthError::new("No provider sign-in is in progress"))?;

        let url = self.endpoint("token?grant_type=pkce")?;
        self.exchange(
            self.post(url)
                .json(&json!({ "auth_code": auth_code, "code_verifier": verifier })),
        )
        .await
    }

    async fn send_magic_link(&self, email: &str, redirect_to: &str) -> Result<(), AuthError> {
        let mut url = self.endpoint("otp")?;
        url.query_pairs_mut().append_pair("redirect_to", redirect_to);
        send(
            self.post(url)
                .json(&json!({ "email": email, "create_user": false })),
        )
        .await?;
        Ok(())
    }

    async fn request_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let url = self.endpoint("recover")?;
        send(self.post(url).json(&json!({ "email": email }))).await?;
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<AuthSession>, AuthError> {
        let now = Utc::now();
        Ok(self
            .session
            .read()
            .clone()
            .filter(|session| !session.is_expired(now)))
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let Some(session) = self.session.write().take() else {
            return Ok(());
        };

        let url = self.endpoint("logout")?;
        let request = self
            .client
            .post(url)
            .header("apikey", self.anon_key.as_str())
            .bearer_auth(session.access_token.as_str());
        if let Err(err) = send(request).await {
            warn!(error = %err, "remote sign-out failed; local session cleared");
        }
        Ok(())
    }
}

async fn send(request: RequestBuilder) -> Result<Response, AuthError> {
    let response = request.send().await.map_err(|err| {
        warn!(error = %err, "auth request failed");
        AuthError::new(UNEXPECTED_ERROR)
    })?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let payload: ErrorPayload = serde_json::from_str(&body).unwrap_or_default();
    let message = payload
        .error_description
        .or(payload.msg)
        .or(payload.message)
        .or(payload.error)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| format!("Authentication failed (status {})", status.as_u16()));

    Err(AuthError::new(message))
}
