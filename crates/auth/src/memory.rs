use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use askprompt_core::{AuthError, AuthSession, AuthUser, OAuthProvider, ProviderRedirect};
use chrono::{Duration, Utc};
use parking_lot::RwLock;
use url::Url;
use uuid::Uuid;

use crate::client::AuthClient;

#[derive(Debug, Clone)]
struct MemoryUser {
    password: String,
    user: AuthUser,
}

/// In-process identity provider with the same error surface as the hosted one.
/// Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryAuthClient {
    users: Arc<RwLock<HashMap<String, MemoryUser>>>,
    session: Arc<RwLock<Option<AuthSession>>>,
    pending_codes: Arc<RwLock<HashMap<String, OAuthProvider>>>,
    magic_links: Arc<RwLock<Vec<String>>>,
    password_resets: Arc<RwLock<Vec<String>>>,
    calls: Arc<AtomicUsize>,
}

impl MemoryAuthClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, email: &str, password: &str) -> Self {
        self.users.write().insert(
            email.trim().to_lowercase(),
            MemoryUser {
                password: password.to_string(),
                user: AuthUser {
                    id: Uuid::new_v4().to_string(),
                    email: Some(email.trim().to_string()),
                },
            },
        );
        self
    }

    /// Number of provider operations invoked so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn magic_links(&self) -> Vec<String> {
        self.magic_links.read().clone()
    }

    pub fn password_resets(&self) -> Vec<String> {
        self.password_resets.read().clone()
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn issue_session(&self, user: AuthUser) -> AuthSession {
        let session = AuthSession {
            access_token: Uuid::new_v4().to_string(),
            refresh_token: Some(Uuid::new_v4().to_string()),
            expires_at: Some(Utc::now() + Duration::hours(1)),
            user,
        };
        *self.session.write() = Some(session.clone());
        session
    }
}

impl AuthClient for MemoryAuthClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        self.record_call();
        let user = self
            .users
            .read()
            .get(&email.trim().to_lowercase())
            .filter(|candidate| candidate.password == password)
            .map(|candidate| candidate.user.clone())
            .ok_or_else(|| AuthError::new("Invalid login credentials"))?;

        Ok(self.issue_session(user))
    }

    async fn sign_in_with_provider(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
    ) -> Result<ProviderRedirect, AuthError> {
        self.record_call();
        let code = Uuid::new_v4().simple().to_string();
        let authorize_url = Url::parse_with_params(
            "memory://authorize",
            &[
                ("provider", provider.as_str()),
                ("redirect_to", redirect_to),
                ("code", code.as_str()),
            ],
        )
        .map_err(|err| AuthError::new(format!("invalid redirect target: {err}")))?;

        self.pending_codes.write().insert(code, provider);
        Ok(ProviderRedirect {
            provider,
            authorize_url: authorize_url.to_string(),
        })
    }

    async fn complete_provider_sign_in(&self, auth_code: &str) -> Result<AuthSession, AuthError> {
        self.record_call();
        let provider = self
            .pending_codes
            .write()
            .remove(auth_code)
            .ok_or_else(|| AuthError::new("invalid flow state, no valid flow state found"))?;

        Ok(self.issue_session(AuthUser {
            id: Uuid::new_v4().to_string(),
            email: Some(format!("{}-user@example.com", provider.as_str())),
        }))
    }

    async fn send_magic_link(&self, email: &str, _redirect_to: &str) -> Result<(), AuthError> {
        self.record_call();
        let key = email.trim().to_lowercase();
        if !self.users.read().contains_key(&key) {
            return Err(AuthError::new("Signups not allowed for otp"));
        }
        self.magic_links.write().push(key);
        Ok(())
    }

    async fn request_password_reset(&self, email: &str) -> Result<(), AuthError> {
        self.record_call();
        self.password_resets.write().push(email.trim().to_lowercase());
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
        self.record_call();
        *self.session.write() = None;
        Ok(())
    }
}
