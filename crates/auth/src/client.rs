use askprompt_core::{AuthError, AuthSession, OAuthProvider, ProviderRedirect};

use crate::http::HttpAuthClient;
use crate::memory::MemoryAuthClient;

/// Operations the sign-in screens need from the identity provider.
pub trait AuthClient: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    /// Starts a redirect-based sign-in. The session only exists after the
    /// provider sends the user back and [`AuthClient::complete_provider_sign_in`] runs.
    async fn sign_in_with_provider(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
    ) -> Result<ProviderRedirect, AuthError>;

    async fn complete_provider_sign_in(&self, auth_code: &str) -> Result<AuthSession, AuthError>;

    async fn send_magic_link(&self, email: &str, redirect_to: &str) -> Result<(), AuthError>;

    async fn request_password_reset(&self, email: &str) -> Result<(), AuthError>;

    async fn current_session(&self) -> Result<Option<AuthSession>, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;
}

#[derive(Debug, Clone)]
pub enum AuthBackend {
    Http(HttpAuthClient),
    Memory(MemoryAuthClient),
}

impl AuthBackend {
    pub fn memory() -> Self {
        Self::Memory(MemoryAuthClient::new())
    }
}

impl AuthClient for AuthBackend {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        match self {
            AuthBackend::Http(client) => client.sign_in(email, password).await,
            AuthBackend::Memory(client) => client.sign_in(email, password).await,
        }
    }

    async fn sign_in_with_provider(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
    ) -> Result<ProviderRedirect, AuthError> {
        match self {
            AuthBackend::Http(client) => client.sign_in_with_provider(provider, redirect_to).await,
            AuthBackend::Memory(client) => client.sign_in_with_provider(provider, redirect_to).await,
        }
    }

    async fn complete_provider_sign_in(&self, auth_code: &str) -> Result<AuthSession, AuthError> {
        match self {
            AuthBackend::Http(client) => client.complete_provider_sign_in(auth_code).await,
            AuthBackend::Memory(client) => client.complete_provider_sign_in(auth_code).await,
        }
    }

    async fn send_magic_link(&self, email: &str, redirect_to: &str) -> Result<(), AuthError> {
        match self {
            AuthBackend::Http(client) => client.send_magic_link(email, redirect_to).await,
            AuthBackend::Memory(client) => client.send_magic_link(email, redirect_to).await,
        }
    }

    async fn request_password_reset(&self, email: &str) -> Result<(), AuthError> {
        match self {
            AuthBackend::Http(client) => client.request_password_reset(email).await,
            AuthBackend::Memory(client) => client.request_password_reset(email).await,
        }
    }

    async fn current_session(&self) -> Result<Option<AuthSession>, AuthError> {
        match self {
            AuthBackend::Http(client) => client.current_session().await,
            AuthBackend::Memory(client) => client.current_session().await,
        }
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        match self {
            AuthBackend::Http(client) => client.sign_out().await,
            AuthBackend::Memory(client) => client.sign_out().await,
        }
    }
}
