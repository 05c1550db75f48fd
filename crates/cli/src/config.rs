use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use askprompt_auth::{AuthBackend, AuthConfig, HttpAuthClient, MemoryAuthClient};
use askprompt_session::config::DEFAULT_REWRITE_TIMEOUT;
use askprompt_session::{HttpRewriter, RewriteBackend, SessionConfig, TemplateRewriter};
use tracing::warn;

const DEFAULT_OAUTH_REDIRECT: &str = "http://localhost:3000/dashboard";
const DEMO_LATENCY: Duration = Duration::from_secs(2);

pub const OFFLINE_DEMO_EMAIL: &str = "demo@askprompt.dev";
pub const OFFLINE_DEMO_PASSWORD: &str = "demo-password";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub auth_url: Option<String>,
    pub auth_anon_key: Option<String>,
    pub rewrite_url: Option<String>,
    pub rewrite_key: Option<String>,
    pub rewrite_timeout: Duration,
    pub demo_mode: bool,
    pub oauth_redirect: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            auth_url: non_empty("ASKPROMPT_AUTH_URL"),
            auth_anon_key: non_empty("ASKPROMPT_AUTH_ANON_KEY"),
            rewrite_url: non_empty("ASKPROMPT_REWRITE_URL"),
            rewrite_key: non_empty("ASKPROMPT_REWRITE_KEY"),
            rewrite_timeout: non_empty("ASKPROMPT_REWRITE_TIMEOUT_SECONDS")
                .and_then(|value| value.parse::<u64>().ok())
                .filter(|seconds| *seconds > 0)
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_REWRITE_TIMEOUT),
            demo_mode: non_empty("ASKPROMPT_DEMO_MODE")
                .map(|value| matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
                .unwrap_or(false),
            oauth_redirect: non_empty("ASKPROMPT_OAUTH_REDIRECT")
                .unwrap_or_else(|| DEFAULT_OAUTH_REDIRECT.to_string()),
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            demo_mode: self.demo_mode,
            rewrite_timeout: self.rewrite_timeout,
            ..SessionConfig::default()
        }
    }

    /// Remote rewriter when an endpoint is configured, otherwise the local template.
    pub fn build_rewriter(&self, latency: Option<Duration>) -> Result<RewriteBackend> {
        if let Some(endpoint) = &self.rewrite_url {
            let rewriter = HttpRewriter::new(endpoint.clone(), self.rewrite_key.clone())
                .with_context(|| format!("failed configuring rewriter for {endpoint}"))?;
            return Ok(RewriteBackend::Http(rewriter));
        }

        let latency = latency.unwrap_or(if self.demo_mode {
            DEMO_LATENCY
        } else {
            Duration::ZERO
        });
        Ok(RewriteBackend::Template(TemplateRewriter::new(latency)))
    }

    pub fn build_auth(&self, offline: bool) -> Result<AuthBackend> {
        if offline {
            return Ok(offline_backend());
        }

        let Some(base_url) = &self.auth_url else {
            warn!("ASKPROMPT_AUTH_URL not set; using in-memory auth");
            return Ok(offline_backend());
        };

        let client = HttpAuthClient::new(AuthConfig {
            base_url: base_url.clone(),
            anon_key: self.auth_anon_key.clone().unwrap_or_default(),
        })?;
        Ok(AuthBackend::Http(client))
    }
}

fn offline_backend() -> AuthBackend {
    AuthBackend::Memory(MemoryAuthClient::new().with_user(OFFLINE_DEMO_EMAIL, OFFLINE_DEMO_PASSWORD))
}
