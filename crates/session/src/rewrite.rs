use std::time::Duration;

use anyhow::{Context, Result};
use askprompt_core::{build_rewrite_prompt, RewriteFailure};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Turns casual text into a structured prompt.
pub trait Rewriter: Send + Sync {
    async fn rewrite(&self, text: &str) -> Result<String, RewriteFailure>;
}

/// Built-in rewriter that fills the structured-prompt template, optionally
/// after a simulated round trip.
#[derive(Debug, Clone, Default)]
pub struct TemplateRewriter {
    latency: Duration,
}

impl TemplateRewriter {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    pub fn instant() -> Self {
        Self::default()
    }
}

impl Rewriter for TemplateRewriter {
    async fn rewrite(&self, text: &str) -> Result<String, RewriteFailure> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        Ok(build_rewrite_prompt(text))
    }
}

#[derive(Debug, Serialize)]
struct RewriteBody<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct RewriteReply {
    prompt: String,
}

/// Calls a remote rewrite function: `POST {endpoint}` with `{"text": ...}`,
/// expecting `{"prompt": ...}` back.
#[derive(Debug, Clone)]
pub struct HttpRewriter {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpRewriter {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(6))
            .timeout(Duration::from_secs(20))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Rewriter for HttpRewriter {
    async fn rewrite(&self, text: &str) -> Result<String, RewriteFailure> {
        let mut request = self.client.post(&self.endpoint).json(&RewriteBody { text });
        if let Some(key) = self.api_key.as_deref() {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RewriteFailure::server(format!(
                "rewrite endpoint returned {}: {}",
                status.as_u16(),
                body
            )));
        }

        let reply: RewriteReply = response
            .json()
            .await
            .map_err(|err| RewriteFailure::server(format!("unreadable rewrite reply: {err}")))?;

        if reply.prompt.trim().is_empty() {
            return Err(RewriteFailure::server("rewrite endpoint returned an empty prompt"));
        }

        debug!(chars = reply.prompt.chars().count(), "rewrite received");
        Ok(reply.prompt)
    }
}

fn classify_transport_error(err: reqwest::Error) -> RewriteFailure {
    if err.is_timeout() {
        RewriteFailure::timeout(err.to_string())
    } else {
        RewriteFailure::network(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub enum RewriteBackend {
    Template(TemplateRewriter),
    Http(HttpRewriter),
}

impl RewriteBackend {
    pub fn name(&self) -> &'static str {
        match self {
            RewriteBackend::Template(_) => "template",
            RewriteBackend::Http(_) => "http",
        }
    }
}

impl Rewriter for RewriteBackend {
    async fn rewrite(&self, text: &str) -> Result<String, RewriteFailure> {
        match self {
            RewriteBackend::Template(rewriter) => rewriter.rewrite(text).await,
            RewriteBackend::Http(rewriter) => rewriter.rewrite(text).await,
        }
    }
}
