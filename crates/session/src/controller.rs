use std::sync::Arc;
use std::time::Instant;

use askprompt_core::{ChatMessage, Notifier, RewriteFailure, SessionError, SubmitRejected};
use askprompt_observability::SessionMetrics;
use tracing::{info, instrument, warn};

use crate::clipboard::Clipboard;
use crate::config::SessionConfig;
use crate::rewrite::Rewriter;
use crate::session::{ChatSession, SubmitOutcome};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendReport {
    Answered { reply: ChatMessage },
    Rewritten { reply: ChatMessage },
    Failed(RewriteFailure),
    Rejected(SubmitRejected),
}

/// Drives a [`ChatSession`] against a rewrite backend, bounding every call
/// with the configured timeout.
pub struct ChatController<R>
where
    R: Rewriter,
{
    session: ChatSession,
    rewriter: R,
    metrics: Arc<SessionMetrics>,
}

impl<R> ChatController<R>
where
    R: Rewriter,
{
    pub fn new(
        config: SessionConfig,
        rewriter: R,
        notifier: Arc<dyn Notifier>,
        metrics: Arc<SessionMetrics>,
    ) -> Self {
        Self {
            session: ChatSession::new(config, notifier),
            rewriter,
            metrics,
        }
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn metrics(&self) -> &Arc<SessionMetrics> {
        &self.metrics
    }

    #[instrument(skip(self, text), fields(chars = text.chars().count()))]
    pub async fn send(&mut self, text: &str) -> Result<SendReport, SessionError> {
        self.metrics.inc_submission();

        let request = match self.session.submit(text) {
            Ok(SubmitOutcome::Answered { reply_id, .. }) => {
                self.metrics.inc_about_answer();
                let reply = self
                    .session
                    .message(&reply_id)
                    .cloned()
                    .ok_or(SessionError::UnknownMessage(reply_id))?;
                return Ok(SendReport::Answered { reply });
            }
            Ok(SubmitOutcome::AwaitingRewrite(request)) => request,
            Err(rejected) => {
                self.metrics.inc_rejected();
                return Ok(SendReport::Rejected(rejected));
            }
        };

        let timeout = self.session.config().rewrite_timeout;
        let started = Instant::now();
        let result = match tokio::time::timeout(timeout, self.rewriter.rewrite(&request.text)).await {
            Ok(result) => result,
            Err(_) => {
                self.metrics.inc_rewrite_timeout();
                Err(RewriteFailure::timeout(format!(
                    "no rewrite within {}s",
                    timeout.as_secs()
                )))
            }
        };
        self.metrics.observe_rewrite(started.elapsed(), result.is_ok());

        match result {
            Ok(prompt) => {
                let reply = self.session.on_result(prompt)?.clone();
                info!(
                    message_id = %reply.id,
                    latency_ms = started.elapsed().as_millis() as u64,
                    "prompt rewritten"
                );
                Ok(SendReport::Rewritten { reply })
            }
            Err(failure) => {
                warn!(kind = ?failure.kind, error = %failure.message, "rewrite failed");
                self.session.on_error(&failure)?;
                Ok(SendReport::Failed(failure))
            }
        }
    }

    pub fn copy(&mut self, message_id: &str, clipboard: &dyn Clipboard) -> Result<(), SessionError> {
        self.session.copy_message(message_id, clipboard)?;
        self.metrics.inc_copy();
        Ok(())
    }
}
