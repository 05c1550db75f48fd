use std::sync::Arc;

use askprompt_core::{
    demo_transcript, matching_rule, normalize_text, AboutRule, ChatMessage, Notice, Notifier,
    RewriteFailure, Role, SessionError, SubmitRejected, ABOUT_RESPONSE,
};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use crate::clipboard::{Clipboard, CopyTracker};
use crate::config::SessionConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    AwaitingResponse,
}

/// Work handed to the rewrite backend. Carries the text exactly as submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteRequest {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Answered on the spot with the canned about response.
    Answered {
        user_message_id: String,
        reply_id: String,
        rule: AboutRule,
    },
    AwaitingRewrite(RewriteRequest),
}

/// The chat log and its busy flag.
///
/// `submit`, `on_result` and `on_error` are the only transitions. The log is
/// append-only and at most one rewrite is ever outstanding.
pub struct ChatSession {
    config: SessionConfig,
    messages: Vec<ChatMessage>,
    state: SessionState,
    copies: CopyTracker,
    notifier: Arc<dyn Notifier>,
}

impl ChatSession {
    pub fn new(config: SessionConfig, notifier: Arc<dyn Notifier>) -> Self {
        let messages = if config.demo_mode {
            demo_transcript(Utc::now())
        } else {
            Vec::new()
        };

        Self {
            copies: CopyTracker::new(config.copy_window),
            config,
            messages,
            state: SessionState::Idle,
            notifier,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn message(&self, id: &str) -> Option<&ChatMessage> {
        self.messages.iter().find(|message| message.id == id)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state == SessionState::AwaitingResponse
    }

    pub fn recently_copied(&self) -> Option<&str> {
        self.copies.current()
    }

    pub fn submit(&mut self, text: &str) -> Result<SubmitOutcome, SubmitRejected> {
        if self.copies.clear_expired() {
            debug!("copy marker expired");
        }

        if self.is_pending() {
            self.notifier.notify(&Notice::info(
                "Still working",
                "Wait for the current prompt to finish rewriting.",
            ));
            return Err(SubmitRejected::Busy);
        }

        if text.trim().is_empty() {
            self.notifier.notify(&Notice::destructive(
                "Please enter a prompt",
                "Type something you'd like me to rewrite into a better AI prompt.",
            ));
            return Err(SubmitRejected::Empty);
        }

        let max = self.config.max_input_chars;
        if text.chars().count() > max {
            self.notifier.notify(&Notice::destructive(
                "Prompt too long",
                format!("Keep your request under {max} characters."),
            ));
            return Err(SubmitRejected::TooLong { max });
        }

        let user_message = ChatMessage::user(text);
        let user_message_id = user_message.id.clone();
        self.messages.push(user_message);

        if let Some(rule) = matching_rule(&normalize_text(text)) {
            let reply_id = self.append(Role::Assistant, ABOUT_RESPONSE);
            info!(rule = rule.name(), "answered about question");
            return Ok(SubmitOutcome::Answered {
                user_message_id,
                reply_id,
                rule,
            });
        }

        self.state = SessionState::AwaitingResponse;
        debug!(message_id = %user_message_id, "awaiting rewrite");
        Ok(SubmitOutcome::AwaitingRewrite(RewriteRequest {
            text: text.to_string(),
        }))
    }

    pub fn on_result(&mut self, text: impl Into<String>) -> Result<&ChatMessage, SessionError> {
        if !self.is_pending() {
            return Err(SessionError::NotAwaiting);
        }

        self.append(Role::Assistant, text);
        self.state = SessionState::Idle;
        self.notifier.notify(&Notice::success(
            "Prompt rewritten successfully!",
            "Your prompt has been optimized for AI systems.",
        ));

        Ok(&self.messages[self.messages.len() - 1])
    }

    pub fn on_error(&mut self, failure: &RewriteFailure) -> Result<(), SessionError> {
        if !self.is_pending() {
            return Err(SessionError::NotAwaiting);
        }

        self.state = SessionState::Idle;
        info!(kind = ?failure.kind, error = %failure.message, "rewrite failed");
        self.notifier.notify(&Notice::destructive(
            "Sorry, something went wrong",
            "We couldn't process your request right now. Please try again later.",
        ));
        Ok(())
    }

    pub fn copy_message(
        &mut self,
        message_id: &str,
        clipboard: &dyn Clipboard,
    ) -> Result<(), SessionError> {
        let content = self
            .message(message_id)
            .map(|message| message.content.clone())
            .ok_or_else(|| SessionError::UnknownMessage(message_id.to_string()))?;

        match clipboard.write_text(&content) {
            Ok(()) => {
                self.copies.mark(message_id);
                self.notifier.notify(&Notice::success(
                    "Copied to clipboard!",
                    "The prompt has been copied to your clipboard.",
                ));
                Ok(())
            }
            Err(failure) => {
                self.notifier.notify(&Notice::destructive(
                    "Failed to copy",
                    "Please try selecting and copying the text manually.",
                ));
                Err(failure.into())
            }
        }
    }

    fn append(&mut self, role: Role, content: impl Into<String>) -> String {
        let message = ChatMessage::new(role, content, Utc::now());
        let id = message.id.clone();
        self.messages.push(message);
        id
    }
}
