use std::sync::Arc;

use askprompt_core::{
    AuthError, AuthSession, FieldErrors, FormField, FormState, FormValidator, FormVariant, Notice,
    Notifier,
};
use askprompt_observability::SessionMetrics;
use tracing::{info, instrument, warn};

use crate::client::AuthClient;
use crate::http::UNEXPECTED_ERROR;

pub const AUTHENTICATED_ROUTE: &str = "/dashboard";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Local validation failed; nothing was sent.
    Invalid(FieldErrors),
    Authenticated {
        route: &'static str,
        session: AuthSession,
    },
    MagicLinkSent {
        email: String,
    },
    PasswordResetSent {
        email: String,
    },
    Failed(AuthError),
    Busy,
}

/// State behind a sign-in screen: the form, its errors and the in-flight flag.
pub struct LoginFlow<A>
where
    A: AuthClient,
{
    client: A,
    validator: FormValidator,
    form: FormState,
    redirect_to: String,
    notifier: Arc<dyn Notifier>,
    metrics: Arc<SessionMetrics>,
}

impl<A> LoginFlow<A>
where
    A: AuthClient,
{
    pub fn new(
        variant: FormVariant,
        client: A,
        redirect_to: impl Into<String>,
        notifier: Arc<dyn Notifier>,
        metrics: Arc<SessionMetrics>,
    ) -> Self {
        Self {
            client,
            validator: FormValidator::new(variant),
            form: FormState::default(),
            redirect_to: redirect_to.into(),
            notifier,
            metrics,
        }
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn client(&self) -> &A {
        &self.client
    }

    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) {
        self.form.set_field(field, value);
    }

    /// Edit plus immediate re-check of that field.
    pub fn edit_field(&mut self, field: FormField, value: impl Into<String>) {
        self.form.set_field(field, value);
        self.validator.revalidate_field(&mut self.form, field);
    }

    #[instrument(skip(self), fields(variant = ?self.validator.variant()))]
    pub async fn submit(&mut self) -> LoginOutcome {
        if self.form.submitting {
            return LoginOutcome::Busy;
        }

        self.form.field_errors = self.validator.validate(&self.form);
        if !self.form.is_valid() {
            return LoginOutcome::Invalid(self.form.field_errors.clone());
        }

        self.form.submitting = true;
        self.form.general_error = None;
        self.metrics.inc_sign_in_attempt();

        let email = self.form.field(FormField::Email).trim().to_string();
        let outcome = match self.validator.variant() {
            FormVariant::EmailPassword => {
                let password = self.form.field(FormField::Password).to_string();
                match self.client.sign_in(&email, &password).await {
                    Ok(session) => {
                        self.notifier.notify(&Notice::success(
                            "Welcome back!",
                            "You have been successfully logged in.",
                        ));
                        info!(user_id = %session.user.id, route = AUTHENTICATED_ROUTE, "login succeeded");
                        LoginOutcome::Authenticated {
                            route: AUTHENTICATED_ROUTE,
                            session,
                        }
                    }
                    Err(err) => self.sign_in_failed(err),
                }
            }
            FormVariant::EmailOnly => {
                match self.client.send_magic_link(&email, &self.redirect_to).await {
                    Ok(()) => {
                        self.notifier.notify(&Notice::success(
                            "Check your email",
                            format!("We sent a sign-in link to {email}."),
                        ));
                        LoginOutcome::MagicLinkSent { email }
                    }
                    Err(err) => self.sign_in_failed(err),
                }
            }
        };

        self.form.submitting = false;
        outcome
    }

    /// The "Forgot your password?" action. Only the email field is checked.
    pub async fn request_password_reset(&mut self) -> LoginOutcome {
        if self.form.submitting {
            return LoginOutcome::Busy;
        }

        let email_only = FormValidator::new(FormVariant::EmailOnly);
        self.form.field_errors = email_only.validate(&self.form);
        if !self.form.is_valid() {
            return LoginOutcome::Invalid(self.form.field_errors.clone());
        }

        self.form.submitting = true;
        self.form.general_error = None;

        let email = self.form.field(FormField::Email).trim().to_string();
        let outcome = match self.client.request_password_reset(&email).await {
            Ok(()) => {
                self.notifier.notify(&Notice::info(
                    "Password reset requested",
                    "If an account exists for that email, a reset link is on its way.",
                ));
                LoginOutcome::PasswordResetSent { email }
            }
            Err(err) => {
                warn!(error = %err, "password reset rejected");
                self.reject(err)
            }
        };

        self.form.submitting = false;
        outcome
    }

    fn sign_in_failed(&mut self, err: AuthError) -> LoginOutcome {
        warn!(error = %err, "sign-in rejected");
        self.metrics.inc_sign_in_failure();
        self.reject(err)
    }

    fn reject(&mut self, err: AuthError) -> LoginOutcome {
        // transport failures get the generic headline
        let title = if err.message == UNEXPECTED_ERROR {
            "Error"
        } else {
            "Login Failed"
        };
        self.form.general_error = Some(err.message.clone());
        self.notifier
            .notify(&Notice::destructive(title, err.message.clone()));
        LoginOutcome::Failed(err)
    }
}

#[cfg(test)]
mod tests {
    use askprompt_core::{validation::EMAIL_INVALID, NoticeKind, RecordingNotifier};

    use super::*;
    use crate::http::{AuthConfig, HttpAuthClient};
    use crate::memory::MemoryAuthClient;

    fn flow(variant: FormVariant, client: MemoryAuthClient) -> (LoginFlow<MemoryAuthClient>, RecordingNotifier) {
        let notifier = RecordingNotifier::new();
        let flow = LoginFlow::new(
            variant,
            client,
            AUTHENTICATED_ROUTE,
            Arc::new(notifier.clone()),
            SessionMetrics::shared(),
        );
        (flow, notifier)
    }

    #[tokio::test]
    async fn invalid_email_never_reaches_provider() {
        let (mut flow, _) = flow(FormVariant::EmailPassword, MemoryAuthClient::new());
        flow.set_field(FormField::Email, "not-an-email");
        flow.set_field(FormField::Password, "hunter2");

        let outcome = flow.submit().await;
        let LoginOutcome::Invalid(errors) = outcome else {
            panic!("expected validation errors");
        };
        assert_eq!(errors.get(&FormField::Email).map(String::as_str), Some(EMAIL_INVALID));
        assert_eq!(flow.client().calls(), 0);
        assert!(!flow.form().submitting);
    }

    #[tokio::test]
    async fn successful_login_routes_to_dashboard() {
        let client = MemoryAuthClient::new().with_user("ada@example.com", "hunter2");
        let (mut flow, notifier) = flow(FormVariant::EmailPassword, client);
        flow.set_field(FormField::Email, "ada@example.com");
        flow.set_field(FormField::Password, "hunter2");

        let outcome = flow.submit().await;
        assert!(matches!(outcome, LoginOutcome::Authenticated { route: "/dashboard", .. }));
        assert_eq!(notifier.last().map(|n| n.title), Some("Welcome back!".to_string()));
        assert!(flow.form().general_error.is_none());
    }

    #[tokio::test]
    async fn provider_error_becomes_general_error() {
        let client = MemoryAuthClient::new().with_user("ada@example.com", "hunter2");
        let (mut flow, notifier) = flow(FormVariant::EmailPassword, client);
        flow.set_field(FormField::Email, "ada@example.com");
        flow.set_field(FormField::Password, "wrong");

        let outcome = flow.submit().await;
        assert!(matches!(outcome, LoginOutcome::Failed(_)));
        assert_eq!(flow.form().general_error.as_deref(), Some("Invalid login credentials"));
        assert!(!flow.form().submitting);
        assert_eq!(notifier.last().map(|n| n.kind), Some(NoticeKind::Destructive));

        flow.set_field(FormField::Password, "hunter2");
        assert!(matches!(flow.submit().await, LoginOutcome::Authenticated { .. }));
        assert!(flow.form().general_error.is_none());
    }

    #[tokio::test]
    async fn email_only_form_sends_magic_link() {
        let client = MemoryAuthClient::new().with_user("ada@example.com", "unused");
        let (mut flow, _) = flow(FormVariant::EmailOnly, client);
        flow.set_field(FormField::Email, "ada@example.com");

        let outcome = flow.submit().await;
        assert_eq!(
            outcome,
            LoginOutcome::MagicLinkSent {
                email: "ada@example.com".to_string()
            }
        );
        assert_eq!(flow.client().magic_links(), vec!["ada@example.com".to_string()]);
    }

    #[tokio::test]
    async fn errors_are_recomputed_each_submit() {
        let (mut flow, _) = flow(FormVariant::EmailPassword, MemoryAuthClient::new());
        flow.submit().await;
        assert_eq!(flow.form().field_errors.len(), 2);

        flow.set_field(FormField::Email, "ada@example.com");
        flow.submit().await;
        assert_eq!(flow.form().field_errors.len(), 1);
        assert!(flow.form().field_errors.contains_key(&FormField::Password));
    }

    #[tokio::test]
    async fn padded_email_is_rejected_as_invalid() {
        let client = MemoryAuthClient::new().with_user("ada@example.com", "hunter2");
        let (mut flow, _) = flow(FormVariant::EmailPassword, client);
        flow.set_field(FormField::Email, "  ada@example.com ");
        flow.set_field(FormField::Password, "hunter2");

        let LoginOutcome::Invalid(errors) = flow.submit().await else {
            panic!("expected validation errors");
        };
        assert_eq!(errors.get(&FormField::Email).map(String::as_str), Some(EMAIL_INVALID));
        assert_eq!(flow.client().calls(), 0);
    }

    #[tokio::test]
    async fn password_reset_checks_email_only() {
        let (mut flow, _) = flow(FormVariant::EmailPassword, MemoryAuthClient::new());
        flow.set_field(FormField::Email, "ada@example.com");

        assert_eq!(
            flow.request_password_reset().await,
            LoginOutcome::PasswordResetSent {
                email: "ada@example.com".to_string()
            }
        );
        assert_eq!(flow.client().password_resets(), vec!["ada@example.com".to_string()]);
        assert!(!flow.form().submitting);
    }

    #[tokio::test]
    async fn password_reset_replaces_errors_from_earlier_submit() {
        let (mut flow, _) = flow(FormVariant::EmailPassword, MemoryAuthClient::new());
        flow.submit().await;
        assert_eq!(flow.form().field_errors.len(), 2);

        flow.set_field(FormField::Email, "ada@example.com");
        assert!(matches!(
            flow.request_password_reset().await,
            LoginOutcome::PasswordResetSent { .. }
        ));
        assert!(flow.form().field_errors.is_empty());
        assert!(flow.form().general_error.is_none());
    }

    #[tokio::test]
    async fn reset_failure_is_not_a_sign_in_failure() {
        let client = HttpAuthClient::new(AuthConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            anon_key: "anon".to_string(),
        })
        .expect("client builds");
        let metrics = SessionMetrics::shared();
        let notifier = RecordingNotifier::new();
        let mut flow = LoginFlow::new(
            FormVariant::EmailOnly,
            client,
            AUTHENTICATED_ROUTE,
            Arc::new(notifier.clone()),
            metrics.clone(),
        );
        flow.set_field(FormField::Email, "ada@example.com");

        assert!(matches!(flow.request_password_reset().await, LoginOutcome::Failed(_)));
        assert_eq!(flow.form().general_error.as_deref(), Some(UNEXPECTED_ERROR));
        assert!(!flow.form().submitting);
        assert_eq!(metrics.snapshot().sign_in_failures_total, 0);
        assert_eq!(notifier.last().map(|n| n.title), Some("Error".to_string()));
    }

    #[tokio::test]
    async fn provider_rejection_keeps_login_headline() {
        let client = MemoryAuthClient::new().with_user("ada@example.com", "hunter2");
        let metrics = SessionMetrics::shared();
        let notifier = RecordingNotifier::new();
        let mut flow = LoginFlow::new(
            FormVariant::EmailPassword,
            client,
            AUTHENTICATED_ROUTE,
            Arc::new(notifier.clone()),
            metrics.clone(),
        );
        flow.set_field(FormField::Email, "ada@example.com");
        flow.set_field(FormField::Password, "nope");

        flow.submit().await;
        assert_eq!(metrics.snapshot().sign_in_failures_total, 1);
        assert_eq!(notifier.last().map(|n| n.title), Some("Login Failed".to_string()));
    }
}
