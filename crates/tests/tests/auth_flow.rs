use std::sync::Arc;

use askprompt_auth::{
    AuthBackend, AuthClient, AuthConfig, HttpAuthClient, LoginFlow, LoginOutcome,
    MemoryAuthClient, AUTHENTICATED_ROUTE,
};
use askprompt_core::{FormField, FormVariant, NoticeKind, OAuthProvider, RecordingNotifier};
use askprompt_observability::SessionMetrics;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn http_flow(server: &MockServer, variant: FormVariant) -> (LoginFlow<AuthBackend>, RecordingNotifier) {
    let client = HttpAuthClient::new(AuthConfig {
        base_url: server.uri(),
        anon_key: "anon".to_string(),
    })
    .expect("client builds");
    let notifier = RecordingNotifier::new();
    let flow = LoginFlow::new(
        variant,
        AuthBackend::Http(client),
        AUTHENTICATED_ROUTE,
        Arc::new(notifier.clone()),
        SessionMetrics::shared(),
    );
    (flow, notifier)
}

#[tokio::test]
async fn malformed_email_never_hits_the_provider() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (mut flow, notifier) = http_flow(&server, FormVariant::EmailPassword);
    flow.set_field(FormField::Email, "not-an-email");
    flow.set_field(FormField::Password, "hunter2");

    let outcome = flow.submit().await;
    assert!(matches!(outcome, LoginOutcome::Invalid(ref errors) if errors.contains_key(&FormField::Email)));
    assert!(notifier.notices().is_empty());
}

#[tokio::test]
async fn password_login_lands_on_dashboard() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "jwt",
            "expires_in": 3600,
            "user": { "id": "user-7", "email": "ada@example.com" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (mut flow, notifier) = http_flow(&server, FormVariant::EmailPassword);
    flow.set_field(FormField::Email, "ada@example.com");
    flow.set_field(FormField::Password, "hunter2");

    let LoginOutcome::Authenticated { route, session } = flow.submit().await else {
        panic!("expected a session");
    };
    assert_eq!(route, "/dashboard");
    assert_eq!(session.user.id, "user-7");
    assert!(flow.client().current_session().await.expect("lookup").is_some());
    assert_eq!(notifier.last().map(|n| n.kind), Some(NoticeKind::Success));
}

#[tokio::test]
async fn rejected_credentials_surface_provider_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid login credentials"
        })))
        .mount(&server)
        .await;

    let (mut flow, notifier) = http_flow(&server, FormVariant::EmailPassword);
    flow.set_field(FormField::Email, "ada@example.com");
    flow.set_field(FormField::Password, "wrong");

    assert!(matches!(flow.submit().await, LoginOutcome::Failed(_)));
    assert_eq!(flow.form().general_error.as_deref(), Some("Invalid login credentials"));
    assert!(!flow.form().submitting);

    let notice = notifier.last().expect("notice emitted");
    assert_eq!(notice.kind, NoticeKind::Destructive);
    assert_eq!(notice.title, "Login Failed");
}

#[tokio::test]
async fn email_only_form_requests_magic_link() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/otp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let (mut flow, _) = http_flow(&server, FormVariant::EmailOnly);
    flow.set_field(FormField::Email, "ada@example.com");

    assert_eq!(
        flow.submit().await,
        LoginOutcome::MagicLinkSent {
            email: "ada@example.com".to_string()
        }
    );
}

#[tokio::test]
async fn offline_provider_sign_in_round_trip() {
    let backend = AuthBackend::Memory(MemoryAuthClient::new());

    let redirect = backend
        .sign_in_with_provider(OAuthProvider::Apple, AUTHENTICATED_ROUTE)
        .await
        .expect("redirect built");
    let code = redirect
        .authorize_url
        .split("code=")
        .nth(1)
        .expect("code in url")
        .to_string();

    let session = backend.complete_provider_sign_in(&code).await.expect("exchange");
    assert_eq!(session.user.email.as_deref(), Some("apple-user@example.com"));

    backend.sign_out().await.expect("sign out");
    assert!(backend.current_session().await.expect("lookup").is_none());
}
