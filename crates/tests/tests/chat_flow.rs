use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use askprompt_core::{
    build_rewrite_prompt, NoticeKind, RecordingNotifier, RewriteFailure, RewriteFailureKind, Role,
    ABOUT_RESPONSE,
};
use askprompt_observability::SessionMetrics;
use askprompt_session::{
    ChatController, HttpRewriter, MemoryClipboard, Rewriter, SendReport, SessionConfig,
    SessionState, TemplateRewriter,
};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Clone, Default)]
struct SpyRewriter {
    calls: Arc<AtomicUsize>,
    inner: TemplateRewriter,
}

impl Rewriter for SpyRewriter {
    async fn rewrite(&self, text: &str) -> Result<String, RewriteFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.rewrite(text).await
    }
}

struct HangingRewriter;

impl Rewriter for HangingRewriter {
    async fn rewrite(&self, _text: &str) -> Result<String, RewriteFailure> {
        std::future::pending().await
    }
}

fn controller<R: Rewriter>(rewriter: R) -> (ChatController<R>, RecordingNotifier) {
    let notifier = RecordingNotifier::new();
    let controller = ChatController::new(
        SessionConfig::default(),
        rewriter,
        Arc::new(notifier.clone()),
        SessionMetrics::shared(),
    );
    (controller, notifier)
}

#[tokio::test]
async fn workout_request_is_rewritten_into_structured_prompt() {
    let spy = SpyRewriter::default();
    let (mut controller, notifier) = controller(spy.clone());

    let report = controller.send("Make a workout plan").await.expect("send");
    let SendReport::Rewritten { reply } = report else {
        panic!("expected a rewritten prompt");
    };

    let messages = controller.session().messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[0].content, "Make a workout plan");
    assert_eq!(reply.role, Role::Assistant);
    assert_eq!(reply.content, build_rewrite_prompt("Make a workout plan"));
    assert!(reply.content.contains("Make a workout plan"));
    assert_eq!(controller.session().state(), SessionState::Idle);
    assert_eq!(spy.calls.load(Ordering::SeqCst), 1);
    assert_eq!(notifier.last().map(|n| n.kind), Some(NoticeKind::Success));
}

#[tokio::test]
async fn about_question_skips_the_rewriter() {
    let spy = SpyRewriter::default();
    let (mut controller, _) = controller(spy.clone());

    let report = controller.send("who built this").await.expect("send");
    let SendReport::Answered { reply } = report else {
        panic!("expected the canned answer");
    };

    assert_eq!(reply.content, ABOUT_RESPONSE);
    assert_eq!(controller.session().messages().len(), 2);
    assert!(!controller.session().is_pending());
    assert_eq!(spy.calls.load(Ordering::SeqCst), 0);
    assert_eq!(controller.metrics().snapshot().about_answers_total, 1);
}

#[tokio::test]
async fn blank_input_leaves_log_untouched() {
    let spy = SpyRewriter::default();
    let (mut controller, notifier) = controller(spy.clone());

    let report = controller.send("   \n ").await.expect("send");
    assert!(matches!(report, SendReport::Rejected(_)));
    assert!(controller.session().messages().is_empty());
    assert!(!controller.session().is_pending());
    assert_eq!(spy.calls.load(Ordering::SeqCst), 0);
    assert_eq!(notifier.last().map(|n| n.kind), Some(NoticeKind::Destructive));
}

#[tokio::test(start_paused = true)]
async fn hung_rewrite_times_out_and_recovers() {
    let (mut controller, notifier) = controller(HangingRewriter);

    let report = controller.send("Draft a cover letter").await.expect("send");
    let SendReport::Failed(failure) = report else {
        panic!("expected a timeout failure");
    };

    assert_eq!(failure.kind, RewriteFailureKind::Timeout);
    assert_eq!(controller.session().state(), SessionState::Idle);
    assert_eq!(controller.session().messages().len(), 1);
    assert_eq!(
        notifier.last().map(|n| n.title),
        Some("Sorry, something went wrong".to_string())
    );
    assert_eq!(controller.metrics().snapshot().rewrite_timeouts_total, 1);
}

#[tokio::test(start_paused = true)]
async fn copy_marker_expires_after_two_seconds() {
    let (mut controller, _) = controller(TemplateRewriter::instant());
    let SendReport::Rewritten { reply } = controller.send("Plan a trip").await.expect("send") else {
        panic!("expected a rewritten prompt");
    };

    let clipboard = MemoryClipboard::new();
    controller.copy(&reply.id, &clipboard).expect("copy");
    assert_eq!(clipboard.contents(), Some(reply.content.clone()));
    assert_eq!(controller.session().recently_copied(), Some(reply.id.as_str()));

    tokio::time::advance(Duration::from_millis(1_900)).await;
    assert!(controller.session().recently_copied().is_some());

    tokio::time::advance(Duration::from_millis(200)).await;
    assert!(controller.session().recently_copied().is_none());
}

#[tokio::test]
async fn remote_rewriter_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/functions/v1/rewrite"))
        .and(body_json(json!({ "text": "Summarize my meeting notes" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "prompt": "Summarize the following meeting notes into action items."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let rewriter = HttpRewriter::new(format!("{}/functions/v1/rewrite", server.uri()), None)
        .expect("rewriter builds");
    let (mut controller, _) = controller(rewriter);

    let report = controller.send("Summarize my meeting notes").await.expect("send");
    let SendReport::Rewritten { reply } = report else {
        panic!("expected a rewritten prompt");
    };
    assert_eq!(reply.content, "Summarize the following meeting notes into action items.");
}

#[tokio::test]
async fn remote_failure_returns_to_idle() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let rewriter = HttpRewriter::new(server.uri(), None).expect("rewriter builds");
    let (mut controller, _) = controller(rewriter);

    let report = controller.send("Write a haiku").await.expect("send");
    assert!(matches!(report, SendReport::Failed(ref failure) if failure.kind == RewriteFailureKind::Server));
    assert!(!controller.session().is_pending());

    let report = controller.send("Tell me about yourself").await.expect("send");
    assert!(matches!(report, SendReport::Answered { .. }));
}
