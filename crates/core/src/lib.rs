pub mod error;
pub mod intent;
pub mod models;
pub mod notify;
pub mod templates;
pub mod validation;

pub use error::{
    AuthError, ClipboardFailure, RewriteFailure, RewriteFailureKind, SessionError, SubmitRejected,
};
pub use intent::{classify_about, classify_intent, matching_rule, normalize_text, AboutRule};
pub use models::*;
pub use notify::{Notifier, RecordingNotifier, TracingNotifier};
pub use templates::{build_rewrite_prompt, demo_transcript, ABOUT_RESPONSE};
pub use validation::{FormValidator, FormVariant};
