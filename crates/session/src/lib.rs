pub mod clipboard;
pub mod config;
pub mod controller;
pub mod rewrite;
pub mod session;

pub use clipboard::{Clipboard, CopyTracker, MemoryClipboard};
pub use config::SessionConfig;
pub use controller::{ChatController, SendReport};
pub use rewrite::{HttpRewriter, RewriteBackend, Rewriter, TemplateRewriter};
pub use session::{ChatSession, RewriteRequest, SessionState, SubmitOutcome};
