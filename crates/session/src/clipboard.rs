use std::time::Duration;

use askprompt_core::ClipboardFailure;
use parking_lot::Mutex;
use tokio::time::Instant;

pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), ClipboardFailure>;
}

#[derive(Debug, Clone)]
struct CopyMarker {
    message_id: String,
    copied_at: Instant,
}

/// Remembers the last copied message for a short display window.
///
/// Only one id is ever tracked: marking again replaces the previous id and
/// restarts the window. Expiry is evaluated on read against the tokio clock.
#[derive(Debug, Clone)]
pub struct CopyTracker {
    window: Duration,
    marker: Option<CopyMarker>,
}

impl CopyTracker {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            marker: None,
        }
    }

    pub fn mark(&mut self, message_id: &str) {
        self.marker = Some(CopyMarker {
            message_id: message_id.to_string(),
            copied_at: Instant::now(),
        });
    }

    pub fn current(&self) -> Option<&str> {
        self.marker
            .as_ref()
            .filter(|marker| marker.copied_at.elapsed() < self.window)
            .map(|marker| marker.message_id.as_str())
    }

    /// Drops a marker whose window has passed. Returns true if one was dropped.
    pub fn clear_expired(&mut self) -> bool {
        if self.marker.is_some() && self.current().is_none() {
            self.marker = None;
            return true;
        }
        false
    }
}

#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
    unavailable: bool,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unavailable() -> Self {
        Self {
            contents: Mutex::new(None),
            unavailable: true,
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.lock().clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardFailure> {
        if self.unavailable {
            return Err(ClipboardFailure("clipboard access denied".to_string()));
        }
        *self.contents.lock() = Some(text.to_string());
        Ok(())
    }
}
