use askprompt_core::{ChatMessage, ClipboardFailure, Notice, NoticeKind, Notifier, TracingNotifier};
use askprompt_session::Clipboard;

/// Prints notices inline with the conversation, like toasts, and logs them.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier {
    log: TracingNotifier,
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: &Notice) {
        self.log.notify(notice);
        let line = format_notice(notice);
        match notice.kind {
            NoticeKind::Destructive => eprintln!("{line}"),
            _ => println!("{line}"),
        }
    }
}

fn format_notice(notice: &Notice) -> String {
    let marker = match notice.kind {
        NoticeKind::Info => "i",
        NoticeKind::Success => "+",
        NoticeKind::Destructive => "!",
    };
    format!("[{marker}] {}: {}", notice.title, notice.description)
}

/// System clipboard through `arboard`. A handle is opened per write.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardFailure> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|err| ClipboardFailure(err.to_string()))?;
        clipboard
            .set_text(text.to_string())
            .map_err(|err| ClipboardFailure(err.to_string()))
    }
}

pub fn render_message(index: usize, message: &ChatMessage, copied: bool) -> String {
    let who = message.role.as_label();
    let stamp = message.created_at.format("%I:%M %p");
    let badge = if copied { "  (copied)" } else { "" };
    format!("#{index} {who} · {stamp}{badge}\n{}\n", message.content)
}
