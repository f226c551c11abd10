use parking_lot::Mutex;

use crate::error::{AppError, AppResult};

/// Write-only access to the system clipboard
pub trait ClipboardSink: Send + Sync {
    fn copy_text(&self, text: &str) -> AppResult<()>;
}

/// Clipboard backed by the desktop session
///
/// The handle is opened on first use and kept for the life of the process:
/// on X11 the copied text is only served while a handle is alive.
#[derive(Default)]
pub struct SystemClipboard {
    handle: Mutex<Option<arboard::Clipboard>>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClipboardSink for SystemClipboard {
    fn copy_text(&self, text: &str) -> AppResult<()> {
        let mut guard = self.handle.lock();

        if guard.is_none() {
            let clipboard = arboard::Clipboard::new()
                .map_err(|e| AppError::Clipboard(format!("failed to open clipboard: {}", e)))?;
            *guard = Some(clipboard);
        }

        let Some(clipboard) = guard.as_mut() else {
            return Err(AppError::Clipboard("clipboard unavailable".to_string()));
        };

        if let Err(e) = clipboard.set_text(text.to_owned()) {
            // Drop the handle so the next message reopens the session
            *guard = None;
            return Err(AppError::Clipboard(format!("failed to set text: {}", e)));
        }

        tracing::debug!(text_length = text.chars().count(), "Payload copied to clipboard");
        Ok(())
    }
}
