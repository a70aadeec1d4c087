use arboard::Clipboard;
use tracing::debug;

use crate::feedback::{ClipboardSink, FeedbackError, FeedbackResult};

/// System clipboard, opened on first use so headless sessions still start.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClipboardSink for SystemClipboard {
    fn copy(&mut self, text: &str) -> FeedbackResult<()> {
        if text.trim().is_empty() {
            return Err(FeedbackError::Empty);
        }
        let clipboard = match self.inner.take() {
            Some(clipboard) => clipboard,
            None => Clipboard::new()?,
        };
        let clipboard = self.inner.insert(clipboard);
        clipboard.set_text(text.to_string())?;
        debug!(chars = text.chars().count(), "copied to clipboard");
        Ok(())
    }
}
