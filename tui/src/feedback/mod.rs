mod bell;
mod clipboard;

use std::fmt;

use thiserror::Error;

pub type FeedbackResult<T> = Result<T, FeedbackError>;

#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("clipboard unavailable: {0}")]
    Clipboard(#[from] arboard::Error),
    #[error("nothing to copy yet")]
    Empty,
}

/// User actions that are acknowledged with a sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Startup,
    Translate,
    Add,
    Batch,
    Process,
}

impl Cue {
    pub fn name(self) -> &'static str {
        match self {
            Cue::Startup => "welcome",
            Cue::Translate => "translate",
            Cue::Add => "add",
            Cue::Batch => "multiple",
            Cue::Process => "process",
        }
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub trait AudioCue {
    fn play(&mut self, cue: Cue);
}

pub trait ClipboardSink {
    fn copy(&mut self, text: &str) -> FeedbackResult<()>;
}

pub fn get_cue_backend(sound_enabled: bool) -> Box<dyn AudioCue> {
    if sound_enabled {
        Box::new(bell::TerminalBell::stdout())
    } else {
        Box::new(bell::Silent)
    }
}

pub use clipboard::SystemClipboard;
