use std::io::{self, Write};

use tracing::debug;

use crate::feedback::{AudioCue, Cue};

/// Rings the terminal bell. A terminal has a single tone, so cues are
/// told apart by how many times it rings.
pub struct TerminalBell<W: Write> {
    out: W,
}

impl TerminalBell<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalBell<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> AudioCue for TerminalBell<W> {
    fn play(&mut self, cue: Cue) {
        debug!(%cue, "playing cue");
        let pattern = b"\x07".repeat(rings(cue));
        let rung = self.out.write_all(&pattern).and_then(|()| self.out.flush());
        if let Err(err) = rung {
            debug!(%cue, error = %err, "terminal bell failed");
        }
    }
}

fn rings(cue: Cue) -> usize {
    match cue {
        Cue::Translate | Cue::Startup => 1,
        Cue::Add | Cue::Batch => 2,
        Cue::Process => 3,
    }
}

pub struct Silent;

impl AudioCue for Silent {
    fn play(&mut self, cue: Cue) {
        debug!(%cue, "cue muted");
    }
}
