use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{info, warn};
use ud_core::{InsertError, Store, format_lookup, translate_batch};

use crate::feedback::{AudioCue, ClipboardSink, Cue, FeedbackError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Translate,
    Batch,
    AddWord,
    Browse,
    Message,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddField {
    English,
    Urdu,
}

pub struct App {
    pub mode: Mode,
    pub return_mode: Mode,
    pub store: Store,
    pub word_input: String,
    pub result: Option<String>,
    pub english_input: String,
    pub urdu_input: String,
    pub add_field: AddField,
    pub batch_inputs: Vec<String>,
    pub batch_selection: usize,
    pub browse_scroll: usize,
    pub message: Option<String>,
    cue: Box<dyn AudioCue>,
    clipboard: Box<dyn ClipboardSink>,
}

impl App {
    pub fn new(
        store: Store,
        batch_slots: usize,
        cue: Box<dyn AudioCue>,
        clipboard: Box<dyn ClipboardSink>,
    ) -> Self {
        Self {
            mode: Mode::Translate,
            return_mode: Mode::Translate,
            store,
            word_input: String::new(),
            result: None,
            english_input: String::new(),
            urdu_input: String::new(),
            add_field: AddField::English,
            batch_inputs: vec![String::new(); batch_slots.max(1)],
            batch_selection: 0,
            browse_scroll: 0,
            message: None,
            cue,
            clipboard,
        }
    }

    pub fn start(&mut self) {
        self.cue.play(Cue::Startup);
    }

    pub fn set_message(&mut self, message: String) {
        self.message = Some(message);
    }

    /// Shows `message` full-screen until the next key press.
    pub fn show_message(&mut self, message: String) {
        if self.mode != Mode::Message {
            self.return_mode = self.mode;
        }
        self.message = Some(message);
        self.mode = Mode::Message;
    }

    fn dismiss_message(&mut self) {
        self.message = None;
        self.mode = self.return_mode;
    }

    pub fn start_translate(&mut self) {
        self.message = None;
        self.mode = Mode::Translate;
    }

    pub fn start_add(&mut self) {
        self.cue.play(Cue::Add);
        self.english_input.clear();
        self.urdu_input.clear();
        self.add_field = AddField::English;
        self.message = None;
        self.mode = Mode::AddWord;
    }

    pub fn start_batch(&mut self) {
        self.cue.play(Cue::Batch);
        for input in &mut self.batch_inputs {
            input.clear();
        }
        self.batch_selection = 0;
        self.message = None;
        self.mode = Mode::Batch;
    }

    pub fn start_browse(&mut self) {
        self.browse_scroll = 0;
        self.message = None;
        self.mode = Mode::Browse;
    }

    pub fn translate(&mut self) {
        self.cue.play(Cue::Translate);
        let output = format_lookup(&self.word_input, self.store.lookup(&self.word_input));
        self.result = Some(output);
    }

    pub fn process_batch(&mut self) {
        self.cue.play(Cue::Process);
        let output = translate_batch(&self.store, &self.batch_inputs);
        self.show_message(output);
    }

    pub fn save_entry(&mut self) {
        match self.store.insert(&self.english_input, &self.urdu_input) {
            Ok(()) => {
                self.english_input.clear();
                self.urdu_input.clear();
                self.add_field = AddField::English;
                self.set_message("New translation added successfully!".to_string());
            }
            Err(err @ InsertError::Validation(_)) => {
                self.set_message(format!(
                    "Both English and Urdu translations are required ({err})"
                ));
            }
            Err(err) => {
                warn!(error = %err, "insert failed");
                self.set_message(format!("Could not save new translation: {err}"));
            }
        }
    }

    pub fn copy_result(&mut self) {
        let text = self.result.clone().unwrap_or_default();
        match self.clipboard.copy(&text) {
            Ok(()) => self.show_message("Translation copied to clipboard!".to_string()),
            Err(FeedbackError::Empty) => self.show_message("Nothing to copy yet".to_string()),
            Err(err) => {
                warn!(error = %err, "copy failed");
                self.show_message(format!("Copy failed: {err}"));
            }
        }
    }

    pub fn reload(&mut self) {
        match self.store.reload() {
            Ok(count) => {
                info!(count, "dictionary reloaded");
                self.show_message(format!("Reloaded {count} entries"));
            }
            Err(err) => self.show_message(format!("Reload failed: {err}")),
        }
    }

    fn toggle_add_field(&mut self) {
        self.add_field = match self.add_field {
            AddField::English => AddField::Urdu,
            AddField::Urdu => AddField::English,
        };
    }

    fn active_add_input_mut(&mut self) -> &mut String {
        match self.add_field {
            AddField::English => &mut self.english_input,
            AddField::Urdu => &mut self.urdu_input,
        }
    }

    fn batch_move(&mut self, delta: isize) {
        let max = self.batch_inputs.len().saturating_sub(1);
        self.batch_selection = self
            .batch_selection
            .saturating_add_signed(delta)
            .min(max);
    }

    fn selected_batch_input_mut(&mut self) -> Option<&mut String> {
        self.batch_inputs.get_mut(self.batch_selection)
    }

    /// Rows of the browse view: session additions first, then every entry.
    pub fn browse_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        let added = self.store.session_additions();
        if !added.is_empty() {
            lines.push(format!("Added this session ({})", added.len()));
            for entry in added {
                lines.push(format!("  {} -> {}", entry.english, entry.urdu));
            }
            lines.push(String::new());
        }
        lines.push(format!("All entries ({})", self.store.len()));
        for (english, urdu) in self.store.entries() {
            lines.push(format!("  {english} -> {urdu}"));
        }
        lines
    }

    fn browse_move(&mut self, delta: isize) {
        let max = self.browse_lines().len().saturating_sub(1);
        self.browse_scroll = self.browse_scroll.saturating_add_signed(delta).min(max);
    }
}

/// Returns `true` when the app should quit.
pub fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') => return true,
            KeyCode::Char('t') => {
                app.start_translate();
                return false;
            }
            KeyCode::Char('a') => {
                app.start_add();
                return false;
            }
            KeyCode::Char('b') => {
                app.start_batch();
                return false;
            }
            KeyCode::Char('l') => {
                app.start_browse();
                return false;
            }
            KeyCode::Char('y') => {
                app.copy_result();
                return false;
            }
            KeyCode::Char('r') => {
                app.reload();
                return false;
            }
            _ => {}
        }
    }

    match app.mode {
        Mode::Translate => handle_translate_key(app, key),
        Mode::Batch => handle_batch_key(app, key),
        Mode::AddWord => handle_add_key(app, key),
        Mode::Browse => handle_browse_key(app, key),
        Mode::Message => {
            app.dismiss_message();
            false
        }
    }
}

fn handle_translate_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Enter => app.translate(),
        KeyCode::Esc => {
            app.word_input.clear();
            app.result = None;
        }
        KeyCode::Backspace => {
            app.word_input.pop();
        }
        KeyCode::Char(ch) => app.word_input.push(ch),
        _ => {}
    }
    false
}

fn handle_batch_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc => app.start_translate(),
        KeyCode::Enter => app.process_batch(),
        KeyCode::Up | KeyCode::BackTab => app.batch_move(-1),
        KeyCode::Down | KeyCode::Tab => app.batch_move(1),
        KeyCode::Backspace => {
            if let Some(input) = app.selected_batch_input_mut() {
                input.pop();
            }
        }
        KeyCode::Char(ch) => {
            if let Some(input) = app.selected_batch_input_mut() {
                input.push(ch);
            }
        }
        _ => {}
    }
    false
}

fn handle_add_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc => app.start_translate(),
        KeyCode::Tab | KeyCode::BackTab => app.toggle_add_field(),
        KeyCode::Enter => app.save_entry(),
        KeyCode::Backspace => {
            app.active_add_input_mut().pop();
        }
        KeyCode::Char(ch) => app.active_add_input_mut().push(ch),
        _ => {}
    }
    false
}

fn handle_browse_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.start_translate(),
        KeyCode::Up | KeyCode::Char('k') => app.browse_move(-1),
        KeyCode::Down | KeyCode::Char('j') => app.browse_move(1),
        KeyCode::PageUp => app.browse_move(-10),
        KeyCode::PageDown => app.browse_move(10),
        _ => {}
    }
    false
}
