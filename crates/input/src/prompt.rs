//! Single-line name editor for the score submission prompt.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::types::PLAYER_NAME_MAX_CHARS;

/// What a key did to the name entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameEntryAction {
    /// Text changed (or a rejected edit at the limit)
    Edited,
    /// Enter: submit the current text
    Submit,
    /// Esc: close without submitting
    Skip,
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameEntry {
    text: String,
    max_chars: usize,
}

impl NameEntry {
    pub fn new() -> Self {
        Self::with_limit(PLAYER_NAME_MAX_CHARS)
    }

    pub fn with_limit(max_chars: usize) -> Self {
        Self {
            text: String::new(),
            max_chars,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Append a printable character. Returns false at the limit or for control chars.
    pub fn push(&mut self, ch: char) -> bool {
        if ch.is_control() || self.char_count() >= self.max_chars {
            return false;
        }
        self.text.push(ch);
        true
    }

    pub fn backspace(&mut self) -> bool {
        self.text.pop().is_some()
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> NameEntryAction {
        if key.kind == KeyEventKind::Release {
            return NameEntryAction::Ignored;
        }
        match key.code {
            KeyCode::Enter => NameEntryAction::Submit,
            KeyCode::Esc => NameEntryAction::Skip,
            KeyCode::Backspace => {
                self.backspace();
                NameEntryAction::Edited
            }
            KeyCode::Char(ch)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.push(ch);
                NameEntryAction::Edited
            }
            _ => NameEntryAction::Ignored,
        }
    }
}

impl Default for NameEntry {
    fn default() -> Self {
        Self::new()
    }
}
