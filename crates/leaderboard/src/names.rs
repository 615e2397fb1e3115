//! Player name validation and display escaping.

use std::fmt;

use crate::types::PLAYER_NAME_MAX_CHARS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameError {
    /// Empty or whitespace only
    Empty,
    TooLong { max: usize },
}

impl fmt::Display for NameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameError::Empty => write!(f, "please enter a name"),
            NameError::TooLong { max } => write!(f, "name is longer than {max} characters"),
        }
    }
}

impl std::error::Error for NameError {}

/// Trim and check a player name before it is sent to any store.
pub fn validate_player_name(raw: &str) -> Result<String, NameError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(NameError::Empty);
    }
    if name.chars().count() > PLAYER_NAME_MAX_CHARS {
        return Err(NameError::TooLong {
            max: PLAYER_NAME_MAX_CHARS,
        });
    }
    Ok(name.to_string())
}

/// Make a stored name safe to show.
///
/// Markup characters become entities and control or bidi-override characters
/// (which could carry terminal escape sequences) become `?`.
pub fn escape_display_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c if c.is_control() || is_bidi_control(c) => out.push('?'),
            c => out.push(c),
        }
    }
    out
}

/// Replace control and bidi-override characters with `?`, leaving everything
/// else as is. For text from a store (error bodies) that is not a name.
pub fn scrub_control_chars(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_control() || is_bidi_control(c) {
                '?'
            } else {
                c
            }
        })
        .collect()
}

fn is_bidi_control(c: char) -> bool {
    matches!(c, '\u{200e}' | '\u{200f}' | '\u{202a}'..='\u{202e}' | '\u{2066}'..='\u{2069}')
}
