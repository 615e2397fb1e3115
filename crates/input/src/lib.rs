//! Terminal input module (engine-facing).
//!
//! This module is intentionally independent of any UI framework. It maps
//! `crossterm` key events into [`crate::types::GameCommand`], buffers them per
//! frame in a [`CommandQueue`], and provides the [`NameEntry`] editor used by the
//! score submission prompt.

pub mod map;
pub mod prompt;
pub mod queue;

pub use classic_tetris_types as types;

pub use map::{handle_key_event, should_quit};
pub use prompt::{NameEntry, NameEntryAction};
pub use queue::CommandQueue;
