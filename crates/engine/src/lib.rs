//! Game engine: lifecycle state machine, piece commands and the fixed-step loop.
//!
//! [`Engine`] is the only owner of mutable game state. The host feeds it commands
//! through [`Engine::apply`] and frame deltas through [`Engine::advance`], and reads
//! it back via [`Engine::snapshot_into`] and [`Engine::take_last_event`].

pub use classic_tetris_core as core;
pub use classic_tetris_types as types;

pub mod engine;
pub mod flash;

pub use engine::{ClearOutcome, Engine, GameSummary, LockEvent};
pub use flash::LineClearFlash;
