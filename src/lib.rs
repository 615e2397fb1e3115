//! Classic falling-block puzzle (workspace facade crate).
//!
//! The game rules live in dedicated crates under `crates/`; this package re-exports
//! them as `classic_tetris::{types,core,engine,input,term,leaderboard}` and adds the
//! application layer shared by the binary and the integration tests.

pub use classic_tetris_core as core;
pub use classic_tetris_engine as engine;
pub use classic_tetris_input as input;
pub use classic_tetris_leaderboard as leaderboard;
pub use classic_tetris_term as term;
pub use classic_tetris_types as types;

pub mod app;
pub mod config;
pub mod logging;
