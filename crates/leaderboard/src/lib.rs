//! Leaderboard client: score stores and the worker that talks to them.
//!
//! The game loop never awaits anything. It owns a [`Leaderboard`] handle, queues
//! submissions and refreshes, and polls [`LeaderboardEvent`]s once per frame.
//! Failures arrive as events carrying a message; they never touch game state.
//!
//! Stores implement [`ScoreStore`]:
//! - [`RestStore`]: PostgREST/Supabase `rest/v1` over HTTPS (rustls) or HTTP
//! - [`FileStore`]: JSON file
//! - [`MemoryStore`]: in-process

pub mod client;
pub mod config;
pub mod entry;
pub mod file;
pub mod memory;
pub mod names;
pub mod rest;
pub mod store;

pub use classic_tetris_types as types;

pub use client::{Leaderboard, LeaderboardEvent, LeaderboardStatus};
pub use config::{LeaderboardConfig, StoreConfig};
pub use entry::{sort_by_score, top_n, ScoreEntry};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use names::{escape_display_name, scrub_control_chars, validate_player_name, NameError};
pub use rest::RestStore;
pub use store::ScoreStore;
