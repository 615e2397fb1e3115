//! Terminal "game renderer" module.
//!
//! This is a small, game-oriented rendering layer for terminal gameplay.
//! It intentionally avoids widget/layout libraries and instead renders into a
//! simple framebuffer that can be flushed to a terminal backend.
//!
//! - [`canvas`]: the `fill_cell` / `stroke_grid` draw-call sink and [`paint_playfield`]
//! - [`game_view`]: playfield, next preview, counters, overlays, submission modal
//!   and leaderboard panel
//! - [`renderer`]: diffing flush to the terminal
//!
//! Board cells are drawn 2 columns wide to compensate for glyph aspect ratio.

pub mod canvas;
pub mod fb;
pub mod game_view;
pub mod renderer;

pub use classic_tetris_core as core;
pub use classic_tetris_types as types;

pub use canvas::{paint_playfield, BoardCanvas, Canvas, DrawCall, RecordingCanvas, GRID_COLOR};
pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{
    AnchorY, GameView, HudView, LeaderboardView, ScoreRow, SubmitPromptView, Viewport,
};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
