//! Core game logic module - pure, deterministic, and testable
//!
//! This module contains the game rules that do not depend on time: the board,
//! tetromino shapes, random piece generation, collision and scoring.
//! It has **zero dependencies** on UI, networking, or I/O, making it:
//!
//! - **Deterministic**: Same seed produces identical piece sequences
//! - **Testable**: Unit tests for every rule
//! - **Portable**: Can run in any environment (terminal, GUI, headless)
//!
//! # Module Structure
//!
//! - [`board`]: 10x20 grid of colors with full-row detection and row removal
//! - [`pieces`]: Shape matrices, clockwise rotation, and the [`Piece`] instance
//! - [`collision`]: The [`collides`] predicate every move and rotation is validated with
//! - [`rng`]: Uniform random [`PieceFactory`] over a seedable LCG
//! - [`scoring`]: Line-clear table, hard-drop bonus, level curve and gravity intervals
//! - [`snapshot`]: Read-only frame data for renderers
//!
//! # Game Rules
//!
//! - **Uniform randomizer**: every kind is equally likely on every draw
//! - **Naive rotation**: clockwise matrix rotation, rejected on collision (no wall kicks)
//! - **Scoring**: 100/300/500/800 per 1/2/3/4 lines, times level; 2 points per hard-drop row
//! - **Levels**: one level per 10 lines, starting at 1
//!
//! # Example
//!
//! ```
//! use classic_tetris_core::{collides, Board, Piece};
//! use classic_tetris_types::PieceKind;
//!
//! let board = Board::new();
//! let piece = Piece::new(PieceKind::O);
//! assert!(!collides(&piece, &board));
//! assert!(collides(&piece.shifted(0, 19), &board));
//! ```

pub mod board;
pub mod collision;
pub mod pieces;
pub mod rng;
pub mod scoring;
pub mod snapshot;

pub use classic_tetris_types as types;

// Re-export commonly used types for convenience
pub use board::{Board, RowList};
pub use collision::collides;
pub use pieces::{get_shape, Piece, Shape};
pub use rng::{clock_seed, PieceFactory, SimpleRng};
pub use scoring::{
    calculate_hard_drop_score, calculate_level, calculate_line_score, get_drop_interval_ms,
};
pub use snapshot::{ActiveSnapshot, GameSnapshot};
