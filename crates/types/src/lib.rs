//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the game.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (engine, terminal rendering, leaderboard submission).
//!
//! # Board Dimensions
//!
//! - **Width**: 10 columns (indexed 0-9, left to right)
//! - **Height**: 20 rows (indexed 0-19, row 0 is the top / spawn side)
//!
//! # Game Timing Constants
//!
//! Timing values are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `FRAME_MS` | 16 | Nominal frame delta used by the terminal loop |
//! | `BASE_DROP_MS` | 1000 | Gravity interval at level 1 |
//! | `DROP_INTERVAL_STEP_MS` | 50 | Interval reduction per level |
//! | `DROP_INTERVAL_MIN_MS` | 100 | Gravity interval floor |
//! | `LINE_CLEAR_FLASH_MS` | 80 | Duration of one flash cycle |
//! | `LINE_CLEAR_FLASH_CYCLES` | 4 | Flash cycles before cleared rows disappear |
//!
//! # Examples
//!
//! ```
//! use classic_tetris_types::{GameCommand, PieceKind, Rotation, BOARD_HEIGHT, BOARD_WIDTH};
//!
//! let piece = PieceKind::from_str("t").unwrap();
//! assert_eq!(piece, PieceKind::T);
//! assert_eq!(piece.color().to_hex(), "#a000f0");
//!
//! assert_eq!(Rotation::North.rotate_cw(), Rotation::East);
//!
//! assert_eq!(GameCommand::from_str("hardDrop"), Some(GameCommand::HardDrop));
//!
//! assert_eq!(BOARD_WIDTH, 10);
//! assert_eq!(BOARD_HEIGHT, 20);
//! ```

/// Board width in cells (COLS)
pub const BOARD_WIDTH: u8 = 10;

/// Board height in cells (ROWS)
pub const BOARD_HEIGHT: u8 = 20;

/// Lines needed to advance one level
pub const LINES_PER_LEVEL: u32 = 10;

/// Level at the start of every game
pub const START_LEVEL: u32 = 1;

/// Nominal frame delta for the terminal loop (16ms ≈ 60 FPS)
pub const FRAME_MS: u32 = 16;

/// Gravity interval at level 1 (1000ms = 1 second per row)
pub const BASE_DROP_MS: u32 = 1000;

/// Gravity interval reduction per level above 1
pub const DROP_INTERVAL_STEP_MS: u32 = 50;

/// Gravity interval floor
pub const DROP_INTERVAL_MIN_MS: u32 = 100;

/// Points per row travelled by a hard drop
pub const HARD_DROP_POINTS_PER_ROW: u32 = 2;

/// Line clear scoring table, indexed by rows cleared at once.
///
/// Points are multiplied by the current level.
pub const LINE_SCORES: [u32; 5] = [0, 100, 300, 500, 800];

/// Duration of one line-clear flash cycle
pub const LINE_CLEAR_FLASH_MS: u32 = 80;

/// Number of flash cycles before cleared rows disappear from view
pub const LINE_CLEAR_FLASH_CYCLES: u32 = 4;

/// Default number of leaderboard rows to fetch
pub const LEADERBOARD_TOP_N: usize = 10;

/// Maximum length of a player name on the leaderboard
pub const PLAYER_NAME_MAX_CHARS: usize = 20;


/// Opaque color token stored in board cells.
///
/// A 24-bit RGB value; rendered as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a `#rrggbb` string.
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#')?;
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// First line-clear flash color
pub const FLASH_COLOR_A: Color = Color::new(0xff, 0xff, 0xff);

/// Second line-clear flash color
pub const FLASH_COLOR_B: Color = Color::new(0xff, 0xff, 0x00);

/// The seven tetromino piece kinds
///
/// Each piece has a distinct shape and a fixed color:
/// - **I**: Cyan, horizontal bar
/// - **O**: Yellow, 2x2 square
/// - **T**: Purple, T-shaped
/// - **S**: Green, S-shaped
/// - **Z**: Red, Z-shaped (mirror of S)
/// - **J**: Blue, J-shaped
/// - **L**: Orange, L-shaped (mirror of J)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    /// All kinds in table order.
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Parse piece kind from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use classic_tetris_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_str("i"), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_str("O"), Some(PieceKind::O));
    /// assert_eq!(PieceKind::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "i" => Some(PieceKind::I),
            "o" => Some(PieceKind::O),
            "t" => Some(PieceKind::T),
            "s" => Some(PieceKind::S),
            "z" => Some(PieceKind::Z),
            "j" => Some(PieceKind::J),
            "l" => Some(PieceKind::L),
            _ => None,
        }
    }

    /// Uppercase letter used in the UI
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "I",
            PieceKind::O => "O",
            PieceKind::T => "T",
            PieceKind::S => "S",
            PieceKind::Z => "Z",
            PieceKind::J => "J",
            PieceKind::L => "L",
        }
    }

    /// Fixed color of this kind
    pub fn color(&self) -> Color {
        match self {
            PieceKind::I => Color::new(0x00, 0xf0, 0xf0),
            PieceKind::O => Color::new(0xf0, 0xf0, 0x00),
            PieceKind::T => Color::new(0xa0, 0x00, 0xf0),
            PieceKind::S => Color::new(0x00, 0xf0, 0x00),
            PieceKind::Z => Color::new(0xf0, 0x00, 0x00),
            PieceKind::J => Color::new(0x00, 0x00, 0xf0),
            PieceKind::L => Color::new(0xf0, 0xa0, 0x00),
        }
    }
}

/// Rotation state of a piece
///
/// - **North**: Spawn orientation
/// - **East**: Rotated 90° clockwise
/// - **South**: Rotated 180°
/// - **West**: Rotated 270° clockwise
///
/// Pieces only rotate clockwise: North → East → South → West → North
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    #[default]
    North,
    East,
    South,
    West,
}

impl Rotation {
    /// Rotate clockwise (90°)
    ///
    /// # Examples
    ///
    /// ```
    /// use classic_tetris_types::Rotation;
    ///
    /// assert_eq!(Rotation::North.rotate_cw(), Rotation::East);
    /// assert_eq!(Rotation::West.rotate_cw(), Rotation::North);
    /// ```
    pub fn rotate_cw(&self) -> Self {
        match self {
            Rotation::North => Rotation::East,
            Rotation::East => Rotation::South,
            Rotation::South => Rotation::West,
            Rotation::West => Rotation::North,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rotation::North => "north",
            Rotation::East => "east",
            Rotation::South => "south",
            Rotation::West => "west",
        }
    }
}

/// Discrete commands delivered by the input source
///
/// Only `StartGame` and `TogglePause` are honoured outside the running state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameCommand {
    /// Move piece one cell left
    MoveLeft,
    /// Move piece one cell right
    MoveRight,
    /// Rotate piece 90° clockwise (no wall kicks)
    Rotate,
    /// Drop piece to the lowest valid position and lock it
    HardDrop,
    /// Pause or resume
    TogglePause,
    /// Start a new game (restarts when a game is in progress)
    StartGame,
}

impl GameCommand {
    /// Parse a command from its camelCase name (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use classic_tetris_types::GameCommand;
    ///
    /// assert_eq!(GameCommand::from_str("moveLeft"), Some(GameCommand::MoveLeft));
    /// assert_eq!(GameCommand::from_str("togglepause"), Some(GameCommand::TogglePause));
    /// assert_eq!(GameCommand::from_str("hold"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "moveleft" => Some(GameCommand::MoveLeft),
            "moveright" => Some(GameCommand::MoveRight),
            "rotate" => Some(GameCommand::Rotate),
            "harddrop" => Some(GameCommand::HardDrop),
            "togglepause" => Some(GameCommand::TogglePause),
            "startgame" => Some(GameCommand::StartGame),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameCommand::MoveLeft => "moveLeft",
            GameCommand::MoveRight => "moveRight",
            GameCommand::Rotate => "rotate",
            GameCommand::HardDrop => "hardDrop",
            GameCommand::TogglePause => "togglePause",
            GameCommand::StartGame => "startGame",
        }
    }
}

/// Engine lifecycle
///
/// `NotStarted → Running ⇄ Paused`, `Running → GameOver`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GamePhase {
    #[default]
    NotStarted,
    Running,
    Paused,
    GameOver,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::NotStarted => "notStarted",
            GamePhase::Running => "running",
            GamePhase::Paused => "paused",
            GamePhase::GameOver => "gameOver",
        }
    }
}

/// A cell on the game board
///
/// - `None`: Empty cell
/// - `Some(Color)`: Cell filled by a locked piece of that color
pub type Cell = Option<Color>;
