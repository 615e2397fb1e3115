use crate::board::RowList;
use crate::pieces::{Piece, Shape};
use crate::types::{Cell, Color, GamePhase, PieceKind, Rotation, BOARD_HEIGHT, BOARD_WIDTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActiveSnapshot {
    pub kind: PieceKind,
    pub shape: Shape,
    pub color: Color,
    pub rotation: Rotation,
    pub x: i8,
    pub y: i8,
}

impl ActiveSnapshot {
    /// Absolute (x, y) of each occupied sub-cell
    pub fn cells(&self) -> impl Iterator<Item = (i8, i8)> + '_ {
        self.shape.minos().map(move |(dx, dy)| (self.x + dx, self.y + dy))
    }
}

impl From<Piece> for ActiveSnapshot {
    fn from(value: Piece) -> Self {
        Self {
            kind: value.kind,
            shape: value.shape,
            color: value.color,
            rotation: value.rotation,
            x: value.x,
            y: value.y,
        }
    }
}

/// Read-only copy of everything the renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GameSnapshot {
    /// Board as it should be displayed (pre-clear rows while a flash is running)
    pub board: [[Cell; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize],
    pub active: Option<ActiveSnapshot>,
    pub next: Option<ActiveSnapshot>,
    /// Rows currently flashing before they disappear from view
    pub flashing_rows: RowList,
    pub phase: GamePhase,
    pub score: u32,
    pub level: u32,
    pub lines: u32,
    pub drop_interval_ms: u32,
}

impl GameSnapshot {
    pub fn clear(&mut self) {
        self.board = [[None; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize];
        self.active = None;
        self.next = None;
        self.flashing_rows.clear();
        self.phase = GamePhase::NotStarted;
        self.score = 0;
        self.level = 1;
        self.lines = 0;
        self.drop_interval_ms = 0;
    }

    pub fn playable(&self) -> bool {
        self.phase == GamePhase::Running
    }
}

impl Default for GameSnapshot {
    fn default() -> Self {
        let mut s = Self {
            board: [[None; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize],
            active: None,
            next: None,
            flashing_rows: RowList::new(),
            phase: GamePhase::NotStarted,
            score: 0,
            level: 1,
            lines: 0,
            drop_interval_ms: 0,
        };
        s.clear();
        s
    }
}
