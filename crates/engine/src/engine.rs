//! Engine module - owns the complete game state
//!
//! Ties together the board, the current and next pieces, the piece factory and the
//! score/level/lines counters. Handles piece commands, locking, line clears, the
//! lifecycle state machine and the fixed-step gravity loop.

use log::{debug, info};

use crate::core::{
    calculate_hard_drop_score, calculate_level, calculate_line_score, collides,
    get_drop_interval_ms, Board, GameSnapshot, Piece, PieceFactory, RowList,
};
use crate::flash::LineClearFlash;
use crate::types::{GameCommand, GamePhase, START_LEVEL};

/// Result of a line-clear pass
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClearOutcome {
    /// Cleared row indices, bottom to top
    pub rows: RowList,
    /// Points awarded for the clear
    pub points: u32,
    pub level_up: bool,
}

impl ClearOutcome {
    pub fn lines_cleared(&self) -> u32 {
        self.rows.len() as u32
    }
}

/// Event recorded after a piece locks (consumed by observers)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockEvent {
    /// Rows travelled by a hard drop (0 for gravity locks)
    pub drop_distance: u32,
    pub drop_bonus: u32,
    pub lines_cleared: u32,
    pub line_clear_score: u32,
    pub level: u32,
    pub level_up: bool,
    /// The replacement piece could not spawn
    pub game_over: bool,
}

/// Final counters of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSummary {
    pub score: u32,
    pub level: u32,
    pub lines: u32,
}

/// The game engine
#[derive(Debug, Clone)]
pub struct Engine {
    board: Board,
    current: Option<Piece>,
    next: Option<Piece>,
    factory: PieceFactory,
    phase: GamePhase,
    score: u32,
    lines: u32,
    level: u32,
    drop_interval_ms: u32,
    drop_accumulator_ms: u32,
    flash: Option<LineClearFlash>,
    /// Last lock event (consumed by observers).
    last_event: Option<LockEvent>,
    /// Number of games started on this engine.
    games_started: u32,
}

impl Engine {
    /// Create an engine whose pieces come from the given RNG seed
    pub fn new(seed: u32) -> Self {
        Self::with_factory(PieceFactory::new(seed))
    }

    pub fn with_factory(factory: PieceFactory) -> Self {
        Self {
            board: Board::new(),
            current: None,
            next: None,
            factory,
            phase: GamePhase::NotStarted,
            score: 0,
            lines: 0,
            level: START_LEVEL,
            drop_interval_ms: get_drop_interval_ms(START_LEVEL),
            drop_accumulator_ms: 0,
            flash: None,
            last_event: None,
            games_started: 0,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    pub fn paused(&self) -> bool {
        self.phase == GamePhase::Paused
    }

    pub fn game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn drop_interval_ms(&self) -> u32 {
        self.drop_interval_ms
    }

    pub fn drop_accumulator_ms(&self) -> u32 {
        self.drop_accumulator_ms
    }

    pub fn games_started(&self) -> u32 {
        self.games_started
    }

    pub fn current(&self) -> Option<Piece> {
        self.current
    }

    pub fn next(&self) -> Option<Piece> {
        self.next
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn flash(&self) -> Option<&LineClearFlash> {
        self.flash.as_ref()
    }

    pub fn summary(&self) -> GameSummary {
        GameSummary {
            score: self.score,
            level: self.level,
            lines: self.lines,
        }
    }

    /// Replace the settled board (puzzle setups, fixtures).
    pub fn load_board(&mut self, board: Board) {
        self.board = board;
    }

    /// Replace the falling piece without collision checks (puzzle setups, fixtures).
    pub fn set_current_piece(&mut self, piece: Piece) {
        self.current = Some(piece);
    }

    /// Replace the preview piece that the next spawn will use.
    pub fn set_next_piece(&mut self, piece: Piece) {
        self.next = Some(piece);
    }

    /// Take and clear the last lock event.
    pub fn take_last_event(&mut self) -> Option<LockEvent> {
        self.last_event.take()
    }

    /// Start (or restart) a game: reset board and counters, draw the next piece and
    /// spawn the first one.
    pub fn start(&mut self) {
        self.board.clear();
        self.current = None;
        self.score = 0;
        self.lines = 0;
        self.level = START_LEVEL;
        self.drop_interval_ms = get_drop_interval_ms(START_LEVEL);
        self.drop_accumulator_ms = 0;
        self.flash = None;
        self.last_event = None;
        self.games_started = self.games_started.wrapping_add(1);
        self.phase = GamePhase::Running;

        self.next = Some(self.factory.create_piece());
        self.spawn_piece();

        info!(
            "game {} started (seed state {})",
            self.games_started,
            self.factory.seed()
        );
    }

    /// Pause or resume. Ignored unless the game is running or paused.
    pub fn toggle_pause(&mut self) -> bool {
        self.phase = match self.phase {
            GamePhase::Running => GamePhase::Paused,
            GamePhase::Paused => GamePhase::Running,
            _ => return false,
        };
        debug!("pause toggled: {}", self.phase.as_str());
        true
    }

    /// Promote the next piece to current and draw a new next piece.
    ///
    /// A spawn that collides with the stack is still installed as the current piece,
    /// but ends the game. Returns false in that case.
    pub fn spawn_piece(&mut self) -> bool {
        let piece = match self.next.take() {
            Some(piece) => piece,
            None => self.factory.create_piece(),
        };
        self.next = Some(self.factory.create_piece());
        self.current = Some(piece);

        if collides(&piece, &self.board) {
            self.phase = GamePhase::GameOver;
            info!(
                "game over: score {} level {} lines {}",
                self.score, self.level, self.lines
            );
            return false;
        }
        true
    }

    /// Shift the current piece one column left (-1) or right (+1).
    ///
    /// Reverted silently when the new position collides.
    pub fn move_piece(&mut self, direction: i8) -> bool {
        if !self.is_running() {
            return false;
        }
        let Some(piece) = self.current else {
            return false;
        };

        let moved = piece.shifted(direction.signum(), 0);
        if direction == 0 || collides(&moved, &self.board) {
            return false;
        }
        self.current = Some(moved);
        true
    }

    /// Rotate the current piece 90° clockwise around its anchor.
    ///
    /// No wall kicks: a rotation that collides is rejected.
    pub fn rotate(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        let Some(piece) = self.current else {
            return false;
        };

        let rotated = piece.rotated();
        if collides(&rotated, &self.board) {
            return false;
        }
        self.current = Some(rotated);
        true
    }

    /// Gravity step: move the current piece down one row, or lock it when it cannot
    /// move. The drop accumulator is reset either way.
    ///
    /// Returns true when the piece moved.
    pub fn soft_drop(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        let Some(piece) = self.current else {
            return false;
        };

        let lowered = piece.shifted(0, 1);
        let moved = if collides(&lowered, &self.board) {
            self.settle(0);
            false
        } else {
            self.current = Some(lowered);
            true
        };
        self.drop_accumulator_ms = 0;
        moved
    }

    /// Drop the current piece to its lowest valid position, award 2 points per row
    /// travelled, then lock it.
    ///
    /// Returns the number of rows travelled.
    pub fn hard_drop(&mut self) -> u32 {
        if !self.is_running() {
            return 0;
        }
        let Some(mut piece) = self.current else {
            return 0;
        };

        let mut drop_distance: u32 = 0;
        while !collides(&piece.shifted(0, 1), &self.board) {
            piece = piece.shifted(0, 1);
            drop_distance += 1;
        }

        self.current = Some(piece);
        self.score = self
            .score
            .saturating_add(calculate_hard_drop_score(drop_distance));
        self.settle(drop_distance);
        self.drop_accumulator_ms = 0;
        drop_distance
    }

    /// Write the current piece's cells into the board.
    ///
    /// Sub-cells above the visible area are dropped. Returns the number of cells
    /// written.
    pub fn lock_piece(&mut self) -> usize {
        if !self.is_running() {
            return 0;
        }
        self.lock_current()
    }

    fn lock_current(&mut self) -> usize {
        let Some(piece) = self.current else {
            return 0;
        };

        let mut written = 0;
        for (x, y) in piece.cells() {
            if y >= 0 && self.board.set(x, y, Some(piece.color)) {
                written += 1;
            }
        }
        written
    }

    /// Remove full rows, award points, and advance the level.
    pub fn clear_lines(&mut self) -> ClearOutcome {
        if !self.is_running() {
            return ClearOutcome::default();
        }
        self.clear_full_rows()
    }

    fn clear_full_rows(&mut self) -> ClearOutcome {
        let rows = self.board.full_rows();
        if rows.is_empty() {
            return ClearOutcome::default();
        }

        let before = self.board;
        let cleared = rows.len();

        self.lines += cleared as u32;
        let points = calculate_line_score(cleared, self.level);
        self.score = self.score.saturating_add(points);

        let new_level = calculate_level(self.lines);
        let level_up = new_level > self.level;
        if level_up {
            self.level = new_level;
            self.drop_interval_ms = get_drop_interval_ms(new_level);
            info!(
                "level {} reached, drop interval {}ms",
                self.level, self.drop_interval_ms
            );
        }

        self.board.remove_rows(&rows);
        self.flash = Some(LineClearFlash::new(before, rows.clone()));

        ClearOutcome {
            rows,
            points,
            level_up,
        }
    }

    /// Lock, clear lines and spawn the replacement piece.
    ///
    /// A flash still running from an earlier clear ends here, so the snapshot
    /// never hides a freshly locked piece behind the pre-clear board.
    fn settle(&mut self, drop_distance: u32) {
        self.flash = None;
        self.lock_current();
        let outcome = self.clear_full_rows();
        let spawned = self.spawn_piece();

        let event = LockEvent {
            drop_distance,
            drop_bonus: calculate_hard_drop_score(drop_distance),
            lines_cleared: outcome.lines_cleared(),
            line_clear_score: outcome.points,
            level: self.level,
            level_up: outcome.level_up,
            game_over: !spawned,
        };
        debug!(
            "locked: dropped {} rows, cleared {} lines (+{}), score {}",
            event.drop_distance, event.lines_cleared, event.line_clear_score, self.score
        );
        self.last_event = Some(event);
    }

    /// Fixed-step loop body: advance timers by one frame delta.
    ///
    /// Gravity fires at most once per call; the accumulator restarts from zero rather
    /// than carrying the remainder, so long frames never trigger catch-up drops.
    /// Returns true when a gravity step ran.
    pub fn advance(&mut self, delta_ms: u32) -> bool {
        if let Some(flash) = self.flash.as_mut() {
            if !flash.advance(delta_ms) {
                self.flash = None;
            }
        }

        if !self.is_running() {
            return false;
        }

        self.drop_accumulator_ms = self.drop_accumulator_ms.saturating_add(delta_ms);
        if self.drop_accumulator_ms > self.drop_interval_ms {
            self.soft_drop();
            return true;
        }
        false
    }

    /// Apply an input command.
    ///
    /// Piece commands are ignored unless the game is running.
    pub fn apply(&mut self, command: GameCommand) -> bool {
        match command {
            GameCommand::MoveLeft => self.move_piece(-1),
            GameCommand::MoveRight => self.move_piece(1),
            GameCommand::Rotate => self.rotate(),
            GameCommand::HardDrop => {
                if !self.is_running() {
                    return false;
                }
                self.hard_drop();
                true
            }
            GameCommand::TogglePause => self.toggle_pause(),
            GameCommand::StartGame => {
                self.start();
                true
            }
        }
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        out.board = match &self.flash {
            Some(flash) => flash.display_board().to_grid(),
            None => self.board.to_grid(),
        };
        out.flashing_rows.clear();
        if let Some(flash) = &self.flash {
            out.flashing_rows.extend(flash.rows().iter().copied());
        }
        out.active = self.current.map(Into::into);
        out.next = self.next.map(Into::into);
        out.phase = self.phase;
        out.score = self.score;
        out.level = self.level;
        out.lines = self.lines;
        out.drop_interval_ms = self.drop_interval_ms;
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PieceKind, BOARD_HEIGHT, BOARD_WIDTH};

    fn running_with(kind: PieceKind) -> Engine {
        let mut engine = Engine::new(12345);
        engine.start();
        engine.set_current_piece(Piece::new(kind));
        engine
    }

    #[test]
    fn test_new_engine() {
        let engine = Engine::new(12345);

        assert_eq!(engine.phase, GamePhase::NotStarted);
        assert_eq!(engine.score, 0);
        assert_eq!(engine.level, 1);
        assert_eq!(engine.lines, 0);
        assert_eq!(engine.drop_interval_ms, 1000);
        assert!(engine.current.is_none());
        assert!(engine.next.is_none());
    }

    #[test]
    fn test_start_spawns_current_and_next() {
        let mut engine = Engine::new(12345);
        engine.start();

        assert_eq!(engine.phase, GamePhase::Running);
        assert!(engine.current.is_some());
        assert!(engine.next.is_some());
        assert_eq!(engine.games_started, 1);
    }

    #[test]
    fn test_spawn_promotes_next() {
        let mut engine = Engine::new(12345);
        engine.start();

        let next = engine.next.unwrap();
        assert!(engine.spawn_piece());
        assert_eq!(engine.current.unwrap(), next);
    }

    #[test]
    fn test_commands_ignored_before_start() {
        let mut engine = Engine::new(12345);
        assert!(!engine.apply(GameCommand::MoveLeft));
        assert!(!engine.apply(GameCommand::Rotate));
        assert!(!engine.apply(GameCommand::HardDrop));
        assert!(!engine.apply(GameCommand::TogglePause));
        assert_eq!(engine.phase, GamePhase::NotStarted);
    }

    #[test]
    fn test_move_reverts_at_wall() {
        let mut engine = running_with(PieceKind::O);
        let mut moved = 0;
        for _ in 0..10 {
            if engine.move_piece(-1) {
                moved += 1;
            }
        }
        assert_eq!(moved, 4);
        assert_eq!(engine.current.unwrap().x, 0);
    }

    #[test]
    fn test_rotate_rejected_without_kick() {
        let mut engine = running_with(PieceKind::I);
        // Vertical I in the last column cannot rotate back to horizontal.
        assert!(engine.rotate());
        while engine.move_piece(1) {}
        let before = engine.current.unwrap();
        assert_eq!(before.x, (BOARD_WIDTH - 1) as i8);
        assert!(!engine.rotate());
        assert_eq!(engine.current.unwrap(), before);
    }

    #[test]
    fn test_soft_drop_moves_and_resets_accumulator() {
        let mut engine = running_with(PieceKind::T);
        engine.drop_accumulator_ms = 700;
        assert!(engine.soft_drop());
        assert_eq!(engine.current.unwrap().y, 1);
        assert_eq!(engine.drop_accumulator_ms, 0);
    }

    #[test]
    fn test_soft_drop_locks_on_floor() {
        let mut engine = running_with(PieceKind::O);
        let next = engine.next.unwrap();
        engine.set_current_piece(Piece::new(PieceKind::O).shifted(0, 18));

        assert!(!engine.soft_drop());
        assert!(engine.board.is_occupied(4, 19));
        assert!(engine.board.is_occupied(5, 18));
        assert_eq!(engine.current.unwrap(), next);
        assert_eq!(engine.take_last_event().unwrap().drop_distance, 0);
    }

    #[test]
    fn test_hard_drop_o_piece_scores_36() {
        let mut engine = running_with(PieceKind::O);
        assert_eq!(engine.hard_drop(), 18);
        assert_eq!(engine.score, 36);
        for (x, y) in [(4, 18), (5, 18), (4, 19), (5, 19)] {
            assert_eq!(engine.board.get(x, y), Some(Some(PieceKind::O.color())));
        }
        let event = engine.take_last_event().unwrap();
        assert_eq!(event.drop_bonus, 36);
        assert!(!event.game_over);
    }

    #[test]
    fn test_lock_skips_cells_above_board() {
        let mut engine = running_with(PieceKind::I);
        engine.set_current_piece(Piece::new(PieceKind::I).rotated().shifted(0, -2));
        assert_eq!(engine.lock_piece(), 2);
        assert_eq!(engine.board.filled_count(), 2);
        assert!(engine.board.is_occupied(3, 0));
        assert!(engine.board.is_occupied(3, 1));
    }

    #[test]
    fn test_clear_lines_scores_by_level() {
        let mut engine = running_with(PieceKind::T);
        engine.level = 3;
        engine.load_board(Board::from_ascii(
            &["##########", "##########"],
            PieceKind::J.color(),
        ));

        let outcome = engine.clear_lines();
        assert_eq!(outcome.lines_cleared(), 2);
        assert_eq!(outcome.points, 900);
        assert_eq!(engine.score, 900);
        assert_eq!(engine.lines, 2);
        assert_eq!(engine.board.filled_count(), 0);
        assert!(engine.flash.is_some());
    }

    #[test]
    fn test_level_up_speeds_gravity() {
        let mut engine = running_with(PieceKind::T);
        engine.lines = 8;
        engine.load_board(Board::from_ascii(
            &["##########", "##########"],
            PieceKind::J.color(),
        ));

        let outcome = engine.clear_lines();
        assert!(outcome.level_up);
        assert_eq!(engine.level, 2);
        assert_eq!(engine.drop_interval_ms, 950);
        // Points use the level in effect before the clear.
        assert_eq!(outcome.points, 300);
    }

    #[test]
    fn test_spawn_collision_ends_game() {
        let mut engine = running_with(PieceKind::T);
        let mut blocked = Board::new();
        blocked.set(4, 0, Some(PieceKind::Z.color()));
        blocked.set(4, 1, Some(PieceKind::Z.color()));
        engine.load_board(blocked);
        engine.set_next_piece(Piece::new(PieceKind::O));

        let filled = engine.board.filled_count();
        assert!(!engine.spawn_piece());
        assert_eq!(engine.phase, GamePhase::GameOver);
        assert_eq!(engine.current.unwrap().kind, PieceKind::O);
        assert_eq!(engine.board.filled_count(), filled);

        // Terminal: piece commands and gravity are ignored.
        assert!(!engine.move_piece(1));
        assert!(!engine.advance(5000));
        assert!(!engine.toggle_pause());
    }

    #[test]
    fn test_pause_blocks_gravity_and_commands() {
        let mut engine = running_with(PieceKind::T);
        assert!(engine.toggle_pause());
        assert!(!engine.advance(5000));
        assert_eq!(engine.drop_accumulator_ms, 0);
        assert!(!engine.move_piece(1));
        assert!(engine.toggle_pause());
        assert!(engine.move_piece(1));
    }

    #[test]
    fn test_advance_single_drop_without_catch_up() {
        let mut engine = running_with(PieceKind::T);
        assert!(!engine.advance(1000));
        assert_eq!(engine.current.unwrap().y, 0);
        assert!(engine.advance(1));
        assert_eq!(engine.current.unwrap().y, 1);
        assert_eq!(engine.drop_accumulator_ms, 0);

        // A huge frame still drops just one row.
        assert!(engine.advance(10_000));
        assert_eq!(engine.current.unwrap().y, 2);
    }

    #[test]
    fn test_restart_resets_everything() {
        let mut engine = running_with(PieceKind::O);
        engine.hard_drop();
        assert!(engine.score > 0);

        engine.apply(GameCommand::StartGame);
        assert_eq!(engine.score, 0);
        assert_eq!(engine.lines, 0);
        assert_eq!(engine.level, 1);
        assert_eq!(engine.board.filled_count(), 0);
        assert_eq!(engine.games_started, 2);
        assert!(engine.flash.is_none());
    }

    #[test]
    fn test_snapshot_shows_flash_rows() {
        let mut engine = running_with(PieceKind::T);
        engine.load_board(Board::from_ascii(&["##########"], PieceKind::L.color()));
        engine.clear_lines();

        let snap = engine.snapshot();
        assert_eq!(snap.flashing_rows.as_slice(), &[(BOARD_HEIGHT - 1) as usize]);
        assert!(snap.board[19].iter().all(|c| c.is_some()));

        engine.advance(400);
        let snap = engine.snapshot();
        assert!(snap.flashing_rows.is_empty());
        assert!(snap.board[19].iter().all(|c| c.is_none()));
    }
}
