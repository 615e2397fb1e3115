//! Collision checker.

use crate::board::Board;
use crate::pieces::Piece;
use crate::types::{BOARD_HEIGHT, BOARD_WIDTH};

/// Test a piece's occupied sub-cells against board bounds and locked cells.
///
/// Side walls and the floor collide. Sub-cells above the board (`y < 0`) never
/// collide with board contents, so pieces may sit partly above the visible area.
pub fn collides(piece: &Piece, board: &Board) -> bool {
    piece.cells().any(|(x, y)| {
        if x < 0 || x >= BOARD_WIDTH as i8 || y >= BOARD_HEIGHT as i8 {
            return true;
        }
        y >= 0 && board.is_occupied(x, y)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PieceKind;

    #[test]
    fn test_spawned_piece_fits_empty_board() {
        let board = Board::new();
        for kind in PieceKind::ALL {
            assert!(!collides(&Piece::new(kind), &board), "{:?}", kind);
        }
    }

    #[test]
    fn test_walls_and_floor() {
        let board = Board::new();
        let piece = Piece::new(PieceKind::O);
        assert!(collides(&piece.shifted(-5, 0), &board));
        assert!(collides(&piece.shifted(5, 0), &board));
        assert!(!collides(&piece.shifted(0, 18), &board));
        assert!(collides(&piece.shifted(0, 19), &board));
    }

    #[test]
    fn test_above_board_ignores_contents() {
        let mut board = Board::new();
        board.set(4, 0, Some(PieceKind::Z.color()));
        let piece = Piece::new(PieceKind::O).shifted(0, -2);
        assert!(!collides(&piece, &board));
        assert!(collides(&piece.shifted(0, 1), &board));
    }
}
