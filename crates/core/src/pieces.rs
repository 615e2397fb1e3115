//! Pieces module - tetromino shape matrices and naive rotation
//!
//! A shape is a small binary matrix (at most 4x4) of occupied sub-cells, measured
//! from the piece anchor. Rotation is a plain clockwise matrix rotation: there is
//! no wall-kick table, so a rotated shape that collides is simply rejected.

use crate::types::{Color, PieceKind, Rotation, BOARD_WIDTH};

/// Largest extent of any tetromino matrix
pub const MAX_SHAPE_DIM: usize = 4;

/// Offset of a single mino relative to the piece anchor, as (dx, dy)
pub type MinoOffset = (i8, i8);

/// Binary shape matrix, row-major with row 0 on top.
///
/// Only the `height` x `width` top-left region is meaningful; everything outside
/// it is always `false`, so structural equality matches matrix equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    width: u8,
    height: u8,
    bits: [[bool; MAX_SHAPE_DIM]; MAX_SHAPE_DIM],
}

impl Shape {
    /// Build a shape from rows of 0/1 values.
    ///
    /// Rows beyond 4 and columns beyond 4 are ignored; the width is taken from the
    /// longest row.
    pub fn from_rows(rows: &[&[u8]]) -> Self {
        let mut bits = [[false; MAX_SHAPE_DIM]; MAX_SHAPE_DIM];
        let height = rows.len().min(MAX_SHAPE_DIM);
        let mut width = 0;
        for (y, row) in rows.iter().take(MAX_SHAPE_DIM).enumerate() {
            width = width.max(row.len().min(MAX_SHAPE_DIM));
            for (x, &v) in row.iter().take(MAX_SHAPE_DIM).enumerate() {
                bits[y][x] = v != 0;
            }
        }
        Self {
            width: width as u8,
            height: height as u8,
            bits,
        }
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    /// Whether sub-cell (x, y) is occupied
    pub fn is_filled(&self, x: usize, y: usize) -> bool {
        x < self.width as usize && y < self.height as usize && self.bits[y][x]
    }

    /// Occupied sub-cells in row-major order
    pub fn minos(&self) -> impl Iterator<Item = MinoOffset> + '_ {
        (0..self.height as usize).flat_map(move |y| {
            (0..self.width as usize)
                .filter(move |&x| self.bits[y][x])
                .map(move |x| (x as i8, y as i8))
        })
    }

    /// 90° clockwise rotation: `new[i][j] = old[h - 1 - j][i]`
    pub fn rotated_cw(&self) -> Self {
        let h = self.height as usize;
        let w = self.width as usize;
        let mut bits = [[false; MAX_SHAPE_DIM]; MAX_SHAPE_DIM];
        for (i, row) in bits.iter_mut().enumerate().take(w) {
            for (j, bit) in row.iter_mut().enumerate().take(h) {
                *bit = self.bits[h - 1 - j][i];
            }
        }
        Self {
            width: self.height,
            height: self.width,
            bits,
        }
    }

    /// Rows rendered as 0/1 vectors (for debugging and tests)
    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        (0..self.height as usize)
            .map(|y| {
                (0..self.width as usize)
                    .map(|x| u8::from(self.bits[y][x]))
                    .collect()
            })
            .collect()
    }
}

/// Get the canonical spawn shape for a piece kind
pub fn get_shape(kind: PieceKind) -> Shape {
    match kind {
        PieceKind::I => Shape::from_rows(&[&[1, 1, 1, 1]]),
        PieceKind::O => Shape::from_rows(&[&[1, 1], &[1, 1]]),
        PieceKind::T => Shape::from_rows(&[&[0, 1, 0], &[1, 1, 1]]),
        PieceKind::S => Shape::from_rows(&[&[0, 1, 1], &[1, 1, 0]]),
        PieceKind::Z => Shape::from_rows(&[&[1, 1, 0], &[0, 1, 1]]),
        PieceKind::J => Shape::from_rows(&[&[1, 0, 0], &[1, 1, 1]]),
        PieceKind::L => Shape::from_rows(&[&[0, 0, 1], &[1, 1, 1]]),
    }
}

/// Spawn column for a shape: horizontally centered
pub fn spawn_x(shape: &Shape) -> i8 {
    (BOARD_WIDTH / 2) as i8 - (shape.width() / 2) as i8
}

/// A tetromino instance: shape matrix, anchor, color and rotation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub shape: Shape,
    pub color: Color,
    pub rotation: Rotation,
    pub x: i8,
    pub y: i8,
}

impl Piece {
    /// Create a piece of `kind` at its spawn anchor (centered, row 0)
    pub fn new(kind: PieceKind) -> Self {
        let shape = get_shape(kind);
        Self {
            kind,
            shape,
            color: kind.color(),
            rotation: Rotation::North,
            x: spawn_x(&shape),
            y: 0,
        }
    }

    /// Copy of this piece shifted by (dx, dy)
    pub fn shifted(&self, dx: i8, dy: i8) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Copy of this piece rotated 90° clockwise around the same anchor
    pub fn rotated(&self) -> Self {
        Self {
            shape: self.shape.rotated_cw(),
            rotation: self.rotation.rotate_cw(),
            ..*self
        }
    }

    /// Absolute board coordinates of occupied sub-cells, as (x, y)
    pub fn cells(&self) -> impl Iterator<Item = (i8, i8)> + '_ {
        self.shape.minos().map(move |(dx, dy)| (self.x + dx, self.y + dy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_shape_has_four_minos() {
        for kind in PieceKind::ALL {
            assert_eq!(get_shape(kind).minos().count(), 4, "{:?}", kind);
        }
    }

    #[test]
    fn test_rotate_t_clockwise() {
        let t = get_shape(PieceKind::T);
        let r = t.rotated_cw();
        assert_eq!(r.to_rows(), vec![vec![1, 0], vec![1, 1], vec![1, 0]]);
        assert_eq!(r.width(), 2);
        assert_eq!(r.height(), 3);
    }

    #[test]
    fn test_rotate_i_becomes_vertical() {
        let r = get_shape(PieceKind::I).rotated_cw();
        assert_eq!(r.width(), 1);
        assert_eq!(r.height(), 4);
        assert_eq!(r.minos().collect::<Vec<_>>(), vec![(0, 0), (0, 1), (0, 2), (0, 3)]);
    }

    #[test]
    fn test_spawn_anchor_centered() {
        assert_eq!(Piece::new(PieceKind::I).x, 3);
        assert_eq!(Piece::new(PieceKind::O).x, 4);
        assert_eq!(Piece::new(PieceKind::T).x, 4);
        assert_eq!(Piece::new(PieceKind::T).y, 0);
    }

    #[test]
    fn test_piece_rotation_state_advances() {
        let p = Piece::new(PieceKind::L).rotated().rotated();
        assert_eq!(p.rotation, Rotation::South);
        assert_eq!(p.x, Piece::new(PieceKind::L).x);
    }
}
