//! Draw-call sink for the playfield.
//!
//! [`paint_playfield`] turns a snapshot into `fill_cell` / `stroke_grid` calls in a
//! fixed order: settled board cells, then the falling piece, then the grid. Any
//! surface implementing [`Canvas`] can consume it; [`BoardCanvas`] paints into a
//! terminal [`FrameBuffer`].

use crate::core::GameSnapshot;
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::types::{Color, BOARD_HEIGHT, BOARD_WIDTH};

/// Playfield background
pub const BACKGROUND_COLOR: Color = Color::new(0x00, 0x00, 0x00);

/// Grid line color
pub const GRID_COLOR: Color = Color::new(0x22, 0x22, 0x22);

pub trait Canvas {
    /// Fill the grid cell at (`col`, `row`) with `color`.
    fn fill_cell(&mut self, col: u8, row: u8, color: Color);

    /// Stroke the cell grid over the playfield.
    fn stroke_grid(&mut self, color: Color);
}

/// Issue the draw calls for one frame of the playfield.
///
/// Piece cells above the visible area are skipped.
pub fn paint_playfield<C: Canvas + ?Sized>(snap: &GameSnapshot, canvas: &mut C) {
    for (y, row) in snap.board.iter().enumerate() {
        for (x, cell) in row.iter().enumerate() {
            if let Some(color) = cell {
                canvas.fill_cell(x as u8, y as u8, *color);
            }
        }
    }

    if let Some(active) = snap.active {
        for (x, y) in active.cells() {
            if x >= 0 && x < BOARD_WIDTH as i8 && y >= 0 && y < BOARD_HEIGHT as i8 {
                canvas.fill_cell(x as u8, y as u8, active.color);
            }
        }
    }

    canvas.stroke_grid(GRID_COLOR);
}

/// Canvas over a rectangle of a terminal framebuffer.
///
/// Each grid cell covers `cell_w` x `cell_h` terminal cells starting at the
/// origin. Grid lines are drawn as dots in cells nothing was painted into.
pub struct BoardCanvas<'a> {
    fb: &'a mut FrameBuffer,
    origin_x: u16,
    origin_y: u16,
    cell_w: u16,
    cell_h: u16,
    painted: [[bool; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize],
}

impl<'a> BoardCanvas<'a> {
    /// Wrap `fb` and clear the playfield rectangle to the background color.
    pub fn new(fb: &'a mut FrameBuffer, origin_x: u16, origin_y: u16, cell_w: u16, cell_h: u16) -> Self {
        let bg = Rgb::from(BACKGROUND_COLOR);
        fb.fill_rect(
            origin_x,
            origin_y,
            BOARD_WIDTH as u16 * cell_w,
            BOARD_HEIGHT as u16 * cell_h,
            ' ',
            CellStyle::new(bg, bg),
        );
        Self {
            fb,
            origin_x,
            origin_y,
            cell_w,
            cell_h,
            painted: [[false; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize],
        }
    }
}

impl Canvas for BoardCanvas<'_> {
    fn fill_cell(&mut self, col: u8, row: u8, color: Color) {
        if col >= BOARD_WIDTH || row >= BOARD_HEIGHT {
            return;
        }
        self.painted[row as usize][col as usize] = true;
        let style = CellStyle::new(color.into(), BACKGROUND_COLOR.into()).bold();
        self.fb.fill_rect(
            self.origin_x + col as u16 * self.cell_w,
            self.origin_y + row as u16 * self.cell_h,
            self.cell_w,
            self.cell_h,
            '█',
            style,
        );
    }

    fn stroke_grid(&mut self, color: Color) {
        // Brighten the line color a little; #222 on black is invisible on most terminals.
        let fg = Rgb::new(
            color.r.saturating_mul(3),
            color.g.saturating_mul(3),
            color.b.saturating_mul(3),
        );
        let style = CellStyle::new(fg, BACKGROUND_COLOR.into()).dim();
        for (row, cols) in self.painted.iter().enumerate() {
            for (col, painted) in cols.iter().enumerate() {
                if !painted {
                    let x = self.origin_x + col as u16 * self.cell_w;
                    let y = self.origin_y + row as u16 * self.cell_h;
                    self.fb.put_char(x, y, '·', style);
                }
            }
        }
    }
}

/// A recorded draw call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawCall {
    FillCell { col: u8, row: u8, color: Color },
    StrokeGrid { color: Color },
}

/// Canvas that records every call (headless hosts and tests)
#[derive(Debug, Clone, Default)]
pub struct RecordingCanvas {
    pub calls: Vec<DrawCall>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filled_cells(&self) -> impl Iterator<Item = (u8, u8, Color)> + '_ {
        self.calls.iter().filter_map(|call| match *call {
            DrawCall::FillCell { col, row, color } => Some((col, row, color)),
            DrawCall::StrokeGrid { .. } => None,
        })
    }
}

impl Canvas for RecordingCanvas {
    fn fill_cell(&mut self, col: u8, row: u8, color: Color) {
        self.calls.push(DrawCall::FillCell { col, row, color });
    }

    fn stroke_grid(&mut self, color: Color) {
        self.calls.push(DrawCall::StrokeGrid { color });
    }
}
