//! Line-clear flash: presentation-only record of rows that were just removed.
//!
//! The authoritative board is compacted the moment rows are cleared. The flash
//! keeps a copy of the pre-clear board so renderers can keep showing the full
//! rows, alternating two colors, until the animation runs out.

use crate::core::{Board, RowList};
use crate::types::{Color, FLASH_COLOR_A, FLASH_COLOR_B, LINE_CLEAR_FLASH_CYCLES, LINE_CLEAR_FLASH_MS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineClearFlash {
    before: Board,
    rows: RowList,
    elapsed_ms: u32,
}

impl LineClearFlash {
    pub fn new(before: Board, rows: RowList) -> Self {
        Self {
            before,
            rows,
            elapsed_ms: 0,
        }
    }

    /// Advance by `delta_ms`. Returns true while the flash is still showing.
    pub fn advance(&mut self, delta_ms: u32) -> bool {
        self.elapsed_ms = self.elapsed_ms.saturating_add(delta_ms);
        !self.is_finished()
    }

    pub fn cycle(&self) -> u32 {
        self.elapsed_ms / LINE_CLEAR_FLASH_MS
    }

    pub fn is_finished(&self) -> bool {
        self.cycle() >= LINE_CLEAR_FLASH_CYCLES
    }

    /// Color the cleared rows are painted with in the current cycle
    pub fn color(&self) -> Color {
        if self.cycle() % 2 == 0 {
            FLASH_COLOR_A
        } else {
            FLASH_COLOR_B
        }
    }

    pub fn rows(&self) -> &RowList {
        &self.rows
    }

    /// Original colors of the cleared rows, in the same order as [`Self::rows`]
    pub fn saved_rows(&self) -> impl Iterator<Item = &[crate::types::Cell]> + '_ {
        self.rows.iter().map(move |&y| self.before.row(y))
    }

    /// Pre-clear board with the cleared rows painted in the flash color
    pub fn display_board(&self) -> Board {
        let mut board = self.before;
        let color = self.color();
        for &y in &self.rows {
            board.fill_row(y, color);
        }
        board
    }
}
