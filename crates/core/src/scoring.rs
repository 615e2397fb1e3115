//! Scoring module - classic line-clear table, hard-drop bonus and level curve
//!
//! - Line clears award `LINE_SCORES[n] * level` for `n` rows cleared at once.
//! - Hard drops award 2 points per row travelled.
//! - Level is `lines / 10 + 1`; gravity speeds up by 50ms per level down to 100ms.

use crate::types::{
    BASE_DROP_MS, DROP_INTERVAL_MIN_MS, DROP_INTERVAL_STEP_MS, HARD_DROP_POINTS_PER_ROW,
    LINES_PER_LEVEL, LINE_SCORES,
};

/// Calculate line clear score
/// lines: number of rows cleared at once (1-4)
/// level: current level (1-based)
pub fn calculate_line_score(lines: usize, level: u32) -> u32 {
    if lines == 0 || lines >= LINE_SCORES.len() {
        return 0;
    }
    LINE_SCORES[lines].saturating_mul(level)
}

/// Hard drop bonus for `rows` travelled
pub fn calculate_hard_drop_score(rows: u32) -> u32 {
    rows.saturating_mul(HARD_DROP_POINTS_PER_ROW)
}

/// Level for a total line count
pub fn calculate_level(total_lines: u32) -> u32 {
    total_lines / LINES_PER_LEVEL + 1
}

/// Gravity interval for a level, in milliseconds
pub fn get_drop_interval_ms(level: u32) -> u32 {
    let reduction = level
        .saturating_sub(1)
        .saturating_mul(DROP_INTERVAL_STEP_MS);
    BASE_DROP_MS
        .saturating_sub(reduction)
        .max(DROP_INTERVAL_MIN_MS)
}
