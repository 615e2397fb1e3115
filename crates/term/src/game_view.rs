//! GameView: maps a `core::GameSnapshot` plus UI state into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::canvas::{paint_playfield, BoardCanvas};
use crate::core::{ActiveSnapshot, GameSnapshot};
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::types::{GamePhase, BOARD_HEIGHT, BOARD_WIDTH};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// One leaderboard line, with the name already escaped for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRow {
    pub name: String,
    pub score: u32,
    pub level: u32,
    pub lines: u32,
}

/// Leaderboard panel contents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaderboardView<'a> {
    /// Leaderboard is off; the reason is shown instead of scores
    Unavailable(&'a str),
    Loading,
    Rows(&'a [ScoreRow]),
}

/// Score submission modal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitPromptView<'a> {
    pub name: &'a str,
    pub score: u32,
    /// A submission is in flight; input is locked
    pub submitting: bool,
    pub error: Option<&'a str>,
}

/// Everything drawn around the playfield
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HudView<'a> {
    pub leaderboard: Option<LeaderboardView<'a>>,
    pub prompt: Option<SubmitPromptView<'a>>,
    pub status: Option<&'a str>,
}

/// A lightweight terminal renderer for the game.
pub struct GameView {
    /// Board cell width in terminal columns.
    cell_w: u16,
    /// Board cell height in terminal rows.
    cell_h: u16,
    anchor_y: AnchorY,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorY {
    Center,
    Top,
}

const LABEL: CellStyle = CellStyle::new(Rgb::new(220, 220, 220), Rgb::new(0, 0, 0)).bold();
const VALUE: CellStyle = CellStyle::new(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0));
const MUTED: CellStyle = CellStyle::new(Rgb::new(140, 140, 150), Rgb::new(0, 0, 0)).dim();
const BORDER: CellStyle = CellStyle::new(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0));
const OVERLAY: CellStyle = CellStyle::new(Rgb::new(255, 255, 255), Rgb::new(0, 0, 0)).bold();
const ERROR: CellStyle = CellStyle::new(Rgb::new(240, 90, 90), Rgb::new(0, 0, 0)).bold();
const MODAL_BG: CellStyle = CellStyle::new(Rgb::new(230, 230, 230), Rgb::new(20, 20, 35));

/// Longest name shown in the leaderboard panel
const PANEL_NAME_CHARS: usize = 12;

impl Default for GameView {
    fn default() -> Self {
        // 2x1 helps compensate for typical terminal glyph aspect ratio.
        Self {
            cell_w: 2,
            cell_h: 1,
            anchor_y: AnchorY::Center,
        }
    }
}

impl GameView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w: cell_w.max(1),
            cell_h: cell_h.max(1),
            anchor_y: AnchorY::Center,
        }
    }

    pub fn with_anchor_y(mut self, anchor_y: AnchorY) -> Self {
        self.anchor_y = anchor_y;
        self
    }

    /// Render the playfield and panel only.
    pub fn render_into(&self, snap: &GameSnapshot, viewport: Viewport, fb: &mut FrameBuffer) {
        self.render_into_with_hud(snap, &HudView::default(), viewport, fb);
    }

    /// Render the current frame into an existing framebuffer.
    ///
    /// Callers can reuse a framebuffer across frames and only resize when the
    /// terminal size changes.
    pub fn render_into_with_hud(
        &self,
        snap: &GameSnapshot,
        hud: &HudView<'_>,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::default().into_cell(' '));

        let board_px_w = (BOARD_WIDTH as u16) * self.cell_w;
        let board_px_h = (BOARD_HEIGHT as u16) * self.cell_h;
        let frame_w = board_px_w + 2;
        let frame_h = board_px_h + 2;

        // Reserve the last row for the status line.
        let usable_h = viewport.height.saturating_sub(1);
        let start_x = viewport.width.saturating_sub(frame_w + panel_width()) / 2;
        let start_y = match self.anchor_y {
            AnchorY::Center => usable_h.saturating_sub(frame_h) / 2,
            AnchorY::Top => 0,
        };

        self.draw_border(fb, start_x, start_y, frame_w, frame_h, BORDER);
        {
            let mut canvas = BoardCanvas::new(fb, start_x + 1, start_y + 1, self.cell_w, self.cell_h);
            paint_playfield(snap, &mut canvas);
        }

        let panel_x = start_x.saturating_add(frame_w).saturating_add(2);
        self.draw_side_panel(fb, snap, hud.leaderboard, viewport, panel_x, start_y);

        match snap.phase {
            GamePhase::NotStarted => {
                self.draw_overlay_lines(fb, start_x, start_y, frame_w, frame_h, &[("PRESS ENTER", None)]);
            }
            GamePhase::Paused => {
                self.draw_overlay_lines(fb, start_x, start_y, frame_w, frame_h, &[("PAUSED", None)]);
            }
            GamePhase::GameOver if hud.prompt.is_none() => {
                self.draw_overlay_lines(
                    fb,
                    start_x,
                    start_y,
                    frame_w,
                    frame_h,
                    &[
                        ("GAME OVER", None),
                        ("SCORE ", Some(snap.score)),
                        ("LEVEL ", Some(snap.level)),
                        ("LINES ", Some(snap.lines)),
                        ("ENTER: NEW GAME", None),
                    ],
                );
            }
            _ => {}
        }

        if let Some(prompt) = hud.prompt {
            self.draw_submit_prompt(fb, &prompt, start_x, start_y, frame_w, frame_h);
        }

        if let Some(status) = hud.status {
            if viewport.height > 0 {
                fb.put_str(0, viewport.height - 1, status, MUTED);
            }
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, snap: &GameSnapshot, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, viewport, &mut fb);
        fb
    }

    pub fn render_with_hud(
        &self,
        snap: &GameSnapshot,
        hud: &HudView<'_>,
        viewport: Viewport,
    ) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into_with_hud(snap, hud, viewport, &mut fb);
        fb
    }

    fn draw_border(&self, fb: &mut FrameBuffer, x: u16, y: u16, w: u16, h: u16, style: CellStyle) {
        if w < 2 || h < 2 {
            return;
        }

        fb.put_char(x, y, '┌', style);
        fb.put_char(x + w - 1, y, '┐', style);
        fb.put_char(x, y + h - 1, '└', style);
        fb.put_char(x + w - 1, y + h - 1, '┘', style);

        for dx in 1..w - 1 {
            fb.put_char(x + dx, y, '─', style);
            fb.put_char(x + dx, y + h - 1, '─', style);
        }
        for dy in 1..h - 1 {
            fb.put_char(x, y + dy, '│', style);
            fb.put_char(x + w - 1, y + dy, '│', style);
        }
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        snap: &GameSnapshot,
        leaderboard: Option<LeaderboardView<'_>>,
        viewport: Viewport,
        panel_x: u16,
        start_y: u16,
    ) {
        if panel_x >= viewport.width || viewport.width - panel_x < 12 {
            return;
        }

        let mut y = start_y;
        for (label, value) in [("SCORE", snap.score), ("LEVEL", snap.level), ("LINES", snap.lines)] {
            fb.put_str(panel_x, y, label, LABEL);
            fb.put_u32(panel_x, y + 1, value, VALUE);
            y = y.saturating_add(3);
        }

        fb.put_str(panel_x, y, "NEXT", LABEL);
        y = y.saturating_add(1);
        if let Some(next) = snap.next {
            self.draw_preview(fb, &next, panel_x, y);
        }
        y = y.saturating_add(4);

        if let Some(board) = leaderboard {
            self.draw_leaderboard(fb, board, viewport, panel_x, y);
        }
    }

    /// Next piece drawn from its own shape origin, independent of its board anchor.
    fn draw_preview(&self, fb: &mut FrameBuffer, next: &ActiveSnapshot, x: u16, y: u16) {
        let style = CellStyle::new(next.color.into(), Rgb::new(0, 0, 0)).bold();
        for (dx, dy) in next.shape.minos() {
            let px = x + dx as u16 * self.cell_w;
            let py = y + dy as u16;
            fb.fill_rect(px, py, self.cell_w, 1, '█', style);
        }
    }

    fn draw_leaderboard(
        &self,
        fb: &mut FrameBuffer,
        board: LeaderboardView<'_>,
        viewport: Viewport,
        x: u16,
        mut y: u16,
    ) {
        fb.put_str(x, y, "TOP SCORES", LABEL);
        y = y.saturating_add(1);

        match board {
            LeaderboardView::Unavailable(reason) => {
                fb.put_str(x, y, "unavailable", MUTED);
                let max_w = viewport.width.saturating_sub(x) as usize;
                for line in wrap(reason, max_w).take(3) {
                    y = y.saturating_add(1);
                    fb.put_str(x, y, line, MUTED);
                }
            }
            LeaderboardView::Loading => {
                fb.put_str(x, y, "loading...", MUTED);
            }
            LeaderboardView::Rows([]) => {
                fb.put_str(x, y, "no scores yet", MUTED);
            }
            LeaderboardView::Rows(rows) => {
                for (i, row) in rows.iter().enumerate() {
                    if y >= viewport.height.saturating_sub(1) {
                        break;
                    }
                    let rank = (i as u32) + 1;
                    let mut cx = x;
                    if rank < 10 {
                        cx += 1;
                    }
                    cx = fb.put_u32(cx, y, rank, MUTED);
                    fb.put_char(cx, y, '.', MUTED);
                    let name_x = x + 4;
                    let name_end = name_x + PANEL_NAME_CHARS as u16;
                    fb.put_str(name_x, y, truncate_chars(&row.name, PANEL_NAME_CHARS), VALUE);
                    fb.put_u32(name_end + 1, y, row.score, VALUE);
                    y = y.saturating_add(1);
                }
            }
        }
    }

    fn draw_submit_prompt(
        &self,
        fb: &mut FrameBuffer,
        prompt: &SubmitPromptView<'_>,
        start_x: u16,
        start_y: u16,
        frame_w: u16,
        frame_h: u16,
    ) {
        let box_w = frame_w.saturating_sub(2).max(20);
        let box_h = 7;
        let x = start_x + 1;
        let y = start_y + frame_h.saturating_sub(box_h) / 2;

        fb.fill_rect(x, y, box_w, box_h, ' ', MODAL_BG);
        self.draw_border(fb, x, y, box_w, box_h, MODAL_BG);

        let inner_x = x + 1;
        let inner_w = box_w.saturating_sub(3) as usize;
        let cx = fb.put_str(inner_x, y + 1, "SCORE ", MODAL_BG.bold());
        fb.put_u32(cx, y + 1, prompt.score, MODAL_BG.bold());

        fb.put_str(inner_x, y + 2, "NAME", MODAL_BG);
        let name = tail_chars(prompt.name, inner_w.saturating_sub(1));
        let end = fb.put_str(inner_x, y + 3, name, MODAL_BG.bold());
        if !prompt.submitting {
            fb.put_char(end, y + 3, '_', MODAL_BG);
        }

        if prompt.submitting {
            fb.put_str(inner_x, y + 5, "submitting...", MODAL_BG.dim());
        } else if let Some(err) = prompt.error {
            let style = CellStyle { bg: MODAL_BG.bg, ..ERROR };
            fb.put_str(inner_x, y + 4, truncate_chars(err, inner_w), style);
            fb.put_str(inner_x, y + 5, "ENTER ok ESC skip", MODAL_BG.dim());
        } else {
            fb.put_str(inner_x, y + 5, "ENTER ok ESC skip", MODAL_BG.dim());
        }
    }

    fn draw_overlay_lines(
        &self,
        fb: &mut FrameBuffer,
        start_x: u16,
        start_y: u16,
        frame_w: u16,
        frame_h: u16,
        lines: &[(&str, Option<u32>)],
    ) {
        let top = start_y.saturating_add(frame_h / 2).saturating_sub(lines.len() as u16 / 2);
        for (i, (text, value)) in lines.iter().enumerate() {
            let digits = value.map(digit_count).unwrap_or(0);
            let text_w = text.chars().count() as u16 + digits;
            let x = start_x.saturating_add(frame_w.saturating_sub(text_w) / 2);
            let y = top + i as u16;
            let end = fb.put_str(x, y, text, OVERLAY);
            if let Some(v) = value {
                fb.put_u32(end, y, *v, OVERLAY);
            }
        }
    }
}

fn panel_width() -> u16 {
    2 + 4 + PANEL_NAME_CHARS as u16 + 8
}

fn digit_count(mut v: u32) -> u16 {
    let mut n = 1;
    while v >= 10 {
        v /= 10;
        n += 1;
    }
    n
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Last `max` chars, so the caret stays visible while typing long names.
fn tail_chars(s: &str, max: usize) -> &str {
    let count = s.chars().count();
    if count <= max {
        return s;
    }
    match s.char_indices().nth(count - max) {
        Some((idx, _)) => &s[idx..],
        None => s,
    }
}

fn wrap(s: &str, width: usize) -> impl Iterator<Item = &str> {
    let width = width.max(1);
    let mut rest = s;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let line = truncate_chars(rest, width);
        rest = &rest[line.len()..];
        Some(line)
    })
}
