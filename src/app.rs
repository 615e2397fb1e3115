//! Application layer: routes keys, runs frames and sequences the score submission.
//!
//! [`App`] owns the engine, the command queue and the leaderboard handle. It has
//! no terminal dependency, so the binary and the tests drive it the same way:
//! `handle_key` for input, `update` once per frame, `snapshot` + `hud` to render.

use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::{debug, info};

use crate::core::GameSnapshot;
use crate::engine::Engine;
use crate::input::{handle_key_event, should_quit, CommandQueue, NameEntry, NameEntryAction};
use crate::leaderboard::{escape_display_name, Leaderboard, LeaderboardEvent, LeaderboardStatus};
use crate::term::{HudView, LeaderboardView, ScoreRow, SubmitPromptView};
use crate::types::GameCommand;

/// Key help shown when there is no status message
pub const HELP_LINE: &str =
    "←→ move  ↑↓ rotate  space drop  p pause  enter new game  r scores  q quit";

/// Which surface receives keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Playing,
    /// Game over; the name prompt is open
    EnteringName,
    /// Name sent; waiting for the store to answer
    Submitting,
}

pub struct App {
    engine: Engine,
    queue: CommandQueue,
    leaderboard: Leaderboard,
    screen: Screen,
    name: NameEntry,
    prompt_error: Option<String>,
    /// `None` until the first fetch answers
    scores: Option<Vec<ScoreRow>>,
    fetch_error: Option<String>,
    status: Option<String>,
    snapshot: GameSnapshot,
    /// Game number the name prompt was last opened for
    prompted_game: u32,
    quit: bool,
}

impl App {
    pub fn new(engine: Engine, leaderboard: Leaderboard) -> Self {
        let mut app = Self {
            engine,
            queue: CommandQueue::new(),
            leaderboard,
            screen: Screen::Playing,
            name: NameEntry::new(),
            prompt_error: None,
            scores: None,
            fetch_error: None,
            status: None,
            snapshot: GameSnapshot::default(),
            prompted_game: 0,
            quit: false,
        };

        if app.leaderboard.is_available() {
            app.refresh_leaderboard();
        } else {
            app.status = Some(app.leaderboard.status().to_string());
        }
        app.engine.snapshot_into(&mut app.snapshot);
        app
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Direct engine access (puzzle setups, fixtures).
    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn snapshot(&self) -> &GameSnapshot {
        &self.snapshot
    }

    pub fn name_entry(&self) -> &NameEntry {
        &self.name
    }

    pub fn prompt_error(&self) -> Option<&str> {
        self.prompt_error.as_deref()
    }

    pub fn scores(&self) -> Option<&[ScoreRow]> {
        self.scores.as_deref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit = true;
            return;
        }

        match self.screen {
            Screen::EnteringName => match self.name.handle_key(key) {
                NameEntryAction::Submit => self.submit_name(),
                NameEntryAction::Skip => {
                    self.close_prompt();
                    self.status = Some("score not saved".to_string());
                }
                NameEntryAction::Edited => self.prompt_error = None,
                NameEntryAction::Ignored => {}
            },
            // Locked until the store answers.
            Screen::Submitting => {}
            Screen::Playing => {
                if should_quit(key) {
                    self.quit = true;
                } else if matches!(key.code, KeyCode::Char('r') | KeyCode::Char('R')) {
                    self.refresh_leaderboard();
                } else if let Some(command) = handle_key_event(key) {
                    if !self.queue.push(command) {
                        debug!("command queue full, dropped {}", command.as_str());
                    }
                }
            }
        }
    }

    /// Run one frame: apply queued commands, advance the engine by `delta_ms`,
    /// collect leaderboard results and refresh the snapshot.
    pub fn update(&mut self, delta_ms: u32) {
        for command in self.queue.drain() {
            if command == GameCommand::StartGame {
                self.status = None;
            }
            self.engine.apply(command);
        }
        self.engine.advance(delta_ms);

        if let Some(event) = self.engine.take_last_event() {
            if event.level_up {
                self.status = Some(format!("level {}", event.level));
            }
        }
        if self.engine.game_over() && self.prompted_game != self.engine.games_started() {
            self.on_game_over();
        }

        while let Some(event) = self.leaderboard.try_recv() {
            self.on_leaderboard_event(event);
        }

        self.engine.snapshot_into(&mut self.snapshot);
    }

    /// Block up to `timeout` for one leaderboard result. Used on shutdown so an
    /// in-flight submission is not lost.
    pub fn wait_for_leaderboard(&mut self, timeout: Duration) -> bool {
        match self.leaderboard.recv_timeout(timeout) {
            Some(event) => {
                self.on_leaderboard_event(event);
                true
            }
            None => false,
        }
    }

    pub fn refresh_leaderboard(&mut self) {
        if let Err(e) = self.leaderboard.refresh() {
            self.status = Some(format!("{e:#}"));
        }
    }

    /// Everything the view draws around the playfield.
    pub fn hud(&self) -> HudView<'_> {
        let leaderboard = match (self.leaderboard.status(), &self.scores) {
            (LeaderboardStatus::Unavailable(reason), _) => LeaderboardView::Unavailable(reason),
            (_, Some(rows)) => LeaderboardView::Rows(rows),
            (_, None) => match &self.fetch_error {
                Some(err) => LeaderboardView::Unavailable(err),
                None => LeaderboardView::Loading,
            },
        };

        let prompt = match self.screen {
            Screen::Playing => None,
            Screen::EnteringName | Screen::Submitting => Some(SubmitPromptView {
                name: self.name.text(),
                score: self.snapshot.score,
                submitting: self.screen == Screen::Submitting,
                error: self.prompt_error.as_deref(),
            }),
        };

        HudView {
            leaderboard: Some(leaderboard),
            prompt,
            status: Some(self.status.as_deref().unwrap_or(HELP_LINE)),
        }
    }

    fn on_game_over(&mut self) {
        self.prompted_game = self.engine.games_started();
        self.queue.clear();
        let summary = self.engine.summary();
        info!(
            "final score {} (level {}, {} lines)",
            summary.score, summary.level, summary.lines
        );

        if self.leaderboard.is_available() {
            self.name.clear();
            self.prompt_error = None;
            self.screen = Screen::EnteringName;
        } else {
            self.status = Some(self.leaderboard.status().to_string());
        }
    }

    fn submit_name(&mut self) {
        let summary = self.engine.summary();
        match self
            .leaderboard
            .submit(self.name.text(), summary.score, summary.level, summary.lines)
        {
            Ok(()) => {
                self.prompt_error = None;
                self.screen = Screen::Submitting;
            }
            Err(e) => self.prompt_error = Some(format!("{e:#}")),
        }
    }

    fn close_prompt(&mut self) {
        self.screen = Screen::Playing;
        self.name.clear();
        self.prompt_error = None;
    }

    fn on_leaderboard_event(&mut self, event: LeaderboardEvent) {
        match event {
            LeaderboardEvent::Submitted(entry) => {
                if self.screen == Screen::Submitting {
                    self.close_prompt();
                }
                self.status = Some(format!(
                    "saved {} points for {}",
                    entry.score,
                    escape_display_name(&entry.name)
                ));
                self.refresh_leaderboard();
            }
            LeaderboardEvent::SubmitFailed(message) => {
                // Store errors can echo the submitted name back.
                let message = escape_display_name(&message);
                if self.screen == Screen::Submitting {
                    self.screen = Screen::EnteringName;
                }
                self.prompt_error = Some(message.clone());
                self.status = Some(format!("could not save score: {message}"));
            }
            LeaderboardEvent::Fetched(entries) => {
                self.fetch_error = None;
                self.scores = Some(
                    entries
                        .into_iter()
                        .map(|e| ScoreRow {
                            name: escape_display_name(&e.name),
                            score: e.score,
                            level: e.level,
                            lines: e.lines,
                        })
                        .collect(),
                );
            }
            LeaderboardEvent::FetchFailed(message) => {
                let message = escape_display_name(&message);
                self.status = Some(format!("could not load scores: {message}"));
                self.fetch_error = Some(message);
            }
        }
    }
}
