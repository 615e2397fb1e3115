//! Terminal runner (default binary).
//!
//! Uses crossterm for input and a custom framebuffer-based renderer. One loop
//! iteration polls input until the next frame is due, advances the game by the
//! measured frame delta and redraws.

use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event};
use log::info;

use classic_tetris::app::{App, Screen};
use classic_tetris::config::{AppConfig, USAGE};
use classic_tetris::engine::Engine;
use classic_tetris::leaderboard::Leaderboard;
use classic_tetris::logging;
use classic_tetris::term::{FrameBuffer, GameView, TerminalRenderer, Viewport};
use classic_tetris::types::FRAME_MS;

fn main() -> Result<()> {
    let config = AppConfig::from_env_and_args()?;
    if config.help {
        println!("{USAGE}");
        return Ok(());
    }
    logging::init(config.log_path.as_deref())?;

    let seed = config.seed();
    info!("starting with seed {seed}");
    let leaderboard = Leaderboard::start_from_config(&config.leaderboard);
    let mut app = App::new(Engine::new(seed), leaderboard);

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, &mut app);

    // Always try to restore terminal state.
    let _ = term.exit();

    if app.screen() == Screen::Submitting {
        info!("waiting for pending score submission");
        app.wait_for_leaderboard(config.leaderboard.timeout);
    }
    result
}

fn run(term: &mut TerminalRenderer, app: &mut App) -> Result<()> {
    let view = GameView::default();
    let mut fb = FrameBuffer::new(0, 0);
    let frame = Duration::from_millis(FRAME_MS as u64);
    let mut last_frame = Instant::now();

    loop {
        // Render.
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        view.render_into_with_hud(app.snapshot(), &app.hud(), Viewport::new(w, h), &mut fb);
        term.draw_swap(&mut fb)?;

        // Input with timeout until the next frame.
        let timeout = frame
            .checked_sub(last_frame.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => app.handle_key(key),
                Event::Resize(_, _) => term.invalidate(),
                _ => {}
            }
        }
        if app.should_quit() {
            return Ok(());
        }

        // Frame.
        let elapsed = last_frame.elapsed();
        if elapsed >= frame {
            last_frame = Instant::now();
            let delta_ms = u32::try_from(elapsed.as_millis()).unwrap_or(u32::MAX);
            app.update(delta_ms);
        }
    }
}
