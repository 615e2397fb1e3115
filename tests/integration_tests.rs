//! Integration tests for the main game loop: seeded games played to the end with
//! the invariants checked after every frame.

use classic_tetris::core::{collides, SimpleRng};
use classic_tetris::engine::Engine;
use classic_tetris::types::{GameCommand, GamePhase, BOARD_HEIGHT, BOARD_WIDTH};

const COMMANDS: [GameCommand; 4] = [
    GameCommand::MoveLeft,
    GameCommand::MoveRight,
    GameCommand::Rotate,
    GameCommand::HardDrop,
];

fn check_invariants(engine: &Engine) {
    assert_eq!(engine.level(), engine.lines() / 10 + 1);
    let expected_interval = 1000u32
        .saturating_sub((engine.level() - 1) * 50)
        .max(100);
    assert_eq!(engine.drop_interval_ms(), expected_interval);

    // Nothing settled is ever full; clears happen on lock.
    for y in 0..BOARD_HEIGHT as usize {
        assert!(!engine.board().is_row_full(y), "row {y} left full");
    }

    if engine.is_running() {
        let piece = engine.current().expect("running game has a piece");
        assert!(!collides(&piece, engine.board()));
        for (x, _) in piece.cells() {
            assert!((0..BOARD_WIDTH as i8).contains(&x));
        }
    }
}

fn play_until_over(seed: u32, max_frames: u32) -> Engine {
    let mut engine = Engine::new(seed);
    let mut rng = SimpleRng::new(seed ^ 0x5eed);
    engine.start();

    let mut last_score = 0;
    for _ in 0..max_frames {
        if engine.game_over() {
            break;
        }
        if rng.next_range(4) == 0 {
            let cmd = COMMANDS[rng.next_range(COMMANDS.len() as u32) as usize];
            engine.apply(cmd);
        }
        engine.advance(16);

        assert!(engine.score() >= last_score, "score went down");
        last_score = engine.score();
        check_invariants(&engine);
    }
    engine
}

#[test]
fn test_random_games_hold_invariants_until_game_over() {
    for seed in [1, 7, 42, 12345, 0xdead_beef] {
        let engine = play_until_over(seed, 200_000);
        assert_eq!(engine.phase(), GamePhase::GameOver, "seed {seed}");
    }
}

#[test]
fn test_game_lifecycle() {
    let mut engine = Engine::new(12345);
    assert_eq!(engine.phase(), GamePhase::NotStarted);

    engine.start();
    assert!(engine.is_running());
    assert!(engine.current().is_some());

    assert!(engine.toggle_pause());
    assert!(engine.paused());
    assert!(engine.toggle_pause());

    let over = play_until_over(12345, 200_000);
    assert!(over.game_over());
    let summary = over.summary();
    assert_eq!(summary.score, over.score());
    assert_eq!(summary.level, over.lines() / 10 + 1);
}

#[test]
fn test_gravity_alone_ends_the_game() {
    let mut engine = Engine::new(3);
    engine.start();

    let mut frames = 0u32;
    while !engine.game_over() {
        engine.advance(16);
        frames += 1;
        assert!(frames < 1_000_000);
    }
    // Pieces stack in the middle columns and never clear a line.
    assert_eq!(engine.lines(), 0);
    assert_eq!(engine.score(), 0);
}
