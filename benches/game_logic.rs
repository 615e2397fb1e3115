use criterion::{black_box, criterion_group, criterion_main, Criterion};
use classic_tetris::core::{Board, Piece};
use classic_tetris::engine::Engine;
use classic_tetris::term::{FrameBuffer, GameView, RecordingCanvas, Viewport};
use classic_tetris::types::{GameCommand, PieceKind};

fn bench_advance(c: &mut Criterion) {
    let mut engine = Engine::new(12345);
    engine.start();

    c.bench_function("advance_16ms", |b| {
        b.iter(|| {
            if engine.game_over() {
                engine.start();
            }
            engine.advance(black_box(16));
        })
    });
}

fn bench_tetris_clear(c: &mut Criterion) {
    let stack = Board::from_ascii(
        &["#########.", "#########.", "#########.", "#########."],
        PieceKind::Z.color(),
    );
    let vertical_i = Piece {
        x: 9,
        ..Piece::new(PieceKind::I).rotated()
    };

    c.bench_function("hard_drop_clear_4_lines", |b| {
        b.iter(|| {
            let mut engine = Engine::new(12345);
            engine.start();
            engine.load_board(stack);
            engine.set_current_piece(vertical_i);
            black_box(engine.hard_drop());
        })
    });
}

fn bench_commands(c: &mut Criterion) {
    let mut engine = Engine::new(12345);
    engine.start();

    c.bench_function("apply_move_and_rotate", |b| {
        b.iter(|| {
            engine.apply(black_box(GameCommand::MoveRight));
            engine.apply(black_box(GameCommand::Rotate));
            engine.apply(black_box(GameCommand::MoveLeft));
        })
    });
}

fn bench_paint(c: &mut Criterion) {
    let mut engine = Engine::new(12345);
    engine.start();
    engine.load_board(Board::from_ascii(
        &["##.#######", "#.########", "####.#####"],
        PieceKind::L.color(),
    ));
    let snap = engine.snapshot();
    let view = GameView::default();
    let mut fb = FrameBuffer::new(80, 24);

    c.bench_function("render_frame_80x24", |b| {
        b.iter(|| {
            view.render_into(black_box(&snap), Viewport::new(80, 24), &mut fb);
        })
    });

    c.bench_function("paint_playfield_recording", |b| {
        b.iter(|| {
            let mut canvas = RecordingCanvas::new();
            classic_tetris::term::paint_playfield(black_box(&snap), &mut canvas);
            black_box(canvas.calls.len())
        })
    });
}

criterion_group!(
    benches,
    bench_advance,
    bench_tetris_clear,
    bench_commands,
    bench_paint
);
criterion_main!(benches);
