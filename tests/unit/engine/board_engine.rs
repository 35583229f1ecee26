use super::*;
use crate::model::board::BoardType;

fn opts() -> EngineOpts {
    EngineOpts {
        canvas: Canvas::new(40, 20),
        pixel_size: 5,
        fill_frames: 4,
        hold_ms: 30,
        blink_ms: 20,
        seed: Some(7),
        ..EngineOpts::default()
    }
}

fn domains() -> Vec<Domain> {
    vec![
        Domain::new("health", "#33cc66"),
        Domain::new("career", "#3366ff"),
    ]
}

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn engine_with(board: Board) -> BoardEngine {
    let mut engine = BoardEngine::new(opts()).unwrap();
    engine
        .set_inputs(board, domains(), ImageTable::new())
        .unwrap();
    engine
}

#[test]
fn empty_canvas_aborts_construction() {
    let err = BoardEngine::new(EngineOpts {
        canvas: Canvas::new(0, 10),
        ..opts()
    })
    .err()
    .unwrap();
    assert!(matches!(err, BoardError::Surface(_)));
}

#[test]
fn ticking_without_inputs_yields_a_blank_frame() {
    let mut engine = BoardEngine::new(opts()).unwrap();
    let frame = engine.tick(ms(0)).unwrap();
    assert!(frame.data.iter().all(|&b| b == 0));
    let status = engine.status();
    assert_eq!(status.phase, Phase::Filling);
    assert_eq!(status.total_grid_pixels, 0);
    assert_eq!(engine.layer_generation(), 0);
}

#[test]
fn status_reports_grid_and_progress() {
    let engine = engine_with(Board::new(BoardType::Monthly, 10, 5));
    let status = engine.status();
    assert_eq!(status.total_grid_pixels, 32);
    assert_eq!(status.target_pixel_count, 16);
    assert_eq!(status.completion_percentage, 50);
    assert!(!status.preview_active);
    assert_eq!(engine.layer_generation(), 1);
}

#[test]
fn identical_inputs_keep_the_running_cycle() {
    let mut engine = engine_with(Board::new(BoardType::Monthly, 10, 5));
    engine.tick(ms(0)).unwrap();
    assert_eq!(engine.status().visible_count, 8);

    engine
        .set_inputs(Board::new(BoardType::Monthly, 10, 5), domains(), ImageTable::new())
        .unwrap();
    assert_eq!(engine.status().visible_count, 8);
    assert_eq!(engine.layer_generation(), 1);
}

#[test]
fn progress_change_restarts_without_rebuilding_layers() {
    let mut engine = engine_with(Board::new(BoardType::Monthly, 10, 5));
    engine.tick(ms(0)).unwrap();

    engine
        .set_inputs(Board::new(BoardType::Monthly, 10, 8), domains(), ImageTable::new())
        .unwrap();
    let status = engine.status();
    assert_eq!(status.phase, Phase::Filling);
    assert_eq!(status.visible_count, 0);
    assert_eq!(status.target_pixel_count, 25);
    assert_eq!(engine.layer_generation(), 1);
}

#[test]
fn colour_or_pixel_size_change_rebuilds_layers() {
    let mut engine = engine_with(Board::new(BoardType::Monthly, 10, 5));

    let mut recoloured = domains();
    recoloured[0].color_hex = "#ff0000".to_string();
    engine
        .set_inputs(Board::new(BoardType::Monthly, 10, 5), recoloured, ImageTable::new())
        .unwrap();
    assert_eq!(engine.layer_generation(), 2);

    engine.set_pixel_size(10).unwrap();
    assert_eq!(engine.layer_generation(), 3);
    assert_eq!(engine.status().total_grid_pixels, 8);
    assert_eq!(engine.pixel_size(), 10);

    engine.set_pixel_size(10).unwrap();
    assert_eq!(engine.layer_generation(), 3);
    assert!(engine.set_pixel_size(0).is_err());
}

#[test]
fn overfull_board_and_duplicate_domains_are_rejected() {
    let mut engine = BoardEngine::new(opts()).unwrap();
    assert!(
        engine
            .set_inputs(Board::new(BoardType::Weekly, 5, 6), domains(), ImageTable::new())
            .is_err()
    );
    let dup = vec![Domain::new("a", "#fff"), Domain::new("a", "#000")];
    assert!(
        engine
            .set_inputs(Board::new(BoardType::Weekly, 5, 1), dup, ImageTable::new())
            .is_err()
    );
}

#[test]
fn full_cycle_reveals_then_previews_then_clears() {
    let mut engine = engine_with(Board::new(BoardType::Monthly, 10, 5));
    let mut now = 0;
    let mut phases = Vec::new();
    loop {
        engine.tick(ms(now)).unwrap();
        let status = engine.status();
        if phases.last() != Some(&status.phase) {
            phases.push(status.phase);
        }
        if status.phase == Phase::Blinking {
            assert!(status.preview_active);
        }
        if phases.len() == 5 {
            break;
        }
        now += 10;
        assert!(now < 10_000, "cycle did not complete: {phases:?}");
    }
    assert_eq!(
        phases,
        vec![
            Phase::Filling,
            Phase::Holding,
            Phase::Blinking,
            Phase::Resetting,
            Phase::Filling
        ]
    );
    assert_eq!(engine.status().visible_count, 0);
}

#[test]
fn teardown_blanks_the_frame() {
    let mut engine = engine_with(Board::new(BoardType::Monthly, 10, 10));
    engine.tick(ms(0)).unwrap();
    assert!(engine.frame().data.iter().any(|&b| b != 0));

    engine.teardown();
    assert!(engine.frame().data.iter().all(|&b| b == 0));
    assert_eq!(engine.status().total_grid_pixels, 0);
    assert!(engine.tick(ms(16)).unwrap().data.iter().all(|&b| b == 0));
}
