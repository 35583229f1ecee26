use super::*;
use crate::animation::state::Phase;
use crate::assets::loader::ImageTable;
use crate::encode::sink::InMemorySink;
use crate::engine::opts::EngineOpts;
use crate::foundation::core::Canvas;
use crate::model::board::{Board, BoardType, Domain};

fn engine(seed: u64) -> BoardEngine {
    let mut engine = BoardEngine::new(EngineOpts {
        canvas: Canvas::new(40, 20),
        pixel_size: 5,
        fill_frames: 4,
        hold_ms: 30,
        blink_ms: 20,
        seed: Some(seed),
        ..EngineOpts::default()
    })
    .unwrap();
    engine
        .set_inputs(
            Board::new(BoardType::Monthly, 10, 5),
            vec![Domain::new("a", "#ff0000"), Domain::new("b", "#00ff00")],
            ImageTable::new(),
        )
        .unwrap();
    engine
}

fn fps() -> Fps {
    Fps::new(100, 1).unwrap()
}

#[test]
fn one_cycle_ends_back_in_filling() {
    let mut engine = engine(1);
    let frames = cycle_frame_count(&engine, fps());
    assert_eq!(frames, 10);

    let mut sink = InMemorySink::new();
    let stats = export_frames(&mut engine, fps(), frames, &mut sink).unwrap();
    assert_eq!(stats.frames, 10);
    assert_eq!(stats.duration, Duration::from_millis(90));
    assert_eq!(sink.frames().len(), 10);
    assert!(sink.is_ended());
    assert_eq!(sink.config().unwrap().width, 40);

    let status = engine.status();
    assert_eq!(status.phase, Phase::Filling);
    assert_eq!(status.visible_count, 0);
}

#[test]
fn same_seed_exports_identical_frames() {
    let mut a = InMemorySink::new();
    let mut b = InMemorySink::new();
    export_frames(&mut engine(42), fps(), 6, &mut a).unwrap();
    export_frames(&mut engine(42), fps(), 6, &mut b).unwrap();
    assert_eq!(a.frames(), b.frames());
}

#[test]
fn frames_are_indexed_in_order() {
    let mut sink = InMemorySink::new();
    export_frames(&mut engine(3), fps(), 5, &mut sink).unwrap();
    let idx: Vec<u64> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(idx, vec![0, 1, 2, 3, 4]);
}

#[test]
fn engine_without_inputs_has_no_cycle() {
    let engine = BoardEngine::new(EngineOpts::default()).unwrap();
    assert_eq!(cycle_frame_count(&engine, fps()), 0);
}
