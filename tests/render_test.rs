use chunk_ngin::{
    data_structures::chunk::ChunkKey,
    render::draw_visible,
    scene::Scene,
    view::{ViewConfig, ViewRange, view_range},
};

use crate::common::test_utils::{RecordingBackend, RecordingTarget, unit, v3, zero};

mod common;

fn scene_with_cubes(backend: &RecordingBackend, positions: &[cgmath::Vector3<f32>]) -> Scene<RecordingBackend> {
    let mut scene = Scene::new();
    for p in positions {
        scene.instances.add(Some("cube"), None, *p, zero(), unit());
    }
    scene.prepare(backend).unwrap();
    scene
}

#[test]
fn draws_only_batches_in_view() {
    let backend = RecordingBackend::new();
    let scene = scene_with_cubes(
        &backend,
        &[v3(0.0, 0.0, 0.0), v3(1.0, 0.0, 0.0), v3(120.0, 0.0, 0.0), v3(400.0, 0.0, 0.0)],
    );
    assert_eq!(scene.batches().len(), 3);

    let range = view_range(v3(0.0, 0.0, 0.0), 45.0, 0.0, &ViewConfig::default());
    let mut target = RecordingTarget::default();
    assert_eq!(scene.draw(&mut target, &range), 2);

    let mut counts: Vec<u32> = target.draws.iter().map(|(_, count)| *count).collect();
    counts.sort();
    assert_eq!(counts, vec![36, 72]);
}

#[test]
fn chunks_behind_the_camera_are_skipped() {
    let backend = RecordingBackend::new();
    let scene = scene_with_cubes(&backend, &[v3(-100.0, 0.0, 0.0), v3(100.0, 0.0, 0.0)]);

    let range = view_range(v3(0.0, 0.0, 0.0), 0.0, 0.0, &ViewConfig::default());
    let mut target = RecordingTarget::default();
    assert_eq!(scene.draw(&mut target, &range), 1);

    let ahead = scene.batches().get(ChunkKey::new(2, 0, 0)).unwrap();
    assert_eq!(target.draws, vec![(ahead.buffer.id, 36)]);
}

#[test]
fn empty_range_draws_nothing() {
    let backend = RecordingBackend::new();
    let scene = scene_with_cubes(&backend, &[v3(0.0, 0.0, 0.0)]);
    let range = ViewRange {
        x: 0..0,
        y: 0..1,
        z: 0..1,
    };
    let mut target = RecordingTarget::default();
    assert_eq!(draw_visible(&mut target, scene.batches(), &range), 0);
    assert!(target.draws.is_empty());
}
