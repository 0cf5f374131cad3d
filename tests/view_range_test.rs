use chunk_ngin::{
    data_structures::chunk::ChunkKey,
    view::{ViewConfig, ViewRange, view_range},
};
use proptest::prelude::*;

fn at_origin(yaw: f32, pitch: f32) -> ViewRange {
    view_range(cgmath::Vector3::new(0.0, 0.0, 0.0), yaw, pitch, &ViewConfig::default())
}

#[test]
fn untrimmed_range_is_centred_on_the_camera() {
    // 45° is exactly between two cardinals and faces neither
    let range = at_origin(45.0, 0.0);
    assert_eq!(range.x, -4..5);
    assert_eq!(range.y, -4..5);
    assert_eq!(range.z, -4..5);
    assert_eq!(range.len(), 9 * 9 * 9);
    assert_eq!(range.keys().count(), range.len());
}

#[test]
fn facing_an_axis_trims_the_layers_behind() {
    let range = at_origin(0.0, 0.0);
    assert_eq!(range.x, -1..5);
    assert_eq!(range.z, -4..5);

    let range = at_origin(90.0, 0.0);
    assert_eq!(range.x, -4..5);
    assert_eq!(range.z, -1..5);

    let range = at_origin(180.0, 0.0);
    assert_eq!(range.x, -4..2);

    let range = at_origin(270.0, 0.0);
    assert_eq!(range.z, -4..2);

    // within the 40° window
    assert_eq!(at_origin(355.0, 0.0).x, -1..5);
    assert_eq!(at_origin(125.0, 0.0).z, -1..5);
}

#[test]
fn pitch_trims_the_vertical_range() {
    assert_eq!(at_origin(45.0, 30.0).y, -1..5);
    assert_eq!(at_origin(45.0, -30.0).y, -4..2);
    assert_eq!(at_origin(45.0, 25.0).y, -4..5);
    assert_eq!(at_origin(45.0, -25.0).y, -4..5);
}

#[test]
fn yaw_is_normalized() {
    assert_eq!(at_origin(-90.0, 0.0), at_origin(270.0, 0.0));
    assert_eq!(at_origin(720.0, 0.0), at_origin(0.0, 0.0));
}

#[test]
fn range_follows_the_camera_chunk() {
    let range = view_range(
        cgmath::Vector3::new(-0.5, 95.0, 200.0),
        0.0,
        0.0,
        &ViewConfig::default(),
    );
    assert_eq!(range.x, -2..4);
    assert_eq!(range.y, -2..7);
    assert_eq!(range.z, 1..10);
    assert!(range.contains(ChunkKey::new(-1, 2, 5)));
    assert!(!range.contains(ChunkKey::new(-3, 2, 5)));
}

#[test]
fn config_changes_the_extent() {
    let config = ViewConfig {
        view_distance: 0,
        trailing_layers: 3,
        ..Default::default()
    };
    let range = view_range(cgmath::Vector3::new(0.0, 0.0, 0.0), 0.0, 60.0, &config);
    assert_eq!(range.len(), 1);
    assert_eq!(range.keys().collect::<Vec<_>>(), vec![ChunkKey::new(0, 0, 0)]);

    let config = ViewConfig {
        view_distance: 2,
        trailing_layers: 0,
        ..Default::default()
    };
    let range = view_range(cgmath::Vector3::new(0.0, 0.0, 0.0), 0.0, 0.0, &config);
    assert_eq!(range.x, 0..3);
    assert_eq!(range.y, -2..3);
}

#[test]
fn far_away_camera_keeps_a_valid_range() {
    for position in [
        cgmath::Vector3::new(1e11, 0.0, 0.0),
        cgmath::Vector3::new(-1e11, 1e30, f32::MAX),
    ] {
        for yaw in [0.0, 45.0, 180.0] {
            let range = view_range(position, yaw, 60.0, &ViewConfig::default());
            assert!(range.x.start < range.x.end);
            assert!(range.y.start < range.y.end);
            assert!(range.z.start < range.z.end);
            assert!(range.contains(ChunkKey::from_position(position)));
        }
    }
}

proptest! {
    // every range is non-empty, bounded and holds the camera chunk
    #[test]
    fn range_always_contains_the_camera(
        x in -5_000.0f32..5_000.0,
        y in -5_000.0f32..5_000.0,
        z in -5_000.0f32..5_000.0,
        yaw in 0.0f32..360.0,
        pitch in -89.0f32..89.0,
    ) {
        let position = cgmath::Vector3::new(x, y, z);
        let range = view_range(position, yaw, pitch, &ViewConfig::default());
        prop_assert!(range.x.start < range.x.end);
        prop_assert!(range.y.start < range.y.end);
        prop_assert!(range.z.start < range.z.end);
        prop_assert!(range.contains(ChunkKey::from_position(position)));
        prop_assert!(range.len() <= 9 * 9 * 9);
        prop_assert!(range.len() >= 6 * 6 * 6);
    }
}
