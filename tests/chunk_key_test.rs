use chunk_ngin::data_structures::{
    chunk::{CHUNK_SIZE, ChunkKey, MAX_CHUNK_COORD, chunk_coord},
    dirty::DirtySet,
};
use proptest::prelude::*;

// quarter units keep positions exactly representable
fn world() -> impl Strategy<Value = f32> {
    (-400_000i32..400_000).prop_map(|q| q as f32 * 0.25)
}

#[test]
fn negative_positions_floor_into_lower_chunk() {
    assert_eq!(chunk_coord(-0.5), -1);
    assert_eq!(chunk_coord(-40.0), -1);
    assert_eq!(chunk_coord(-40.01), -2);
    assert_eq!(chunk_coord(0.0), 0);
    assert_eq!(chunk_coord(39.99), 0);
    assert_eq!(chunk_coord(40.0), 1);

    let key = ChunkKey::from_position(cgmath::Vector3::new(-0.5, 85.0, -120.0));
    assert_eq!(key, ChunkKey::new(-1, 2, -3));
    assert_eq!(key.to_string(), "chunk(-1, 2, -3)");
}

#[test]
fn offset_and_origin() {
    let key = ChunkKey::new(1, -2, 0);
    assert_eq!(key.offset(-1, 2, 3), ChunkKey::new(0, 0, 3));
    assert_eq!(key.origin(), cgmath::Vector3::new(40.0, -80.0, 0.0));
    assert_eq!(ChunkKey::from((1, -2, 0)), key);
}

#[test]
fn far_positions_clamp_to_the_edge_chunk() {
    assert_eq!(chunk_coord(1e11), MAX_CHUNK_COORD);
    assert_eq!(chunk_coord(-1e11), -MAX_CHUNK_COORD);
    let edge = ChunkKey::new(MAX_CHUNK_COORD, 0, 0);
    assert_eq!(edge.offset(i32::MAX, 0, 0).x, i32::MAX);
}

#[test]
fn dirty_marks_are_idempotent_and_drained_once() {
    let mut dirty = DirtySet::new();
    let a = ChunkKey::new(0, 0, 0);
    let b = ChunkKey::new(1, 0, 0);
    dirty.mark(a);
    dirty.mark(a);
    dirty.mark(b);
    assert_eq!(dirty.len(), 2);
    assert!(dirty.contains(&a));

    let drained = dirty.drain_all();
    assert_eq!(drained.len(), 2);
    assert!(drained.contains(&a) && drained.contains(&b));
    assert!(dirty.is_empty());
    assert!(dirty.drain_all().is_empty());
}

proptest! {
    // every position lies inside the cube spanned by its chunk's origin
    #[test]
    fn position_lies_inside_its_chunk(x in world(), y in world(), z in world()) {
        let p = cgmath::Vector3::new(x, y, z);
        let key = ChunkKey::from_position(p);
        let origin = key.origin();
        for (v, o) in [(p.x, origin.x), (p.y, origin.y), (p.z, origin.z)] {
            prop_assert!(o <= v);
            prop_assert!(v < o + CHUNK_SIZE);
        }
    }

    // neighbouring positions never skip a chunk
    #[test]
    fn chunk_coord_is_monotonic(a in world(), b in world()) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(chunk_coord(lo) <= chunk_coord(hi));
    }
}
