//! Selection of the chunk cuboid eligible for rendering this frame.
//!
//! This is a coarse heading test, not frustum culling: it starts from a cube of
//! chunks around the camera and trims the chunk layers behind the camera along
//! every axis it is clearly facing.

use std::ops::Range;

use crate::data_structures::chunk::ChunkKey;

/// Tunables of the view range heuristic.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewConfig {
    /// Chunks rendered in every direction around the camera's chunk.
    pub view_distance: i32,
    /// Chunk layers kept behind the camera on a trimmed side.
    pub trailing_layers: i32,
    /// Yaw window in degrees around a cardinal direction that counts as facing it.
    pub facing_half_angle: f32,
    /// Pitch in degrees beyond which the vertical range is trimmed.
    pub pitch_threshold: f32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            view_distance: 4,
            trailing_layers: 1,
            facing_half_angle: 40.0,
            pitch_threshold: 25.0,
        }
    }
}

/// Axis-aligned chunk cuboid; every range is `min..max` with `max` exclusive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewRange {
    pub x: Range<i32>,
    pub y: Range<i32>,
    pub z: Range<i32>,
}

impl ViewRange {
    pub fn contains(&self, key: ChunkKey) -> bool {
        self.x.contains(&key.x) && self.y.contains(&key.y) && self.z.contains(&key.z)
    }

    /// Every chunk key in the cuboid.
    pub fn keys(&self) -> impl Iterator<Item = ChunkKey> + '_ {
        self.x.clone().flat_map(move |x| {
            self.y
                .clone()
                .flat_map(move |y| self.z.clone().map(move |z| ChunkKey::new(x, y, z)))
        })
    }

    pub fn len(&self) -> usize {
        self.x.len() * self.y.len() * self.z.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Shortest angle in degrees between two headings.
fn angle_between(a: f32, b: f32) -> f32 {
    let diff = (a - b).rem_euclid(360.0);
    diff.min(360.0 - diff)
}

/// Computes the chunk cuboid to draw for a camera.
///
/// `yaw` and `pitch` are in degrees. Yaw 0° looks along +X, 90° along +Z, 180°
/// along −X and 270° along −Z; positive pitch looks up. The result always
/// contains the camera's own chunk and is never empty.
pub fn view_range(position: cgmath::Vector3<f32>, yaw: f32, pitch: f32, config: &ViewConfig) -> ViewRange {
    let center = ChunkKey::from_position(position);
    let distance = config.view_distance.max(0);
    let behind = config.trailing_layers.clamp(0, distance);
    let yaw = yaw.rem_euclid(360.0);
    let facing = |heading: f32| angle_between(yaw, heading) < config.facing_half_angle;

    let around = |c: i32| c.saturating_sub(distance)..c.saturating_add(distance).saturating_add(1);
    let mut x = around(center.x);
    let mut y = around(center.y);
    let mut z = around(center.z);

    if facing(0.0) {
        x.start = center.x.saturating_sub(behind);
    }
    if facing(180.0) {
        x.end = center.x.saturating_add(behind).saturating_add(1);
    }
    if facing(90.0) {
        z.start = center.z.saturating_sub(behind);
    }
    if facing(270.0) {
        z.end = center.z.saturating_add(behind).saturating_add(1);
    }
    if pitch > config.pitch_threshold {
        y.start = center.y.saturating_sub(behind);
    }
    if pitch < -config.pitch_threshold {
        y.end = center.y.saturating_add(behind).saturating_add(1);
    }

    ViewRange { x, y, z }
}
