//! Spatial partitioning of world space into cubic chunks.

use std::fmt;

/// Edge length of a chunk in world units.
pub const CHUNK_SIZE: f32 = 40.0;

/// Integer coordinate of a chunk. Used as the key of chunk membership lists,
/// the dirty set and the batch table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkKey {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl ChunkKey {
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The chunk containing a world position.
    ///
    /// Uses floor division so `-0.5` lands in chunk `-1`, not `0`.
    #[inline]
    pub fn from_position(position: cgmath::Vector3<f32>) -> Self {
        Self {
            x: chunk_coord(position.x),
            y: chunk_coord(position.y),
            z: chunk_coord(position.z),
        }
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
            z: self.z.saturating_add(dz),
        }
    }

    /// World-space corner with the smallest coordinates.
    pub fn origin(self) -> cgmath::Vector3<f32> {
        cgmath::Vector3::new(
            self.x as f32 * CHUNK_SIZE,
            self.y as f32 * CHUNK_SIZE,
            self.z as f32 * CHUNK_SIZE,
        )
    }
}

/// Largest chunk coordinate magnitude. Positions further out land in the edge chunk,
/// which leaves headroom for neighbour and range arithmetic on keys.
pub const MAX_CHUNK_COORD: i32 = 1 << 30;

/// Chunk coordinate along one axis.
#[inline]
pub fn chunk_coord(world: f32) -> i32 {
    ((world / CHUNK_SIZE).floor() as i32).clamp(-MAX_CHUNK_COORD, MAX_CHUNK_COORD)
}

impl fmt::Display for ChunkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chunk({}, {}, {})", self.x, self.y, self.z)
    }
}

impl From<(i32, i32, i32)> for ChunkKey {
    fn from(value: (i32, i32, i32)) -> Self {
        Self::new(value.0, value.1, value.2)
    }
}

impl From<ChunkKey> for (i32, i32, i32) {
    fn from(value: ChunkKey) -> Self {
        (value.x, value.y, value.z)
    }
}

impl From<cgmath::Vector3<f32>> for ChunkKey {
    fn from(position: cgmath::Vector3<f32>) -> Self {
        Self::from_position(position)
    }
}
