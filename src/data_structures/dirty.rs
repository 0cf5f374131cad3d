//! Tracking of chunks whose batch is out of date.

use std::collections::HashSet;

use crate::data_structures::chunk::ChunkKey;

/// Chunks whose batch must be rebuilt before the next render.
///
/// Marking is idempotent: a chunk touched several times in one frame is rebuilt
/// once. Iteration order of a drained set is unspecified.
#[derive(Debug, Default, Clone)]
pub struct DirtySet {
    keys: HashSet<ChunkKey>,
}

impl DirtySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&mut self, key: ChunkKey) {
        self.keys.insert(key);
    }

    /// Hands out every marked key and leaves the set empty.
    pub fn drain_all(&mut self) -> HashSet<ChunkKey> {
        std::mem::take(&mut self.keys)
    }

    pub fn contains(&self, key: &ChunkKey) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChunkKey> {
        self.keys.iter()
    }
}
