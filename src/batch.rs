//! Chunk batching: baking every instance of a chunk into one vertex buffer.
//!
//! A [`ChunkBatch`] is derived state. It can always be rebuilt from the
//! [`InstanceRegistry`] and the [`MeshStore`], and it exists for a chunk exactly
//! when that chunk produces at least one vertex. Rebuilds are full replacements;
//! the previous GPU resources of a chunk are released before new ones are
//! created.
//!
//! GPU access goes through [`GpuBackend`], which `wgpu::Device` implements (see
//! [`crate::gpu`]). Tests plug in a recording backend instead.

use std::collections::HashMap;

use crate::{
    data_structures::{
        chunk::ChunkKey,
        instance::{BatchVertex, InstanceRaw},
        mesh_store::MeshStore,
        registry::InstanceRegistry,
    },
    error::{EngineError, Result},
};

/// The GPU operations the batcher needs.
///
/// Allocation failures are fatal and reported as
/// [`crate::error::EngineError::GpuAllocation`].
pub trait GpuBackend {
    type Buffer;
    type DrawObject;

    fn create_vertex_buffer(&self, label: &str, contents: &[u8]) -> Result<Self::Buffer>;

    /// A draw object bound to the [`BatchVertex`] layout reading `buffer`.
    fn create_draw_object(
        &self,
        label: &str,
        buffer: &Self::Buffer,
        vertex_count: u32,
    ) -> Result<Self::DrawObject>;

    fn release_buffer(&self, buffer: Self::Buffer);

    fn release_draw_object(&self, draw: Self::DrawObject);
}

/// GPU buffer and draw object of one chunk.
pub struct ChunkBatch<B: GpuBackend> {
    pub buffer: B::Buffer,
    pub draw: B::DrawObject,
    vertex_count: u32,
}

impl<B: GpuBackend> ChunkBatch<B> {
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }
}

/// All live chunk batches, keyed by chunk.
pub struct BatchTable<B: GpuBackend> {
    batches: HashMap<ChunkKey, ChunkBatch<B>>,
}

impl<B: GpuBackend> BatchTable<B> {
    pub fn new() -> Self {
        Self {
            batches: HashMap::new(),
        }
    }

    pub fn get(&self, key: ChunkKey) -> Option<&ChunkBatch<B>> {
        self.batches.get(&key)
    }

    pub fn contains(&self, key: ChunkKey) -> bool {
        self.batches.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &ChunkKey> {
        self.batches.keys()
    }

    /// Releases the resources of every batch.
    pub fn clear(&mut self, backend: &B) {
        for (_, batch) in self.batches.drain() {
            release(backend, batch);
        }
    }

    fn remove(&mut self, key: ChunkKey, backend: &B) -> bool {
        match self.batches.remove(&key) {
            Some(batch) => {
                release(backend, batch);
                true
            }
            None => false,
        }
    }

    fn insert(&mut self, key: ChunkKey, batch: ChunkBatch<B>) {
        self.batches.insert(key, batch);
    }
}

impl<B: GpuBackend> Default for BatchTable<B> {
    fn default() -> Self {
        Self::new()
    }
}

fn release<B: GpuBackend>(backend: &B, batch: ChunkBatch<B>) {
    backend.release_draw_object(batch.draw);
    backend.release_buffer(batch.buffer);
}

/// Concatenates the rows of every instance in `key`.
///
/// Each instance contributes its mesh's vertices, each followed by the
/// instance's own transform and material. Instances stay contiguous and in
/// membership order. Instances without a mesh add nothing; instances with an
/// unknown mesh are skipped with a warning.
pub fn build_rows(meshes: &MeshStore, registry: &InstanceRegistry, key: ChunkKey) -> Vec<BatchVertex> {
    let mut rows = Vec::new();
    for instance in registry.chunk_instances(key) {
        let Some(mesh_key) = instance.mesh.as_deref() else {
            continue;
        };
        let record = match meshes.get(mesh_key) {
            Ok(record) => record,
            Err(e) => {
                log::warn!("{} skips an instance: {}", key, e);
                continue;
            }
        };
        let raw: InstanceRaw = instance.to_raw();
        rows.extend(record.vertices().iter().map(|vertex| BatchVertex {
            vertex: *vertex,
            instance: raw,
        }));
    }
    rows
}

/// Rebuilds chunk batches from explicitly injected collaborators.
///
/// Built per rebuild pass; the batch table it writes to outlives it.
pub struct ChunkBatcher<'a, B: GpuBackend> {
    meshes: &'a MeshStore,
    registry: &'a mut InstanceRegistry,
    batches: &'a mut BatchTable<B>,
    backend: &'a B,
}

impl<'a, B: GpuBackend> ChunkBatcher<'a, B> {
    pub fn new(
        meshes: &'a MeshStore,
        registry: &'a mut InstanceRegistry,
        batches: &'a mut BatchTable<B>,
        backend: &'a B,
    ) -> Self {
        Self {
            meshes,
            registry,
            batches,
            backend,
        }
    }

    /// Fully rebuilds the batch of one chunk, or tears it down if the chunk
    /// produces no vertices.
    pub fn rebuild(&mut self, key: ChunkKey) -> Result<()> {
        let rows = build_rows(self.meshes, &*self.registry, key);

        if rows.is_empty() {
            let had_batch = self.batches.remove(key, self.backend);
            self.registry.forget_chunk(key);
            if had_batch {
                log::debug!("Removed empty batch of {}", key);
            }
            return Ok(());
        }

        self.batches.remove(key, self.backend);

        let label = format!("{} Batch", key);
        let vertex_count =
            u32::try_from(rows.len()).map_err(|_| EngineError::GpuAllocation {
                label: label.clone(),
                reason: format!("{} vertices exceed the u32 draw range", rows.len()),
            })?;
        let buffer = self
            .backend
            .create_vertex_buffer(&label, bytemuck::cast_slice(&rows))?;
        let draw = match self
            .backend
            .create_draw_object(&label, &buffer, vertex_count)
        {
            Ok(draw) => draw,
            Err(e) => {
                self.backend.release_buffer(buffer);
                return Err(e);
            }
        };
        self.batches.insert(
            key,
            ChunkBatch {
                buffer,
                draw,
                vertex_count,
            },
        );
        log::trace!("Rebuilt {} with {} vertices", key, vertex_count);
        Ok(())
    }

    /// Drains the dirty set and rebuilds every chunk in it. Returns how many
    /// chunks were processed.
    pub fn rebuild_all_dirty(&mut self) -> Result<usize> {
        let dirty = self.registry.take_dirty();
        let count = dirty.len();
        for key in dirty {
            self.rebuild(key)?;
        }
        if count > 0 {
            log::debug!(
                "Rebuilt {} dirty chunks, {} batches live",
                count,
                self.batches.len()
            );
        }
        Ok(count)
    }
}
