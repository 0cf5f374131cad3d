//! The scene aggregate: meshes, instances and their chunk batches.
//!
//! A frame runs in a fixed order. Mutations go to [`Scene::instances`] while
//! the frame is being updated, [`Scene::prepare`] rebuilds the chunks those
//! mutations touched, and [`Scene::draw`] issues the draws for the chunks in
//! view. Rebuilding always completes before any draw reads the batch table.

use crate::{
    batch::{BatchTable, ChunkBatcher, GpuBackend},
    data_structures::{mesh_store::MeshStore, model::MeshRecord, registry::InstanceRegistry},
    error::Result,
    render::{DrawBatch, draw_visible},
    view::ViewRange,
};

pub struct Scene<B: GpuBackend> {
    pub meshes: MeshStore,
    pub instances: InstanceRegistry,
    batches: BatchTable<B>,
}

impl<B: GpuBackend> Scene<B> {
    /// An empty scene whose mesh store holds the built-in primitives.
    pub fn new() -> Self {
        Self {
            meshes: MeshStore::new(),
            instances: InstanceRegistry::new(),
            batches: BatchTable::new(),
        }
    }

    /// A batcher wired to this scene's collaborators.
    pub fn batcher<'a>(&'a mut self, backend: &'a B) -> ChunkBatcher<'a, B> {
        ChunkBatcher::new(&self.meshes, &mut self.instances, &mut self.batches, backend)
    }

    /// Rebuilds every dirty chunk. Call once per frame before drawing.
    pub fn prepare(&mut self, backend: &B) -> Result<usize> {
        self.batcher(backend).rebuild_all_dirty()
    }

    pub fn draw<T>(&self, target: &mut T, range: &ViewRange) -> usize
    where
        T: DrawBatch<B> + ?Sized,
    {
        draw_visible(target, &self.batches, range)
    }

    /// Stores a loaded mesh and marks every chunk that uses `key` for rebuild.
    ///
    /// A failed load is logged and leaves the scene untouched.
    pub fn insert_mesh(&mut self, key: &str, loaded: Result<MeshRecord>) {
        match loaded {
            Ok(record) => {
                self.meshes.insert(key, record);
                let affected: Vec<_> = self
                    .instances
                    .iter()
                    .filter(|(_, instance)| instance.mesh.as_deref() == Some(key))
                    .filter_map(|(handle, _)| self.instances.chunk_of(handle))
                    .collect();
                for chunk in affected {
                    self.instances.mark_dirty(chunk);
                }
            }
            Err(e) => log::warn!("Skipping mesh `{}`: {}", key, e),
        }
    }

    pub fn batches(&self) -> &BatchTable<B> {
        &self.batches
    }

    /// Releases all GPU resources. Batches come back on the next `prepare`
    /// only for chunks that are marked dirty again.
    pub fn release(&mut self, backend: &B) {
        self.batches.clear(backend);
    }
}

impl<B: GpuBackend> Default for Scene<B> {
    fn default() -> Self {
        Self::new()
    }
}
