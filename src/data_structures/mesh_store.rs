//! Owner of all mesh vertex data, keyed by mesh name.

use std::collections::HashMap;

use crate::{
    data_structures::model::MeshRecord,
    error::{EngineError, Result},
    resources::{mesh::load_mesh, primitives},
};

#[derive(Debug)]
pub struct MeshStore {
    meshes: HashMap<String, MeshRecord>,
    runtime_counter: u64,
}

impl MeshStore {
    /// A store holding the built-in `cube`, `plane` and `quad` primitives.
    pub fn new() -> Self {
        let mut store = Self::empty();
        store.insert(primitives::CUBE, primitives::cube());
        store.insert(primitives::PLANE, primitives::plane());
        store.insert(primitives::QUAD, primitives::screen_quad());
        store
    }

    pub fn empty() -> Self {
        Self {
            meshes: HashMap::new(),
            runtime_counter: 0,
        }
    }

    /// Loads `source` (relative to the asset root) and stores it under `key`.
    ///
    /// A missing or broken asset is logged and skipped; the error is returned so
    /// the caller may react, but the store stays usable either way. Loading a key
    /// that already exists replaces the record; chunks using it must be marked
    /// dirty by the caller.
    pub async fn load(&mut self, key: &str, source: &str) -> Result<()> {
        match load_mesh(source).await {
            Ok(record) => {
                log::info!(
                    "Loaded mesh `{}` from {} ({} vertices, {} unique points)",
                    key,
                    source,
                    record.vertex_count(),
                    record.unique_points().len()
                );
                self.insert(key, record);
                Ok(())
            }
            Err(e) => {
                log::warn!("Skipping mesh `{}`: {}", key, e);
                Err(e)
            }
        }
    }

    pub fn insert(&mut self, key: &str, record: MeshRecord) {
        if self.meshes.insert(key.to_string(), record).is_some() {
            log::debug!("Replaced mesh `{}`", key);
        }
    }

    pub fn get(&self, key: &str) -> Result<&MeshRecord> {
        self.meshes
            .get(key)
            .ok_or_else(|| EngineError::UnknownMesh(key.to_string()))
    }

    /// Builds a flat-shaded mesh from points and triangle indices and stores it
    /// under a fresh key, which is returned.
    pub fn create_runtime(&mut self, points: &[[f32; 3]], triangles: &[[u32; 3]]) -> Result<String> {
        let record = primitives::flat_shaded(points, triangles)?;
        let key = loop {
            let key = format!("runtime-{}", self.runtime_counter);
            self.runtime_counter += 1;
            if !self.meshes.contains_key(&key) {
                break key;
            }
        };
        self.insert(&key, record);
        Ok(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.meshes.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.meshes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

impl Default for MeshStore {
    fn default() -> Self {
        Self::new()
    }
}
