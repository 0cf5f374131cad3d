//! The authoritative list of placed instances and their chunk membership.
//!
//! Every mutation that can change what a chunk looks like goes through
//! [`InstanceRegistry`], which keeps the global list and the per-chunk lists in
//! agreement and marks the affected chunks dirty. Nothing else edits chunk
//! membership.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::{
    data_structures::{chunk::ChunkKey, dirty::DirtySet, instance::ModelInstance},
    error::{EngineError, Result},
};

/// Stable reference to an instance, valid until the instance is removed.
///
/// Handles are never reused, so a stale handle can only miss.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceHandle(u64);

impl InstanceHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Slot {
    instance: ModelInstance,
    chunk: ChunkKey,
}

#[derive(Debug, Default)]
pub struct InstanceRegistry {
    next_handle: u64,
    // Handles grow monotonically, so this iterates in insertion order
    instances: BTreeMap<InstanceHandle, Slot>,
    chunks: HashMap<ChunkKey, Vec<InstanceHandle>>,
    dirty: DirtySet,
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places a new instance and returns its handle.
    pub fn add(
        &mut self,
        mesh: Option<&str>,
        material: Option<u32>,
        position: cgmath::Vector3<f32>,
        rotation: cgmath::Vector3<f32>,
        scale: cgmath::Vector3<f32>,
    ) -> InstanceHandle {
        self.insert(ModelInstance {
            mesh: mesh.map(str::to_string),
            material,
            position,
            rotation,
            scale,
        })
    }

    /// Places an already assembled instance.
    pub fn insert(&mut self, instance: ModelInstance) -> InstanceHandle {
        let handle = InstanceHandle(self.next_handle);
        self.next_handle += 1;

        let chunk = ChunkKey::from_position(instance.position);
        self.chunks.entry(chunk).or_default().push(handle);
        self.instances.insert(handle, Slot { instance, chunk });
        self.dirty.mark(chunk);
        handle
    }

    /// Removes an instance and hands it back.
    pub fn remove(&mut self, handle: InstanceHandle) -> Result<ModelInstance> {
        let slot = self
            .instances
            .remove(&handle)
            .ok_or(EngineError::UnknownInstance(handle))?;
        self.detach(handle, slot.chunk);
        self.dirty.mark(slot.chunk);
        Ok(slot.instance)
    }

    /// Moves an instance. If it crosses a chunk border both chunks are marked.
    pub fn reposition(
        &mut self,
        handle: InstanceHandle,
        position: cgmath::Vector3<f32>,
    ) -> Result<()> {
        let slot = self
            .instances
            .get_mut(&handle)
            .ok_or(EngineError::UnknownInstance(handle))?;
        let old = slot.chunk;
        let new = ChunkKey::from_position(position);
        slot.instance.position = position;
        slot.chunk = new;

        if old != new {
            self.detach(handle, old);
            self.chunks.entry(new).or_default().push(handle);
            self.dirty.mark(old);
        }
        self.dirty.mark(new);
        Ok(())
    }

    pub fn set_material(&mut self, handle: InstanceHandle, material: Option<u32>) -> Result<()> {
        self.modify(handle, |instance| instance.material = material)
    }

    pub fn set_mesh(&mut self, handle: InstanceHandle, mesh: Option<&str>) -> Result<()> {
        self.modify(handle, |instance| instance.mesh = mesh.map(str::to_string))
    }

    pub fn set_transform(
        &mut self,
        handle: InstanceHandle,
        rotation: cgmath::Vector3<f32>,
        scale: cgmath::Vector3<f32>,
    ) -> Result<()> {
        self.modify(handle, |instance| {
            instance.rotation = rotation;
            instance.scale = scale;
        })
    }

    /// Removes every instance. All previously populated chunks are marked so
    /// their batches get torn down on the next rebuild.
    pub fn clear(&mut self) {
        for key in self.chunks.keys() {
            self.dirty.mark(*key);
        }
        self.chunks.clear();
        self.instances.clear();
    }

    pub fn get(&self, handle: InstanceHandle) -> Option<&ModelInstance> {
        self.instances.get(&handle).map(|slot| &slot.instance)
    }

    pub fn chunk_of(&self, handle: InstanceHandle) -> Option<ChunkKey> {
        self.instances.get(&handle).map(|slot| slot.chunk)
    }

    pub fn iter(&self) -> impl Iterator<Item = (InstanceHandle, &ModelInstance)> {
        self.instances
            .iter()
            .map(|(handle, slot)| (*handle, &slot.instance))
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Handles in a chunk in insertion order. Empty for unknown chunks.
    pub fn chunk_members(&self, key: ChunkKey) -> &[InstanceHandle] {
        self.chunks.get(&key).map_or(&[], Vec::as_slice)
    }

    pub fn chunk_instances(&self, key: ChunkKey) -> impl Iterator<Item = &ModelInstance> {
        self.chunk_members(key)
            .iter()
            .filter_map(|handle| self.get(*handle))
    }

    pub fn has_chunk(&self, key: ChunkKey) -> bool {
        self.chunks.contains_key(&key)
    }

    pub fn chunk_keys(&self) -> impl Iterator<Item = &ChunkKey> {
        self.chunks.keys()
    }

    pub fn dirty(&self) -> &DirtySet {
        &self.dirty
    }

    /// Forces a rebuild of `key`, e.g. after a mesh it uses was replaced.
    pub fn mark_dirty(&mut self, key: ChunkKey) {
        self.dirty.mark(key);
    }

    /// Hands out every chunk marked since the last call and clears the marks.
    pub fn take_dirty(&mut self) -> HashSet<ChunkKey> {
        self.dirty.drain_all()
    }

    /// Drops the bookkeeping entry of a chunk that has no members left.
    ///
    /// Chunks that still hold instances (e.g. ones without a mesh) keep their
    /// entry so membership stays consistent.
    pub(crate) fn forget_chunk(&mut self, key: ChunkKey) -> bool {
        match self.chunks.get(&key) {
            Some(members) if members.is_empty() => {
                self.chunks.remove(&key);
                true
            }
            _ => false,
        }
    }

    fn modify(
        &mut self,
        handle: InstanceHandle,
        f: impl FnOnce(&mut ModelInstance),
    ) -> Result<()> {
        let slot = self
            .instances
            .get_mut(&handle)
            .ok_or(EngineError::UnknownInstance(handle))?;
        f(&mut slot.instance);
        self.dirty.mark(slot.chunk);
        Ok(())
    }

    fn detach(&mut self, handle: InstanceHandle, chunk: ChunkKey) {
        match self.chunks.get_mut(&chunk) {
            Some(members) => match members.iter().position(|h| *h == handle) {
                Some(idx) => {
                    members.remove(idx);
                }
                None => log::error!(
                    "{:?} was registered in {} but missing from its member list",
                    handle,
                    chunk
                ),
            },
            None => log::error!(
                "{:?} cannot be detached: {}",
                handle,
                EngineError::UnknownChunk(chunk)
            ),
        }
    }
}
