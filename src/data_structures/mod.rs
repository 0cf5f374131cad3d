//! Engine data structures: chunk keys, meshes, instances and their registry.
//!
//! - `chunk` maps world positions to integer chunk keys
//! - `dirty` is the set of chunks awaiting a rebuild
//! - `model` holds vertex layouts and CPU-side mesh records
//! - `mesh_store` maps mesh keys to mesh records
//! - `instance` holds per-instance transformation and material data
//! - `registry` owns all instances and their chunk membership
//! - `texture` holds the depth target

pub mod chunk;
pub mod dirty;
pub mod instance;
pub mod mesh_store;
pub mod model;
pub mod registry;
pub mod texture;
