//! Error taxonomy of the batching core.
//!
//! Asset errors are recovered where they happen (logged, the asset is skipped).
//! Lookups of unknown meshes, chunks or instances are no-ops or empty results for
//! the caller. GPU allocation failures are the only fatal kind and are meant to be
//! propagated to the application's top level.

use thiserror::Error;

use crate::data_structures::{chunk::ChunkKey, registry::InstanceHandle};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("asset `{path}` could not be found: {reason}")]
    AssetNotFound { path: String, reason: String },
    #[error("asset `{0}` has no supported mesh format (expected .obj, .gltf or .glb)")]
    UnsupportedAsset(String),
    #[error("asset `{path}` could not be parsed: {reason}")]
    AssetParse { path: String, reason: String },
    #[error("no mesh registered under `{0}`")]
    UnknownMesh(String),
    #[error("no chunk at {0}")]
    UnknownChunk(ChunkKey),
    #[error("no instance for {0:?}")]
    UnknownInstance(InstanceHandle),
    #[error("triangle {triangle} references point {index} but only {points} points exist")]
    InvalidTriangle {
        triangle: usize,
        index: u32,
        points: usize,
    },
    #[error("GPU allocation of `{label}` failed: {reason}")]
    GpuAllocation { label: String, reason: String },
}

impl EngineError {
    /// Whether the error is recovered by skipping the affected asset.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, EngineError::GpuAllocation { .. })
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
