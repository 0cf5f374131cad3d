//! chunk-ngin
//!
//! A chunk-batching scene renderer. Model instances live in a registry that
//! partitions world space into cubic chunks. Each chunk is baked into one
//! vertex buffer whose rows carry the instance transform, so drawing the
//! whole scene costs one draw call per visible chunk.
//!
//! High-level modules
//! - `data_structures`: chunk keys, meshes, instances, the registry and dirty tracking
//! - `batch`: the GPU backend seam, the batch table and the chunk batcher
//! - `view`: selects the chunk range around and in front of the camera
//! - `render`: draws the batches inside a view range
//! - `scene`: ties mesh store, registry and batch table together
//! - `resources`: OBJ/glTF mesh loading and the built-in primitives
//! - `gpu`: `wgpu` implementations of the backend and draw seams
//! - `camera`, `context`, `pipelines`, `flow`: window, GPU setup and frame loop
//!

pub mod batch;
pub mod camera;
pub mod context;
pub mod data_structures;
pub mod error;
pub mod flow;
pub mod gpu;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scene;
pub mod view;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use winit::event::DeviceEvent;
pub use winit::event::WindowEvent;
pub use wgpu::*;
