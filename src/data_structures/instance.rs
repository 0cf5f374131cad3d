//! Placed model instances and their per-vertex GPU representation.
//!
//! Chunks are drawn without GPU instancing: every vertex of an instance carries
//! that instance's transform and material as trailing fields. This lets a whole
//! chunk go out in one draw call with no per-draw uniform updates.

use crate::data_structures::model::{self, ModelVertex};

/// One placed occurrence of a mesh.
///
/// `rotation` holds radians per axis and is only interpreted by the shader.
/// A `mesh` of `None` is valid; such instances simply contribute no vertices.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelInstance {
    pub mesh: Option<String>,
    pub material: Option<u32>,
    pub position: cgmath::Vector3<f32>,
    pub rotation: cgmath::Vector3<f32>,
    pub scale: cgmath::Vector3<f32>,
}

impl ModelInstance {
    /// An instance of `mesh` at the origin with no rotation and unit scale.
    pub fn new(mesh: Option<&str>) -> Self {
        Self {
            mesh: mesh.map(str::to_string),
            material: None,
            position: cgmath::Vector3::new(0.0, 0.0, 0.0),
            rotation: cgmath::Vector3::new(0.0, 0.0, 0.0),
            scale: cgmath::Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn to_raw(&self) -> InstanceRaw {
        InstanceRaw {
            position: self.position.into(),
            rotation: self.rotation.into(),
            scale: self.scale.into(),
            // Shaders treat a negative index as "no material"
            material: self.material.map_or(-1.0, |m| m as f32),
        }
    }
}

impl Default for ModelInstance {
    fn default() -> Self {
        Self::new(Some("cube"))
    }
}

/**
 * The raw instance is what gets appended to every vertex of the instance.
 */
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    pub position: [f32; 3],
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
    pub material: f32,
}

/// One row of a chunk batch: mesh attributes followed by instance attributes.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BatchVertex {
    pub vertex: ModelVertex,
    pub instance: InstanceRaw,
}

impl BatchVertex {
    /// Number of `f32` fields in one row.
    pub const FLOATS: usize = ModelVertex::FLOATS + 10;
}

/**
 * As we store vertex data directly in the GPU memory we need to tell what the bytes refer to:
 *
 * stride: length of a full row (14 mesh floats + 10 instance floats)
 *
 * The instance fields use the `Vertex` step mode because they are duplicated per
 * vertex rather than stepped per instance.
 */
impl model::Vertex for BatchVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<BatchVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // in_position
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // in_uv
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                // in_normal
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 5]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // in_tangent
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // in_bitangent
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 11]>() as wgpu::BufferAddress,
                    shader_location: 4,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // obj_position
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 14]>() as wgpu::BufferAddress,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // obj_rotation
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 17]>() as wgpu::BufferAddress,
                    shader_location: 6,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // obj_scale
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 20]>() as wgpu::BufferAddress,
                    shader_location: 7,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // obj_material
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 23]>() as wgpu::BufferAddress,
                    shader_location: 8,
                    format: wgpu::VertexFormat::Float32,
                },
            ],
        }
    }
}
