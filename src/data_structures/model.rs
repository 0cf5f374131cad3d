//! Mesh vertex data as it is kept on the CPU.
//!
//! Meshes are stored pre-expanded: every triangle corner is its own vertex and
//! there is no index buffer. That is what the chunk batcher needs, as it copies
//! mesh rows verbatim into the per-chunk vertex buffer.

use std::collections::HashMap;

/// Anything that can describe its own vertex buffer layout to a pipeline.
pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

/// One triangle corner of a mesh.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub normal: [f32; 3],
    pub tangent: [f32; 3],
    pub bitangent: [f32; 3],
}

impl ModelVertex {
    /// Number of `f32` fields in one vertex.
    pub const FLOATS: usize = 14;

    pub fn new(position: [f32; 3], tex_coords: [f32; 2], normal: [f32; 3]) -> Self {
        Self {
            position,
            tex_coords,
            normal,
            ..Default::default()
        }
    }
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 5]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 11]>() as wgpu::BufferAddress,
                    shader_location: 4,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Immutable vertex data of one mesh type.
#[derive(Clone, Debug)]
pub struct MeshRecord {
    vertices: Vec<ModelVertex>,
    unique_points: Vec<[f32; 3]>,
    point_indices: Vec<u32>,
    has_tangents: bool,
}

impl MeshRecord {
    /// Wraps expanded triangle-list vertices.
    ///
    /// A trailing partial triangle is dropped so the vertex count stays a
    /// multiple of three.
    pub fn new(mut vertices: Vec<ModelVertex>, has_tangents: bool) -> Self {
        let rest = vertices.len() % 3;
        if rest != 0 {
            log::warn!(
                "Mesh data ends with an incomplete triangle, dropping the last {} vertices",
                rest
            );
            vertices.truncate(vertices.len() - rest);
        }
        let (unique_points, point_indices) = dedup_points(&vertices);
        Self {
            vertices,
            unique_points,
            point_indices,
            has_tangents,
        }
    }

    pub fn vertices(&self) -> &[ModelVertex] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Distinct positions in order of first appearance.
    pub fn unique_points(&self) -> &[[f32; 3]] {
        &self.unique_points
    }

    /// For every vertex, the index of its position in [`Self::unique_points`].
    pub fn point_indices(&self) -> &[u32] {
        &self.point_indices
    }

    pub fn has_tangents(&self) -> bool {
        self.has_tangents
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// Positions are compared by value, so `-0.0` and `0.0` are the same point.
fn point_bits(p: [f32; 3]) -> [u32; 3] {
    [
        (p[0] + 0.0).to_bits(),
        (p[1] + 0.0).to_bits(),
        (p[2] + 0.0).to_bits(),
    ]
}

fn dedup_points(vertices: &[ModelVertex]) -> (Vec<[f32; 3]>, Vec<u32>) {
    let mut seen: HashMap<[u32; 3], u32> = HashMap::new();
    let mut points = Vec::new();
    let indices = vertices
        .iter()
        .map(|v| {
            *seen.entry(point_bits(v.position)).or_insert_with(|| {
                points.push(v.position);
                (points.len() - 1) as u32
            })
        })
        .collect();
    (points, indices)
}

/// Expands an indexed attribute table into per-corner rows.
pub(crate) fn expand<T: Copy>(table: &[T], triangles: &[[u32; 3]]) -> Vec<T> {
    triangles
        .iter()
        .flat_map(|tri| tri.iter().map(|&i| table[i as usize]))
        .collect()
}
