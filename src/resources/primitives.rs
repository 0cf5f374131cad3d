//! Procedurally generated meshes: the built-in primitives and flat-shaded
//! meshes assembled at runtime from points and triangles.

use cgmath::InnerSpace;

use crate::{
    data_structures::model::{MeshRecord, ModelVertex, expand},
    error::{EngineError, Result},
};

pub const CUBE: &str = "cube";
pub const PLANE: &str = "plane";
pub const QUAD: &str = "quad";

/// A 2x2x2 cube centred on the origin: 12 triangles, 8 distinct corners.
pub fn cube() -> MeshRecord {
    let corners: [[f32; 3]; 8] = [
        [-1.0, -1.0, 1.0],
        [1.0, -1.0, 1.0],
        [1.0, 1.0, 1.0],
        [-1.0, 1.0, 1.0],
        [-1.0, 1.0, -1.0],
        [-1.0, -1.0, -1.0],
        [1.0, -1.0, -1.0],
        [1.0, 1.0, -1.0],
    ];
    // two triangles per face: +z, +x, -z, -x, +y, -y
    let triangles: [[u32; 3]; 12] = [
        [0, 2, 3],
        [0, 1, 2],
        [1, 7, 2],
        [1, 6, 7],
        [6, 5, 4],
        [4, 7, 6],
        [3, 4, 5],
        [3, 5, 0],
        [3, 7, 4],
        [3, 2, 7],
        [0, 6, 1],
        [0, 5, 6],
    ];
    let uv_corners: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
    let uv_triangles: [[u32; 3]; 12] = [
        [0, 2, 3],
        [0, 1, 2],
        [0, 2, 3],
        [0, 1, 2],
        [0, 1, 2],
        [2, 3, 0],
        [2, 3, 0],
        [2, 0, 1],
        [0, 2, 3],
        [0, 1, 2],
        [3, 1, 2],
        [3, 0, 1],
    ];
    let face_normals: [[f32; 3]; 6] = [
        [0.0, 0.0, 1.0],
        [1.0, 0.0, 0.0],
        [0.0, 0.0, -1.0],
        [-1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
    ];

    let positions = expand(&corners, &triangles);
    let uvs = expand(&uv_corners, &uv_triangles);
    let vertices = positions
        .into_iter()
        .zip(uvs)
        .enumerate()
        .map(|(i, (position, uv))| ModelVertex::new(position, uv, face_normals[i / 6]))
        .collect();
    MeshRecord::new(vertices, false)
}

/// A 2x2 plane in XZ facing +Y.
pub fn plane() -> MeshRecord {
    let corners: [[f32; 3]; 4] = [
        [-1.0, 0.0, -1.0],
        [1.0, 0.0, -1.0],
        [1.0, 0.0, 1.0],
        [-1.0, 0.0, 1.0],
    ];
    quad_mesh(&corners, [[3, 1, 0], [2, 1, 3]], [0.0, 1.0, 0.0])
}

/// A full-screen quad in XY facing +Z, in normalized device coordinates.
pub fn screen_quad() -> MeshRecord {
    let corners: [[f32; 3]; 4] = [
        [-1.0, -1.0, 0.0],
        [1.0, -1.0, 0.0],
        [1.0, 1.0, 0.0],
        [-1.0, 1.0, 0.0],
    ];
    quad_mesh(&corners, [[3, 0, 1], [2, 3, 1]], [0.0, 0.0, 1.0])
}

fn quad_mesh(corners: &[[f32; 3]; 4], triangles: [[u32; 3]; 2], normal: [f32; 3]) -> MeshRecord {
    let uv_corners: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
    let vertices = expand(corners, &triangles)
        .into_iter()
        .zip(expand(&uv_corners, &triangles))
        .map(|(position, uv)| ModelVertex::new(position, uv, normal))
        .collect();
    MeshRecord::new(vertices, false)
}

/// Builds a flat-shaded mesh from a point set and triangle indices.
///
/// Every triangle gets the normalized cross product of its two edges from the
/// first corner as the normal of all three corners. Degenerate triangles get a
/// zero normal.
pub fn flat_shaded(points: &[[f32; 3]], triangles: &[[u32; 3]]) -> Result<MeshRecord> {
    let uvs: [[f32; 2]; 3] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]];
    let mut vertices = Vec::with_capacity(triangles.len() * 3);
    for (t, tri) in triangles.iter().enumerate() {
        if let Some(&index) = tri.iter().find(|&&i| i as usize >= points.len()) {
            return Err(EngineError::InvalidTriangle {
                triangle: t,
                index,
                points: points.len(),
            });
        }
        let p0: cgmath::Vector3<f32> = points[tri[0] as usize].into();
        let p1: cgmath::Vector3<f32> = points[tri[1] as usize].into();
        let p2: cgmath::Vector3<f32> = points[tri[2] as usize].into();
        let cross = (p1 - p0).cross(p2 - p0);
        let unit = cross.normalize();
        let normal = if cross.magnitude2() > 0.0 && unit.x.is_finite() && unit.y.is_finite() && unit.z.is_finite() {
            unit
        } else {
            cgmath::Vector3::new(0.0, 0.0, 0.0)
        };
        for (corner, uv) in tri.iter().zip(uvs) {
            vertices.push(ModelVertex::new(
                points[*corner as usize],
                uv,
                normal.into(),
            ));
        }
    }
    Ok(MeshRecord::new(vertices, false))
}
