use std::io::{BufReader, Cursor};

use crate::{
    data_structures::model::{MeshRecord, ModelVertex},
    error::{EngineError, Result},
    resources::{load_binary, load_string},
};

/// Loads a mesh asset and expands it into a triangle list.
///
/// All meshes and primitives in the file end up in one record. The format is
/// picked by extension: `.obj` goes through `tobj`, `.gltf`/`.glb` through `gltf`.
pub async fn load_mesh(file_name: &str) -> Result<MeshRecord> {
    let extension = std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("obj") => load_mesh_obj(file_name).await,
        Some("gltf") | Some("glb") => load_mesh_gltf(file_name).await,
        _ => Err(EngineError::UnsupportedAsset(file_name.to_string())),
    }
}

fn not_found(file_name: &str, e: anyhow::Error) -> EngineError {
    EngineError::AssetNotFound {
        path: file_name.to_string(),
        reason: e.to_string(),
    }
}

fn parse_error(file_name: &str, reason: impl ToString) -> EngineError {
    EngineError::AssetParse {
        path: file_name.to_string(),
        reason: reason.to_string(),
    }
}

pub async fn load_mesh_obj(file_name: &str) -> Result<MeshRecord> {
    let obj_text = load_string(file_name)
        .await
        .map_err(|e| not_found(file_name, e))?;
    let mut obj_reader = BufReader::new(Cursor::new(obj_text));

    // Materials are resolved by the material collaborator, not here
    let (models, _) = tobj::load_obj_buf_async(
        &mut obj_reader,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        |p| async move {
            log::debug!("Ignoring material library {p}");
            Err(tobj::LoadError::OpenFileFailed)
        },
    )
    .await
    .map_err(|e| parse_error(file_name, e))?;

    let mut vertices = Vec::new();
    let mut has_tangents = true;
    for m in &models {
        let table = obj_vertex_table(&m.mesh);
        has_tangents &= !m.mesh.texcoords.is_empty();
        vertices.extend(
            m.mesh
                .indices
                .chunks_exact(3)
                .flat_map(|c| c.iter().map(|&i| table[i as usize])),
        );
    }
    if models.is_empty() {
        has_tangents = false;
    }
    Ok(MeshRecord::new(vertices, has_tangents))
}

/**
 * Obj files don't come with tangents and bitangents so they have to be calculated for
 * normal maps to work correctly. The result is the indexed vertex table; tangents of
 * vertices shared by several triangles are averaged.
 */
fn obj_vertex_table(mesh: &tobj::Mesh) -> Vec<ModelVertex> {
    let mut vertices = (0..mesh.positions.len() / 3)
        .map(|i| ModelVertex {
            position: [
                mesh.positions[i * 3],
                mesh.positions[i * 3 + 1],
                mesh.positions[i * 3 + 2],
            ],
            tex_coords: [
                mesh.texcoords.get(i * 2).map_or(0.0, |f| *f),
                1.0 - mesh.texcoords.get(i * 2 + 1).map_or(0.0, |f| *f),
            ],
            normal: [
                mesh.normals.get(i * 3).map_or(0.0, |f| *f),
                mesh.normals.get(i * 3 + 1).map_or(0.0, |f| *f),
                mesh.normals.get(i * 3 + 2).map_or(0.0, |f| *f),
            ],
            // We'll calculate these later
            tangent: [0.0; 3],
            bitangent: [0.0; 3],
        })
        .collect::<Vec<_>>();

    if mesh.texcoords.is_empty() {
        return vertices;
    }

    let mut triangles_included = vec![0; vertices.len()];
    for c in mesh.indices.chunks_exact(3) {
        let v0 = vertices[c[0] as usize];
        let v1 = vertices[c[1] as usize];
        let v2 = vertices[c[2] as usize];

        let pos0: cgmath::Vector3<_> = v0.position.into();
        let pos1: cgmath::Vector3<_> = v1.position.into();
        let pos2: cgmath::Vector3<_> = v2.position.into();

        let uv0: cgmath::Vector2<_> = v0.tex_coords.into();
        let uv1: cgmath::Vector2<_> = v1.tex_coords.into();
        let uv2: cgmath::Vector2<_> = v2.tex_coords.into();

        let delta_pos1 = pos1 - pos0;
        let delta_pos2 = pos2 - pos0;
        let delta_uv1 = uv1 - uv0;
        let delta_uv2 = uv2 - uv0;

        //     delta_pos1 = delta_uv1.x * T + delta_uv1.y * B
        //     delta_pos2 = delta_uv2.x * T + delta_uv2.y * B
        let det = delta_uv1.x * delta_uv2.y - delta_uv1.y * delta_uv2.x;
        if det.abs() <= f32::EPSILON {
            continue;
        }
        let r = 1.0 / det;
        let tangent = (delta_pos1 * delta_uv2.y - delta_pos2 * delta_uv1.y) * r;
        // We flip the bitangent to enable right-handed normal
        // maps with wgpu texture coordinate system
        let bitangent = (delta_pos2 * delta_uv1.x - delta_pos1 * delta_uv2.x) * -r;

        for &i in c {
            let v = &mut vertices[i as usize];
            v.tangent = (tangent + cgmath::Vector3::from(v.tangent)).into();
            v.bitangent = (bitangent + cgmath::Vector3::from(v.bitangent)).into();
            triangles_included[i as usize] += 1;
        }
    }

    // Average the tangents/bitangents
    for (i, n) in triangles_included.into_iter().enumerate() {
        if n == 0 {
            continue;
        }
        let denom = 1.0 / n as f32;
        let v = &mut vertices[i];
        v.tangent = (cgmath::Vector3::from(v.tangent) * denom).into();
        v.bitangent = (cgmath::Vector3::from(v.bitangent) * denom).into();
    }
    vertices
}

pub async fn load_mesh_gltf(file_name: &str) -> Result<MeshRecord> {
    let gltf_bytes = load_binary(file_name)
        .await
        .map_err(|e| not_found(file_name, e))?;
    let gltf = gltf::Gltf::from_slice(&gltf_bytes).map_err(|e| parse_error(file_name, e))?;

    let mut buffer_data: Vec<Vec<u8>> = Vec::new();
    for buffer in gltf.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => {
                let blob = gltf
                    .blob
                    .as_deref()
                    .ok_or_else(|| parse_error(file_name, "missing binary chunk"))?;
                buffer_data.push(blob.into());
            }
            gltf::buffer::Source::Uri(uri) => {
                let bin = load_binary(uri).await.map_err(|e| not_found(uri, e))?;
                buffer_data.push(bin);
            }
        }
    }

    let mut vertices = Vec::new();
    let mut has_tangents = true;
    let mut primitive_count = 0;
    for mesh in gltf.meshes() {
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::warn!(
                    "Skipping non-triangle primitive of mesh {:?} in {}",
                    mesh.name(),
                    file_name
                );
                continue;
            }
            primitive_count += 1;
            let reader = primitive.reader(|buffer| buffer_data.get(buffer.index()).map(Vec::as_slice));

            let mut table: Vec<ModelVertex> = match reader.read_positions() {
                Some(positions) => positions
                    .map(|position| ModelVertex {
                        position,
                        ..Default::default()
                    })
                    .collect(),
                None => continue,
            };
            if let Some(normals) = reader.read_normals() {
                table.iter_mut().zip(normals).for_each(|(v, n)| v.normal = n);
            }
            if let Some(tex_coords) = reader.read_tex_coords(0).map(|v| v.into_f32()) {
                table
                    .iter_mut()
                    .zip(tex_coords)
                    .for_each(|(v, uv)| v.tex_coords = uv);
            }
            match reader.read_tangents() {
                Some(tangents) => table.iter_mut().zip(tangents).for_each(|(v, tangent)| {
                    // GLTF represents tangents as vec4 where the 4th elem can be used to calculate the bitangent
                    let tangent: cgmath::Vector4<f32> = tangent.into();
                    v.tangent = tangent.truncate().into();
                    let normal: cgmath::Vector3<f32> = v.normal.into();
                    v.bitangent = (normal.cross(tangent.truncate()) * tangent[3]).into();
                }),
                None => has_tangents = false,
            }

            let indices: Vec<u32> = match reader.read_indices() {
                Some(indices) => indices.into_u32().collect(),
                None => (0..table.len() as u32).collect(),
            };
            for &i in &indices {
                let v = table
                    .get(i as usize)
                    .ok_or_else(|| parse_error(file_name, format!("index {i} out of range")))?;
                vertices.push(*v);
            }
        }
    }
    if primitive_count == 0 {
        has_tangents = false;
    }
    Ok(MeshRecord::new(vertices, has_tangents))
}
