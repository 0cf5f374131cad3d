use chunk_ngin::{
    data_structures::mesh_store::MeshStore,
    error::EngineError,
    resources::primitives,
};

#[test]
fn builtin_primitives_are_registered() {
    let store = MeshStore::new();
    assert_eq!(store.len(), 3);

    let cube = store.get(primitives::CUBE).unwrap();
    assert_eq!(cube.vertex_count(), 36);
    assert_eq!(cube.triangle_count(), 12);
    assert_eq!(cube.unique_points().len(), 8);
    assert_eq!(cube.point_indices().len(), 36);
    assert!(!cube.has_tangents());

    for key in [primitives::PLANE, primitives::QUAD] {
        let record = store.get(key).unwrap();
        assert_eq!(record.vertex_count(), 6);
        assert_eq!(record.unique_points().len(), 4);
    }
    assert!(MeshStore::empty().is_empty());
}

#[test]
fn cube_faces_point_outwards() {
    let cube = primitives::cube();
    for tri in cube.vertices().chunks_exact(3) {
        let normal: cgmath::Vector3<f32> = tri[0].normal.into();
        // every corner of a face lies on the side its normal points to
        for v in tri {
            let p: cgmath::Vector3<f32> = v.position.into();
            assert_eq!(cgmath::dot(p, normal), 1.0);
            assert_eq!(v.normal, tri[0].normal);
        }
    }
}

#[test]
fn point_indices_reference_unique_points() {
    let cube = primitives::cube();
    for (vertex, &index) in cube.vertices().iter().zip(cube.point_indices()) {
        assert_eq!(cube.unique_points()[index as usize], vertex.position);
    }
}

#[test]
fn runtime_mesh_is_flat_shaded() {
    let mut store = MeshStore::new();
    let points = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
    let triangles = [[0, 1, 2], [0, 3, 1]];

    let key = store.create_runtime(&points, &triangles).unwrap();
    let other = store.create_runtime(&points, &triangles).unwrap();
    assert_ne!(key, other);
    assert_eq!(store.len(), 5);

    let record = store.get(&key).unwrap();
    assert_eq!(record.vertex_count(), 6);
    assert_eq!(record.unique_points().len(), 4);

    let rows = record.vertices();
    for v in &rows[..3] {
        assert_eq!(v.normal, [0.0, 0.0, 1.0]);
    }
    for v in &rows[3..] {
        assert_eq!(v.normal, [0.0, 1.0, 0.0]);
    }
    let uvs: Vec<_> = rows[..3].iter().map(|v| v.tex_coords).collect();
    assert_eq!(uvs, vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]);
}

#[test]
fn tiny_triangle_keeps_its_normal() {
    let points = [[0.0, 0.0, 0.0], [1e-4, 0.0, 0.0], [0.0, 1e-4, 0.0]];
    let record = primitives::flat_shaded(&points, &[[0, 1, 2]]).unwrap();
    for v in record.vertices() {
        assert!((v.normal[2] - 1.0).abs() < 1e-6);
        assert_eq!(v.normal[0], 0.0);
        assert_eq!(v.normal[1], 0.0);
    }
}

#[test]
fn degenerate_triangle_gets_zero_normal() {
    let points = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]];
    let record = primitives::flat_shaded(&points, &[[0, 1, 2]]).unwrap();
    assert!(record.vertices().iter().all(|v| v.normal == [0.0; 3]));
}

#[test]
fn out_of_range_triangle_is_rejected() {
    let mut store = MeshStore::new();
    let points = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
    let err = store
        .create_runtime(&points, &[[0, 1, 2], [0, 1, 7]])
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::InvalidTriangle {
            triangle: 1,
            index: 7,
            points: 3
        }
    ));
    assert_eq!(store.len(), 3);
}

#[test]
fn unknown_mesh_lookup_fails() {
    let store = MeshStore::new();
    assert!(matches!(store.get("teapot"), Err(EngineError::UnknownMesh(key)) if key == "teapot"));
    assert!(!store.contains("teapot"));
}

#[test]
fn loads_obj_from_assets() {
    let mut store = MeshStore::new();
    pollster::block_on(store.load("pyramid", "pyramid.obj")).unwrap();

    let record = store.get("pyramid").unwrap();
    // one quad base split in two plus four sides
    assert_eq!(record.triangle_count(), 6);
    assert_eq!(record.unique_points().len(), 5);
    assert!(!record.has_tangents());
}

#[test]
fn missing_and_unsupported_assets_are_skipped() {
    let mut store = MeshStore::new();

    let missing = pollster::block_on(store.load("ghost", "does-not-exist.obj"));
    assert!(matches!(missing, Err(EngineError::AssetNotFound { .. })));

    let unsupported = pollster::block_on(store.load("fbx", "model.fbx"));
    assert!(matches!(unsupported, Err(EngineError::UnsupportedAsset(_))));
    assert!(unsupported.unwrap_err().is_recoverable());

    assert!(!store.contains("ghost"));
    assert!(!store.contains("fbx"));
    assert_eq!(store.len(), 3);
}

#[test]
fn partial_triangle_is_dropped() {
    use chunk_ngin::data_structures::model::{MeshRecord, ModelVertex};

    let v = ModelVertex::new([0.0; 3], [0.0; 2], [0.0, 1.0, 0.0]);
    let record = MeshRecord::new(vec![v; 5], false);
    assert_eq!(record.vertex_count(), 3);
    assert_eq!(record.unique_points().len(), 1);
}
