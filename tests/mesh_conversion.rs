//! Integration tests for converting in-memory meshes into buffers.

use alembic_importer::memory::{MemArchive, NodeDesc, ParamDesc, PolyMeshDesc, SceneDesc, SchemaDesc, XformDesc, XformSampleDesc};
use alembic_importer::prelude::*;

fn positions(n: usize) -> Vec<Vec3> {
    (0..n).map(|i| Vec3::new(i as f32 + 1.0, i as f32 * 0.5, -(i as f32))).collect()
}

fn session_with(root: NodeDesc, settings: ImportSettings) -> Session {
    let desc = SceneDesc { name: "test".into(), time_sampling: TimeSampling::Identity, root };
    let mut session = Session::new(settings);
    session.load_archive(Box::new(MemArchive::from_desc("test", desc)));
    let stats = session.update().expect("update failed");
    assert_eq!(stats.failed, 0);
    session
}

fn single_mesh(mesh: PolyMeshDesc, settings: ImportSettings) -> Session {
    session_with(NodeDesc::new("ABC").with_child(NodeDesc::polymesh("mesh", mesh)), settings)
}

fn mesh_of(session: &Session) -> &PolyMesh {
    let id = session.find("/mesh").expect("mesh not found");
    session.object(id).and_then(|o| o.polymesh()).expect("not a mesh")
}

fn mixed_mesh() -> PolyMeshDesc {
    PolyMeshDesc::constant(vec![4, 3, 5], (0..12).collect(), positions(12))
}

#[test]
fn test_mixed_faces_triangulated() {
    let session = single_mesh(mixed_mesh(), ImportSettings::default());
    let mesh = mesh_of(&session);

    assert_eq!(mesh.triangle_count(), 6);
    assert_eq!(mesh.index_count(), 18);

    let mut indices = vec![0u32; mesh.index_count()];
    assert_eq!(mesh.copy_indices(&mut indices).unwrap(), 18);
    assert_eq!(&indices[0..3], &[0, 1, 2]);
    assert_eq!(&indices[3..6], &[0, 2, 3]);
    assert_eq!(&indices[6..9], &[4, 5, 6]);
    assert_eq!(&indices[9..18], &[7, 8, 9, 7, 9, 10, 7, 10, 11]);
}

#[test]
fn test_mixed_faces_reversed_and_raw() {
    let settings = ImportSettings { swap_face_winding: true, ..Default::default() };
    let session = single_mesh(mixed_mesh(), settings);
    let mesh = mesh_of(&session);

    let mut indices = vec![0u32; mesh.index_count()];
    mesh.copy_indices(&mut indices).unwrap();
    assert_eq!(&indices[0..6], &[0, 2, 1, 0, 3, 2]);

    let settings = ImportSettings { force_triangulate: false, swap_face_winding: true, ..Default::default() };
    let session = single_mesh(mixed_mesh(), settings);
    let mesh = mesh_of(&session);
    assert_eq!(mesh.index_count(), 12);

    let mut raw = vec![0u32; mesh.index_count()];
    assert_eq!(mesh.copy_indices(&mut raw).unwrap(), 12);
    let expected: Vec<u32> = (0..12).rev().collect();
    assert_eq!(raw, expected);
}

#[test]
fn test_copy_into_short_buffer() {
    let session = single_mesh(mixed_mesh(), ImportSettings::default());
    let mesh = mesh_of(&session);

    let mut indices = vec![0u32; 17];
    assert!(matches!(
        mesh.copy_indices(&mut indices),
        Err(Error::BufferTooSmall { needed: 18, actual: 17 })
    ));
    let mut verts = vec![Vec3::ZERO; 3];
    assert!(mesh.copy_vertices(&mut verts).is_err());
}

#[test]
fn test_mirror_positions() {
    let plain = single_mesh(mixed_mesh(), ImportSettings::default());
    let settings = ImportSettings { swap_handedness: true, ..Default::default() };
    let mirrored = single_mesh(mixed_mesh(), settings);

    let a = mesh_of(&plain);
    let b = mesh_of(&mirrored);
    let mut pa = vec![Vec3::ZERO; a.vertex_count()];
    let mut pb = vec![Vec3::ZERO; b.vertex_count()];
    a.copy_vertices(&mut pa).unwrap();
    b.copy_vertices(&mut pb).unwrap();

    for (p, q) in pa.iter().zip(&pb) {
        assert_eq!(q.x, -p.x);
        assert_eq!(q.y, p.y);
        assert_eq!(q.z, p.z);
    }
}

#[test]
fn test_faceset_with_default() {
    // three triangles over a shared strip
    let mesh = PolyMeshDesc::constant(vec![3, 3, 3], vec![0, 1, 2, 1, 3, 2, 2, 3, 4], positions(5));
    let mut session = single_mesh(mesh, ImportSettings::default());
    let id = session.find("/mesh").unwrap();
    let mesh = session.object_mut(id).and_then(|o| o.polymesh_mut()).unwrap();

    let sets = FaceSetSpec::new(vec![2, 0], vec![0, 1]);
    assert_eq!(mesh.prepare_submeshes(Some(&sets)), 2);

    let subs = mesh.submeshes();
    assert_eq!(subs[0].faces(), Some(&[0usize, 1][..]));
    assert_eq!(subs[1].faces(), Some(&[2usize][..]));
    assert_eq!(subs[0].faceset_index, 0);
    assert_eq!(subs[1].faceset_index, 1);

    let infos: Vec<SubmeshInfo> = mesh.submesh_infos().collect();
    assert_eq!(infos.len(), 2);
    assert_eq!(infos[0].triangle_count, 2);
    assert_eq!(infos[1].triangle_count, 1);

    // second submesh addresses the third face's slots in the face-vertex buffer
    let mut dst = vec![0u32; infos[1].index_count()];
    assert_eq!(mesh.fill_submesh_indices(&mut dst, &infos[1]).unwrap(), 3);
    assert_eq!(dst, vec![6, 7, 8]);

    // restartable
    assert_eq!(mesh.submesh_infos().count(), 2);
}

#[test]
fn test_submeshes_by_uv_tile() {
    let uvs: Vec<Vec2> = [0.2, 0.2, 0.2, 0.2, 1.5, 1.5, 1.5, 0.3, 0.3, 0.3, 0.3, 0.3]
        .iter()
        .map(|&u| Vec2::new(u, 0.5))
        .collect();
    let mesh = mixed_mesh().with_uvs(ParamDesc::constant(GeometryScope::FaceVarying, uvs, None));
    let mut session = single_mesh(mesh, ImportSettings::default());
    let id = session.find("/mesh").unwrap();
    let mesh = session.object_mut(id).and_then(|o| o.polymesh_mut()).unwrap();
    assert!(mesh.has_uvs());

    assert_eq!(mesh.prepare_submeshes(None), 2);
    let subs = mesh.submeshes();
    assert_eq!(subs[0].faces(), Some(&[0usize, 2][..]));
    assert_eq!(subs[1].faces(), Some(&[1usize][..]));

    // triangle counts across submeshes cover the mesh
    let total: usize = mesh.submesh_infos().map(|i| i.triangle_count).sum();
    assert_eq!(total, mesh.triangle_count());
}

#[test]
fn test_whole_mesh_submesh() {
    let mut session = single_mesh(mixed_mesh(), ImportSettings::default());
    let id = session.find("/mesh").unwrap();
    let mesh = session.object_mut(id).and_then(|o| o.polymesh_mut()).unwrap();

    assert_eq!(mesh.prepare_submeshes(None), 1);
    assert!(mesh.submeshes()[0].faces().is_none());

    let info = mesh.submesh_info(0).unwrap();
    let mut dst = vec![0u32; info.index_count()];
    mesh.fill_submesh_indices(&mut dst, &info).unwrap();

    let buffers = mesh.build_buffers().unwrap();
    assert_eq!(dst, buffers.indices);

    let stale = SubmeshInfo { index: 5, ..info };
    assert!(matches!(
        mesh.fill_submesh_indices(&mut dst, &stale),
        Err(Error::SubmeshOutOfRange { index: 5, count: 1 })
    ));
}

#[test]
fn test_vertex_buffer_with_vertex_normals() {
    let quad = PolyMeshDesc::constant(vec![4], vec![3, 2, 1, 0], positions(4))
        .with_normals(ParamDesc::constant(GeometryScope::Vertex, vec![Vec3::X, Vec3::Y, Vec3::Z, Vec3::NEG_X], None));
    let settings = ImportSettings { swap_handedness: true, ..Default::default() };
    let session = single_mesh(quad, settings);
    let mesh = mesh_of(&session);

    assert_eq!(mesh.vertex_buffer_length(), 4);
    let mut p = vec![Vec3::ZERO; 4];
    let mut n = vec![Vec3::ZERO; 4];
    mesh.fill_vertex_buffer(&mut p, Some(&mut n), None).unwrap();

    let src = positions(4);
    assert_eq!(p[0], Vec3::new(-src[3].x, src[3].y, src[3].z));
    // vertex-scoped normals follow the face vertex indices, mirrored
    assert_eq!(n, vec![Vec3::X, Vec3::Z, Vec3::Y, Vec3::NEG_X]);

    let buffers = mesh.build_buffers().unwrap();
    assert_eq!(buffers.triangle_count(), 2);
    assert!(buffers.uvs.is_none());
    assert_eq!(buffers.interleaved().len(), 4);

    // chunks read vertex-scoped normals through the face indices too
    let chunk = mesh.split_chunks(4).next().unwrap().unwrap();
    let mut split = vec![Vec3::ZERO; chunk.num_vertices];
    assert_eq!(mesh.copy_split_normals(&mut split, &chunk).unwrap(), 4);
    assert_eq!(split, n);
}

// ============================================================================
// Face-Varying Attributes
// ============================================================================

/// Triangle, quad, triangle. Face-varying UVs put the faces in tiles
/// `tiles[face]` and normals are indexed back to front.
fn striped_mesh(tiles: [f32; 3]) -> PolyMeshDesc {
    let counts = [3usize, 4, 3];
    let uvs: Vec<Vec2> = counts
        .iter()
        .zip(tiles)
        .flat_map(|(&n, u)| std::iter::repeat(u).take(n))
        .enumerate()
        .map(|(fv, u)| Vec2::new(u, fv as f32 * 0.05))
        .collect();
    let normals: Vec<Vec3> = (0..10).map(|k| Vec3::new(k as f32 + 1.0, 2.0, 3.0)).collect();
    PolyMeshDesc::constant(vec![3, 4, 3], vec![0, 1, 2, 1, 3, 4, 2, 3, 5, 4], positions(6))
        .with_uvs(ParamDesc::constant(GeometryScope::FaceVarying, uvs, None))
        .with_normals(ParamDesc::constant(GeometryScope::FaceVarying, normals, Some((0..10).rev().collect())))
}

/// Mirrored normal bound to face-vertex `fv` of [`striped_mesh`].
fn striped_normal(fv: usize) -> Vec3 {
    Vec3::new(-(10.0 - fv as f32), 2.0, 3.0)
}

fn mirrored_reversed() -> ImportSettings {
    ImportSettings { swap_handedness: true, swap_face_winding: true, ..Default::default() }
}

#[test]
fn test_face_varying_buffers_by_faceset_and_tile() {
    let mut session = single_mesh(striped_mesh([0.2, 1.5, 0.4]), mirrored_reversed());
    let id = session.find("/mesh").unwrap();
    let mesh = session.object_mut(id).and_then(|o| o.polymesh_mut()).unwrap();

    // face 2 in set 0, the rest fall to the empty default set 1
    let sets = FaceSetSpec::from_sets(&[vec![2], vec![]]);
    assert_eq!(mesh.prepare_submeshes(Some(&sets)), 3);

    let infos: Vec<SubmeshInfo> = mesh.submesh_infos().collect();
    let facesets: Vec<i32> = infos.iter().map(|i| i.faceset_index).collect();
    assert_eq!(facesets, vec![1, 1, 0]);

    let submesh_indices: Vec<Vec<u32>> = infos
        .iter()
        .map(|info| {
            let mut dst = vec![0u32; info.index_count()];
            mesh.fill_submesh_indices(&mut dst, info).unwrap();
            dst
        })
        .collect();
    assert_eq!(submesh_indices, vec![vec![0, 2, 1], vec![3, 5, 4, 3, 6, 5], vec![7, 9, 8]]);

    let len = mesh.vertex_buffer_length();
    assert_eq!(len, 10);
    let mut p = vec![Vec3::ZERO; len];
    let mut n = vec![Vec3::ZERO; len];
    let mut uv = vec![Vec2::ZERO; len];
    mesh.fill_vertex_buffer(&mut p, Some(&mut n), Some(&mut uv)).unwrap();

    let src = positions(6);
    let face_indices = mesh.sample().face_indices().to_vec();
    for fv in 0..len {
        let q = src[face_indices[fv] as usize];
        assert_eq!(p[fv], Vec3::new(-q.x, q.y, q.z), "fv {}", fv);
        assert_eq!(n[fv], striped_normal(fv), "fv {}", fv);
        assert_eq!(uv[fv].y, fv as f32 * 0.05);
    }
    // every corner a submesh addresses carries that submesh's tile
    for (indices, tile) in submesh_indices.iter().zip([0.0, 1.0, 0.0]) {
        assert!(indices.iter().all(|&i| uv[i as usize].x.floor() == tile));
    }

    // UVs only: same positions and UVs, normals untouched
    let mut p2 = vec![Vec3::ZERO; len];
    let mut uv2 = vec![Vec2::ZERO; len];
    mesh.fill_vertex_buffer(&mut p2, None, Some(&mut uv2)).unwrap();
    assert_eq!(p2, p);
    assert_eq!(uv2, uv);

    let buffers = mesh.build_buffers().unwrap();
    assert_eq!(buffers.normals.as_deref(), Some(&n[..]));
    assert_eq!(buffers.uvs.as_deref(), Some(&uv[..]));
}

#[test]
fn test_tile_submesh_with_gap_reversed() {
    // faces 0 and 2 share tile 0 around face 1 in tile 1
    let mut session = single_mesh(striped_mesh([0.2, 1.5, 0.7]), mirrored_reversed());
    let id = session.find("/mesh").unwrap();
    let mesh = session.object_mut(id).and_then(|o| o.polymesh_mut()).unwrap();

    assert_eq!(mesh.prepare_submeshes(None), 2);
    assert_eq!(mesh.submeshes()[0].faces(), Some(&[0usize, 2][..]));

    let mut dst = Vec::new();
    for info in mesh.submesh_infos() {
        let mut part = vec![0u32; info.index_count()];
        assert_eq!(mesh.fill_submesh_indices(&mut part, &info).unwrap(), info.index_count());
        assert_eq!(info.faceset_index, -1);
        dst.push(part);
    }
    assert_eq!(dst, vec![vec![0, 2, 1, 7, 9, 8], vec![3, 5, 4, 3, 6, 5]]);
}

#[test]
fn test_split_face_varying_attributes() {
    let session = single_mesh(striped_mesh([0.2, 1.5, 0.4]), mirrored_reversed());
    let mesh = mesh_of(&session);

    let mut uv = vec![Vec2::ZERO; 10];
    mesh.fill_vertex_buffer(&mut vec![Vec3::ZERO; 10], None, Some(&mut uv)).unwrap();

    // the triangle and the quad fill the budget exactly
    let chunks: Vec<SplitMeshInfo> = mesh.split_chunks(7).collect::<Result<_>>().unwrap();
    assert_eq!(chunks.len(), 2);
    assert_eq!((chunks[0].num_faces, chunks[0].num_vertices), (2, 7));
    assert_eq!((chunks[1].begin_index, chunks[1].num_vertices), (7, 3));

    for chunk in &chunks {
        let range = chunk.begin_index..chunk.end_index();

        let mut uvs = vec![Vec2::ZERO; chunk.num_vertices];
        assert_eq!(mesh.copy_split_uvs(&mut uvs, chunk).unwrap(), chunk.num_vertices);
        assert_eq!(uvs, &uv[range.clone()]);

        let mut normals = vec![Vec3::ZERO; chunk.num_vertices];
        assert_eq!(mesh.copy_split_normals(&mut normals, chunk).unwrap(), chunk.num_vertices);
        let expected: Vec<Vec3> = range.map(striped_normal).collect();
        assert_eq!(normals, expected);
    }

    let mut idx = vec![0u32; chunks[0].triangulated_index_count];
    mesh.copy_split_indices(&mut idx, &chunks[0]).unwrap();
    assert_eq!(idx, vec![0, 2, 1, 3, 5, 4, 3, 6, 5]);

    let mut short = vec![Vec2::ZERO; 6];
    assert!(mesh.copy_split_uvs(&mut short, &chunks[0]).is_err());
}

// ============================================================================
// Normal Modes
// ============================================================================

/// Unit quad in the YZ plane facing +X.
fn wall(normals: Option<Vec3>) -> PolyMeshDesc {
    let points = vec![Vec3::ZERO, Vec3::Y, Vec3::new(0.0, 1.0, 1.0), Vec3::Z];
    let mesh = PolyMeshDesc::constant(vec![4], vec![0, 1, 2, 3], points);
    match normals {
        Some(n) => mesh.with_normals(ParamDesc::constant(GeometryScope::Vertex, vec![n; 4], None)),
        None => mesh,
    }
}

fn wall_normals(mesh: PolyMeshDesc, mode: NormalMode) -> Option<Vec<Vec3>> {
    let settings = ImportSettings { normal_mode: mode, ..Default::default() };
    let session = single_mesh(mesh, settings);
    mesh_of(&session).build_buffers().unwrap().normals
}

#[test]
fn test_normal_modes() {
    let computed = Some(vec![Vec3::X; 4]);
    let file = Some(vec![Vec3::Y; 4]);

    assert_eq!(wall_normals(wall(None), NormalMode::ComputeIfMissing), computed);
    assert_eq!(wall_normals(wall(None), NormalMode::AlwaysCompute), computed);
    assert_eq!(wall_normals(wall(None), NormalMode::ReadFromFile), None);
    assert_eq!(wall_normals(wall(None), NormalMode::Ignore), None);

    assert_eq!(wall_normals(wall(Some(Vec3::Y)), NormalMode::ComputeIfMissing), file);
    assert_eq!(wall_normals(wall(Some(Vec3::Y)), NormalMode::ReadFromFile), file);
    assert_eq!(wall_normals(wall(Some(Vec3::Y)), NormalMode::AlwaysCompute), computed);
    assert_eq!(wall_normals(wall(Some(Vec3::Y)), NormalMode::Ignore), None);
}

#[test]
fn test_computed_normals_mirrored() {
    let settings = ImportSettings { swap_handedness: true, swap_face_winding: true, ..Default::default() };
    let mut session = single_mesh(wall(None), settings);
    let id = session.find("/mesh").unwrap();
    let mesh = session.object_mut(id).and_then(|o| o.polymesh_mut()).unwrap();
    assert!(!mesh.has_normals());
    assert!(mesh.has_output_normals());

    let mut p = vec![Vec3::ZERO; 4];
    let mut n = vec![Vec3::ZERO; 4];
    mesh.fill_vertex_buffer(&mut p, Some(&mut n), None).unwrap();
    assert_eq!(n, vec![Vec3::NEG_X; 4]);

    let chunk = mesh.split_chunks(4).next().unwrap().unwrap();
    let mut split = vec![Vec3::ZERO; 4];
    assert_eq!(mesh.copy_split_normals(&mut split, &chunk).unwrap(), 4);
    assert_eq!(split, n);

    // switching the mode applies to the cached sample without a refresh
    let flags = MeshFlags { normal_mode: NormalMode::Ignore, ..mesh.flags() };
    mesh.set_flags(flags);
    assert!(!mesh.has_output_normals());
    assert_eq!(mesh.copy_split_normals(&mut split, &chunk).unwrap(), 0);
    assert!(mesh.build_buffers().unwrap().normals.is_none());

    mesh.set_flags(MeshFlags { normal_mode: NormalMode::AlwaysCompute, ..flags });
    assert_eq!(mesh.build_buffers().unwrap().normals, Some(vec![Vec3::NEG_X; 4]));
}

#[test]
fn test_split_chunks_cover_mesh() {
    let counts: Vec<i32> = (0..40).map(|i| 3 + (i % 4)).collect();
    let num_fv: usize = counts.iter().map(|&c| c as usize).sum();
    let mesh = PolyMeshDesc::constant(counts.clone(), (0..num_fv as i32).collect(), positions(num_fv));
    let settings = ImportSettings { normal_mode: NormalMode::ReadFromFile, ..Default::default() };
    let session = single_mesh(mesh, settings);
    let mesh = mesh_of(&session);

    let chunks: Vec<SplitMeshInfo> = mesh.split_chunks(20).collect::<Result<_>>().unwrap();
    assert!(chunks.len() > 1);

    let mut next_face = 0;
    let mut next_index = 0;
    let mut triangles = 0;
    for chunk in &chunks {
        assert_eq!(chunk.begin_face, next_face);
        assert_eq!(chunk.begin_index, next_index);
        assert!(chunk.num_vertices <= 20);
        next_face = chunk.end_face();
        next_index = chunk.end_index();
        triangles += chunk.triangulated_index_count / 3;

        let mut idx = vec![0u32; chunk.triangulated_index_count];
        assert_eq!(mesh.copy_split_indices(&mut idx, chunk).unwrap(), chunk.triangulated_index_count);
        assert!(idx.iter().all(|&i| (i as usize) < chunk.num_vertices));

        let mut verts = vec![Vec3::ZERO; chunk.num_vertices];
        assert_eq!(mesh.copy_split_vertices(&mut verts, chunk).unwrap(), chunk.num_vertices);
        assert_eq!(verts[0], mesh.sample().positions()[chunk.begin_index]);

        // no normals in the file and none computed
        let mut normals = vec![Vec3::ZERO; chunk.num_vertices];
        assert_eq!(mesh.copy_split_normals(&mut normals, chunk).unwrap(), 0);
    }
    assert_eq!(next_face, counts.len());
    assert_eq!(next_index, num_fv);
    assert_eq!(triangles, mesh.triangle_count());
}

#[test]
fn test_split_face_over_budget() {
    let mesh = PolyMeshDesc::constant(vec![3, 8], (0..11).collect(), positions(11));
    let session = single_mesh(mesh, ImportSettings::default());
    let mesh = mesh_of(&session);

    let results: Vec<Result<SplitMeshInfo>> = mesh.split_chunks(5).collect();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].as_ref().unwrap().num_faces, 1);
    assert!(matches!(results[1], Err(Error::FaceExceedsBudget { face: 1, vertices: 8, budget: 5 })));
}

#[test]
fn test_xform_mirrored() {
    let xform = XformDesc {
        time_sampling: None,
        samples: vec![XformSampleDesc {
            translation: Vec3::new(1.0, 2.0, 3.0),
            axis: Vec3::Y,
            angle: 30.0,
            scale: Vec3::splat(2.0),
            inherits: true,
        }],
    };
    let root = NodeDesc::new("ABC").with_child(NodeDesc { name: "xf".into(), schema: SchemaDesc::Xform(xform), children: vec![] });
    let settings = ImportSettings { swap_handedness: true, ..Default::default() };
    let session = session_with(root, settings);

    let id = session.find("/xf").unwrap();
    let xf = session.object(id).and_then(|o| o.xform()).unwrap();
    assert_eq!(xf.position(), Vec3::new(-1.0, 2.0, 3.0));
    assert!((xf.angle() + 30.0).abs() < 1e-3);
    assert!((xf.axis() - Vec3::Y).length() < 1e-4);
    assert_eq!(xf.scale(), Vec3::splat(2.0));
    assert!(xf.inherits());
}
