//! Submesh partitioning by face set and UV tile.
//!
//! [`PolyMesh::prepare_submeshes`] groups faces into submeshes. With UVs,
//! faces are keyed by face set and the integer tile of their average UV:
//!
//! ```text
//! key = faceset * 1_000_000 + floor(u) * 1000 + floor(v)
//! ```
//!
//! Keys assume fewer than 1000 V tiles and U tiles below 1000; tiles outside
//! that range alias with neighbouring keys and their faces share a submesh.
//! Without UVs there is one submesh per face set plus one for unassigned
//! faces, and without face sets the whole mesh is a single submesh.

use std::collections::HashMap;

use crate::core::IndexedSample;
use crate::geom::topology::{face_len, fan_into, triangle_count};
use crate::geom::{FaceSetSpec, PolyMesh};
use crate::util::{check_len, Error, Result, Vec2};

/// Faces covered by a submesh.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmeshFaces {
    /// Every face of the mesh.
    WholeMesh,
    /// An explicit subset.
    Subset {
        /// Face indices, ascending.
        faces: Vec<usize>,
        /// Face-vertex positions owned by the faces, in face order.
        face_vertices: Vec<u32>,
    },
}

/// Group of faces rendered with one index buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Submesh {
    /// Faces in this submesh.
    pub coverage: SubmeshFaces,
    /// Number of fan triangles.
    pub triangle_count: usize,
    /// Face set the faces belong to, -1 for none.
    pub faceset_index: i32,
}

impl Submesh {
    fn subset(faceset_index: i32) -> Self {
        Self {
            coverage: SubmeshFaces::Subset { faces: Vec::new(), face_vertices: Vec::new() },
            triangle_count: 0,
            faceset_index,
        }
    }

    fn push_face(&mut self, face: usize, first_face_vertex: usize, len: usize) {
        if let SubmeshFaces::Subset { faces, face_vertices } = &mut self.coverage {
            faces.push(face);
            face_vertices.extend((first_face_vertex..first_face_vertex + len).map(|fv| fv as u32));
            self.triangle_count += len.saturating_sub(2);
        }
    }

    /// Face indices of the subset, or `None` for the whole mesh.
    pub fn faces(&self) -> Option<&[usize]> {
        match &self.coverage {
            SubmeshFaces::WholeMesh => None,
            SubmeshFaces::Subset { faces, .. } => Some(faces),
        }
    }
}

/// By-value description of a prepared submesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubmeshInfo {
    /// Position in the submesh list.
    pub index: usize,
    /// Number of fan triangles.
    pub triangle_count: usize,
    /// Face set index, -1 for none.
    pub faceset_index: i32,
}

impl SubmeshInfo {
    /// Length of the index buffer for this submesh.
    pub fn index_count(&self) -> usize {
        self.triangle_count * 3
    }
}

/// Tile key of a face from its face set and average UV.
pub fn submesh_key(faceset_index: i32, avg_uv: Vec2) -> i64 {
    // float to int casts saturate, NaN maps to 0
    let u = avg_uv.x.floor() as i64;
    let v = avg_uv.y.floor() as i64;
    i64::from(faceset_index) * 1_000_000 + u * 1000 + v
}

/// Per-face face set assignment. Later listings win; faces outside the mesh
/// are skipped.
fn assign_facesets(spec: &FaceSetSpec, num_faces: usize) -> Vec<i32> {
    let fallback = spec.default_set().map_or(-1, |i| i as i32);
    let mut assignment = vec![fallback; num_faces];
    for (set, faces) in spec.iter().enumerate() {
        for &face in faces {
            match usize::try_from(face).ok().filter(|&f| f < num_faces) {
                Some(f) => assignment[f] = set as i32,
                None => tracing::warn!(face, set, num_faces, "face set lists a face outside the mesh, ignored"),
            }
        }
    }
    assignment
}

/// Partition faces into submeshes.
pub fn partition(face_counts: &[i32], uvs: Option<&IndexedSample<Vec2>>, facesets: Option<&FaceSetSpec>) -> Vec<Submesh> {
    let num_faces = face_counts.len();
    let facesets = facesets.filter(|s| !s.is_empty());
    let uvs = uvs.filter(|u| u.is_valid());

    let assignment = match facesets {
        Some(spec) => assign_facesets(spec, num_faces),
        None if uvs.is_some() => vec![-1; num_faces],
        None => {
            return vec![Submesh {
                coverage: SubmeshFaces::WholeMesh,
                triangle_count: triangle_count(face_counts),
                faceset_index: -1,
            }];
        }
    };

    match uvs {
        Some(uvs) => partition_by_tile(face_counts, uvs, &assignment),
        None => partition_by_faceset(face_counts, &assignment, facesets.map_or(0, FaceSetSpec::len)),
    }
}

fn partition_by_tile(face_counts: &[i32], uvs: &IndexedSample<Vec2>, assignment: &[i32]) -> Vec<Submesh> {
    let mut submeshes: Vec<Submesh> = Vec::new();
    let mut by_key: HashMap<i64, usize> = HashMap::new();
    let mut aliased = false;

    let mut offset = 0usize;
    for (face, &count) in face_counts.iter().enumerate() {
        let len = face_len(count);
        if len == 0 {
            continue;
        }

        let sum: Vec2 = (offset..offset + len)
            .map(|fv| uvs.get(fv).copied().unwrap_or(Vec2::ZERO))
            .sum();
        let avg = sum / len as f32;
        aliased |= !(0.0..1000.0).contains(&avg.y) || avg.x.abs() >= 1000.0;

        let faceset_index = assignment[face];
        let slot = *by_key.entry(submesh_key(faceset_index, avg)).or_insert_with(|| {
            submeshes.push(Submesh::subset(faceset_index));
            submeshes.len() - 1
        });
        submeshes[slot].push_face(face, offset, len);
        offset += len;
    }

    if aliased {
        tracing::warn!("UV tiles outside 0..1000 may share submeshes");
    }
    submeshes
}

fn partition_by_faceset(face_counts: &[i32], assignment: &[i32], num_sets: usize) -> Vec<Submesh> {
    let mut submeshes: Vec<Submesh> = (0..num_sets).map(|i| Submesh::subset(i as i32)).collect();
    let mut overflow: Option<usize> = None;

    let mut offset = 0usize;
    for (face, &count) in face_counts.iter().enumerate() {
        let len = face_len(count);
        if len == 0 {
            continue;
        }
        let slot = match usize::try_from(assignment[face]) {
            Ok(set) => set,
            Err(_) => *overflow.get_or_insert_with(|| {
                submeshes.push(Submesh::subset(-1));
                submeshes.len() - 1
            }),
        };
        submeshes[slot].push_face(face, offset, len);
        offset += len;
    }
    submeshes
}

// ============================================================================
// PolyMesh Operations
// ============================================================================

impl PolyMesh {
    /// Rebuild the submesh list from the cached topology and UVs.
    ///
    /// Returns the number of submeshes.
    pub fn prepare_submeshes(&mut self, facesets: Option<&FaceSetSpec>) -> usize {
        let submeshes = partition(self.sample().face_counts(), self.sample().uvs(), facesets);
        tracing::debug!(count = submeshes.len(), "prepared submeshes");
        self.submeshes = submeshes;
        self.submeshes.len()
    }

    /// Prepared submeshes.
    pub fn submeshes(&self) -> &[Submesh] {
        &self.submeshes
    }

    /// Number of prepared submeshes.
    pub fn submesh_count(&self) -> usize {
        self.submeshes.len()
    }

    /// Descriptor of the submesh at `index`.
    pub fn submesh_info(&self, index: usize) -> Option<SubmeshInfo> {
        self.submeshes.get(index).map(|s| SubmeshInfo {
            index,
            triangle_count: s.triangle_count,
            faceset_index: s.faceset_index,
        })
    }

    /// Iterate descriptors of all prepared submeshes. Call again to restart.
    pub fn submesh_infos(&self) -> impl Iterator<Item = SubmeshInfo> + '_ {
        (0..self.submeshes.len()).filter_map(move |i| self.submesh_info(i))
    }

    /// Write the triangle indices of one submesh into `dst`.
    ///
    /// Indices address the per-face-vertex buffer written by
    /// [`fill_vertex_buffer`](Self::fill_vertex_buffer). Returns the
    /// number of indices written.
    pub fn fill_submesh_indices(&self, dst: &mut [u32], info: &SubmeshInfo) -> Result<usize> {
        let submesh = self.submeshes.get(info.index).ok_or(Error::SubmeshOutOfRange {
            index: info.index,
            count: self.submeshes.len(),
        })?;
        check_len(dst, submesh.triangle_count * 3)?;

        let counts = self.sample().face_counts();
        let reverse = self.flags().reverse_winding;
        let n = match &submesh.coverage {
            SubmeshFaces::WholeMesh => fan_into(counts, reverse, dst, |fv| fv as u32),
            SubmeshFaces::Subset { faces, face_vertices } => {
                let lens: Vec<i32> = faces.iter().map(|&f| counts.get(f).copied().unwrap_or(0)).collect();
                if lens.iter().map(|&c| face_len(c)).sum::<usize>() > face_vertices.len() {
                    // submesh was prepared for a different topology
                    return Err(Error::SubmeshOutOfRange { index: info.index, count: self.submeshes.len() });
                }
                fan_into(&lens, reverse, dst, |fv| face_vertices[fv])
            }
        };
        Ok(n)
    }
}
