//! Splitting a mesh into chunks under a vertex budget.
//!
//! Targets with 16-bit index buffers cannot draw more than ~65k vertices
//! per call. A chunk is a contiguous face range whose face-vertex count
//! stays within the budget; its buffers are per-face-vertex, so the chunk's
//! vertex count equals its face-vertex count and its indices start at 0.

use crate::core::GeometryScope;
use crate::geom::topology::{clamp_index, face_len, fan_face_vertices, triangle_count};
use crate::geom::PolyMesh;
use crate::util::{check_len, mirror_x, Error, Result, Vec2, Vec3};

/// A contiguous range of faces forming one chunk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SplitMeshInfo {
    /// First face of the chunk.
    pub begin_face: usize,
    /// Number of faces.
    pub num_faces: usize,
    /// First face-vertex of the chunk.
    pub begin_index: usize,
    /// Number of face-vertices.
    pub num_indices: usize,
    /// Number of output vertices (one per face-vertex).
    pub num_vertices: usize,
    /// Index count after fan triangulation.
    pub triangulated_index_count: usize,
}

impl SplitMeshInfo {
    /// One past the last face.
    pub fn end_face(&self) -> usize {
        self.begin_face + self.num_faces
    }

    /// One past the last face-vertex.
    pub fn end_index(&self) -> usize {
        self.begin_index + self.num_indices
    }
}

/// Compute the chunk following `prev` (pass `None` for the first chunk).
///
/// Faces are added greedily while the face-vertex count stays within
/// `max_vertices`. Returns the chunk and whether it reaches the last face.
/// A face with more vertices than the budget fails with
/// [`Error::FaceExceedsBudget`].
///
/// A chunk may fill the budget exactly (`<=`). Breaking as soon as the
/// count reaches the budget would never place a face whose size equals it,
/// so every chunk covering the faces exactly once requires the inclusive
/// bound.
pub fn next_split(face_counts: &[i32], prev: Option<&SplitMeshInfo>, max_vertices: usize) -> Result<(SplitMeshInfo, bool)> {
    let (begin_face, begin_index) = prev.map_or((0, 0), |p| (p.end_face(), p.end_index()));
    let mut info = SplitMeshInfo {
        begin_face,
        begin_index,
        ..Default::default()
    };

    let mut face = begin_face;
    while face < face_counts.len() {
        let len = face_len(face_counts[face]);
        if info.num_indices + len > max_vertices {
            break;
        }
        info.num_indices += len;
        info.triangulated_index_count += len.saturating_sub(2) * 3;
        face += 1;
    }
    info.num_faces = face - begin_face;
    info.num_vertices = info.num_indices;

    let is_end = face >= face_counts.len();
    if !is_end && info.num_faces == 0 {
        return Err(Error::FaceExceedsBudget {
            face,
            vertices: face_len(face_counts[face]),
            budget: max_vertices,
        });
    }
    Ok((info, is_end))
}

/// Iterator over all chunks of a mesh.
pub struct SplitChunks<'a> {
    face_counts: &'a [i32],
    max_vertices: usize,
    prev: Option<SplitMeshInfo>,
    done: bool,
}

impl<'a> SplitChunks<'a> {
    /// Chunk `face_counts` under `max_vertices`.
    pub fn new(face_counts: &'a [i32], max_vertices: usize) -> Self {
        Self { face_counts, max_vertices, prev: None, done: false }
    }
}

impl Iterator for SplitChunks<'_> {
    type Item = Result<SplitMeshInfo>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match next_split(self.face_counts, self.prev.as_ref(), self.max_vertices) {
            Ok((info, is_end)) => {
                self.done = is_end;
                self.prev = Some(info);
                Some(Ok(info))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

// ============================================================================
// PolyMesh Operations
// ============================================================================

impl PolyMesh {
    /// Chunk following `prev` over the cached topology.
    pub fn split_mesh_info(&self, prev: Option<&SplitMeshInfo>, max_vertices: usize) -> Result<(SplitMeshInfo, bool)> {
        next_split(self.sample().face_counts(), prev, max_vertices)
    }

    /// Iterate every chunk in order.
    pub fn split_chunks(&self, max_vertices: usize) -> SplitChunks<'_> {
        SplitChunks::new(self.sample().face_counts(), max_vertices)
    }

    fn split_counts(&self, info: &SplitMeshInfo) -> Result<&[i32]> {
        self.sample()
            .face_counts()
            .get(info.begin_face..info.end_face())
            .ok_or_else(|| Error::other(format!("chunk faces {}..{} out of range", info.begin_face, info.end_face())))
    }

    /// Write chunk-local fan triangle indices.
    pub fn copy_split_indices(&self, dst: &mut [u32], info: &SplitMeshInfo) -> Result<usize> {
        let counts = self.split_counts(info)?;
        debug_assert_eq!(triangle_count(counts) * 3, info.triangulated_index_count);
        fan_face_vertices(counts, self.flags().reverse_winding, dst)
    }

    /// Write one position per face-vertex of the chunk.
    pub fn copy_split_vertices(&self, dst: &mut [Vec3], info: &SplitMeshInfo) -> Result<usize> {
        let sample = self.sample();
        let indices = chunk_slice(sample.face_indices(), info)?;
        let positions = sample.positions();
        let mirror = self.flags().mirror_x;
        check_len(dst, indices.len())?;

        for (d, &i) in dst.iter_mut().zip(indices) {
            let p = positions.get(clamp_index(i) as usize).copied().unwrap_or(Vec3::ZERO);
            *d = if mirror { mirror_x(p) } else { p };
        }
        Ok(indices.len())
    }

    /// Write one normal per face-vertex of the chunk. Returns `Ok(0)` when
    /// the normal mode yields no normals.
    pub fn copy_split_normals(&self, dst: &mut [Vec3], info: &SplitMeshInfo) -> Result<usize> {
        let sample = self.sample();
        let Some(normals) = self.output_normals() else { return Ok(0) };
        let mirror = self.flags().mirror_x;
        check_len(dst, info.num_indices)?;

        let range = info.begin_index..info.end_index();
        if normals.scope == GeometryScope::FaceVarying {
            for (d, fv) in dst.iter_mut().zip(range) {
                let n = normals.get(fv).copied().unwrap_or(Vec3::ZERO);
                *d = if mirror { mirror_x(n) } else { n };
            }
        } else {
            let indices = chunk_slice(sample.face_indices(), info)?;
            for (d, &i) in dst.iter_mut().zip(indices) {
                let n = normals.get(clamp_index(i) as usize).copied().unwrap_or(Vec3::ZERO);
                *d = if mirror { mirror_x(n) } else { n };
            }
        }
        Ok(info.num_indices)
    }

    /// Write one UV per face-vertex of the chunk. Returns `Ok(0)` when the
    /// mesh has no UVs.
    pub fn copy_split_uvs(&self, dst: &mut [Vec2], info: &SplitMeshInfo) -> Result<usize> {
        let Some(uvs) = self.sample().uvs() else { return Ok(0) };
        check_len(dst, info.num_indices)?;
        for (d, fv) in dst.iter_mut().zip(info.begin_index..info.end_index()) {
            *d = uvs.get(fv).copied().unwrap_or(Vec2::ZERO);
        }
        Ok(info.num_indices)
    }
}

fn chunk_slice<'a>(face_indices: &'a [i32], info: &SplitMeshInfo) -> Result<&'a [i32]> {
    face_indices
        .get(info.begin_index..info.end_index())
        .ok_or_else(|| Error::other(format!("chunk face-vertices {}..{} out of range", info.begin_index, info.end_index())))
}
