//! Triangulation and index/vertex copies for poly meshes.
//!
//! Faces are fan-triangulated from their first vertex: a face with `k`
//! vertices yields triangles `(0, j+1, j+2)` for `j in 0..k-2`, or
//! `(0, j+2, j+1)` when the winding is reversed. Faces with fewer than
//! three vertices produce no triangles.

use crate::geom::PolyMesh;
use crate::util::{check_len, mirror_x, Result, Vec3};

// ============================================================================
// Free Helpers
// ============================================================================

/// Clamp a raw face index to an unsigned buffer index.
#[inline]
pub(crate) fn clamp_index(i: i32) -> u32 {
    i.max(0) as u32
}

/// Number of face-vertices of a face, negative counts read as zero.
#[inline]
pub(crate) fn face_len(count: i32) -> usize {
    count.max(0) as usize
}

/// Offsets of the second and third fan vertex.
#[inline]
fn fan_order(reverse_winding: bool) -> (usize, usize) {
    if reverse_winding { (2, 1) } else { (1, 2) }
}

/// Number of fan triangles over all faces.
pub fn triangle_count(face_counts: &[i32]) -> usize {
    face_counts.iter().map(|&c| face_len(c).saturating_sub(2)).sum()
}

/// Fan-triangulate `face_counts`, writing `map(face_vertex)` for every corner.
///
/// `face_vertex` is the running position in the flattened face-vertex
/// array, starting at 0. Returns the number of indices written. `dst` must
/// hold `3 * triangle_count(face_counts)` entries.
pub(crate) fn fan_into(
    face_counts: &[i32],
    reverse_winding: bool,
    dst: &mut [u32],
    mut map: impl FnMut(usize) -> u32,
) -> usize {
    let (i1, i2) = fan_order(reverse_winding);
    let mut n = 0;
    let mut offset = 0;
    for &count in face_counts {
        let k = face_len(count);
        for j in 0..k.saturating_sub(2) {
            dst[n] = map(offset);
            dst[n + 1] = map(offset + i1 + j);
            dst[n + 2] = map(offset + i2 + j);
            n += 3;
        }
        offset += k;
    }
    n
}

/// Fan-triangulate into positions of the flattened face-vertex array.
///
/// The first corner of the first face is 0. This is the index buffer for a
/// per-face-vertex vertex buffer or a split chunk.
pub fn fan_face_vertices(face_counts: &[i32], reverse_winding: bool, dst: &mut [u32]) -> Result<usize> {
    check_len(dst, triangle_count(face_counts) * 3)?;
    Ok(fan_into(face_counts, reverse_winding, dst, |fv| fv as u32))
}

/// Fan-triangulate into the source vertex indices.
pub fn triangulate(face_counts: &[i32], face_indices: &[i32], reverse_winding: bool, dst: &mut [u32]) -> Result<usize> {
    check_len(dst, triangle_count(face_counts) * 3)?;
    Ok(fan_into(face_counts, reverse_winding, dst, |fv| {
        face_indices.get(fv).copied().map_or(0, clamp_index)
    }))
}

// ============================================================================
// PolyMesh Operations
// ============================================================================

impl PolyMesh {
    /// Number of triangles the cached topology fans into.
    pub fn triangle_count(&self) -> usize {
        triangle_count(self.sample().face_counts())
    }

    /// Length of the index buffer [`copy_indices`](Self::copy_indices) writes.
    pub fn index_count(&self) -> usize {
        if self.flags().triangulate {
            self.triangle_count() * 3
        } else {
            self.sample().num_face_vertices()
        }
    }

    /// Number of positions.
    pub fn vertex_count(&self) -> usize {
        self.sample().positions().len()
    }

    /// Write the index buffer into `dst`.
    ///
    /// Triangulating writes fan triangles over the source vertex indices.
    /// Otherwise the raw face indices are copied, end to end reversed when
    /// the winding is flipped. Negative source indices become 0.
    pub fn copy_indices(&self, dst: &mut [u32]) -> Result<usize> {
        let flags = self.flags();
        let sample = self.sample();
        if flags.triangulate {
            return triangulate(sample.face_counts(), sample.face_indices(), flags.reverse_winding, dst);
        }

        let src = sample.face_indices();
        check_len(dst, src.len())?;
        if flags.reverse_winding {
            for (d, &s) in dst.iter_mut().zip(src.iter().rev()) {
                *d = clamp_index(s);
            }
        } else {
            for (d, &s) in dst.iter_mut().zip(src) {
                *d = clamp_index(s);
            }
        }
        Ok(src.len())
    }

    /// Copy positions 1:1 into `dst`, negating X when mirroring.
    pub fn copy_vertices(&self, dst: &mut [Vec3]) -> Result<usize> {
        copy_mirrored(self.sample().positions(), self.flags().mirror_x, dst)
    }

    /// Copy velocities 1:1 into `dst`. Writes nothing when the mesh has none.
    pub fn copy_velocities(&self, dst: &mut [Vec3]) -> Result<usize> {
        match self.sample().velocities() {
            Some(v) => copy_mirrored(v, self.flags().mirror_x, dst),
            None => Ok(0),
        }
    }
}

fn copy_mirrored(src: &[Vec3], mirror: bool, dst: &mut [Vec3]) -> Result<usize> {
    check_len(dst, src.len())?;
    if mirror {
        for (d, &s) in dst.iter_mut().zip(src) {
            *d = mirror_x(s);
        }
    } else {
        dst[..src.len()].copy_from_slice(src);
    }
    Ok(src.len())
}
