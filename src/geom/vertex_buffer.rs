//! Per-face-vertex vertex buffers.
//!
//! Every face-vertex gets its own output slot, so positions are expanded
//! through the face indices, normals through their own indices when
//! face-varying (otherwise through the face indices, which is also how
//! computed normals are bound), and UVs through
//! their own indices. Lookups that fall outside the source arrays produce
//! zero vectors.

use bytemuck::{Pod, Zeroable};

use crate::core::{GeometryScope, IndexedSample};
use crate::geom::topology::{clamp_index, fan_face_vertices, triangle_count};
use crate::geom::PolyMesh;
use crate::util::{check_len, mirror_x, BBox3f, Result, Vec2, Vec3};

/// Interleaved vertex for GPU upload.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Owned per-face-vertex buffers of one mesh.
#[derive(Clone, Debug, Default)]
pub struct MeshBuffers {
    pub positions: Vec<Vec3>,
    pub normals: Option<Vec<Vec3>>,
    pub uvs: Option<Vec<Vec2>>,
    /// Fan triangles over the per-face-vertex buffer.
    pub indices: Vec<u32>,
    pub bounds: BBox3f,
}

impl MeshBuffers {
    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Interleave into [`Vertex`] records. Missing attributes are zero.
    pub fn interleaved(&self) -> Vec<Vertex> {
        self.positions
            .iter()
            .enumerate()
            .map(|(i, p)| Vertex {
                position: p.to_array(),
                normal: self.normals.as_ref().and_then(|n| n.get(i)).map_or([0.0; 3], |n| n.to_array()),
                uv: self.uvs.as_ref().and_then(|u| u.get(i)).map_or([0.0; 2], |u| u.to_array()),
            })
            .collect()
    }

    /// Interleaved vertices as raw bytes.
    pub fn vertex_bytes(&self) -> Vec<u8> {
        bytemuck::cast_slice(&self.interleaved()).to_vec()
    }
}

/// How normals map onto face-vertices.
#[derive(Clone, Copy)]
enum NormalSource<'a> {
    /// Through the normals' own indices.
    Own,
    /// Through the face vertex indices.
    FaceIndices(&'a [i32]),
}

impl NormalSource<'_> {
    #[inline]
    fn fetch(self, normals: &IndexedSample<Vec3>, fv: usize) -> Vec3 {
        let n = match self {
            Self::Own => normals.get(fv),
            Self::FaceIndices(indices) => indices.get(fv).and_then(|&i| normals.get(clamp_index(i) as usize)),
        };
        n.copied().unwrap_or(Vec3::ZERO)
    }
}

impl PolyMesh {
    /// Number of slots [`fill_vertex_buffer`](Self::fill_vertex_buffer) writes.
    pub fn vertex_buffer_length(&self) -> usize {
        self.sample().num_face_vertices()
    }

    /// Fill per-face-vertex buffers.
    ///
    /// `normals` and `uvs` are written only when both the destination is
    /// given and the mesh has that attribute. Normals follow the
    /// [`NormalMode`](crate::geom::NormalMode) flag.
    pub fn fill_vertex_buffer(&self, positions: &mut [Vec3], normals: Option<&mut [Vec3]>, uvs: Option<&mut [Vec2]>) -> Result<()> {
        let sample = self.sample();
        let len = sample.num_face_vertices();
        let indices = sample.face_indices();
        let points = sample.positions();
        let mirror = self.flags().mirror_x;

        check_len(positions, len)?;
        let normals = normals.zip(self.output_normals());
        let uvs = uvs.zip(sample.uvs());
        if let Some((dst, _)) = &normals {
            check_len::<Vec3>(dst, len)?;
        }
        if let Some((dst, _)) = &uvs {
            check_len::<Vec2>(dst, len)?;
        }

        let point = |fv: usize| {
            let p = points.get(clamp_index(indices[fv]) as usize).copied().unwrap_or(Vec3::ZERO);
            if mirror { mirror_x(p) } else { p }
        };
        let normal = |src: NormalSource<'_>, n: &IndexedSample<Vec3>, fv: usize| {
            let n = src.fetch(n, fv);
            if mirror { mirror_x(n) } else { n }
        };
        let uv = |u: &IndexedSample<Vec2>, fv: usize| u.get(fv).copied().unwrap_or(Vec2::ZERO);

        match (normals, uvs) {
            (Some((n_dst, n_src)), Some((uv_dst, uv_src))) => {
                let src = normal_source(n_src, indices);
                for fv in 0..len {
                    positions[fv] = point(fv);
                    n_dst[fv] = normal(src, n_src, fv);
                    uv_dst[fv] = uv(uv_src, fv);
                }
            }
            (Some((n_dst, n_src)), None) => {
                let src = normal_source(n_src, indices);
                for fv in 0..len {
                    positions[fv] = point(fv);
                    n_dst[fv] = normal(src, n_src, fv);
                }
            }
            (None, Some((uv_dst, uv_src))) => {
                for fv in 0..len {
                    positions[fv] = point(fv);
                    uv_dst[fv] = uv(uv_src, fv);
                }
            }
            (None, None) => {
                for (fv, p) in positions[..len].iter_mut().enumerate() {
                    *p = point(fv);
                }
            }
        }
        Ok(())
    }

    /// Build owned buffers for the whole mesh, triangulated over the
    /// per-face-vertex buffer.
    pub fn build_buffers(&self) -> Result<MeshBuffers> {
        let len = self.vertex_buffer_length();
        let mut positions = vec![Vec3::ZERO; len];
        let mut normals = self.has_output_normals().then(|| vec![Vec3::ZERO; len]);
        let mut uvs = self.has_uvs().then(|| vec![Vec2::ZERO; len]);
        self.fill_vertex_buffer(&mut positions, normals.as_deref_mut(), uvs.as_deref_mut())?;

        let counts = self.sample().face_counts();
        let mut indices = vec![0u32; triangle_count(counts) * 3];
        fan_face_vertices(counts, self.flags().reverse_winding, &mut indices)?;

        let bounds = BBox3f::from_points(&positions);
        Ok(MeshBuffers { positions, normals, uvs, indices, bounds })
    }
}

fn normal_source<'a>(normals: &IndexedSample<Vec3>, face_indices: &'a [i32]) -> NormalSource<'a> {
    if normals.scope == GeometryScope::FaceVarying {
        NormalSource::Own
    } else {
        NormalSource::FaceIndices(face_indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_layout() {
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
    }

    #[test]
    fn test_interleaved() {
        let buffers = MeshBuffers {
            positions: vec![Vec3::X, Vec3::Y],
            normals: None,
            uvs: Some(vec![Vec2::new(0.5, 0.25), Vec2::ONE]),
            indices: vec![],
            bounds: BBox3f::EMPTY,
        };
        let verts = buffers.interleaved();
        assert_eq!(verts.len(), 2);
        assert_eq!(verts[0].position, [1.0, 0.0, 0.0]);
        assert_eq!(verts[0].normal, [0.0; 3]);
        assert_eq!(verts[0].uv, [0.5, 0.25]);
        assert_eq!(buffers.vertex_bytes().len(), 64);
    }

    #[test]
    fn test_normal_source_fetch() {
        use crate::core::ArraySample;

        let normals = IndexedSample::new(
            ArraySample::new(vec![Vec3::X, Vec3::Y]),
            ArraySample::new(vec![1, 0, 0]),
            GeometryScope::Vertex,
        );
        assert_eq!(NormalSource::Own.fetch(&normals, 0), Vec3::Y);
        assert_eq!(NormalSource::FaceIndices(&[1, 0, 7]).fetch(&normals, 0), Vec3::X);
        // face index 7 has no normal
        assert_eq!(NormalSource::FaceIndices(&[1, 0, 7]).fetch(&normals, 2), Vec3::ZERO);
    }
}
