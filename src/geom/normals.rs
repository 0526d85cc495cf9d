//! Normal generation.
//!
//! [`NormalMode`] decides whether a mesh outputs the normals read from the
//! file, normals computed from its positions, or none at all. Computed
//! normals are smooth: each point gets the area-weighted sum of the faces
//! around it, so they are looked up through the face indices exactly like
//! vertex-scoped normals read from a file.

use serde::{Deserialize, Serialize};

use crate::core::{ArraySample, GeometryScope, IndexedSample};
use crate::geom::topology::{clamp_index, face_len};
use crate::geom::PolyMesh;
use crate::util::Vec3;

/// Where output normals come from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalMode {
    /// Only normals stored in the file.
    ReadFromFile,
    /// File normals, computed ones when the file has none.
    #[default]
    ComputeIfMissing,
    /// Always computed, file normals are ignored.
    AlwaysCompute,
    /// No normals.
    Ignore,
}

impl NormalMode {
    /// Parse a mode name. Accepts the serialized names and short aliases.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "read_from_file" | "read" | "file" => Some(Self::ReadFromFile),
            "compute_if_missing" | "missing" => Some(Self::ComputeIfMissing),
            "always_compute" | "compute" | "always" => Some(Self::AlwaysCompute),
            "ignore" | "none" => Some(Self::Ignore),
            _ => None,
        }
    }

    /// Serialized name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReadFromFile => "read_from_file",
            Self::ComputeIfMissing => "compute_if_missing",
            Self::AlwaysCompute => "always_compute",
            Self::Ignore => "ignore",
        }
    }

    /// Normals must be computed given whether the file provides some.
    pub fn needs_computed(&self, has_file_normals: bool) -> bool {
        match self {
            Self::AlwaysCompute => true,
            Self::ComputeIfMissing => !has_file_normals,
            Self::ReadFromFile | Self::Ignore => false,
        }
    }
}

// ============================================================================
// Computation
// ============================================================================

/// Unnormalized normal of one face: the sum of its fan triangle cross
/// products, twice the area for planar faces. Out-of-range indices read as
/// the origin.
fn face_area_normal(face: &[i32], positions: &[Vec3]) -> Vec3 {
    let at = |i: i32| positions.get(clamp_index(i) as usize).copied().unwrap_or(Vec3::ZERO);
    let Some((&first, rest)) = face.split_first() else { return Vec3::ZERO };
    let v0 = at(first);
    rest.windows(2).map(|w| (at(w[0]) - v0).cross(at(w[1]) - v0)).sum()
}

/// Unit normal of every face. Degenerate faces and faces with fewer than
/// three vertices get +Y.
pub fn compute_face_normals(face_counts: &[i32], face_indices: &[i32], positions: &[Vec3]) -> Vec<Vec3> {
    let mut normals = Vec::with_capacity(face_counts.len());
    let mut offset = 0usize;
    for &count in face_counts {
        let len = face_len(count);
        let face = face_indices.get(offset..offset + len).unwrap_or(&[]);
        let n = face_area_normal(face, positions).normalize_or_zero();
        normals.push(if n == Vec3::ZERO { Vec3::Y } else { n });
        offset += len;
    }
    normals
}

/// Smooth unit normal of every point. Points no face references, or whose
/// faces cancel out, get zero.
pub fn compute_point_normals(face_counts: &[i32], face_indices: &[i32], positions: &[Vec3]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    let mut offset = 0usize;
    for &count in face_counts {
        let len = face_len(count);
        let Some(face) = face_indices.get(offset..offset + len) else { break };
        let n = face_area_normal(face, positions);
        for &i in face {
            if let Some(slot) = normals.get_mut(clamp_index(i) as usize) {
                *slot += n;
            }
        }
        offset += len;
    }
    for n in &mut normals {
        *n = n.normalize_or_zero();
    }
    normals
}

impl PolyMesh {
    /// Normals written to vertex buffers and split chunks under the current
    /// [`NormalMode`]: the file's, the computed ones, or `None`.
    pub fn output_normals(&self) -> Option<&IndexedSample<Vec3>> {
        match self.flags().normal_mode {
            NormalMode::Ignore => None,
            NormalMode::ReadFromFile => self.sample().normals(),
            NormalMode::ComputeIfMissing => self.sample().normals().or(self.computed_normals.as_ref()),
            NormalMode::AlwaysCompute => self.computed_normals.as_ref(),
        }
    }

    /// Check if buffers get a normal channel.
    pub fn has_output_normals(&self) -> bool {
        self.output_normals().is_some()
    }

    /// Recompute or drop the generated normals to match the cached sample
    /// and the normal mode.
    pub(crate) fn update_computed_normals(&mut self) {
        let sample = self.sample();
        if !self.flags().normal_mode.needs_computed(sample.has_normals()) || !sample.has_topology() {
            self.computed_normals = None;
            return;
        }
        let values = compute_point_normals(sample.face_counts(), sample.face_indices(), sample.positions());
        let indices: Vec<u32> = (0..values.len() as u32).collect();
        tracing::trace!(points = values.len(), "computed normals");
        self.computed_normals = Some(IndexedSample::new(
            ArraySample::new(values),
            ArraySample::new(indices),
            GeometryScope::Vertex,
        ));
    }
}
