//! PolyMesh schema state and its sample cache.
//!
//! [`MeshSample`] keeps the last fetched version of every mesh property and
//! decides on each refresh which of them must be read again. [`PolyMesh`]
//! pairs that cache with the schema reader, the per-object flags and the
//! most recently prepared submeshes. The conversion operations live in the
//! sibling modules (`topology`, `submesh`, `vertex_buffer`, `split`).

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::{ArraySample, IndexedSample, PolyMeshReader, SampleSelector, TopologyVariance};
use crate::geom::normals::NormalMode;
use crate::geom::submesh::Submesh;
use crate::util::{Error, Result, Vec2, Vec3};

/// Per-object conversion flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshFlags {
    /// Negate X of positions, normals and transforms.
    pub mirror_x: bool,
    /// Flip triangle winding.
    pub reverse_winding: bool,
    /// Fan-triangulate n-gons when copying indices.
    pub triangulate: bool,
    /// Source of output normals.
    pub normal_mode: NormalMode,
}

/// Which attribute kinds a refresh actually read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RefreshReport {
    /// Face counts and indices were read.
    pub topology: bool,
    /// The topology read returned different arrays than the cached ones.
    pub topology_changed: bool,
    /// Positions were read.
    pub positions: bool,
    /// Velocities were read and present.
    pub velocities: bool,
    /// Normals were read.
    pub normals: bool,
    /// UVs were read.
    pub uvs: bool,
}

/// Cached raw arrays of one poly mesh.
///
/// Mutated only by [`MeshSample::refresh`]. Invariant: when topology is
/// cached, the face counts sum to the number of face indices.
#[derive(Clone, Debug, Default)]
pub struct MeshSample {
    face_counts: Option<ArraySample<i32>>,
    face_indices: Option<ArraySample<i32>>,
    positions: Option<ArraySample<Vec3>>,
    velocities: Option<ArraySample<Vec3>>,
    normals: Option<IndexedSample<Vec3>>,
    uvs: Option<IndexedSample<Vec2>>,
}

impl MeshSample {
    /// Create an empty sample.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of vertices for each face.
    pub fn face_counts(&self) -> &[i32] {
        self.face_counts.as_deref().unwrap_or(&[])
    }

    /// Flattened face vertex indices.
    pub fn face_indices(&self) -> &[i32] {
        self.face_indices.as_deref().unwrap_or(&[])
    }

    /// Vertex positions.
    pub fn positions(&self) -> &[Vec3] {
        self.positions.as_deref().unwrap_or(&[])
    }

    /// Vertex velocities, if the schema has them.
    pub fn velocities(&self) -> Option<&[Vec3]> {
        self.velocities.as_deref()
    }

    /// Indexed normals, if valid.
    pub fn normals(&self) -> Option<&IndexedSample<Vec3>> {
        self.normals.as_ref()
    }

    /// Indexed UVs, if valid.
    pub fn uvs(&self) -> Option<&IndexedSample<Vec2>> {
        self.uvs.as_ref()
    }

    /// Non-empty face counts and indices are cached.
    pub fn has_topology(&self) -> bool {
        matches!((&self.face_counts, &self.face_indices), (Some(c), Some(i)) if !c.is_empty() && !i.is_empty())
    }

    /// Check if normals are cached.
    pub fn has_normals(&self) -> bool {
        self.normals.is_some()
    }

    /// Check if UVs are cached.
    pub fn has_uvs(&self) -> bool {
        self.uvs.is_some()
    }

    /// Check if velocities are cached.
    pub fn has_velocities(&self) -> bool {
        self.velocities.is_some()
    }

    /// Get number of faces.
    pub fn num_faces(&self) -> usize {
        self.face_counts().len()
    }

    /// Get number of face-vertices (length of the face index array).
    pub fn num_face_vertices(&self) -> usize {
        self.face_indices().len()
    }

    /// Bring the cache up to date with `selector`, reading as little as possible.
    ///
    /// Constant topology is read once. Positions (and velocities) are read
    /// every time. Normals and UVs are re-read only when absent or
    /// time-varying, and are dropped whenever topology is re-read. All reads
    /// are staged: on error the previously cached sample is left intact.
    pub fn refresh(&mut self, reader: &dyn PolyMeshReader, selector: SampleSelector) -> Result<RefreshReport> {
        let mut next = self.clone();
        let mut report = RefreshReport::default();

        let constant_topology = reader.topology_variance().is_constant_topology();
        if !(constant_topology && self.has_topology()) {
            let indices = reader.face_indices(selector)?;
            let counts = reader.face_counts(selector)?;
            validate_topology(&counts, &indices)?;

            let unchanged = matches!(
                (&self.face_counts, &self.face_indices),
                (Some(c), Some(i)) if c.same_as(&counts) && i.same_as(&indices)
            );
            report.topology = true;
            report.topology_changed = !unchanged;

            next.face_counts = Some(counts);
            next.face_indices = Some(indices);
            // indexed attributes refer to the old topology
            next.normals = None;
            next.uvs = None;
        }

        next.positions = Some(reader.positions(selector)?);
        report.positions = true;

        next.velocities = reader.velocities(selector)?;
        report.velocities = next.velocities.is_some();

        if let Some(param) = reader.normals() {
            if param.scope().supports_normals() && (next.normals.is_none() || !param.is_constant()) {
                next.normals = Some(param.get_indexed(selector)?).filter(IndexedSample::is_valid);
                report.normals = true;
            }
        }

        if let Some(param) = reader.uvs() {
            if param.scope().supports_uvs() && (next.uvs.is_none() || !param.is_constant()) {
                next.uvs = Some(param.get_indexed(selector)?).filter(IndexedSample::is_valid);
                report.uvs = true;
            }
        }

        *self = next;
        Ok(report)
    }
}

/// Reject topology whose face counts do not add up to the index count.
fn validate_topology(counts: &[i32], indices: &[i32]) -> Result<()> {
    let counts_sum: usize = counts.iter().map(|&c| c.max(0) as usize).sum();
    if counts_sum != indices.len() || counts.iter().any(|&c| c < 0) {
        return Err(Error::TopologyMismatch {
            counts_sum,
            num_indices: indices.len(),
        });
    }
    Ok(())
}

/// Poly mesh schema state owned by a geometry object.
pub struct PolyMesh {
    reader: Arc<dyn PolyMeshReader>,
    sample: MeshSample,
    flags: MeshFlags,
    pub(crate) computed_normals: Option<IndexedSample<Vec3>>,
    pub(crate) submeshes: Vec<Submesh>,
}

impl PolyMesh {
    /// Wrap a schema reader. Nothing is read until the first refresh.
    pub fn new(reader: Arc<dyn PolyMeshReader>) -> Self {
        Self {
            reader,
            sample: MeshSample::new(),
            flags: MeshFlags::default(),
            computed_normals: None,
            submeshes: Vec::new(),
        }
    }

    /// Schema reader.
    pub fn reader(&self) -> &dyn PolyMeshReader {
        self.reader.as_ref()
    }

    /// Currently cached sample.
    pub fn sample(&self) -> &MeshSample {
        &self.sample
    }

    /// Conversion flags.
    pub fn flags(&self) -> MeshFlags {
        self.flags
    }

    /// Replace the conversion flags. A new normal mode takes effect on the
    /// cached sample right away.
    pub fn set_flags(&mut self, flags: MeshFlags) {
        let mode_changed = flags.normal_mode != self.flags.normal_mode;
        self.flags = flags;
        if mode_changed {
            self.update_computed_normals();
        }
    }

    /// Topology variance declared by the schema.
    pub fn topology_variance(&self) -> TopologyVariance {
        self.reader.topology_variance()
    }

    /// Check if normals are cached.
    pub fn has_normals(&self) -> bool {
        self.sample.has_normals()
    }

    /// Check if UVs are cached.
    pub fn has_uvs(&self) -> bool {
        self.sample.has_uvs()
    }

    /// Check if velocities are cached.
    pub fn has_velocities(&self) -> bool {
        self.sample.has_velocities()
    }

    /// Refresh the sample cache. Prepared submeshes are discarded when the
    /// topology changed. Computed normals follow the new positions.
    pub fn refresh(&mut self, selector: SampleSelector) -> Result<RefreshReport> {
        let report = self.sample.refresh(self.reader.as_ref(), selector)?;
        if report.topology_changed {
            self.submeshes.clear();
        }
        self.update_computed_normals();
        tracing::trace!(?report, "polymesh refreshed");
        Ok(report)
    }
}
