//! Abstract traits for the archive layer.
//!
//! These traits are the boundary between the geometry conversion code
//! and whatever reads the cache off disk. Everything here is read-only
//! and shareable across threads.

use std::path::Path;
use std::sync::Arc;

use crate::core::{
    ArraySample, GeometryScope, IndexedSample, SampleSelector, SchemaKind, TopologyVariance,
};
use crate::geom::XformSample;
use crate::util::{Chrono, Result, Vec2, Vec3};

// ============================================================================
// Archive Traits
// ============================================================================

/// A container format able to open archives from disk.
pub trait ArchiveFormat: Send + Sync {
    /// Short format name used in logs.
    fn name(&self) -> &'static str;

    /// Open the file at `path`.
    fn open(&self, path: &Path) -> Result<Box<dyn ArchiveReader>>;
}

/// Reader interface for an opened archive.
pub trait ArchiveReader: Send + Sync {
    /// Get the archive name/path.
    fn name(&self) -> &str;

    /// Get the root object.
    fn root(&self) -> Arc<dyn NodeReader>;

    /// First and last sample time over all properties, if known.
    fn time_range(&self) -> Option<(Chrono, Chrono)> {
        None
    }
}

// ============================================================================
// Object Traits
// ============================================================================

/// Reader interface for a node in the hierarchy.
pub trait NodeReader: Send + Sync {
    /// Node name.
    fn name(&self) -> &str;

    /// Full path from the root, `/` separated.
    fn full_name(&self) -> &str;

    /// Get the number of child nodes.
    fn num_children(&self) -> usize;

    /// Read a child by index.
    fn child(&self, index: usize) -> Result<Arc<dyn NodeReader>>;

    /// Kind of schema attached to this node.
    fn schema_kind(&self) -> SchemaKind;

    /// Mesh schema, when the node is a poly mesh.
    fn as_polymesh(&self) -> Option<Arc<dyn PolyMeshReader>> {
        None
    }

    /// Transform schema, when the node is an xform.
    fn as_xform(&self) -> Option<Arc<dyn XformReader>> {
        None
    }
}

// ============================================================================
// Schema Traits
// ============================================================================

/// Time-sampled, indexed geometry parameter (normals, UVs).
pub trait GeomParamReader<T>: Send + Sync {
    /// Binding scope.
    fn scope(&self) -> GeometryScope;

    /// Number of stored samples.
    fn num_samples(&self) -> usize;

    /// Declared time-constant (single sample).
    fn is_constant(&self) -> bool {
        self.num_samples() <= 1
    }

    /// Read values and indices. Non-indexed parameters report an
    /// identity index array.
    fn get_indexed(&self, selector: SampleSelector) -> Result<IndexedSample<T>>;
}

/// Poly mesh schema reader.
pub trait PolyMeshReader: Send + Sync {
    /// Number of stored samples of the schema.
    fn num_samples(&self) -> usize;

    /// Whole schema is time-constant.
    fn is_constant(&self) -> bool {
        self.num_samples() <= 1
    }

    /// How the topology changes over time.
    fn topology_variance(&self) -> TopologyVariance;

    /// Number of vertices for each face.
    fn face_counts(&self, selector: SampleSelector) -> Result<ArraySample<i32>>;

    /// Flattened per-face vertex indices into the positions.
    fn face_indices(&self, selector: SampleSelector) -> Result<ArraySample<i32>>;

    /// Per-vertex positions.
    fn positions(&self, selector: SampleSelector) -> Result<ArraySample<Vec3>>;

    /// Per-vertex velocities, `Ok(None)` when the schema has none.
    fn velocities(&self, _selector: SampleSelector) -> Result<Option<ArraySample<Vec3>>> {
        Ok(None)
    }

    /// Normals parameter.
    fn normals(&self) -> Option<&dyn GeomParamReader<Vec3>> {
        None
    }

    /// UV parameter.
    fn uvs(&self) -> Option<&dyn GeomParamReader<Vec2>> {
        None
    }
}

/// Transform schema reader.
pub trait XformReader: Send + Sync {
    /// Number of stored samples.
    fn num_samples(&self) -> usize;

    /// Declared time-constant.
    fn is_constant(&self) -> bool {
        self.num_samples() <= 1
    }

    /// Read the transform sample.
    fn get(&self, selector: SampleSelector) -> Result<XformSample>;
}
