//! In-memory archive built from a [`SceneDesc`].
//!
//! All arrays are converted to [`ArraySample`]s once at build time, so
//! reading the same sample twice returns the same allocation.

use std::sync::Arc;

use crate::core::{
    ArchiveReader, ArraySample, GeomParamReader, GeometryScope, IndexedSample, NodeReader, PolyMeshReader,
    SampleSelector, SchemaKind, TimeSampling, TopologyVariance, XformReader,
};
use crate::geom::XformSample;
use crate::memory::desc::{NodeDesc, ParamDesc, PolyMeshDesc, SceneDesc, SchemaDesc, XformDesc};
use crate::util::{Chrono, Error, Result, Vec2, Vec3};

// ============================================================================
// Sampled Property
// ============================================================================

/// Samples of one property plus their time sampling.
struct Sampled<T> {
    name: &'static str,
    samples: Vec<T>,
    time_sampling: TimeSampling,
}

impl<T: Clone> Sampled<T> {
    fn new(name: &'static str, samples: Vec<T>, time_sampling: TimeSampling) -> Self {
        Self { name, samples, time_sampling }
    }

    fn len(&self) -> usize {
        self.samples.len()
    }

    fn get(&self, selector: SampleSelector) -> Result<T> {
        if self.samples.is_empty() {
            return Err(Error::read(self.name, "property has no samples"));
        }
        let index = self.time_sampling.select(selector, self.samples.len());
        Ok(self.samples[index].clone())
    }

    fn time_range(&self) -> Option<(Chrono, Chrono)> {
        let last = self.samples.len().checked_sub(1)?;
        Some((self.time_sampling.sample_time(0), self.time_sampling.sample_time(last)))
    }
}

fn to_samples<T>(arrays: Vec<Vec<T>>) -> Vec<ArraySample<T>> {
    arrays.into_iter().map(ArraySample::new).collect()
}

fn merge_range(a: Option<(Chrono, Chrono)>, b: Option<(Chrono, Chrono)>) -> Option<(Chrono, Chrono)> {
    match (a, b) {
        (Some(a), Some(b)) => Some((a.0.min(b.0), a.1.max(b.1))),
        (a, b) => a.or(b),
    }
}

// ============================================================================
// Geometry Parameter
// ============================================================================

/// Indexed geometry parameter.
pub struct MemParam<T> {
    scope: GeometryScope,
    values: Sampled<ArraySample<T>>,
    indices: Sampled<ArraySample<u32>>,
}

impl<T> MemParam<T> {
    fn from_desc(name: &'static str, desc: ParamDesc<T>, time_sampling: &TimeSampling) -> Self {
        let values = to_samples(desc.values);
        let indices = if desc.indices.is_empty() {
            values.iter().map(|v| ArraySample::new((0..v.len() as u32).collect())).collect()
        } else {
            to_samples(desc.indices)
        };
        Self {
            scope: desc.scope,
            values: Sampled::new(name, values, time_sampling.clone()),
            indices: Sampled::new(name, indices, time_sampling.clone()),
        }
    }
}

impl<T: Send + Sync> GeomParamReader<T> for MemParam<T> {
    fn scope(&self) -> GeometryScope {
        self.scope
    }

    fn num_samples(&self) -> usize {
        self.values.len().max(self.indices.len())
    }

    fn get_indexed(&self, selector: SampleSelector) -> Result<IndexedSample<T>> {
        Ok(IndexedSample::new(self.values.get(selector)?, self.indices.get(selector)?, self.scope))
    }
}

// ============================================================================
// PolyMesh
// ============================================================================

/// Poly mesh schema.
pub struct MemPolyMesh {
    variance: TopologyVariance,
    face_counts: Sampled<ArraySample<i32>>,
    face_indices: Sampled<ArraySample<i32>>,
    positions: Sampled<ArraySample<Vec3>>,
    velocities: Sampled<ArraySample<Vec3>>,
    normals: Option<MemParam<Vec3>>,
    uvs: Option<MemParam<Vec2>>,
}

impl MemPolyMesh {
    fn from_desc(desc: PolyMeshDesc, scene_ts: &TimeSampling) -> Self {
        let variance = desc.inferred_variance();
        let ts = desc.time_sampling.unwrap_or_else(|| scene_ts.clone());
        Self {
            variance,
            face_counts: Sampled::new("face_counts", to_samples(desc.face_counts), ts.clone()),
            face_indices: Sampled::new("face_indices", to_samples(desc.face_indices), ts.clone()),
            positions: Sampled::new("positions", to_samples(desc.positions), ts.clone()),
            velocities: Sampled::new("velocities", to_samples(desc.velocities), ts.clone()),
            normals: desc.normals.map(|n| MemParam::from_desc("normals", n, &ts)),
            uvs: desc.uvs.map(|u| MemParam::from_desc("uvs", u, &ts)),
        }
    }

    fn time_range(&self) -> Option<(Chrono, Chrono)> {
        let topology = merge_range(self.face_counts.time_range(), self.face_indices.time_range());
        merge_range(topology, self.positions.time_range())
    }
}

impl PolyMeshReader for MemPolyMesh {
    fn num_samples(&self) -> usize {
        self.face_counts.len().max(self.face_indices.len()).max(self.positions.len())
    }

    fn topology_variance(&self) -> TopologyVariance {
        self.variance
    }

    fn face_counts(&self, selector: SampleSelector) -> Result<ArraySample<i32>> {
        self.face_counts.get(selector)
    }

    fn face_indices(&self, selector: SampleSelector) -> Result<ArraySample<i32>> {
        self.face_indices.get(selector)
    }

    fn positions(&self, selector: SampleSelector) -> Result<ArraySample<Vec3>> {
        self.positions.get(selector)
    }

    fn velocities(&self, selector: SampleSelector) -> Result<Option<ArraySample<Vec3>>> {
        if self.velocities.len() == 0 {
            return Ok(None);
        }
        self.velocities.get(selector).map(Some)
    }

    fn normals(&self) -> Option<&dyn GeomParamReader<Vec3>> {
        self.normals.as_ref().map(|n| n as &dyn GeomParamReader<Vec3>)
    }

    fn uvs(&self) -> Option<&dyn GeomParamReader<Vec2>> {
        self.uvs.as_ref().map(|u| u as &dyn GeomParamReader<Vec2>)
    }
}

// ============================================================================
// Xform
// ============================================================================

/// Transform schema.
pub struct MemXform {
    samples: Sampled<XformSample>,
}

impl MemXform {
    fn from_desc(desc: XformDesc, scene_ts: &TimeSampling) -> Self {
        let ts = desc.time_sampling.unwrap_or_else(|| scene_ts.clone());
        let samples = desc
            .samples
            .into_iter()
            .map(|s| XformSample {
                inherits: s.inherits,
                ..XformSample::from_axis_angle(s.translation, s.axis, s.angle, s.scale)
            })
            .collect();
        Self { samples: Sampled::new("xform", samples, ts) }
    }
}

impl XformReader for MemXform {
    fn num_samples(&self) -> usize {
        self.samples.len()
    }

    fn get(&self, selector: SampleSelector) -> Result<XformSample> {
        // an xform without samples is identity
        if self.samples.len() == 0 {
            return Ok(XformSample::identity());
        }
        self.samples.get(selector)
    }
}

// ============================================================================
// Node / Archive
// ============================================================================

/// Node of an in-memory archive.
pub struct MemNode {
    name: String,
    full_name: String,
    kind: SchemaKind,
    children: Vec<Arc<MemNode>>,
    polymesh: Option<Arc<MemPolyMesh>>,
    xform: Option<Arc<MemXform>>,
}

impl MemNode {
    fn from_desc(desc: NodeDesc, parent_path: &str, ts: &TimeSampling) -> Self {
        let full_name = if parent_path.is_empty() {
            String::from("/")
        } else if parent_path == "/" {
            format!("/{}", desc.name)
        } else {
            format!("{}/{}", parent_path, desc.name)
        };

        let kind = desc.schema.kind();
        let (polymesh, xform) = match desc.schema {
            SchemaDesc::PolyMesh(mesh) => (Some(Arc::new(MemPolyMesh::from_desc(mesh, ts))), None),
            SchemaDesc::Xform(xf) => (None, Some(Arc::new(MemXform::from_desc(xf, ts)))),
            _ => (None, None),
        };
        let children = desc
            .children
            .into_iter()
            .map(|c| Arc::new(MemNode::from_desc(c, &full_name, ts)))
            .collect();

        Self { name: desc.name, full_name, kind, children, polymesh, xform }
    }

    fn time_range(&self) -> Option<(Chrono, Chrono)> {
        let own = self.polymesh.as_ref().and_then(|m| m.time_range());
        let own = merge_range(own, self.xform.as_ref().and_then(|x| x.samples.time_range()));
        self.children.iter().fold(own, |acc, c| merge_range(acc, c.time_range()))
    }
}

impl NodeReader for MemNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn full_name(&self) -> &str {
        &self.full_name
    }

    fn num_children(&self) -> usize {
        self.children.len()
    }

    fn child(&self, index: usize) -> Result<Arc<dyn NodeReader>> {
        self.children
            .get(index)
            .map(|c| Arc::clone(c) as Arc<dyn NodeReader>)
            .ok_or_else(|| Error::read(&self.full_name, format!("child {} out of range", index)))
    }

    fn schema_kind(&self) -> SchemaKind {
        self.kind
    }

    fn as_polymesh(&self) -> Option<Arc<dyn PolyMeshReader>> {
        self.polymesh.as_ref().map(|m| Arc::clone(m) as Arc<dyn PolyMeshReader>)
    }

    fn as_xform(&self) -> Option<Arc<dyn XformReader>> {
        self.xform.as_ref().map(|x| Arc::clone(x) as Arc<dyn XformReader>)
    }
}

/// Archive held entirely in memory.
pub struct MemArchive {
    name: String,
    root: Arc<MemNode>,
    time_range: Option<(Chrono, Chrono)>,
}

impl MemArchive {
    /// Build the archive from a scene description.
    pub fn from_desc(name: impl Into<String>, desc: SceneDesc) -> Self {
        let root = Arc::new(MemNode::from_desc(desc.root, "", &desc.time_sampling));
        let time_range = root.time_range();
        Self { name: name.into(), root, time_range }
    }

    /// Parse a JSON scene description.
    pub fn from_json(name: impl Into<String>, json: &str) -> Result<Self> {
        let desc: SceneDesc = serde_json::from_str(json)?;
        Ok(Self::from_desc(name, desc))
    }
}

impl ArchiveReader for MemArchive {
    fn name(&self) -> &str {
        &self.name
    }

    fn root(&self) -> Arc<dyn NodeReader> {
        Arc::clone(&self.root) as Arc<dyn NodeReader>
    }

    fn time_range(&self) -> Option<(Chrono, Chrono)> {
        self.time_range
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn animated_triangle() -> SceneDesc {
        let mesh = PolyMeshDesc {
            face_counts: vec![vec![3]],
            face_indices: vec![vec![0, 1, 2]],
            positions: vec![vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![Vec3::ONE, Vec3::X, Vec3::Y]],
            ..Default::default()
        };
        SceneDesc {
            name: "tri".into(),
            time_sampling: TimeSampling::uniform(1.0, 0.0),
            root: NodeDesc::new("ABC").with_child(NodeDesc::new("group").with_child(NodeDesc::polymesh("tri", mesh))),
        }
    }

    #[test]
    fn test_paths() {
        let archive = MemArchive::from_desc("test", animated_triangle());
        let root = archive.root();
        assert_eq!(root.full_name(), "/");
        let group = root.child(0).unwrap();
        assert_eq!(group.full_name(), "/group");
        let tri = group.child(0).unwrap();
        assert_eq!(tri.full_name(), "/group/tri");
        assert_eq!(tri.schema_kind(), SchemaKind::PolyMesh);
        assert!(tri.as_polymesh().is_some());
        assert!(tri.as_xform().is_none());
        assert!(group.child(1).is_err());
    }

    #[test]
    fn test_sample_identity() {
        let archive = MemArchive::from_desc("test", animated_triangle());
        let tri = archive.root().child(0).unwrap().child(0).unwrap();
        let mesh = tri.as_polymesh().unwrap();

        assert_eq!(mesh.topology_variance(), TopologyVariance::Homogeneous);
        assert_eq!(mesh.num_samples(), 2);

        let a = mesh.positions(SampleSelector::time_floor(0.2)).unwrap();
        let b = mesh.positions(SampleSelector::time_floor(0.7)).unwrap();
        let c = mesh.positions(SampleSelector::time_floor(1.5)).unwrap();
        assert!(a.same_as(&b));
        assert!(!a.same_as(&c));
        assert_eq!(c[0], Vec3::ONE);
        assert!(mesh.velocities(SampleSelector::first()).unwrap().is_none());
        assert_eq!(archive.time_range(), Some((0.0, 1.0)));
    }

    #[test]
    fn test_param_identity_indices() {
        let desc = ParamDesc::constant(GeometryScope::Vertex, vec![Vec3::X, Vec3::Y], None);
        let param = MemParam::from_desc("normals", desc, &TimeSampling::Identity);
        let s = param.get_indexed(SampleSelector::first()).unwrap();
        assert_eq!(&*s.indices, &[0, 1]);
        assert!(param.is_constant());
    }
}
