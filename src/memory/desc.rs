//! Serializable scene description.
//!
//! A scene is a tree of named nodes. Each node may carry one schema whose
//! properties are stored as per-sample arrays. Every property is sampled
//! independently: a property with one sample is constant, and sample `i`
//! of a property sits at `time_sampling.sample_time(i)`.
//!
//! ```json
//! {
//!   "name": "scene",
//!   "time_sampling": { "type": "uniform", "time_per_cycle": 0.5, "start_time": 0.0 },
//!   "root": {
//!     "name": "ABC",
//!     "children": [{
//!       "name": "quad",
//!       "schema": {
//!         "type": "polymesh",
//!         "face_counts": [[4]],
//!         "face_indices": [[0, 1, 2, 3]],
//!         "positions": [[[0, 0, 0], [1, 0, 0], [1, 1, 0], [0, 1, 0]]]
//!       }
//!     }]
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::core::{GeometryScope, SchemaKind, TimeSampling, TopologyVariance};
use crate::util::{Vec2, Vec3};

/// Root of a scene description.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDesc {
    #[serde(default)]
    pub name: String,
    /// Default time sampling for every property.
    #[serde(default)]
    pub time_sampling: TimeSampling,
    pub root: NodeDesc,
}

/// A node and its subtree.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeDesc {
    pub name: String,
    #[serde(default)]
    pub schema: SchemaDesc,
    #[serde(default)]
    pub children: Vec<NodeDesc>,
}

impl NodeDesc {
    /// Create a node without schema.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    /// Create a poly mesh node.
    pub fn polymesh(name: impl Into<String>, mesh: PolyMeshDesc) -> Self {
        Self { name: name.into(), schema: SchemaDesc::PolyMesh(mesh), children: Vec::new() }
    }

    /// Create a transform node.
    pub fn xform(name: impl Into<String>, xform: XformDesc) -> Self {
        Self { name: name.into(), schema: SchemaDesc::Xform(xform), children: Vec::new() }
    }

    /// Append a child.
    pub fn with_child(mut self, child: NodeDesc) -> Self {
        self.children.push(child);
        self
    }
}

/// Schema attached to a node.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SchemaDesc {
    #[default]
    None,
    Xform(XformDesc),
    PolyMesh(PolyMeshDesc),
    Curves,
    Points,
    Camera,
    Light,
    Material,
}

impl SchemaDesc {
    pub fn kind(&self) -> SchemaKind {
        match self {
            Self::None => SchemaKind::None,
            Self::Xform(_) => SchemaKind::Xform,
            Self::PolyMesh(_) => SchemaKind::PolyMesh,
            Self::Curves => SchemaKind::Curves,
            Self::Points => SchemaKind::Points,
            Self::Camera => SchemaKind::Camera,
            Self::Light => SchemaKind::Light,
            Self::Material => SchemaKind::Material,
        }
    }
}

/// Poly mesh properties, one array per sample.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolyMeshDesc {
    /// Overrides the scene time sampling.
    pub time_sampling: Option<TimeSampling>,
    /// Inferred from the sample counts when absent.
    pub topology_variance: Option<TopologyVariance>,
    pub face_counts: Vec<Vec<i32>>,
    pub face_indices: Vec<Vec<i32>>,
    pub positions: Vec<Vec<Vec3>>,
    pub velocities: Vec<Vec<Vec3>>,
    pub normals: Option<ParamDesc<Vec3>>,
    pub uvs: Option<ParamDesc<Vec2>>,
}

impl PolyMeshDesc {
    /// Single-sample mesh.
    pub fn constant(face_counts: Vec<i32>, face_indices: Vec<i32>, positions: Vec<Vec3>) -> Self {
        Self {
            face_counts: vec![face_counts],
            face_indices: vec![face_indices],
            positions: vec![positions],
            ..Default::default()
        }
    }

    pub fn with_normals(mut self, normals: ParamDesc<Vec3>) -> Self {
        self.normals = Some(normals);
        self
    }

    pub fn with_uvs(mut self, uvs: ParamDesc<Vec2>) -> Self {
        self.uvs = Some(uvs);
        self
    }

    /// Variance from the sample counts: one topology and one position
    /// sample is static, one topology sample is homogeneous.
    pub fn inferred_variance(&self) -> TopologyVariance {
        if let Some(v) = self.topology_variance {
            return v;
        }
        let constant_topology = self.face_counts.len() <= 1 && self.face_indices.len() <= 1;
        match (constant_topology, self.positions.len() <= 1) {
            (true, true) => TopologyVariance::Static,
            (true, false) => TopologyVariance::Homogeneous,
            _ => TopologyVariance::Heterogeneous,
        }
    }
}

/// Indexed geometry parameter. Missing indices mean identity indexing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParamDesc<T> {
    pub scope: GeometryScope,
    pub values: Vec<Vec<T>>,
    #[serde(default)]
    pub indices: Vec<Vec<u32>>,
}

impl<T> ParamDesc<T> {
    /// Single-sample parameter.
    pub fn constant(scope: GeometryScope, values: Vec<T>, indices: Option<Vec<u32>>) -> Self {
        Self {
            scope,
            values: vec![values],
            indices: indices.into_iter().collect(),
        }
    }
}

/// Transform samples.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XformDesc {
    pub time_sampling: Option<TimeSampling>,
    pub samples: Vec<XformSampleDesc>,
}

/// One transform sample; rotation as axis and angle in degrees.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XformSampleDesc {
    pub translation: Vec3,
    pub axis: Vec3,
    pub angle: f32,
    pub scale: Vec3,
    pub inherits: bool,
}

impl Default for XformSampleDesc {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            axis: Vec3::Y,
            angle: 0.0,
            scale: Vec3::ONE,
            inherits: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scene() {
        let json = r#"{
            "name": "scene",
            "time_sampling": { "type": "uniform", "time_per_cycle": 0.5, "start_time": 0.0 },
            "root": {
                "name": "ABC",
                "children": [
                    { "name": "cam", "schema": { "type": "camera" } },
                    { "name": "quad", "schema": {
                        "type": "polymesh",
                        "face_counts": [[4]],
                        "face_indices": [[0, 1, 2, 3]],
                        "positions": [[[0, 0, 0], [1, 0, 0], [1, 1, 0], [0, 1, 0]]],
                        "uvs": { "scope": "facevarying", "values": [[[0, 0], [1, 0], [1, 1], [0, 1]]] }
                    }}
                ]
            }
        }"#;
        let scene: SceneDesc = serde_json::from_str(json).unwrap();
        assert_eq!(scene.root.children.len(), 2);
        assert_eq!(scene.root.schema, SchemaDesc::None);
        assert_eq!(scene.root.children[0].schema.kind(), SchemaKind::Camera);

        let SchemaDesc::PolyMesh(mesh) = &scene.root.children[1].schema else {
            panic!("expected polymesh");
        };
        assert_eq!(mesh.positions[0][2], Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(mesh.inferred_variance(), TopologyVariance::Static);
        let uvs = mesh.uvs.as_ref().unwrap();
        assert_eq!(uvs.scope, GeometryScope::FaceVarying);
        assert!(uvs.indices.is_empty());
    }

    #[test]
    fn test_inferred_variance() {
        let mut mesh = PolyMeshDesc::constant(vec![3], vec![0, 1, 2], vec![Vec3::ZERO; 3]);
        assert_eq!(mesh.inferred_variance(), TopologyVariance::Static);

        mesh.positions.push(vec![Vec3::ONE; 3]);
        assert_eq!(mesh.inferred_variance(), TopologyVariance::Homogeneous);

        mesh.face_counts.push(vec![3]);
        assert_eq!(mesh.inferred_variance(), TopologyVariance::Heterogeneous);

        mesh.topology_variance = Some(TopologyVariance::Homogeneous);
        assert_eq!(mesh.inferred_variance(), TopologyVariance::Homogeneous);
    }
}
