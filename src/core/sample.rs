//! Sample selection and schema classification types.

use serde::{Deserialize, Serialize};

use crate::util::Chrono;

/// Sample selector for reading property samples.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SampleSelector {
    /// Select by exact index.
    Index(usize),
    /// Select by time - floor (largest index <= time).
    TimeFloor(Chrono),
    /// Select by time - ceil (smallest index >= time).
    TimeCeil(Chrono),
    /// Select by time - nearest.
    TimeNear(Chrono),
}

impl SampleSelector {
    /// Create a selector for index 0 (first/static sample).
    pub const fn first() -> Self {
        Self::Index(0)
    }

    /// Create a selector for a specific index.
    pub const fn index(i: usize) -> Self {
        Self::Index(i)
    }

    /// Create a selector for floor time.
    pub const fn time_floor(t: Chrono) -> Self {
        Self::TimeFloor(t)
    }

    /// Create a selector for ceil time.
    pub const fn time_ceil(t: Chrono) -> Self {
        Self::TimeCeil(t)
    }

    /// Create a selector for nearest time.
    pub const fn time_near(t: Chrono) -> Self {
        Self::TimeNear(t)
    }
}

impl Default for SampleSelector {
    fn default() -> Self {
        Self::Index(0)
    }
}

impl From<usize> for SampleSelector {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// Binding scope of a geometry attribute.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryScope {
    /// Constant for entire object.
    #[default]
    Constant,
    /// Per-face.
    Uniform,
    /// Per-vertex, interpolated.
    Varying,
    /// Per-vertex.
    Vertex,
    /// Per-face-vertex.
    FaceVarying,
}

impl GeometryScope {
    /// Parse from string (as stored in metadata).
    pub fn parse(s: &str) -> Self {
        match s {
            "con" | "constant" => Self::Constant,
            "uni" | "uniform" => Self::Uniform,
            "var" | "varying" => Self::Varying,
            "vtx" | "vertex" => Self::Vertex,
            "fvr" | "facevarying" => Self::FaceVarying,
            _ => Self::Constant,
        }
    }

    /// Convert to short string for metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Constant => "con",
            Self::Uniform => "uni",
            Self::Varying => "var",
            Self::Vertex => "vtx",
            Self::FaceVarying => "fvr",
        }
    }

    /// Whether normals bound with this scope can be expanded per face-vertex.
    #[inline]
    pub fn supports_normals(&self) -> bool {
        matches!(self, Self::Vertex | Self::Varying | Self::FaceVarying)
    }

    /// Whether UVs bound with this scope can be expanded per face-vertex.
    #[inline]
    pub fn supports_uvs(&self) -> bool {
        matches!(self, Self::FaceVarying)
    }
}

/// Topology variance hint for geometry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopologyVariance {
    /// Completely static (single sample).
    Static,
    /// Topology is constant, only positions change.
    Homogeneous,
    /// Topology changes every sample.
    #[default]
    Heterogeneous,
}

impl TopologyVariance {
    /// Face counts and indices never change between samples.
    #[inline]
    pub fn is_constant_topology(&self) -> bool {
        !matches!(self, Self::Heterogeneous)
    }
}

/// Kind of schema attached to a scene-graph node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    Xform,
    PolyMesh,
    Curves,
    Points,
    Camera,
    Light,
    Material,
    #[default]
    None,
}

impl SchemaKind {
    /// Short display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Xform => "Xform",
            Self::PolyMesh => "PolyMesh",
            Self::Curves => "Curves",
            Self::Points => "Points",
            Self::Camera => "Camera",
            Self::Light => "Light",
            Self::Material => "Material",
            Self::None => "-",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_selector() {
        let sel = SampleSelector::index(5);
        assert!(matches!(sel, SampleSelector::Index(5)));

        let sel: SampleSelector = 3.into();
        assert!(matches!(sel, SampleSelector::Index(3)));

        assert_eq!(SampleSelector::default(), SampleSelector::first());
    }

    #[test]
    fn test_geometry_scope() {
        assert_eq!(GeometryScope::parse("fvr"), GeometryScope::FaceVarying);
        assert_eq!(GeometryScope::Vertex.as_str(), "vtx");
        assert!(GeometryScope::Varying.supports_normals());
        assert!(!GeometryScope::Uniform.supports_normals());
        assert!(GeometryScope::FaceVarying.supports_uvs());
        assert!(!GeometryScope::Vertex.supports_uvs());
    }

    #[test]
    fn test_geometry_scope_serde() {
        let s: GeometryScope = serde_json::from_str("\"facevarying\"").unwrap();
        assert_eq!(s, GeometryScope::FaceVarying);
        let s: GeometryScope = serde_json::from_str("\"vertex\"").unwrap();
        assert_eq!(s, GeometryScope::Vertex);
    }

    #[test]
    fn test_topology_variance() {
        assert!(TopologyVariance::Static.is_constant_topology());
        assert!(TopologyVariance::Homogeneous.is_constant_topology());
        assert!(!TopologyVariance::Heterogeneous.is_constant_topology());
    }
}
