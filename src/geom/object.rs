//! Scene-graph objects held by a session.

use std::fmt;
use std::sync::Arc;

use crate::core::{NodeReader, SampleSelector, SchemaKind};
use crate::geom::{MeshFlags, PolyMesh, RefreshReport, XformState};
use crate::util::{Chrono, Result};

/// Index of an object in its session's arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub(crate) usize);

impl ObjectId {
    /// Position in depth-first order.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Schema state attached to an object.
pub enum Schema {
    Xform(XformState),
    PolyMesh(PolyMesh),
    /// Recognised but not sampled (curves, points, cameras, ...), or no schema.
    Unsupported(SchemaKind),
}

impl Schema {
    fn from_node(node: &dyn NodeReader) -> Self {
        let kind = node.schema_kind();
        match kind {
            SchemaKind::PolyMesh => match node.as_polymesh() {
                Some(reader) => Self::PolyMesh(PolyMesh::new(reader)),
                None => Self::Unsupported(kind),
            },
            SchemaKind::Xform => match node.as_xform() {
                Some(reader) => Self::Xform(XformState::new(reader)),
                None => Self::Unsupported(kind),
            },
            _ => Self::Unsupported(kind),
        }
    }

    /// Kind of the attached schema.
    pub fn kind(&self) -> SchemaKind {
        match self {
            Self::Xform(_) => SchemaKind::Xform,
            Self::PolyMesh(_) => SchemaKind::PolyMesh,
            Self::Unsupported(kind) => *kind,
        }
    }
}

/// One node of the loaded scene with its schema state.
pub struct GeometryObject {
    node: Arc<dyn NodeReader>,
    parent: Option<ObjectId>,
    pub(crate) children: Vec<ObjectId>,
    flags: MeshFlags,
    time: Chrono,
    schema: Schema,
}

impl GeometryObject {
    /// Create an object for `node`. No samples are read yet.
    pub fn new(node: Arc<dyn NodeReader>, parent: Option<ObjectId>, flags: MeshFlags) -> Self {
        let schema = Schema::from_node(node.as_ref());
        let mut obj = Self {
            node,
            parent,
            children: Vec::new(),
            flags,
            time: 0.0,
            schema,
        };
        obj.set_flags(flags);
        obj
    }

    /// Node name.
    pub fn name(&self) -> &str {
        self.node.name()
    }

    /// Full path from the root.
    pub fn full_name(&self) -> &str {
        self.node.full_name()
    }

    /// Node reader.
    pub fn node(&self) -> &Arc<dyn NodeReader> {
        &self.node
    }

    /// Parent object, `None` for the root.
    pub fn parent(&self) -> Option<ObjectId> {
        self.parent
    }

    /// Child objects in archive order. Children that failed to read are absent.
    pub fn children(&self) -> &[ObjectId] {
        &self.children
    }

    /// Get number of children.
    pub fn num_children(&self) -> usize {
        self.children.len()
    }

    /// Conversion flags.
    pub fn flags(&self) -> MeshFlags {
        self.flags
    }

    /// Replace the conversion flags.
    pub fn set_flags(&mut self, flags: MeshFlags) {
        self.flags = flags;
        match &mut self.schema {
            Schema::PolyMesh(mesh) => mesh.set_flags(flags),
            Schema::Xform(xform) => xform.set_mirror_x(flags.mirror_x),
            Schema::Unsupported(_) => {}
        }
    }

    /// Current sample time.
    pub fn time(&self) -> Chrono {
        self.time
    }

    /// Set the sample time used by the next [`update`](Self::update).
    pub fn set_time(&mut self, time: Chrono) {
        self.time = time;
    }

    /// Attached schema state.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Kind of the attached schema.
    pub fn schema_kind(&self) -> SchemaKind {
        self.schema.kind()
    }

    /// Check if the object is a transform.
    pub fn has_xform(&self) -> bool {
        matches!(self.schema, Schema::Xform(_))
    }

    /// Check if the object is a poly mesh.
    pub fn has_polymesh(&self) -> bool {
        matches!(self.schema, Schema::PolyMesh(_))
    }

    pub fn xform(&self) -> Option<&XformState> {
        match &self.schema {
            Schema::Xform(x) => Some(x),
            _ => None,
        }
    }

    pub fn polymesh(&self) -> Option<&PolyMesh> {
        match &self.schema {
            Schema::PolyMesh(m) => Some(m),
            _ => None,
        }
    }

    pub fn polymesh_mut(&mut self) -> Option<&mut PolyMesh> {
        match &mut self.schema {
            Schema::PolyMesh(m) => Some(m),
            _ => None,
        }
    }

    /// Refresh the schema state at the current time (floor sample).
    ///
    /// Returns the mesh refresh report, or the default report for
    /// non-mesh schemas.
    pub fn update(&mut self) -> Result<RefreshReport> {
        let selector = SampleSelector::time_floor(self.time);
        match &mut self.schema {
            Schema::PolyMesh(mesh) => mesh.refresh(selector),
            Schema::Xform(xform) => xform.refresh(selector).map(|()| RefreshReport::default()),
            Schema::Unsupported(_) => Ok(RefreshReport::default()),
        }
    }
}

impl fmt::Debug for GeometryObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeometryObject")
            .field("name", &self.full_name())
            .field("schema", &self.schema_kind())
            .field("children", &self.children.len())
            .field("time", &self.time)
            .finish()
    }
}
