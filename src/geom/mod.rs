//! Geometry conversion.
//!
//! This module turns schema samples into renderer-ready buffers:
//! - [`PolyMesh`] / [`MeshSample`] - Mesh sample cache and refresh policy
//! - [`topology`] - Fan triangulation, index and vertex copies
//! - [`submesh`] - Partitioning by face set and UV tile
//! - [`vertex_buffer`] - Per-face-vertex buffers
//! - [`normals`] - Normal mode and generated normals
//! - [`split`] - Chunking under a vertex budget
//! - [`XformState`] - Transform samples with handedness correction
//! - [`GeometryObject`] - Scene-graph node holding one of the above

pub mod faceset;
pub mod normals;
pub mod object;
pub mod polymesh;
pub mod split;
pub mod submesh;
pub mod topology;
pub mod vertex_buffer;
pub mod xform;

pub use faceset::FaceSetSpec;
pub use normals::NormalMode;
pub use object::{GeometryObject, ObjectId, Schema};
pub use polymesh::{MeshFlags, MeshSample, PolyMesh, RefreshReport};
pub use split::{SplitChunks, SplitMeshInfo};
pub use submesh::{Submesh, SubmeshFaces, SubmeshInfo};
pub use vertex_buffer::{MeshBuffers, Vertex};
pub use xform::{XformSample, XformState};
