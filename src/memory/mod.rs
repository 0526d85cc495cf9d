//! In-memory archive backend.
//!
//! Scenes are described with serde types ([`SceneDesc`]) and stored as
//! JSON or gzip-compressed JSON. Loading builds a [`MemArchive`] that
//! implements the reader traits in [`crate::core`].

mod archive;
mod desc;
mod format;

pub use archive::{MemArchive, MemNode, MemParam, MemPolyMesh, MemXform};
pub use desc::{NodeDesc, ParamDesc, PolyMeshDesc, SceneDesc, SchemaDesc, XformDesc, XformSampleDesc};
pub use format::{default_formats, write_scene, GzipJsonFormat, JsonFormat};
