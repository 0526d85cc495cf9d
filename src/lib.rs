//! # Alembic Importer
//!
//! Streams time-sampled scene-graph geometry caches into flat,
//! renderer-ready vertex and index buffers.
//!
//! Meshes may change topology between samples. The importer re-reads only
//! the attributes that changed, fan-triangulates n-gons, partitions faces
//! into submeshes by face set and UV tile, splits large meshes under a
//! vertex budget and converts between right- and left-handed frames.
//!
//! ## Modules
//!
//! - [`util`] - Errors and math types
//! - [`core`] - Archive reader traits, samples, time sampling
//! - [`geom`] - Mesh sample cache and buffer conversion
//! - [`memory`] - In-memory archive backend (JSON / gzip JSON)
//! - [`session`] - Loaded archive with its object tree
//! - [`registry`] - Handle-based registry of sessions
//! - [`settings`] - Persistent import and playback settings
//! - [`stream`] - Playback driver that skips redundant refreshes
//!
//! ## Example
//!
//! ```ignore
//! use alembic_importer::prelude::*;
//!
//! let mut session = Session::new(ImportSettings::default());
//! session.load("shot.json.gz")?;
//! session.set_time(1.5);
//! session.update()?;
//!
//! let id = session.find("/geo/body")?;
//! let mesh = session.object(id).and_then(|o| o.polymesh()).unwrap();
//! let mut indices = vec![0u32; mesh.index_count()];
//! mesh.copy_indices(&mut indices)?;
//! ```

pub mod util;
pub mod core;
pub mod geom;
pub mod memory;
pub mod session;
pub mod registry;
pub mod settings;
pub mod stream;

// Re-export commonly used types
pub use util::{Error, Result};
pub use session::Session;
pub use settings::ImportSettings;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{Error, Result, Chrono, Vec2, Vec3};
    pub use crate::core::{SampleSelector, TimeSampling, SchemaKind, GeometryScope, TopologyVariance};
    pub use crate::geom::*;
    pub use crate::session::Session;
    pub use crate::settings::{ImportSettings, PlaybackSettings, CycleType};
    pub use crate::stream::Stream;
    pub use crate::registry::{SessionRegistry, SessionHandle};
}
