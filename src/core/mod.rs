//! Core layer - archive-facing traits and fundamental types.
//!
//! This module provides:
//! - [`TimeSampling`] - Time sampling for animated properties
//! - [`SampleSelector`] - Sample selection by index or time
//! - [`ArraySample`] / [`IndexedSample`] - Shared immutable array snapshots
//! - Abstract traits for reading archives, nodes and schemas

mod time_sampling;
mod traits;
mod sample;
mod array;

pub use time_sampling::TimeSampling;
pub use traits::{
    ArchiveFormat, ArchiveReader, NodeReader,
    GeomParamReader, PolyMeshReader, XformReader,
};
pub use sample::{SampleSelector, GeometryScope, TopologyVariance, SchemaKind};
pub use array::{ArraySample, IndexedSample};
