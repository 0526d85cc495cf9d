//! Error types for the importer.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for importer operations.
#[derive(Error, Debug)]
pub enum Error {
    /// No container format could parse the file
    #[error("Failed to open archive {path}: {reason}")]
    ArchiveOpen { path: PathBuf, reason: String },

    /// Sampling was requested on a session without a loaded archive
    #[error("No archive loaded")]
    NotLoaded,

    /// The archive layer failed to read a property or node
    #[error("Read failed for {what}: {reason}")]
    Read { what: String, reason: String },

    /// Face counts do not add up to the face index array length
    #[error("Topology mismatch: face counts sum to {counts_sum}, but there are {num_indices} face indices")]
    TopologyMismatch { counts_sum: usize, num_indices: usize },

    /// Destination buffer cannot hold the requested data
    #[error("Destination buffer too small: need {needed}, got {actual}")]
    BufferTooSmall { needed: usize, actual: usize },

    /// Submesh descriptor does not address a prepared submesh
    #[error("Submesh index {index} out of range (count: {count})")]
    SubmeshOutOfRange { index: usize, count: usize },

    /// A single face does not fit into the chunk vertex budget
    #[error("Face {face} has {vertices} vertices, exceeding the budget of {budget}")]
    FaceExceedsBudget { face: usize, vertices: usize, budget: usize },

    /// Object not found by path
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create a read error for the named property or node.
    pub fn read(what: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Read {
            what: what.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for importer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Fail with [`Error::BufferTooSmall`] unless `dst` holds at least `needed` items.
#[inline]
pub(crate) fn check_len<T>(dst: &[T], needed: usize) -> Result<()> {
    if dst.len() < needed {
        Err(Error::BufferTooSmall {
            needed,
            actual: dst.len(),
        })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::TopologyMismatch { counts_sum: 7, num_indices: 6 };
        assert!(e.to_string().contains("7"));
        assert!(e.to_string().contains("6"));

        let e = Error::read("P", "truncated");
        assert!(e.to_string().contains("P"));
        assert!(e.to_string().contains("truncated"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_check_len() {
        let buf = [0u32; 4];
        assert!(check_len(&buf, 4).is_ok());
        assert!(matches!(
            check_len(&buf, 5),
            Err(Error::BufferTooSmall { needed: 5, actual: 4 })
        ));
    }
}
