//! Face set descriptions used to partition a mesh into submeshes.
//!
//! Face sets are passed flattened: one size per set plus the concatenated
//! face indices of all sets. A set of size 0 is the default set and absorbs
//! every face no other set lists.

use serde::{Deserialize, Serialize};

/// Flattened list of face sets.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceSetSpec {
    /// Number of faces in each set.
    pub sizes: Vec<usize>,
    /// Face indices of all sets, concatenated in set order.
    pub faces: Vec<i32>,
}

impl FaceSetSpec {
    /// Create from flattened sizes and faces.
    pub fn new(sizes: Vec<usize>, faces: Vec<i32>) -> Self {
        Self { sizes, faces }
    }

    /// Build from one face list per set. An empty list marks the default set.
    pub fn from_sets<S: AsRef<[i32]>>(sets: &[S]) -> Self {
        let mut spec = Self::default();
        for set in sets {
            let set = set.as_ref();
            spec.sizes.push(set.len());
            spec.faces.extend_from_slice(set);
        }
        spec
    }

    /// Number of face sets.
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    /// Check if there are no face sets.
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Index of the default set (the last one with size 0).
    pub fn default_set(&self) -> Option<usize> {
        self.sizes.iter().rposition(|&s| s == 0)
    }

    /// Iterate the face lists of all sets.
    ///
    /// Sizes running past the end of `faces` are truncated.
    pub fn iter(&self) -> impl Iterator<Item = &[i32]> + '_ {
        let mut begin = 0usize;
        self.sizes.iter().map(move |&size| {
            let start = begin.min(self.faces.len());
            let end = begin.saturating_add(size).min(self.faces.len());
            begin = begin.saturating_add(size);
            &self.faces[start..end]
        })
    }
}
