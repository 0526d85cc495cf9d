//! Shared, immutable array samples.
//!
//! The archive layer hands out samples as reference-counted snapshots.
//! Readers never mutate them, and two handles pointing at the same
//! allocation are the same version of the data, which is what the
//! mesh cache uses to tell whether a property changed between reads.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use crate::core::GeometryScope;

/// Reference-counted array snapshot returned by property readers.
pub struct ArraySample<T>(Arc<[T]>);

impl<T> ArraySample<T> {
    /// Wrap owned data.
    pub fn new(data: Vec<T>) -> Self {
        Self(Arc::from(data))
    }

    /// Borrow the elements.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.0
    }

    /// Both handles refer to the same backing allocation.
    #[inline]
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Clone for ArraySample<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> Deref for ArraySample<T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        &self.0
    }
}

impl<T> From<Vec<T>> for ArraySample<T> {
    fn from(data: Vec<T>) -> Self {
        Self::new(data)
    }
}

impl<T> Default for ArraySample<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T: fmt::Debug> fmt::Debug for ArraySample<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

/// An indexed geometry parameter sample: values, per-element indices
/// into them, and the binding scope.
pub struct IndexedSample<T> {
    /// Distinct values.
    pub values: ArraySample<T>,
    /// One entry per bound element, indexing `values`.
    pub indices: ArraySample<u32>,
    /// Binding scope of the parameter.
    pub scope: GeometryScope,
}

impl<T> IndexedSample<T> {
    /// Create an indexed sample.
    pub fn new(values: ArraySample<T>, indices: ArraySample<u32>, scope: GeometryScope) -> Self {
        Self { values, indices, scope }
    }

    /// Sample carries data.
    #[inline]
    pub fn is_valid(&self) -> bool {
        !self.values.is_empty()
    }

    /// Both values and indices are the same versions as `other`'s.
    pub fn same_as(&self, other: &Self) -> bool {
        self.values.same_as(&other.values) && self.indices.same_as(&other.indices)
    }

    /// Value bound to element `i`, or `None` when either lookup is out of range.
    #[inline]
    pub fn get(&self, i: usize) -> Option<&T> {
        let idx = *self.indices.get(i)? as usize;
        self.values.get(idx)
    }
}

impl<T> Clone for IndexedSample<T> {
    fn clone(&self) -> Self {
        Self {
            values: self.values.clone(),
            indices: self.indices.clone(),
            scope: self.scope,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for IndexedSample<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexedSample")
            .field("scope", &self.scope)
            .field("values", &self.values.len())
            .field("indices", &self.indices.len())
            .finish()
    }
}
