//! Serializable export of an index's live values.
//!
//! A snapshot carries values only. Keys are re-derived by the facets of the
//! index the snapshot is restored into, so facets never need to be
//! serialized.

use std::{fmt, hash::Hash};

use serde::{Deserialize, Serialize};

use crate::{
    core::{facet::Facet, index::MultiKeyIndex},
    error::IndexError,
};

/// Version number for serialized [`IndexSnapshot`] payloads.
pub const SNAPSHOT_FORMAT_VERSION: u16 = 1;

/// Live values of an index in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSnapshot<V> {
    /// Payload format version.
    pub format_version: u16,
    /// Values, oldest first.
    pub values: Vec<V>,
}

impl<V> IndexSnapshot<V> {
    /// Wraps `values` using [`SNAPSHOT_FORMAT_VERSION`].
    pub fn new(values: Vec<V>) -> Self {
        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            values,
        }
    }
}

impl<V, K> MultiKeyIndex<V, K>
where
    V: Clone,
{
    /// Copies the live values out in insertion order.
    pub fn export_snapshot(&self) -> IndexSnapshot<V> {
        IndexSnapshot::new(self.values().cloned().collect())
    }
}

impl<V, K> MultiKeyIndex<V, K>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    /// Adds every value of `snapshot`, in order, returning how many were added.
    ///
    /// Existing entries are kept; collisions follow the configured policy.
    pub fn restore(&mut self, snapshot: IndexSnapshot<V>) -> Result<usize, IndexError> {
        if snapshot.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(IndexError::UnsupportedSnapshot {
                found: snapshot.format_version,
                expected: SNAPSHOT_FORMAT_VERSION,
            });
        }

        let count = snapshot.values.len();
        self.extend(snapshot.values);
        tracing::debug!(count, "snapshot restored");
        Ok(count)
    }

    /// Builds an index over `facets` holding the values of `snapshot`.
    pub fn from_snapshot(
        facets: impl IntoIterator<Item = Facet<V, K>>,
        snapshot: IndexSnapshot<V>,
    ) -> Result<Self, IndexError> {
        let mut index = Self::new(facets)?;
        index.restore(snapshot)?;
        Ok(index)
    }
}
