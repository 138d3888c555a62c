//! Error types.

use std::fmt;

use thiserror::Error;

use crate::types::EntryId;

/// Failures reported by index construction and strict insertion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    /// An index needs at least one facet to derive keys from.
    #[error("an index needs at least one facet")]
    NoFacets,
    /// A key produced by `facet` is already owned by `existing`.
    #[error("duplicate key on facet `{facet}` (owned by entry {existing})")]
    DuplicateKey {
        /// Name of the facet that produced the key.
        facet: String,
        /// Entry that currently owns the key.
        existing: EntryId,
    },
    /// Snapshot was written with an unknown format version.
    #[error("unsupported snapshot format {found} (expected {expected})")]
    UnsupportedSnapshot {
        /// Version found in the snapshot.
        found: u16,
        /// Version this build reads.
        expected: u16,
    },
}

/// A strict insert that was refused, handing the value back.
pub struct Rejected<V> {
    /// Why the value was refused.
    pub error: IndexError,
    /// The value that was not inserted.
    pub value: V,
}

impl<V> Rejected<V> {
    /// Returns the refused value.
    pub fn into_value(self) -> V {
        self.value
    }
}

impl<V> fmt::Debug for Rejected<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rejected").field("error", &self.error).finish_non_exhaustive()
    }
}

impl<V> fmt::Display for Rejected<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "insert rejected: {}", self.error)
    }
}

impl<V> std::error::Error for Rejected<V> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
