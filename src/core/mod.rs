//! The multi-key index and its supporting pieces.

/// Named key extractors.
pub mod facet;
/// The index: forward and reverse tables and the operations over them.
pub mod index;
/// Insertion-ordered borrowing iterators.
pub mod iter;
