//! Index behavior knobs.

use serde::{Deserialize, Serialize};

/// What `add` does when an incoming key is already owned by another entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Rebind the key to the incoming entry (last writer wins).
    #[default]
    Overwrite,
    /// Leave the key bound to its existing owner (first writer wins).
    KeepExisting,
}

/// How removal treats keys that a later insertion took over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalPolicy {
    /// Unbind a recorded key only while it still points at the removed entry.
    #[default]
    VerifyOwner,
    /// Unbind every recorded key, even ones now owned by another entry.
    Unconditional,
}

/// Configuration for a [`crate::MultiKeyIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Duplicate-key handling on insert.
    pub collision_policy: CollisionPolicy,
    /// Key unbinding on removal.
    pub removal_policy: RemovalPolicy,
    /// Initial capacity hint, in entries.
    pub capacity: usize,
}
