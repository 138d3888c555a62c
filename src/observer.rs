//! Duplicate-key notifications.

use std::fmt;

use crate::types::EntryId;

/// How a collision was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The key now points at the incoming entry.
    Overwritten,
    /// The key still points at the existing entry.
    KeptExisting,
    /// The insert was refused and the index left untouched.
    Rejected,
}

/// One key produced by an incoming value that another live entry already owns.
#[derive(Debug)]
pub struct Collision<'a, K, V> {
    /// Name of the facet that produced the key for the incoming value.
    pub facet: &'a str,
    /// Position of that facet in the index's facet list.
    pub facet_index: usize,
    /// The contested key.
    pub key: &'a K,
    /// Id the incoming value has, or would have had, in the index.
    pub incoming: EntryId,
    /// The incoming value.
    pub incoming_value: &'a V,
    /// Current owner of the key.
    pub existing: EntryId,
    /// The current owner's value.
    pub existing_value: &'a V,
    /// What the index did about it.
    pub resolution: Resolution,
}

/// Receives collision reports from an index.
pub trait CollisionObserver<K, V>: Send {
    /// Called once per contested key, before the index moves on.
    fn on_collision(&mut self, collision: &Collision<'_, K, V>);
}

impl<K, V, F> CollisionObserver<K, V> for F
where
    F: FnMut(&Collision<'_, K, V>) + Send,
{
    fn on_collision(&mut self, collision: &Collision<'_, K, V>) {
        self(collision)
    }
}

/// Default observer: a `warn` event through `tracing`.
///
/// Records the contested key with its facet and the two entry ids. Values are
/// left out since they are not required to be `Debug`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl<K, V> CollisionObserver<K, V> for TracingObserver
where
    K: fmt::Debug,
{
    fn on_collision(&mut self, collision: &Collision<'_, K, V>) {
        tracing::warn!(
            facet = collision.facet,
            key = ?collision.key,
            incoming = %collision.incoming,
            existing = %collision.existing,
            resolution = ?collision.resolution,
            "duplicate key"
        );
    }
}
