use std::{borrow::Borrow, collections::BTreeSet, fmt, hash::Hash};

use hashbrown::HashMap;

use crate::{
    config::{CollisionPolicy, IndexConfig, RemovalPolicy},
    core::{
        facet::{derive_keys, Facet},
        iter::{Entries, Iter, Keys, Values},
    },
    error::{IndexError, Rejected},
    observer::{Collision, CollisionObserver, Resolution, TracingObserver},
    types::{EntryId, FacetKey},
};

pub(crate) struct Entry<V, K> {
    pub(crate) value: V,
    pub(crate) keys: Vec<K>,
}

/// Outcome of a successful [`MultiKeyIndex::replace`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replaced<V> {
    /// Id of the newly added entry.
    pub id: EntryId,
    /// Value that owned the key before the call.
    pub previous: V,
}

/// A collection of values, each retrievable by any key one of its facets
/// derives.
///
/// Values are owned by the index and identified by the [`EntryId`] assigned
/// when they are added. Every facet writes into a single key table, so a key
/// resolves to at most one live value regardless of which facet produced it.
pub struct MultiKeyIndex<V, K = FacetKey> {
    facets: Vec<Facet<V, K>>,
    records: HashMap<EntryId, Entry<V, K>>,
    order: BTreeSet<EntryId>,
    by_key: HashMap<K, EntryId>,
    config: IndexConfig,
    observer: Option<Box<dyn CollisionObserver<K, V>>>,
    next_id: u64,
}

/// Step-by-step construction of a [`MultiKeyIndex`].
pub struct MultiKeyIndexBuilder<V, K = FacetKey> {
    facets: Vec<Facet<V, K>>,
    config: IndexConfig,
    observer: Option<Box<dyn CollisionObserver<K, V>>>,
}

impl<V, K> MultiKeyIndexBuilder<V, K> {
    /// Appends a facet. Facet order is the order of each entry's key list.
    pub fn facet<F>(mut self, name: impl Into<String>, extract: F) -> Self
    where
        F: Fn(&V) -> K + Send + Sync + 'static,
    {
        self.facets.push(Facet::new(name, extract));
        self
    }

    /// Appends prebuilt facets.
    pub fn facets(mut self, facets: impl IntoIterator<Item = Facet<V, K>>) -> Self {
        self.facets.extend(facets);
        self
    }

    /// Replaces the configuration.
    pub fn config(mut self, config: IndexConfig) -> Self {
        self.config = config;
        self
    }

    /// Installs a collision observer in place of the `tracing` default.
    pub fn observer(mut self, observer: impl CollisionObserver<K, V> + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Installs a closure as the collision observer.
    pub fn observe_with<F>(self, f: F) -> Self
    where
        F: FnMut(&Collision<'_, K, V>) + Send + 'static,
    {
        self.observer(f)
    }

    /// Disables collision reporting.
    pub fn without_observer(mut self) -> Self {
        self.observer = None;
        self
    }

    /// Builds the index. Fails if no facet was given.
    pub fn build(self) -> Result<MultiKeyIndex<V, K>, IndexError> {
        if self.facets.is_empty() {
            return Err(IndexError::NoFacets);
        }

        let capacity = self.config.capacity;
        Ok(MultiKeyIndex {
            records: HashMap::with_capacity(capacity),
            order: BTreeSet::new(),
            by_key: HashMap::with_capacity(capacity.saturating_mul(self.facets.len())),
            facets: self.facets,
            config: self.config,
            observer: self.observer,
            next_id: 1,
        })
    }
}

impl<V, K> MultiKeyIndex<V, K>
where
    K: fmt::Debug,
{
    /// Starts a builder with the default config and the `tracing` observer.
    pub fn builder() -> MultiKeyIndexBuilder<V, K> {
        MultiKeyIndexBuilder {
            facets: Vec::new(),
            config: IndexConfig::default(),
            observer: Some(Box::new(TracingObserver)),
        }
    }

    /// Creates an index over `facets` with the default configuration.
    pub fn new(facets: impl IntoIterator<Item = Facet<V, K>>) -> Result<Self, IndexError> {
        Self::builder().facets(facets).build()
    }

    /// Creates an index over `facets` with `config`.
    pub fn with_config(
        facets: impl IntoIterator<Item = Facet<V, K>>,
        config: IndexConfig,
    ) -> Result<Self, IndexError> {
        Self::builder().facets(facets).config(config).build()
    }
}

impl<V, K> MultiKeyIndex<V, K> {
    /// Number of live values.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no value is live.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of keys currently bound, across all facets.
    pub fn key_count(&self) -> usize {
        self.by_key.len()
    }

    /// The facets, in key-list order.
    pub fn facets(&self) -> &[Facet<V, K>] {
        &self.facets
    }

    /// The facet names, in key-list order.
    pub fn facet_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.facets.iter().map(Facet::name)
    }

    /// Active configuration.
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Value with identity `id`, if live.
    pub fn get_by_id(&self, id: EntryId) -> Option<&V> {
        self.records.get(&id).map(|entry| &entry.value)
    }

    /// Key list last derived for `id`, in facet order.
    ///
    /// Keys later taken over by a colliding insert are still listed here.
    pub fn keys_of(&self, id: EntryId) -> Option<&[K]> {
        self.records.get(&id).map(|entry| entry.keys.as_slice())
    }

    /// True when `id` is live.
    pub fn contains_id(&self, id: EntryId) -> bool {
        self.records.contains_key(&id)
    }

    /// Drops every entry. Ids handed out before are not reused.
    pub fn clear(&mut self) {
        let dropped = self.records.len();
        self.records.clear();
        self.order.clear();
        self.by_key.clear();
        tracing::debug!(dropped, "index cleared");
    }

    /// Live ids and values in insertion order.
    pub fn iter(&self) -> Iter<'_, V, K> {
        Iter::new(&self.order, &self.records)
    }

    /// Key list of each live value, in insertion order.
    pub fn keys(&self) -> Keys<'_, V, K> {
        Keys::new(&self.order, &self.records)
    }

    /// Live values in insertion order.
    pub fn values(&self) -> Values<'_, V, K> {
        Values::new(&self.order, &self.records)
    }

    /// `(key list, value)` pairs in insertion order.
    pub fn entries(&self) -> Entries<'_, V, K> {
        Entries::new(&self.order, &self.records)
    }

    /// Calls `f` with each live value, its key list, and the index.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&V, &[K], &Self),
    {
        for (keys, value) in self.entries() {
            f(value, keys, self);
        }
    }

    fn take_next_id(&mut self) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        id
    }
}

impl<V, K> MultiKeyIndex<V, K>
where
    K: Eq + Hash + Clone,
{
    /// Adds `value` under every key its facets derive.
    ///
    /// A key already owned by another entry is resolved by the configured
    /// [`CollisionPolicy`] and reported to the observer; the insert itself
    /// always succeeds.
    pub fn add(&mut self, value: V) -> EntryId {
        let keys = derive_keys(&self.facets, &value);
        self.insert_entry(value, keys)
    }

    /// Adds `value` only if none of its keys is owned by another entry.
    ///
    /// On refusal the index is untouched and the value comes back in the
    /// error.
    pub fn try_add(&mut self, value: V) -> Result<EntryId, Rejected<V>> {
        let keys = derive_keys(&self.facets, &value);
        let contested = keys.iter().enumerate().find_map(|(facet_index, key)| {
            self.by_key.get(key).map(|owner| (facet_index, *owner))
        });

        if let Some((facet_index, existing)) = contested {
            let incoming = EntryId(self.next_id);
            self.report(
                facet_index,
                &keys[facet_index],
                incoming,
                Some(&value),
                existing,
                Resolution::Rejected,
            );
            return Err(Rejected {
                error: IndexError::DuplicateKey {
                    facet: self.facets[facet_index].name().to_string(),
                    existing,
                },
                value,
            });
        }

        Ok(self.insert_entry(value, keys))
    }

    /// True when some live value owns `key`.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.by_key.contains_key(key)
    }

    /// Id of the value that owns `key`.
    pub fn get_id<Q>(&self, key: &Q) -> Option<EntryId>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.by_key.get(key).copied()
    }

    /// Value that owns `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_id(key).and_then(|id| self.get_by_id(id))
    }

    /// Removes the entry with identity `id` and unbinds its keys.
    pub fn remove(&mut self, id: EntryId) -> Option<V> {
        let entry = self.records.remove(&id)?;
        self.order.remove(&id);
        self.unbind_keys(id, &entry.keys);
        tracing::trace!(%id, "entry removed");
        Some(entry.value)
    }

    /// Removes the value that owns `key`, along with all of its other keys.
    pub fn remove_by_key<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let id = self.get_id(key)?;
        self.remove(id)
    }

    /// Supersedes the value that owns `key` with `value`.
    ///
    /// The previous owner is removed with its whole key set, then `value` is
    /// added fresh, so it gets a new id and moves to the end of iteration
    /// order. If nothing owns `key`, `value` is handed back untouched.
    pub fn replace<Q>(&mut self, key: &Q, value: V) -> Result<Replaced<V>, V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(owner) = self.get_id(key) else {
            return Err(value);
        };
        let Some(previous) = self.remove(owner) else {
            return Err(value);
        };

        let id = self.add(value);
        tracing::debug!(old = %owner, new = %id, "entry replaced");
        Ok(Replaced { id, previous })
    }

    /// Mutates the value that owns `key` in place and re-derives its keys.
    ///
    /// Unlike [`replace`](Self::replace), the entry keeps its id and position.
    pub fn update<Q, F>(&mut self, key: &Q, f: F) -> Option<EntryId>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        F: FnOnce(&mut V),
    {
        let id = self.get_id(key)?;
        self.update_by_id(id, f).then_some(id)
    }

    /// Mutates the value with identity `id` in place and re-derives its keys.
    ///
    /// Returns false if `id` is not live.
    pub fn update_by_id<F>(&mut self, id: EntryId, f: F) -> bool
    where
        F: FnOnce(&mut V),
    {
        let Some(entry) = self.records.get_mut(&id) else {
            return false;
        };

        f(&mut entry.value);
        let keys = derive_keys(&self.facets, &entry.value);
        let previous = std::mem::replace(&mut entry.keys, keys.clone());

        let stale: Vec<K> = previous
            .iter()
            .filter(|key| !keys.contains(key))
            .cloned()
            .collect();
        self.unbind_keys(id, &stale);
        self.bind_keys(id, &keys, &previous);
        true
    }

    /// Keeps only the values for which `f` returns true.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&V) -> bool,
    {
        let doomed: Vec<EntryId> = self
            .iter()
            .filter_map(|(id, value)| (!f(value)).then_some(id))
            .collect();
        for id in doomed {
            self.remove(id);
        }
    }

    fn insert_entry(&mut self, value: V, keys: Vec<K>) -> EntryId {
        let id = self.take_next_id();
        self.records.insert(
            id,
            Entry {
                value,
                keys: keys.clone(),
            },
        );
        self.order.insert(id);
        self.bind_keys(id, &keys, &[]);
        id
    }

    /// Binds `keys` to `id`, skipping the ones listed in `held`.
    fn bind_keys(&mut self, id: EntryId, keys: &[K], held: &[K]) {
        for (facet_index, key) in keys.iter().enumerate() {
            if held.contains(key) {
                continue;
            }
            match self.by_key.get(key).copied() {
                Some(owner) if owner == id => {}
                Some(owner) => {
                    let resolution = match self.config.collision_policy {
                        CollisionPolicy::Overwrite => Resolution::Overwritten,
                        CollisionPolicy::KeepExisting => Resolution::KeptExisting,
                    };
                    self.report(facet_index, key, id, None, owner, resolution);
                    if resolution == Resolution::Overwritten {
                        self.by_key.insert(key.clone(), id);
                    }
                }
                None => {
                    self.by_key.insert(key.clone(), id);
                }
            }
        }
    }

    fn unbind_keys(&mut self, id: EntryId, keys: &[K]) {
        for key in keys {
            match self.config.removal_policy {
                RemovalPolicy::VerifyOwner => {
                    if self.by_key.get(key) == Some(&id) {
                        self.by_key.remove(key);
                    }
                }
                RemovalPolicy::Unconditional => {
                    self.by_key.remove(key);
                }
            }
        }
    }

    fn report(
        &mut self,
        facet_index: usize,
        key: &K,
        incoming: EntryId,
        incoming_value: Option<&V>,
        existing: EntryId,
        resolution: Resolution,
    ) {
        let Some(observer) = self.observer.as_mut() else {
            return;
        };
        let Some(existing_entry) = self.records.get(&existing) else {
            return;
        };
        let Some(incoming_value) =
            incoming_value.or_else(|| self.records.get(&incoming).map(|entry| &entry.value))
        else {
            return;
        };

        observer.on_collision(&Collision {
            facet: self.facets[facet_index].name(),
            facet_index,
            key,
            incoming,
            incoming_value,
            existing,
            existing_value: &existing_entry.value,
            resolution,
        });
    }
}

impl<V, K> Extend<V> for MultiKeyIndex<V, K>
where
    K: Eq + Hash + Clone,
{
    fn extend<I: IntoIterator<Item = V>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

impl<'a, V, K> IntoIterator for &'a MultiKeyIndex<V, K> {
    type Item = (&'a [K], &'a V);
    type IntoIter = Entries<'a, V, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries()
    }
}

impl<V, K> fmt::Debug for MultiKeyIndex<V, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiKeyIndex")
            .field("facets", &self.facet_names().collect::<Vec<_>>())
            .field("len", &self.len())
            .field("key_count", &self.key_count())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
