use std::{collections::btree_set, iter::FusedIterator};

use hashbrown::HashMap;

use crate::{core::index::Entry, types::EntryId};

/// Walks the forward index in id order, which is insertion order.
struct Cursor<'a, V, K> {
    order: btree_set::Iter<'a, EntryId>,
    records: &'a HashMap<EntryId, Entry<V, K>>,
}

impl<'a, V, K> Cursor<'a, V, K> {
    fn next_entry(&mut self) -> Option<(EntryId, &'a Entry<V, K>)> {
        let records = self.records;
        self.order
            .next()
            .and_then(|id| records.get(id).map(|entry| (*id, entry)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.order.size_hint()
    }
}

impl<V, K> Clone for Cursor<'_, V, K> {
    fn clone(&self) -> Self {
        Self {
            order: self.order.clone(),
            records: self.records,
        }
    }
}

macro_rules! entry_iter {
    ($(#[$doc:meta])* $name:ident, $item:ty, |$id:ident, $entry:ident| $map:expr) => {
        $(#[$doc])*
        pub struct $name<'a, V, K> {
            cursor: Cursor<'a, V, K>,
        }

        impl<'a, V, K> $name<'a, V, K> {
            pub(crate) fn new(
                order: &'a std::collections::BTreeSet<EntryId>,
                records: &'a HashMap<EntryId, Entry<V, K>>,
            ) -> Self {
                Self {
                    cursor: Cursor {
                        order: order.iter(),
                        records,
                    },
                }
            }
        }

        impl<'a, V, K> Iterator for $name<'a, V, K> {
            type Item = $item;

            fn next(&mut self) -> Option<Self::Item> {
                let ($id, $entry) = self.cursor.next_entry()?;
                Some($map)
            }

            fn size_hint(&self) -> (usize, Option<usize>) {
                self.cursor.size_hint()
            }
        }

        impl<V, K> ExactSizeIterator for $name<'_, V, K> {}

        impl<V, K> FusedIterator for $name<'_, V, K> {}

        impl<V, K> Clone for $name<'_, V, K> {
            fn clone(&self) -> Self {
                Self {
                    cursor: self.cursor.clone(),
                }
            }
        }
    };
}

entry_iter!(
    /// Live `(id, value)` pairs in insertion order.
    Iter,
    (EntryId, &'a V),
    |id, entry| (id, &entry.value)
);

entry_iter!(
    /// Per-entry key lists in insertion order.
    Keys,
    &'a [K],
    |_id, entry| entry.keys.as_slice()
);

entry_iter!(
    /// Live values in insertion order.
    Values,
    &'a V,
    |_id, entry| &entry.value
);

entry_iter!(
    /// `(key list, value)` pairs in insertion order.
    Entries,
    (&'a [K], &'a V),
    |_id, entry| (entry.keys.as_slice(), &entry.value)
);
