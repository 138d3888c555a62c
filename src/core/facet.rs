use std::fmt;

/// Boxed key extractor.
pub type Extractor<V, K> = Box<dyn Fn(&V) -> K + Send + Sync>;

/// One named key space of an index, with the function that derives its key.
///
/// Extractors must be pure: the index calls them only when a value is added,
/// replaced, or updated, and trusts the keys it recorded then.
pub struct Facet<V, K> {
    name: String,
    extract: Extractor<V, K>,
}

impl<V, K> Facet<V, K> {
    /// Creates a facet from a name and an extractor.
    pub fn new<F>(name: impl Into<String>, extract: F) -> Self
    where
        F: Fn(&V) -> K + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            extract: Box::new(extract),
        }
    }

    /// Facet name, used in collision reports and errors.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Applies the extractor to `value`.
    pub fn extract(&self, value: &V) -> K {
        (self.extract)(value)
    }
}

impl<V, K> fmt::Debug for Facet<V, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Facet").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Applies every facet to `value`, in facet order.
pub(crate) fn derive_keys<V, K>(facets: &[Facet<V, K>], value: &V) -> Vec<K> {
    facets.iter().map(|facet| facet.extract(value)).collect()
}
