//! Ordered placeholder bindings for template interpolation.

use std::collections::{BTreeMap, HashMap};

/// An insertion-ordered mapping of placeholder names to replacement values.
///
/// Entries may be recorded with an absent key or value (mirroring loosely
/// typed input such as parsed parameter files). Such entries are kept so the
/// binding set round-trips, but [`Bindings::entries`] never yields them.
///
/// # Invariants
///
/// - Iteration order is insertion order.
/// - Re-inserting a key replaces its value in place, keeping the original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    entries: Vec<(Option<String>, Option<String>)>,
}

impl Bindings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Bindings::insert`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.insert_raw(Some(key.into()), Some(value.into()));
    }

    /// Record an entry whose key or value may be missing.
    pub fn insert_raw(&mut self, key: Option<String>, value: Option<String>) {
        if let Some(k) = key.as_deref()
            && let Some(slot) = self
                .entries
                .iter_mut()
                .find(|(existing, _)| existing.as_deref() == Some(k))
        {
            slot.1 = value;
            return;
        }
        self.entries.push((key, value));
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_deref() == Some(key))
            .and_then(|(_, v)| v.as_deref())
    }

    /// Complete `(key, value)` pairs in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| Some((k.as_deref()?, v.as_deref()?)))
    }

    /// Number of recorded entries, including incomplete ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Bindings
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bindings = Self::new();
        for (k, v) in iter {
            bindings.insert(k, v);
        }
        bindings
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Bindings
where
    K: Into<String>,
    V: Into<String>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

// Entries land in key order.
impl From<BTreeMap<String, String>> for Bindings {
    fn from(map: BTreeMap<String, String>) -> Self {
        map.into_iter().collect()
    }
}

// Entries land in the map's unspecified iteration order.
impl From<HashMap<String, String>> for Bindings {
    fn from(map: HashMap<String, String>) -> Self {
        map.into_iter().collect()
    }
}
