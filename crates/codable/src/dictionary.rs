//! [`CodableDictionary`]: a map from a [`CodingKey`] type to values, encoded as
//! a codec object.
//!
//! Keys that cannot be converted into `K` are dropped silently, both when
//! building from a string-keyed map and when decoding. Values are decoded
//! eagerly and the first failure aborts the whole decode.

use std::collections::HashMap;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::marker::PhantomData;

use indexmap::IndexMap;
use serde::de::{Deserialize, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{CodableError, Result};
use crate::key::{CodingKey, DecodedKey, KeyVisitor};

/// Collections that can insert-or-replace a value under a key.
pub trait MutableKeyedCollection {
    type Key;
    type Value;

    /// Returns the value that was replaced, if any.
    fn update_value(&mut self, value: Self::Value, key: Self::Key) -> Option<Self::Value>;
}

impl<K: Hash + Eq, V, S: BuildHasher> MutableKeyedCollection for HashMap<K, V, S> {
    type Key = K;
    type Value = V;

    fn update_value(&mut self, value: V, key: K) -> Option<V> {
        self.insert(key, value)
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> MutableKeyedCollection for IndexMap<K, V, S> {
    type Key = K;
    type Value = V;

    fn update_value(&mut self, value: V, key: K) -> Option<V> {
        self.insert(key, value)
    }
}

/// A dictionary keyed by a coding key type.
///
/// Iteration and encode order is storage order, which is not part of the
/// contract: two dictionaries with the same entries compare equal but may
/// encode to different bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct CodableDictionary<K: Hash + Eq, V> {
    base: IndexMap<K, V>,
}

impl<K: Hash + Eq, V> Default for CodableDictionary<K, V> {
    fn default() -> Self {
        Self {
            base: IndexMap::new(),
        }
    }
}

impl<K: CodingKey + Hash + Eq, V> CodableDictionary<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            base: IndexMap::with_capacity(capacity),
        }
    }

    /// Builds a dictionary from string-keyed entries, skipping every entry
    /// whose key does not convert into `K`.
    pub fn from_string_map<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, V)>,
    {
        let mut dictionary = Self::new();
        for (raw, value) in entries {
            match K::from_string_value(&raw) {
                Some(key) => {
                    dictionary.base.insert(key, value);
                }
                None => tracing::debug!(key = %raw, "dropping unmappable coding key"),
            }
        }
        dictionary
    }

    /// Inserts or replaces the value for `key`, returning the previous value.
    pub fn update_value(&mut self, value: V, key: K) -> Option<V> {
        self.base.insert(key, value)
    }

    /// Like [`update_value`](Self::update_value) with a string key.
    ///
    /// Fails with [`CodableError::InvalidCodingKey`] when `key` does not
    /// convert into `K`; the dictionary is left unchanged.
    pub fn try_update_value(&mut self, value: V, key: &str) -> Result<Option<V>> {
        let coding_key =
            K::from_string_value(key).ok_or_else(|| CodableError::invalid_coding_key(key))?;
        Ok(self.update_value(value, coding_key))
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.base.get(key)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.base.get_mut(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&V> {
        K::from_string_value(key).and_then(|key| self.base.get(&key))
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.base.contains_key(key)
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.base.shift_remove(key)
    }

    /// Removes and returns the entry at `index`. Later entries shift down.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn remove_at(&mut self, index: usize) -> (K, V) {
        let len = self.base.len();
        match self.base.shift_remove_index(index) {
            Some(entry) => entry,
            None => panic!("removal index (is {index}) should be < len (is {len})"),
        }
    }

    pub fn get_index(&self, index: usize) -> Option<(&K, &V)> {
        self.base.get_index(index)
    }

    pub fn len(&self) -> usize {
        self.base.len()
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, K, V> {
        self.base.iter()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, K, V> {
        self.base.keys()
    }

    pub fn values(&self) -> indexmap::map::Values<'_, K, V> {
        self.base.values()
    }

    /// The entries keyed by their string identifiers.
    pub fn to_string_map(&self) -> HashMap<String, V>
    where
        V: Clone,
    {
        self.base
            .iter()
            .map(|(key, value)| (key.string_value().to_string(), value.clone()))
            .collect()
    }
}

impl<K: CodingKey + Hash + Eq, V> MutableKeyedCollection for CodableDictionary<K, V> {
    type Key = K;
    type Value = V;

    fn update_value(&mut self, value: V, key: K) -> Option<V> {
        self.update_value(value, key)
    }
}

impl<K: CodingKey + Hash + Eq, V> FromIterator<(K, V)> for CodableDictionary<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            base: iter.into_iter().collect(),
        }
    }
}

impl<K: CodingKey + Hash + Eq, V, const N: usize> From<[(K, V); N]> for CodableDictionary<K, V> {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<K: CodingKey + Hash + Eq, V> Extend<(K, V)> for CodableDictionary<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.base.extend(iter);
    }
}

impl<K: Hash + Eq, V> IntoIterator for CodableDictionary<K, V> {
    type Item = (K, V);
    type IntoIter = indexmap::map::IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.base.into_iter()
    }
}

impl<'a, K: Hash + Eq, V> IntoIterator for &'a CodableDictionary<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = indexmap::map::Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.base.iter()
    }
}

impl<K: CodingKey + Hash + Eq, V: fmt::Debug> fmt::Debug for CodableDictionary<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.base.iter().map(|(key, value)| (key.string_value(), value)))
            .finish()
    }
}

impl<K: CodingKey + Hash + Eq, V: fmt::Debug> fmt::Display for CodableDictionary<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl<K: CodingKey + Hash + Eq, V: Serialize> Serialize for CodableDictionary<K, V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.base.len()))?;
        for (key, value) in &self.base {
            map.serialize_entry(key.string_value(), value)?;
        }
        map.end()
    }
}

struct DictionaryVisitor<K, V>(PhantomData<(K, V)>);

impl<'de, K, V> Visitor<'de> for DictionaryVisitor<K, V>
where
    K: CodingKey + Hash + Eq,
    V: Deserialize<'de>,
{
    type Value = CodableDictionary<K, V>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a codable dictionary")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut dictionary =
            CodableDictionary::with_capacity(map.size_hint().unwrap_or_default());
        while let Some(key) = map.next_key_seed(KeyVisitor::<K>::new())? {
            match key {
                DecodedKey::Known(key) => {
                    let value = map.next_value()?;
                    dictionary.base.insert(key, value);
                }
                DecodedKey::Unknown(raw) => {
                    tracing::debug!(key = %raw, "dropping unmappable coding key");
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }
        Ok(dictionary)
    }
}

impl<'de, K, V> Deserialize<'de> for CodableDictionary<K, V>
where
    K: CodingKey + Hash + Eq,
    V: Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(DictionaryVisitor(PhantomData))
    }
}
