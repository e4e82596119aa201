//! [`UnkeyedCodableDictionary`]: a string-keyed dictionary for payloads whose
//! key set is not known ahead of time.
//!
//! Decoding tolerates bad entries: a key whose value does not decode as `V`
//! is skipped and the rest of the object is kept.
//!
//! ```
//! use codable::{AnyCodable, UnkeyedCodableDictionary};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Event {
//!     name: String,
//!     user_info: UnkeyedCodableDictionary<AnyCodable>,
//! }
//!
//! let event: Event = serde_json::from_str(
//!     r#"{"name": "custom", "user_info": {"name": "Harry", "device": "iPhone X", "seen": null}}"#,
//! )
//! .unwrap();
//! assert_eq!(event.name, "custom");
//! assert_eq!(event.user_info.len(), 2);
//! assert_eq!(event.user_info["device"], AnyCodable::from("iPhone X"));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::ops::Index;

use serde::de::{DeserializeOwned, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::dictionary::{CodableDictionary, MutableKeyedCollection};
use crate::key::{CodingKey, DecodedKey, KeyVisitor, UnkeyedKey};

type IntoEntries<V> =
    std::iter::Map<indexmap::map::IntoIter<UnkeyedKey, V>, fn((UnkeyedKey, V)) -> (String, V)>;

/// A dictionary with no fixed key universe, layered over
/// [`CodableDictionary`] with [`UnkeyedKey`].
#[derive(Clone, PartialEq, Eq)]
pub struct UnkeyedCodableDictionary<V> {
    base: CodableDictionary<UnkeyedKey, V>,
}

impl<V> Default for UnkeyedCodableDictionary<V> {
    fn default() -> Self {
        Self {
            base: CodableDictionary::default(),
        }
    }
}

impl<V> UnkeyedCodableDictionary<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds from string-keyed entries. Every key is accepted.
    pub fn from_string_map<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, V)>,
    {
        Self {
            base: CodableDictionary::from_string_map(entries),
        }
    }

    pub fn update_value(&mut self, value: V, key: &str) -> Option<V> {
        self.base.update_value(value, UnkeyedKey::new(key))
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.base.get(&UnkeyedKey::new(key))
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.base.get_mut(&UnkeyedKey::new(key))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.base.contains_key(&UnkeyedKey::new(key))
    }

    pub fn remove(&mut self, key: &str) -> Option<V> {
        self.base.remove(&UnkeyedKey::new(key))
    }

    /// Removes and returns the entry at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn remove_at(&mut self, index: usize) -> (String, V) {
        let (key, value) = self.base.remove_at(index);
        (key.into_string(), value)
    }

    pub fn get_index(&self, index: usize) -> Option<(&str, &V)> {
        self.base
            .get_index(index)
            .map(|(key, value)| (key.string_value(), value))
    }

    pub fn len(&self) -> usize {
        self.base.len()
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.base.iter().map(|(key, value)| (key.string_value(), value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.base.keys().map(UnkeyedKey::string_value)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.base.values()
    }

    pub fn to_string_map(&self) -> HashMap<String, V>
    where
        V: Clone,
    {
        self.base.to_string_map()
    }

    pub fn as_dictionary(&self) -> &CodableDictionary<UnkeyedKey, V> {
        &self.base
    }

    pub fn into_dictionary(self) -> CodableDictionary<UnkeyedKey, V> {
        self.base
    }
}

impl<V> MutableKeyedCollection for UnkeyedCodableDictionary<V> {
    type Key = String;
    type Value = V;

    fn update_value(&mut self, value: V, key: String) -> Option<V> {
        self.base.update_value(value, UnkeyedKey::new(key))
    }
}

impl<V> From<CodableDictionary<UnkeyedKey, V>> for UnkeyedCodableDictionary<V> {
    fn from(base: CodableDictionary<UnkeyedKey, V>) -> Self {
        Self { base }
    }
}

impl<V> From<HashMap<String, V>> for UnkeyedCodableDictionary<V> {
    fn from(entries: HashMap<String, V>) -> Self {
        Self::from_string_map(entries)
    }
}

impl<V, const N: usize> From<[(&str, V); N]> for UnkeyedCodableDictionary<V> {
    fn from(entries: [(&str, V); N]) -> Self {
        entries
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect()
    }
}

impl<V> FromIterator<(String, V)> for UnkeyedCodableDictionary<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        Self::from_string_map(iter)
    }
}

impl<V> IntoIterator for UnkeyedCodableDictionary<V> {
    type Item = (String, V);
    type IntoIter = IntoEntries<V>;

    fn into_iter(self) -> Self::IntoIter {
        let into_entry: fn((UnkeyedKey, V)) -> (String, V) =
            |(key, value)| (key.into_string(), value);
        self.base.into_iter().map(into_entry)
    }
}

impl<V> Index<&str> for UnkeyedCodableDictionary<V> {
    type Output = V;

    /// # Panics
    ///
    /// Panics if `key` is not present.
    fn index(&self, key: &str) -> &V {
        match self.get(key) {
            Some(value) => value,
            None => panic!("no entry found for key `{key}`"),
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for UnkeyedCodableDictionary<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.base, f)
    }
}

impl<V: fmt::Debug> fmt::Display for UnkeyedCodableDictionary<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.base, f)
    }
}

impl<V: Serialize> Serialize for UnkeyedCodableDictionary<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.base.serialize(serializer)
    }
}

struct TolerantVisitor<V>(PhantomData<V>);

impl<'de, V: DeserializeOwned> Visitor<'de> for TolerantVisitor<V> {
    type Value = UnkeyedCodableDictionary<V>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an unkeyed codable dictionary")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut dictionary = UnkeyedCodableDictionary::new();
        while let Some(key) = map.next_key_seed(KeyVisitor::<UnkeyedKey>::new())? {
            // Buffer the value so a failed decode leaves the map cursor intact.
            let raw: Value = map.next_value()?;
            let key = match key {
                DecodedKey::Known(key) => key,
                DecodedKey::Unknown(raw_key) => UnkeyedKey::new(raw_key),
            };
            match V::deserialize(raw) {
                Ok(value) => {
                    dictionary.base.update_value(value, key);
                }
                Err(error) => {
                    tracing::debug!(key = %key, %error, "skipping undecodable value");
                }
            }
        }
        Ok(dictionary)
    }
}

impl<'de, V: DeserializeOwned> Deserialize<'de> for UnkeyedCodableDictionary<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(TolerantVisitor(PhantomData))
    }
}
