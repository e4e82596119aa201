//! The coding-key capability and the open key type used by
//! [`UnkeyedCodableDictionary`](crate::UnkeyedCodableDictionary).

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use serde::de::{self, Deserializer, Visitor};

/// A value that identifies a field in a keyed container.
///
/// Keys round-trip through their string identifier. Integer construction is
/// used when a codec reports positional (integer) keys.
pub trait CodingKey: Sized {
    fn from_string_value(value: &str) -> Option<Self>;

    fn from_int_value(value: usize) -> Option<Self> {
        let _ = value;
        None
    }

    fn string_value(&self) -> &str;

    fn int_value(&self) -> Option<usize> {
        None
    }
}

/// A coding key that accepts any string and reflects it back unchanged.
///
/// Equality and hashing consider only the string identifier, so the key
/// built from the integer `7` equals the key built from `"7"`.
#[derive(Debug, Clone)]
pub struct UnkeyedKey {
    string_value: String,
    int_value: Option<usize>,
}

impl UnkeyedKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            string_value: value.into(),
            int_value: None,
        }
    }

    pub fn into_string(self) -> String {
        self.string_value
    }
}

impl CodingKey for UnkeyedKey {
    fn from_string_value(value: &str) -> Option<Self> {
        Some(Self::new(value))
    }

    fn from_int_value(value: usize) -> Option<Self> {
        Some(Self {
            string_value: value.to_string(),
            int_value: Some(value),
        })
    }

    fn string_value(&self) -> &str {
        &self.string_value
    }

    fn int_value(&self) -> Option<usize> {
        self.int_value
    }
}

impl PartialEq for UnkeyedKey {
    fn eq(&self, other: &Self) -> bool {
        self.string_value == other.string_value
    }
}

impl Eq for UnkeyedKey {}

impl Hash for UnkeyedKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.string_value.hash(state);
    }
}

impl fmt::Display for UnkeyedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.string_value)
    }
}

/// Outcome of reading one key from a codec map.
pub(crate) enum DecodedKey<K> {
    Known(K),
    Unknown(String),
}

/// Reads one map key: string keys go through `from_string_value`, integer
/// keys through `from_int_value`.
pub(crate) struct KeyVisitor<K>(PhantomData<K>);

impl<K> KeyVisitor<K> {
    pub(crate) fn new() -> Self {
        Self(PhantomData)
    }
}

impl<'de, K: CodingKey> Visitor<'de> for KeyVisitor<K> {
    type Value = DecodedKey<K>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a string or non-negative integer coding key")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<DecodedKey<K>, E> {
        Ok(match K::from_string_value(value) {
            Some(key) => DecodedKey::Known(key),
            None => DecodedKey::Unknown(value.to_string()),
        })
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<DecodedKey<K>, E> {
        let key = usize::try_from(value).ok().and_then(K::from_int_value);
        Ok(match key {
            Some(key) => DecodedKey::Known(key),
            None => DecodedKey::Unknown(value.to_string()),
        })
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<DecodedKey<K>, E> {
        match u64::try_from(value) {
            Ok(value) => self.visit_u64(value),
            Err(_) => Ok(DecodedKey::Unknown(value.to_string())),
        }
    }
}

impl<'de, K: CodingKey> de::DeserializeSeed<'de> for KeyVisitor<K> {
    type Value = DecodedKey<K>;

    fn deserialize<D>(self, deserializer: D) -> Result<DecodedKey<K>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }
}
