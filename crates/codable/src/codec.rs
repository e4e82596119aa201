//! The codec boundary.
//!
//! Containers in this crate never touch bytes: they implement serde's
//! `Serialize`/`Deserialize` and leave byte production to a [`Codec`].
//! [`JsonCodec`] is the JSON implementation, configured by [`CodecConfig`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

/// Output options for [`JsonCodec`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Indent with two spaces and break lines.
    pub pretty: bool,
    /// Sort object keys recursively before writing.
    pub sort_keys: bool,
}

impl CodecConfig {
    /// Compact output with sorted keys. Equality and hashing of
    /// [`AnyCodable`](crate::AnyCodable) compare bytes produced this way.
    pub fn canonical() -> Self {
        Self {
            pretty: false,
            sort_keys: true,
        }
    }

    pub fn pretty() -> Self {
        Self {
            pretty: true,
            sort_keys: false,
        }
    }
}

/// Trait for byte codecs that can carry any serde value.
pub trait Codec {
    fn id(&self) -> &'static str;
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>>;
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonCodec {
    pub config: CodecConfig,
}

impl JsonCodec {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn canonical() -> Self {
        Self::new(CodecConfig::canonical())
    }

    pub fn id(&self) -> &'static str {
        "json"
    }

    pub fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        if self.config.sort_keys {
            return self.write(&sorted_tree(value)?);
        }
        self.write(value)
    }

    pub fn encode_to_string<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        if self.config.sort_keys {
            return self.write_string(&sorted_tree(value)?);
        }
        self.write_string(value)
    }

    pub fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn decode_str<T: DeserializeOwned>(&self, text: &str) -> Result<T> {
        Ok(serde_json::from_str(text)?)
    }

    fn write<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        if self.config.pretty {
            Ok(serde_json::to_vec_pretty(value)?)
        } else {
            Ok(serde_json::to_vec(value)?)
        }
    }

    fn write_string<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        if self.config.pretty {
            Ok(serde_json::to_string_pretty(value)?)
        } else {
            Ok(serde_json::to_string(value)?)
        }
    }
}

impl Codec for JsonCodec {
    fn id(&self) -> &'static str {
        self.id()
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        self.encode(value)
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        self.decode(bytes)
    }
}

/// Encodes `value` under [`CodecConfig::canonical`].
pub fn canonical_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    JsonCodec::canonical().encode(value)
}

/// The compact output of `value`, parsed back into a tree with sorted keys.
///
/// Going through the written text keeps every number exactly as the raw
/// encoder spells it, so an `f32` is not widened to its `f64` expansion.
fn sorted_tree<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    let raw = serde_json::to_vec(value)?;
    Ok(sort_keys(serde_json::from_slice(&raw)?))
}

/// Recursively rebuilds every object with its keys in lexicographic order.
pub fn sort_keys(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        Value::Object(object) => {
            let mut entries: Vec<(String, Value)> = object.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut sorted = Map::with_capacity(entries.len());
            for (key, value) in entries {
                sorted.insert(key, sort_keys(value));
            }
            Value::Object(sorted)
        }
        scalar => scalar,
    }
}
