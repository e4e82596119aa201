//! [`AnyCodable`]: a closed, type-erased box over the JSON-shaped values the
//! codec can carry.
//!
//! Decoding buffers the input into a codec tree and resolves each node with a
//! fixed cascade of probes, first match wins:
//!
//! `Int → Double → Float → String → Bool → Map → Array`
//!
//! The order is part of the wire contract. An integer literal such as `42`
//! satisfies the `Int`, `Double` and `Float` probes, and always decodes as
//! `Int`. A `Float` never survives a round trip as `Float`: the `Double`
//! probe accepts every number the `Float` probe would.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use codable_path::{CodingPath, PathSegment};
use indexmap::IndexMap;
use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Number, Value};

use crate::array::CodableArray;
use crate::codec::sort_keys;
use crate::error::{CodableError, Result};
use crate::unkeyed::UnkeyedCodableDictionary;

/// A type-erased codable value. Exactly one variant is active; re-decoding
/// produces a new value rather than changing the variant in place.
#[derive(Debug, Clone)]
pub enum AnyCodable {
    Int(i64),
    Double(f64),
    Float(f32),
    String(String),
    Bool(bool),
    Array(CodableArray<AnyCodable>),
    Map(IndexMap<String, AnyCodable>),
}

/// Discriminant of an [`AnyCodable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnyKind {
    Int,
    Double,
    Float,
    String,
    Bool,
    Array,
    Map,
}

impl AnyKind {
    pub fn name(self) -> &'static str {
        match self {
            AnyKind::Int => "Int",
            AnyKind::Double => "Double",
            AnyKind::Float => "Float",
            AnyKind::String => "String",
            AnyKind::Bool => "Bool",
            AnyKind::Array => "Array",
            AnyKind::Map => "Map",
        }
    }
}

impl fmt::Display for AnyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl AnyCodable {
    /// Wraps any serializable value, e.g. a user struct, by encoding it to a
    /// codec tree and running the decode cascade over it.
    pub fn from_serializable<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let tree = serde_json::to_value(value)?;
        Self::from_tree(&tree)
    }

    /// Runs the decode cascade over an already-decoded codec tree.
    pub fn from_tree(tree: &Value) -> Result<Self> {
        let mut path = CodingPath::root();
        decode_node(tree, &mut path)
    }

    /// Converts back into a codec tree. Non-finite floats become `null`, as
    /// they do when written by the codec. A `Float` keeps the digits the
    /// codec writes for it, so `0.1f32` becomes `0.1`.
    pub fn to_tree(&self) -> Value {
        match self {
            AnyCodable::Int(v) => Value::from(*v),
            AnyCodable::Double(v) => Number::from_f64(*v).map_or(Value::Null, Value::Number),
            AnyCodable::Float(v) => {
                Number::from_f64(widen_f32(*v)).map_or(Value::Null, Value::Number)
            }
            AnyCodable::String(v) => Value::String(v.clone()),
            AnyCodable::Bool(v) => Value::Bool(*v),
            AnyCodable::Array(items) => Value::Array(items.iter().map(Self::to_tree).collect()),
            AnyCodable::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_tree()))
                    .collect(),
            ),
        }
    }

    pub fn kind(&self) -> AnyKind {
        match self {
            AnyCodable::Int(_) => AnyKind::Int,
            AnyCodable::Double(_) => AnyKind::Double,
            AnyCodable::Float(_) => AnyKind::Float,
            AnyCodable::String(_) => AnyKind::String,
            AnyCodable::Bool(_) => AnyKind::Bool,
            AnyCodable::Array(_) => AnyKind::Array,
            AnyCodable::Map(_) => AnyKind::Map,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AnyCodable::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AnyCodable::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            AnyCodable::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AnyCodable::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AnyCodable::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&CodableArray<AnyCodable>> {
        match self {
            AnyCodable::Array(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, AnyCodable>> {
        match self {
            AnyCodable::Map(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_int(&self) -> bool {
        matches!(self, AnyCodable::Int(_))
    }

    pub fn is_double(&self) -> bool {
        matches!(self, AnyCodable::Double(_))
    }

    pub fn is_float(&self) -> bool {
        matches!(self, AnyCodable::Float(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, AnyCodable::String(_))
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, AnyCodable::Bool(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, AnyCodable::Array(_))
    }

    pub fn is_map(&self) -> bool {
        matches!(self, AnyCodable::Map(_))
    }

    /// Looks up a nested value by pointer, e.g. `"/users/0/name"`.
    /// Malformed pointers resolve to `None`.
    pub fn pointer(&self, pointer: &str) -> Option<&AnyCodable> {
        let path = CodingPath::parse(pointer).ok()?;
        let mut target = self;
        for segment in path.segments() {
            target = match (target, segment) {
                (AnyCodable::Map(entries), PathSegment::Key(key)) => entries.get(key)?,
                (AnyCodable::Array(items), PathSegment::Key(key)) => {
                    items.get(array_index(key)?)?
                }
                (AnyCodable::Array(items), PathSegment::Index(index)) => items.get(*index)?,
                _ => return None,
            };
        }
        Some(target)
    }

    /// Compact encoding with every object's keys sorted. Equality and
    /// hashing compare this text.
    fn canonical_text(&self) -> String {
        sort_keys(self.to_tree()).to_string()
    }
}

/// The `f64` the codec's spelling of `value` parses back to.
fn widen_f32(value: f32) -> f64 {
    serde_json::to_string(&value)
        .ok()
        .and_then(|text| text.parse::<f64>().ok())
        .unwrap_or(f64::from(value))
}

/// An array index component: decimal digits, no sign, no leading zero.
fn array_index(component: &str) -> Option<usize> {
    let digits_only = !component.is_empty() && component.bytes().all(|b| b.is_ascii_digit());
    if !digits_only || (component.len() > 1 && component.starts_with('0')) {
        return None;
    }
    component.parse().ok()
}

fn try_decode<'de, T: Deserialize<'de>>(node: &'de Value) -> Option<T> {
    T::deserialize(node).ok()
}

fn tree_kind(node: &Value) -> &'static str {
    match node {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn decode_node(node: &Value, path: &mut CodingPath) -> Result<AnyCodable> {
    let decoded = probe(node, path)?;
    tracing::trace!(path = %path, variant = decoded.kind().name(), "resolved codable node");
    Ok(decoded)
}

fn probe(node: &Value, path: &mut CodingPath) -> Result<AnyCodable> {
    if let Some(v) = try_decode::<i64>(node) {
        return Ok(AnyCodable::Int(v));
    }
    if let Some(v) = try_decode::<f64>(node) {
        return Ok(AnyCodable::Double(v));
    }
    if let Some(v) = try_decode::<f32>(node) {
        return Ok(AnyCodable::Float(v));
    }
    if let Some(v) = try_decode::<String>(node) {
        return Ok(AnyCodable::String(v));
    }
    if let Some(v) = try_decode::<bool>(node) {
        return Ok(AnyCodable::Bool(v));
    }
    // Only an object can satisfy the Map probe and only an array the Array
    // probe, so an inner failure is reported from where it happened.
    if let Value::Object(object) = node {
        let mut entries = IndexMap::with_capacity(object.len());
        for (key, value) in object {
            path.push(key.as_str());
            let decoded = decode_node(value, path)?;
            path.pop();
            entries.insert(key.clone(), decoded);
        }
        return Ok(AnyCodable::Map(entries));
    }
    if let Value::Array(items) = node {
        let mut array = CodableArray::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            path.push(index);
            let decoded = decode_node(item, path)?;
            path.pop();
            array.push(decoded);
        }
        return Ok(AnyCodable::Array(array));
    }
    Err(CodableError::type_mismatch(path, tree_kind(node)))
}

impl<'de> Deserialize<'de> for AnyCodable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tree = Value::deserialize(deserializer)?;
        AnyCodable::from_tree(&tree).map_err(de::Error::custom)
    }
}

impl Serialize for AnyCodable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AnyCodable::Int(v) => serializer.serialize_i64(*v),
            AnyCodable::Double(v) => serializer.serialize_f64(*v),
            AnyCodable::Float(v) => serializer.serialize_f32(*v),
            AnyCodable::String(v) => serializer.serialize_str(v),
            AnyCodable::Bool(v) => serializer.serialize_bool(*v),
            AnyCodable::Array(items) => items.serialize(serializer),
            AnyCodable::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

impl PartialEq for AnyCodable {
    /// Values are equal when their canonical encodings match, so `Map`
    /// entries compare regardless of storage order and `Double(0.1)` equals
    /// `Float(0.1)`.
    fn eq(&self, other: &Self) -> bool {
        self.canonical_text() == other.canonical_text()
    }
}

impl Eq for AnyCodable {}

impl Hash for AnyCodable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical_text().hash(state);
    }
}

impl fmt::Display for AnyCodable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AnyCodable({})", self.to_tree())
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for AnyCodable {
                fn from(value: $ty) -> Self {
                    AnyCodable::Int(i64::from(value))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<isize> for AnyCodable {
    fn from(value: isize) -> Self {
        // isize is at most 64 bits on every supported target.
        AnyCodable::Int(value as i64)
    }
}

impl From<f64> for AnyCodable {
    fn from(value: f64) -> Self {
        AnyCodable::Double(value)
    }
}

impl From<f32> for AnyCodable {
    fn from(value: f32) -> Self {
        AnyCodable::Float(value)
    }
}

impl From<bool> for AnyCodable {
    fn from(value: bool) -> Self {
        AnyCodable::Bool(value)
    }
}

impl From<String> for AnyCodable {
    fn from(value: String) -> Self {
        AnyCodable::String(value)
    }
}

impl From<&str> for AnyCodable {
    fn from(value: &str) -> Self {
        AnyCodable::String(value.to_string())
    }
}

impl From<char> for AnyCodable {
    fn from(value: char) -> Self {
        AnyCodable::String(value.to_string())
    }
}

impl From<CodableArray<AnyCodable>> for AnyCodable {
    fn from(value: CodableArray<AnyCodable>) -> Self {
        AnyCodable::Array(value)
    }
}

impl<T: Into<AnyCodable>> From<Vec<T>> for AnyCodable {
    fn from(values: Vec<T>) -> Self {
        AnyCodable::Array(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<AnyCodable>, const N: usize> From<[T; N]> for AnyCodable {
    fn from(values: [T; N]) -> Self {
        AnyCodable::Array(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<AnyCodable>> From<IndexMap<String, T>> for AnyCodable {
    fn from(entries: IndexMap<String, T>) -> Self {
        AnyCodable::Map(
            entries
                .into_iter()
                .map(|(key, value)| (key, value.into()))
                .collect(),
        )
    }
}

impl<T: Into<AnyCodable>> From<HashMap<String, T>> for AnyCodable {
    fn from(entries: HashMap<String, T>) -> Self {
        AnyCodable::Map(
            entries
                .into_iter()
                .map(|(key, value)| (key, value.into()))
                .collect(),
        )
    }
}

impl From<UnkeyedCodableDictionary<AnyCodable>> for AnyCodable {
    fn from(dictionary: UnkeyedCodableDictionary<AnyCodable>) -> Self {
        AnyCodable::Map(dictionary.into_iter().collect())
    }
}

/// Builds an [`AnyCodable::Array`] from a list of values convertible into
/// [`AnyCodable`].
///
/// ```
/// use codable::{any_codable, AnyCodable};
///
/// let value = any_codable![1, "two", true];
/// assert_eq!(value.as_array().map(|items| items.len()), Some(3));
/// assert_eq!(value.pointer("/1"), Some(&AnyCodable::from("two")));
/// ```
#[macro_export]
macro_rules! any_codable {
    () => {
        $crate::AnyCodable::Array($crate::CodableArray::new())
    };
    ($($element:expr),+ $(,)?) => {
        $crate::AnyCodable::Array($crate::CodableArray::from(::std::vec![
            $($crate::AnyCodable::from($element)),+
        ]))
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integer_literal_decodes_as_int() {
        let value: AnyCodable = serde_json::from_str("42").unwrap();
        assert!(matches!(value, AnyCodable::Int(42)));
    }

    #[test]
    fn fractional_literal_decodes_as_double() {
        let value: AnyCodable = serde_json::from_str("4.5").unwrap();
        assert!(matches!(value, AnyCodable::Double(v) if v == 4.5));
    }

    #[test]
    fn integer_past_i64_falls_through_to_double() {
        let value = AnyCodable::from_tree(&json!(u64::MAX)).unwrap();
        assert_eq!(value.kind(), AnyKind::Double);
    }

    #[test]
    fn null_fails_with_path() {
        let err = AnyCodable::from_tree(&json!({"a": [1, null]})).unwrap_err();
        match &err {
            CodableError::TypeMismatch { path, found } => {
                assert_eq!(path.to_pointer(), "/a/1");
                assert_eq!(*found, "null");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(
            err.to_string(),
            "type mismatch at /a/1: expected one of [Int, Double, Float, String, Bool, Map, Array], found null"
        );
    }

    #[test]
    fn root_null_reports_root_path() {
        let err = AnyCodable::from_tree(&Value::Null).unwrap_err();
        assert!(err.path().is_some_and(CodingPath::is_root));
        assert!(err.to_string().starts_with("type mismatch at /:"));
    }

    #[test]
    fn map_equality_ignores_storage_order() {
        let a = AnyCodable::from_tree(&json!({"x": 1, "y": 2})).unwrap();
        let b = AnyCodable::from_tree(&json!({"y": 2, "x": 1})).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn canonical_text_matches_canonical_bytes() {
        let tree = json!({"b": [0.1, 3.0], "a": {"d": 1, "c": "x"}});
        let value = AnyCodable::from_tree(&tree).unwrap();
        let bytes = crate::codec::canonical_bytes(&value).unwrap();
        assert_eq!(value.canonical_text().into_bytes(), bytes);
    }

    #[test]
    fn float_tree_keeps_written_digits() {
        assert_eq!(AnyCodable::from(0.1f32).to_tree(), json!(0.1));
        assert_eq!(AnyCodable::from(f32::NAN).to_tree(), Value::Null);
    }

    #[test]
    fn array_index_rejects_signs_and_leading_zeros() {
        assert_eq!(array_index("0"), Some(0));
        assert_eq!(array_index("10"), Some(10));
        assert_eq!(array_index("01"), None);
        assert_eq!(array_index("+1"), None);
        assert_eq!(array_index("-1"), None);
        assert_eq!(array_index(""), None);
    }

    #[test]
    fn display_wraps_json() {
        assert_eq!(AnyCodable::from("hi").to_string(), r#"AnyCodable("hi")"#);
        assert_eq!(any_codable![1, 2].to_string(), "AnyCodable([1,2])");
    }
}
