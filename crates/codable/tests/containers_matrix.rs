//! Container matrix: ordering, key filtering, tolerant decoding, bounds and
//! the storage-order encode hazard.

use std::collections::HashMap;

use codable::{
    canonical_bytes, AnyCodable, CodableArray, CodableDictionary, CodableError, CodecConfig,
    CodingKey, JsonCodec, MutableKeyedCollection, ToCodable, UnkeyedCodableDictionary,
    UnkeyedKey,
};
use serde::de::value::{Error as ValueError, MapDeserializer};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Key {
    ValidKey,
    Other,
}

impl CodingKey for Key {
    fn from_string_value(value: &str) -> Option<Self> {
        match value {
            "validKey" => Some(Key::ValidKey),
            "other" => Some(Key::Other),
            _ => None,
        }
    }

    fn string_value(&self) -> &str {
        match self {
            Key::ValidKey => "validKey",
            Key::Other => "other",
        }
    }
}

// ---------------------------------------------------------------------------
// CodableArray
// ---------------------------------------------------------------------------

#[test]
fn array_preserves_order_through_codec() {
    let codec = JsonCodec::default();
    let array = vec![3, 1, 2].to_codable();
    let bytes = codec.encode(&array).unwrap();
    assert_eq!(bytes, b"[3,1,2]".to_vec());
    let back: CodableArray<i64> = codec.decode(&bytes).unwrap();
    assert_eq!(back.as_slice(), &[3, 1, 2]);
}

#[test]
fn array_sequence_operations() {
    let mut array = CodableArray::new();
    array.push("b");
    array.insert("a", 0);
    array.append_contents_of(["c", "d"]);
    assert_eq!(array.len(), 4);
    assert_eq!(array.remove(3), "d");
    assert_eq!(array.filter(|s| *s != "b"), vec!["a", "c"]);
    let indexed: Vec<(usize, &&str)> = array.enumerate().collect();
    assert_eq!(indexed[2], (2, &"c"));
    array[1] = "B";
    assert_eq!(array.into_vec(), vec!["a", "B", "c"]);
}

#[test]
fn array_decode_aborts_on_bad_element() {
    let result = serde_json::from_value::<CodableArray<AnyCodable>>(json!([1, null, 3]));
    assert!(result.is_err());
}

#[test]
fn array_from_lossy_reports_skipped() {
    let (array, skipped) = CodableArray::<String>::from_lossy(vec![json!("a"), json!(1), json!("b")]);
    assert_eq!(array.as_slice(), &["a".to_string(), "b".to_string()]);
    assert_eq!(skipped, 1);
}

#[test]
#[should_panic]
fn array_remove_at_count_panics() {
    let mut array = CodableArray::from(vec![1, 2, 3]);
    let count = array.len();
    array.remove(count);
}

// ---------------------------------------------------------------------------
// CodableDictionary
// ---------------------------------------------------------------------------

#[test]
fn dictionary_silently_drops_unmappable_keys() {
    let raw: HashMap<String, i64> =
        HashMap::from([("validKey".to_string(), 1), ("unmappable!!key".to_string(), 2)]);
    let dictionary = CodableDictionary::<Key, i64>::from_string_map(raw);
    assert_eq!(dictionary.len(), 1);
    assert_eq!(dictionary.get(&Key::ValidKey), Some(&1));
    assert_eq!(dictionary.get_str("unmappable!!key"), None);
}

#[test]
fn dictionary_update_value_returns_previous() {
    let mut dictionary = CodableDictionary::<Key, &str>::new();
    assert_eq!(dictionary.update_value("one", Key::Other), None);
    assert_eq!(dictionary.update_value("two", Key::Other), Some("one"));
    assert_eq!(dictionary.len(), 1);
}

#[test]
fn dictionary_string_update_rejects_unknown_key() {
    let mut dictionary = CodableDictionary::<Key, i64>::new();
    match dictionary.try_update_value(1, "missing") {
        Err(CodableError::InvalidCodingKey { key }) => assert_eq!(key, "missing"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn dictionary_decode_drops_unknown_keys() {
    let dictionary: CodableDictionary<Key, i64> =
        serde_json::from_str(r#"{"validKey": 1, "unmappable!!key": {"deep": [null]}}"#).unwrap();
    assert_eq!(dictionary.to_string_map(), HashMap::from([("validKey".to_string(), 1)]));
}

#[test]
fn dictionary_decode_aborts_on_bad_value() {
    let result = serde_json::from_str::<CodableDictionary<Key, i64>>(
        r#"{"validKey": 1, "other": "two"}"#,
    );
    assert!(result.is_err());
}

#[test]
fn dictionary_ignores_integer_keys_it_cannot_represent() {
    let deserializer: MapDeserializer<_, ValueError> =
        MapDeserializer::new(vec![(0u64, 10i64)].into_iter());
    let dictionary = CodableDictionary::<Key, i64>::deserialize(deserializer).unwrap();
    assert!(dictionary.is_empty());
}

#[test]
fn dictionary_literal_and_display() {
    let dictionary = CodableDictionary::from([(Key::ValidKey, 1)]);
    assert_eq!(dictionary.to_string(), r#"{"validKey": 1}"#);
    assert_eq!(format!("{dictionary:?}"), r#"{"validKey": 1}"#);
}

#[test]
fn dictionary_remove_at_index() {
    let mut dictionary = CodableDictionary::from([(Key::ValidKey, 1), (Key::Other, 2)]);
    let (key, value) = dictionary.remove_at(0);
    assert_eq!((key, value), (Key::ValidKey, 1));
    assert_eq!(dictionary.get_index(0), Some((&Key::Other, &2)));
}

#[test]
#[should_panic(expected = "removal index (is 2) should be < len (is 2)")]
fn dictionary_remove_at_count_panics() {
    let mut dictionary = CodableDictionary::from([(Key::ValidKey, 1), (Key::Other, 2)]);
    let count = dictionary.len();
    dictionary.remove_at(count);
}

// ---------------------------------------------------------------------------
// Storage-order hazard
// ---------------------------------------------------------------------------

#[test]
fn raw_encoding_is_not_a_stable_identity() {
    let forward = CodableDictionary::from([(Key::ValidKey, 1), (Key::Other, 2)]);
    let backward = CodableDictionary::from([(Key::Other, 2), (Key::ValidKey, 1)]);

    // Structurally equal...
    assert_eq!(forward, backward);

    // ...but raw bytes follow storage order and must not be used as identity.
    let raw = JsonCodec::default();
    assert_ne!(raw.encode(&forward).unwrap(), raw.encode(&backward).unwrap());

    // The canonical form used for AnyCodable equality is order-independent.
    assert_eq!(canonical_bytes(&forward).unwrap(), canonical_bytes(&backward).unwrap());
    assert_eq!(
        JsonCodec::new(CodecConfig::canonical()).encode(&forward).unwrap(),
        br#"{"other":2,"validKey":1}"#.to_vec()
    );
}

// ---------------------------------------------------------------------------
// UnkeyedCodableDictionary
// ---------------------------------------------------------------------------

#[test]
fn unkeyed_decode_tolerates_bad_values() {
    let dictionary: UnkeyedCodableDictionary<i64> =
        serde_json::from_str(r#"{"a": 1, "b": "not-an-int"}"#).unwrap();
    assert_eq!(dictionary.to_string_map(), HashMap::from([("a".to_string(), 1)]));
}

#[test]
fn unkeyed_keeps_every_key_that_decodes() {
    let dictionary: UnkeyedCodableDictionary<AnyCodable> = serde_json::from_value(json!({
        "name": "Harry",
        "device": "iPhone X 11.1.1",
        "unmappable!!key": [1, 2],
        "bad": null
    }))
    .unwrap();
    let keys: Vec<&str> = dictionary.keys().collect();
    assert_eq!(keys, vec!["name", "device", "unmappable!!key"]);
}

#[test]
fn unkeyed_encode_delegates_to_keyed_container() {
    let dictionary = UnkeyedCodableDictionary::from([("x", 1), ("y", 2)]);
    assert_eq!(
        JsonCodec::default().encode_to_string(&dictionary).unwrap(),
        r#"{"x":1,"y":2}"#
    );
    let keyed = dictionary.as_dictionary();
    assert_eq!(
        serde_json::to_string(keyed).unwrap(),
        serde_json::to_string(&dictionary).unwrap()
    );
}

#[test]
fn unkeyed_integer_keys_render_as_decimal() {
    let deserializer: MapDeserializer<_, ValueError> =
        MapDeserializer::new(vec![(0u64, 10i64), (7u64, 70i64)].into_iter());
    let dictionary = UnkeyedCodableDictionary::<i64>::deserialize(deserializer).unwrap();
    assert_eq!(dictionary.get("7"), Some(&70));

    let keyed = dictionary.into_dictionary();
    let (first_key, _) = keyed.get_index(0).unwrap();
    assert_eq!(first_key.string_value(), "0");
    assert_eq!(first_key.int_value(), Some(0));
    assert_eq!(first_key, &UnkeyedKey::new("0"));
}

#[test]
fn unkeyed_into_any_codable_map() {
    let dictionary = UnkeyedCodableDictionary::from([("k", AnyCodable::from(true))]);
    let value = AnyCodable::from(dictionary);
    assert_eq!(value.pointer("/k"), Some(&AnyCodable::from(true)));
}

#[test]
#[should_panic]
fn unkeyed_remove_at_count_panics() {
    let mut dictionary = UnkeyedCodableDictionary::from([("x", 1)]);
    let count = dictionary.len();
    dictionary.remove_at(count);
}

// ---------------------------------------------------------------------------
// MutableKeyedCollection
// ---------------------------------------------------------------------------

fn set_all<C>(collection: &mut C, entries: Vec<(C::Key, C::Value)>) -> usize
where
    C: MutableKeyedCollection,
{
    entries
        .into_iter()
        .filter_map(|(key, value)| collection.update_value(value, key))
        .count()
}

#[test]
fn mutable_keyed_collection_is_shared_by_all_maps() {
    let mut keyed = CodableDictionary::<Key, i64>::new();
    assert_eq!(set_all(&mut keyed, vec![(Key::Other, 1), (Key::Other, 2)]), 1);

    let mut unkeyed = UnkeyedCodableDictionary::<i64>::new();
    assert_eq!(set_all(&mut unkeyed, vec![("a".to_string(), 1)]), 0);
    assert_eq!(unkeyed.get("a"), Some(&1));

    let mut plain = HashMap::<String, i64>::new();
    assert_eq!(set_all(&mut plain, vec![("a".to_string(), 1), ("a".to_string(), 2)]), 1);
}

// ---------------------------------------------------------------------------
// CodecConfig
// ---------------------------------------------------------------------------

#[test]
fn codec_config_loads_from_toml() {
    let config: CodecConfig = toml::from_str("sort_keys = true").unwrap();
    assert_eq!(config, CodecConfig::canonical());

    let config: CodecConfig = toml::from_str("").unwrap();
    assert_eq!(config, CodecConfig::default());
}
