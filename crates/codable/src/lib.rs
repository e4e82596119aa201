//! Type-erased JSON values and coding-key keyed containers on top of serde.
//!
//! - [`AnyCodable`] boxes any JSON-shaped value behind a closed set of
//!   variants and resolves decoded input through an ordered probe cascade.
//! - [`CodableArray`] is an ordered sequence that encodes as an array.
//! - [`CodableDictionary`] maps a [`CodingKey`] type to values and silently
//!   drops keys the key type cannot represent.
//! - [`UnkeyedCodableDictionary`] accepts any string key and skips entries
//!   whose values fail to decode.
//!
//! Byte production is left to a [`Codec`]; [`JsonCodec`] is the JSON one.
//!
//! None of the containers synchronise internally. Mutation takes `&mut self`,
//! so sharing one instance across threads for writing needs the caller's own
//! lock.

mod any_codable;
mod array;
mod dictionary;
mod key;
mod unkeyed;

pub mod codec;
pub mod error;

pub use any_codable::{AnyCodable, AnyKind};
pub use array::{CodableArray, ToCodable};
pub use codec::{canonical_bytes, Codec, CodecConfig, JsonCodec};
pub use dictionary::{CodableDictionary, MutableKeyedCollection};
pub use error::{CodableError, Result};
pub use key::{CodingKey, UnkeyedKey};
pub use unkeyed::UnkeyedCodableDictionary;

pub use codable_path::{CodingPath, PathSegment};
