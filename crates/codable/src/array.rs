//! [`CodableArray`]: an ordered, index-addressable sequence that encodes as a
//! codec array.

use std::fmt;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

use serde::de::{DeserializeOwned, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// An ordered sequence of `T`.
///
/// Encode order is always storage order. Index operations panic when the
/// index is out of bounds, like the slice operations they wrap.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CodableArray<T> {
    base: Vec<T>,
}

impl<T> Default for CodableArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> CodableArray<T> {
    pub fn new() -> Self {
        Self { base: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            base: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.base.len()
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }

    pub fn push(&mut self, element: T) {
        self.base.push(element);
    }

    pub fn append_contents_of<I: IntoIterator<Item = T>>(&mut self, elements: I) {
        self.base.extend(elements);
    }

    /// Inserts `element` at `index`, shifting later elements.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, element: T, index: usize) {
        let len = self.base.len();
        assert!(
            index <= len,
            "insertion index (is {index}) should be <= len (is {len})"
        );
        self.base.insert(index, element);
    }

    /// Removes and returns the element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn remove(&mut self, index: usize) -> T {
        let len = self.base.len();
        assert!(
            index < len,
            "removal index (is {index}) should be < len (is {len})"
        );
        self.base.remove(index)
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.base.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.base.get_mut(index)
    }

    pub fn first(&self) -> Option<&T> {
        self.base.first()
    }

    pub fn last(&self) -> Option<&T> {
        self.base.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.base.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.base.iter_mut()
    }

    pub fn enumerate(&self) -> std::iter::Enumerate<std::slice::Iter<'_, T>> {
        self.base.iter().enumerate()
    }

    pub fn filter<F>(&self, mut is_included: F) -> Vec<T>
    where
        T: Clone,
        F: FnMut(&T) -> bool,
    {
        self.base
            .iter()
            .filter(|element| is_included(element))
            .cloned()
            .collect()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.base
    }

    pub fn into_vec(self) -> Vec<T> {
        self.base
    }
}

impl<T: DeserializeOwned> CodableArray<T> {
    /// Builds an array from untyped codec trees, keeping the elements that
    /// decode as `T` and counting the rest.
    pub fn from_lossy<I>(values: I) -> (Self, usize)
    where
        I: IntoIterator<Item = Value>,
    {
        let mut array = Self::new();
        let mut skipped = 0;
        for value in values {
            match T::deserialize(value) {
                Ok(element) => array.push(element),
                Err(_) => skipped += 1,
            }
        }
        if skipped > 0 {
            tracing::debug!(skipped, kept = array.len(), "skipped undecodable array elements");
        }
        (array, skipped)
    }
}

/// Converts a `Vec` into a [`CodableArray`].
pub trait ToCodable<T> {
    fn to_codable(self) -> CodableArray<T>;
}

impl<T> ToCodable<T> for Vec<T> {
    fn to_codable(self) -> CodableArray<T> {
        CodableArray::from(self)
    }
}

impl<T> From<Vec<T>> for CodableArray<T> {
    fn from(base: Vec<T>) -> Self {
        Self { base }
    }
}

impl<T, const N: usize> From<[T; N]> for CodableArray<T> {
    fn from(elements: [T; N]) -> Self {
        Self {
            base: Vec::from(elements),
        }
    }
}

impl<T> From<CodableArray<T>> for Vec<T> {
    fn from(array: CodableArray<T>) -> Self {
        array.base
    }
}

impl<T> FromIterator<T> for CodableArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            base: iter.into_iter().collect(),
        }
    }
}

impl<T> Extend<T> for CodableArray<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.base.extend(iter);
    }
}

impl<T> IntoIterator for CodableArray<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.base.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a CodableArray<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.base.iter()
    }
}

impl<T> Index<usize> for CodableArray<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.base[index]
    }
}

impl<T> IndexMut<usize> for CodableArray<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.base[index]
    }
}

impl<T: fmt::Debug> fmt::Debug for CodableArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.base).finish()
    }
}

impl<T: Serialize> Serialize for CodableArray<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.base.len()))?;
        for element in &self.base {
            seq.serialize_element(element)?;
        }
        seq.end()
    }
}

struct ArrayVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for ArrayVisitor<T> {
    type Value = CodableArray<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a codable array")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut array = CodableArray::with_capacity(seq.size_hint().unwrap_or_default());
        // The first element that fails aborts the whole array.
        while let Some(element) = seq.next_element()? {
            array.push(element);
        }
        Ok(array)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for CodableArray<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(ArrayVisitor(PhantomData))
    }
}
