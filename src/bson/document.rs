use super::de::BsonReader;
use super::{BsonWriter, ParseError, TotalOrd, Value};
use crate::utils::{CaseInsensitiveStr, CaseInsensitiveString};
use indexmap::IndexMap;
use indexmap::map::Entry;
use std::cmp::Ordering;
use std::fmt::{Debug, Formatter};

/// The bson document.
///
/// Keys are compared case-insensitively and iterated in insertion order.
#[derive(Clone, PartialEq)]
pub struct Document {
    inner: IndexMap<CaseInsensitiveString, Value>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Document {
        Self {
            inner: IndexMap::new(),
        }
    }

    /// Adds value to document, replacing the existing value with the same key.
    ///
    /// ### Panics
    /// This function will panic if the key contains null char (`'\0'`)
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        check_key(&key);
        self.inner.insert(key.into(), value.into())
    }

    /// Gets the value with `key`.
    pub fn get(&self, key: impl AsRef<str>) -> Option<&Value> {
        self.inner.get(CaseInsensitiveStr::new(key.as_ref()))
    }

    pub fn get_mut(&mut self, key: impl AsRef<str>) -> Option<&mut Value> {
        self.inner.get_mut(CaseInsensitiveStr::new(key.as_ref()))
    }

    /// Gets the value with dotted path like `address.city`
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let mut current = self.get(parts.next()?)?;
        for part in parts {
            current = current.as_document()?.get(part)?;
        }
        Some(current)
    }

    pub fn contains_key(&self, key: impl AsRef<str>) -> bool {
        self.inner
            .contains_key(CaseInsensitiveStr::new(key.as_ref()))
    }

    pub fn remove(&mut self, key: impl AsRef<str>) -> Option<Value> {
        self.inner
            .shift_remove(CaseInsensitiveStr::new(key.as_ref()))
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl Document {
    /// Returns the size of serialized value.
    ///
    /// This doesn't include tag or name of key.
    pub fn get_serialized_value_len(&self) -> usize {
        4 // total bytes of the document
            + self.inner.iter().map(|(key, value)| {
            1 // tag byte
                + (key.as_str().len() + 1) // cstring for key
                + value.get_serialized_value_len()
        }).sum::<usize>()
            + 1 // trailing 0 tag
    }

    /// Writes the value to the BsonWriter
    pub fn write_value<W: BsonWriter>(&self, w: &mut W) -> Result<(), <W as BsonWriter>::Error> {
        let len = self.get_serialized_value_len();
        let len = i32::try_from(len).map_err(|_| W::when_too_large(len))?;

        w.write_bytes(&len.to_le_bytes())?;

        for (key, value) in &self.inner {
            w.write_bytes(&[value.ty().bson_tag()])?;
            super::utils::write_c_string(w, key.as_str())?;
            value.write_value(w)?;
        }

        w.write_bytes(&[0])?;
        Ok(())
    }

    /// Serializes the document to the bson bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, ParseError> {
        let mut bytes = Vec::with_capacity(self.get_serialized_value_len());
        self.write_value(&mut bytes)?;
        Ok(bytes)
    }

    /// Parses the document from exactly `bytes`
    pub fn from_bytes(bytes: &[u8]) -> Result<Document, ParseError> {
        let mut r = BsonReader::new(bytes);
        let result = Self::parse_document_inner(&mut r)?;
        if !r.is_end() {
            return Err(ParseError::RemainingDataInDocument);
        }
        Ok(result)
    }

    pub(super) fn parse_document_inner(r: &mut BsonReader<'_>) -> Result<Document, ParseError> {
        let mut r = r.embedded()?;

        let mut document = Self::new();

        while let Some((key, value)) = super::de::parse_element(&mut r)? {
            match document.inner.entry(key.into()) {
                Entry::Occupied(e) => {
                    return Err(ParseError::DuplicatedKey(e.key().to_string()));
                }
                Entry::Vacant(e) => {
                    e.insert(value);
                }
            }
        }

        if !r.is_end() {
            return Err(ParseError::RemainingDataInDocument);
        }

        Ok(document)
    }
}

impl TotalOrd for Document {
    fn total_cmp(&self, other: &Self) -> Ordering {
        for ((l_key, l_value), (r_key, r_value)) in self.iter().zip(other.iter()) {
            let ordering = l_key
                .cmp(r_key)
                .then_with(|| l_value.total_cmp(r_value));
            if ordering.is_ne() {
                return ordering;
            }
        }
        self.len().cmp(&other.len())
    }
}

#[track_caller]
fn check_key(key: &str) {
    assert!(
        !key.as_bytes().contains(&0),
        "Key contains null char, which is disallowed for bson"
    );
}

impl Debug for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Document {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut document = Document::new();
        for (k, v) in iter {
            document.insert(k, v);
        }
        document
    }
}
