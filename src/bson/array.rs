use super::de::BsonReader;
use super::{BsonWriter, ParseError, TotalOrd, Value};
use std::cmp::Ordering;
use std::fmt::Debug;

#[derive(Clone, PartialEq, Default)]
pub struct Array {
    data: Vec<Value>,
}

impl Array {
    pub fn new() -> Array {
        Array { data: Vec::new() }
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.data
    }

    pub fn push(&mut self, value: impl Into<Value>) {
        self.data.push(value.into());
    }

    pub fn pop(&mut self) -> Option<Value> {
        self.data.pop()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.data.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }
}

impl Array {
    /// Returns the size of serialized value.
    ///
    /// This doesn't include tag or name of key.
    pub fn get_serialized_value_len(&self) -> usize {
        4 // total bytes of the document
            + self.data.iter().enumerate().map(|(index, value)| {
            1 // tag byte
                + (index.to_string().len() + 1)
                + value.get_serialized_value_len()
        }).sum::<usize>()
            + 1 // trailing 0 tag
    }

    /// Writes the value to the BsonWriter
    pub fn write_value<W: BsonWriter>(&self, w: &mut W) -> Result<(), W::Error> {
        let len = self.get_serialized_value_len();
        let len = i32::try_from(len).map_err(|_| W::when_too_large(len))?;

        w.write_bytes(&len.to_le_bytes())?;

        for (index, value) in self.data.iter().enumerate() {
            w.write_bytes(&[value.ty().bson_tag()])?;
            super::utils::write_c_string(w, &index.to_string())?;
            value.write_value(w)?;
        }

        w.write_bytes(&[0])?;
        Ok(())
    }

    pub(super) fn parse_array(r: &mut BsonReader<'_>) -> Result<Array, ParseError> {
        let mut r = r.embedded()?;
        let mut data = Vec::new();

        while let Some((key, value)) = super::de::parse_element(&mut r)? {
            if key != data.len().to_string() {
                return Err(ParseError::DuplicatedKey(key));
            }
            data.push(value);
        }

        if !r.is_end() {
            return Err(ParseError::RemainingDataInDocument);
        }

        Ok(Array { data })
    }
}

impl TotalOrd for Array {
    fn total_cmp(&self, other: &Self) -> Ordering {
        for (l, r) in self.data.iter().zip(other.data.iter()) {
            let ordering = l.total_cmp(r);
            if ordering.is_ne() {
                return ordering;
            }
        }
        self.len().cmp(&other.len())
    }
}

impl Debug for Array {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&self.data, f)
    }
}

impl From<Vec<Value>> for Array {
    fn from(data: Vec<Value>) -> Self {
        Array { data }
    }
}

impl<V: Into<Value>> FromIterator<V> for Array {
    fn from_iter<T: IntoIterator<Item = V>>(iter: T) -> Self {
        Array {
            data: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl IntoIterator for Array {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

impl<'a> IntoIterator for &'a Array {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}
