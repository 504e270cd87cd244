use crate::bson::BsonWriter;

/// A generic (subtype 0) binary value.
///
/// UUID binaries are read as [`Guid`](crate::bson::Guid) instead.
#[derive(Eq, PartialEq, Hash, Debug, Clone, Default, Ord, PartialOrd)]
pub struct Binary {
    bytes: Vec<u8>,
}

impl Binary {
    pub(crate) const GENERIC_SUBTYPE: u8 = 0x00;

    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Length prefix, subtype and payload. Tag and key are not counted
    pub(crate) fn get_serialized_value_len(&self) -> usize {
        size_of::<i32>() + 1 + self.len()
    }

    pub(crate) fn write_value<W: BsonWriter>(&self, w: &mut W) -> Result<(), W::Error> {
        let Ok(len) = i32::try_from(self.len()) else {
            return Err(W::when_too_large(self.len()));
        };

        w.write_bytes(&len.to_le_bytes())?;
        w.write_bytes(&[Self::GENERIC_SUBTYPE])?;
        w.write_bytes(self.bytes())
    }
}

impl AsRef<[u8]> for Binary {
    fn as_ref(&self) -> &[u8] {
        self.bytes()
    }
}

impl From<Vec<u8>> for Binary {
    fn from(bytes: Vec<u8>) -> Self {
        Binary::new(bytes)
    }
}

impl From<&[u8]> for Binary {
    fn from(bytes: &[u8]) -> Self {
        Binary::new(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bson::{Document, Value};

    #[test]
    fn ordered_by_bytes() {
        assert!(Binary::default() < Binary::new(vec![1, 2, 3]));
        assert!(Binary::new(vec![0, 9]) < Binary::from(&[1u8][..]));
        assert!(Binary::new(vec![1]) < Binary::new(vec![1, 0]));
    }

    #[test]
    fn stored_as_generic_subtype() {
        let mut doc = Document::new();
        doc.insert("b", Binary::new(vec![7, 8]));
        let bytes = doc.to_bytes().unwrap();

        // i32 total, tag 5, "b\0", i32 length, subtype, payload, trailing 0
        assert_eq!(bytes.len(), 4 + 1 + 2 + 4 + 1 + 2 + 1);
        assert_eq!(&bytes[7..14], &[2, 0, 0, 0, Binary::GENERIC_SUBTYPE, 7, 8]);

        let parsed = Document::from_bytes(&bytes).unwrap();
        assert_eq!(parsed.get("b"), Some(&Value::Binary(Binary::from(vec![7, 8]))));
    }
}
