use super::*;
use std::fmt::{Display, Formatter};
use std::string::FromUtf8Error;

#[derive(Debug)]
pub enum ParseError {
    BadLength,
    SizeExceeded,
    RemainingDataInDocument,
    BadTag(u8),
    BadUtf8(FromUtf8Error),
    NoTrailingZero,
    BadGuidLength,
    BadBinarySubType(u8),
    DuplicatedKey(String),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::BadLength => f.write_str("bad length in bson document"),
            ParseError::SizeExceeded => {
                f.write_str("size limit exceeded in bson document or inner document")
            }
            ParseError::RemainingDataInDocument => {
                f.write_str("The bson document is shorter than expected")
            }
            ParseError::BadTag(tag) => write!(f, "bad tag: {tag:02x}"),
            ParseError::BadUtf8(e) => Display::fmt(e, f),
            ParseError::NoTrailingZero => f.write_str("no trailing zero byte in string"),
            ParseError::BadGuidLength => f.write_str("bad GUID bytes length"),
            ParseError::BadBinarySubType(t) => write!(f, "bad binary subtype: {t}"),
            ParseError::DuplicatedKey(key) => write!(f, "duplicate key: {key}"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Reads bson values from a byte slice.
///
/// Embedded documents are read through a new reader over their own bytes.
pub(super) struct BsonReader<'a> {
    bytes: &'a [u8],
}

impl<'a> BsonReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub fn is_end(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn read_slice(&mut self, len: usize) -> Result<&'a [u8], ParseError> {
        if self.bytes.len() < len {
            return Err(ParseError::SizeExceeded);
        }
        let (head, tail) = self.bytes.split_at(len);
        self.bytes = tail;
        Ok(head)
    }

    pub fn read_fully_fixed<const SIZE: usize>(&mut self) -> Result<[u8; SIZE], ParseError> {
        let mut buffer = [0u8; SIZE];
        buffer.copy_from_slice(self.read_slice(SIZE)?);
        Ok(buffer)
    }

    fn read_len(&mut self) -> Result<usize, ParseError> {
        let len = i32::from_le_bytes(self.read_fully_fixed()?);
        len.try_into().map_err(|_| ParseError::BadLength)
    }

    /// Reads the length prefix of a document / array and returns the reader for its body
    pub fn embedded(&mut self) -> Result<BsonReader<'a>, ParseError> {
        let offset = 4;
        let len = self.read_len()?;
        if len < offset + 1 {
            return Err(ParseError::BadLength);
        }
        Ok(BsonReader::new(self.read_slice(len - offset)?))
    }
}

/// Parses one element. Returns `None` for the trailing zero of the document.
pub(super) fn parse_element(r: &mut BsonReader<'_>) -> Result<Option<(String, Value)>, ParseError> {
    let tag = r.read_fully_fixed::<1>()?[0];
    if tag == 0 {
        return Ok(None);
    }

    let key = parse_c_string(r)?;

    let value = match tag {
        1 => Value::Double(f64::from_le_bytes(r.read_fully_fixed()?)),
        16 => Value::Int32(i32::from_le_bytes(r.read_fully_fixed()?)),
        18 => Value::Int64(i64::from_le_bytes(r.read_fully_fixed()?)),
        0xFF => Value::MinValue,
        0x7F => Value::MaxValue,
        10 => Value::Null,
        7 => Value::ObjectId(ObjectId::from_bytes(r.read_fully_fixed()?)),
        8 => Value::Boolean(r.read_fully_fixed::<1>()?[0] != 0),
        9 => Value::DateTime(DateTime::from_unix_milliseconds(i64::from_le_bytes(
            r.read_fully_fixed()?,
        ))),

        2 => {
            let len = r.read_len()?;
            if len == 0 {
                return Err(ParseError::BadLength);
            }
            let mut buffer = r.read_slice(len)?.to_vec();

            if buffer.pop() != Some(0) {
                return Err(ParseError::NoTrailingZero);
            }

            Value::String(String::from_utf8(buffer).map_err(ParseError::BadUtf8)?)
        }
        5 => {
            let len = r.read_len()?;
            let sub_type = r.read_fully_fixed::<1>()?[0];

            match sub_type {
                Binary::GENERIC_SUBTYPE => {
                    Value::Binary(Binary::new(r.read_slice(len)?.to_vec()))
                }
                4 => {
                    // UUID
                    if len != 16 {
                        return Err(ParseError::BadGuidLength);
                    }
                    Value::Guid(Guid::from_bytes(r.read_fully_fixed()?))
                }
                sub_type => return Err(ParseError::BadBinarySubType(sub_type)),
            }
        }
        3 => Value::Document(Document::parse_document_inner(r)?),
        4 => Value::Array(Array::parse_array(r)?),
        tag => return Err(ParseError::BadTag(tag)),
    };

    Ok(Some((key, value)))
}

fn parse_c_string(p: &mut BsonReader<'_>) -> Result<String, ParseError> {
    let mut buffer = vec![];

    loop {
        let data = p.read_fully_fixed::<1>()?[0];
        if data == 0 {
            break;
        }
        buffer.push(data);
    }

    String::from_utf8(buffer).map_err(ParseError::BadUtf8)
}
