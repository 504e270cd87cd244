//! The bson module
//!
//! Documents stored by the engine are a subset of the bson used in mongodb.
//! Only the value kinds the engine can store and index are implemented here.

#[macro_use]
mod macros;
mod utils;

mod array;
mod binary;
mod date_time;
mod de;
mod document;
mod guid;
mod object_id;

pub use array::Array;
pub use binary::Binary;
pub use date_time::DateTime;
pub use de::ParseError;
pub use document::Document;
pub use guid::Guid;
pub use object_id::ObjectId;

use std::cmp::Ordering;

/// The type of bson [`Value`]
///
/// The number representation of [`BsonType`] is used as the type tag of index keys
/// and decides the order between values of different types.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BsonType {
    MinValue = 0,

    Null = 1,

    Int32 = 2,
    Int64 = 3,
    Double = 4,

    String = 6,

    Document = 7,
    Array = 8,

    Binary = 9,
    ObjectId = 10,
    Guid = 11,

    Boolean = 12,
    DateTime = 13,

    MaxValue = 14,
}

impl BsonType {
    pub(crate) fn from_u8(value: u8) -> Option<BsonType> {
        Some(match value {
            0 => BsonType::MinValue,
            1 => BsonType::Null,
            2 => BsonType::Int32,
            3 => BsonType::Int64,
            4 => BsonType::Double,
            6 => BsonType::String,
            7 => BsonType::Document,
            8 => BsonType::Array,
            9 => BsonType::Binary,
            10 => BsonType::ObjectId,
            11 => BsonType::Guid,
            12 => BsonType::Boolean,
            13 => BsonType::DateTime,
            14 => BsonType::MaxValue,
            _ => return None,
        })
    }

    pub(crate) fn bson_tag(self) -> u8 {
        match self {
            BsonType::Double => 1,
            BsonType::String => 2,
            BsonType::Document => 3,
            BsonType::Array => 4,
            BsonType::Binary => 5,
            BsonType::Guid => 5, // GUID is a kind of binary in bson
            BsonType::ObjectId => 7,
            BsonType::Boolean => 8,
            BsonType::DateTime => 9,
            BsonType::Null => 10,
            BsonType::Int32 => 16,
            BsonType::Int64 => 18,

            BsonType::MinValue => -1i8 as u8,
            BsonType::MaxValue => 127,
        }
    }

    fn is_numeric(self) -> bool {
        matches!(self, BsonType::Int32 | BsonType::Int64 | BsonType::Double)
    }
}

/// The num represents one bson value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The MinValue. The smallest value of bson value
    MinValue,
    /// The null value.
    Null,
    /// The signed 32bit integer.
    Int32(i32),
    /// The signed 64bit integer.
    Int64(i64),
    /// The IEEE 754 binary64 floating point value.
    Double(f64),
    /// The UTF-8 encoded string value
    String(String),
    /// The string key mapping
    Document(Document),
    /// The array of bson value
    Array(Array),
    /// The byte array
    Binary(Binary),
    /// ObjectId
    ObjectId(ObjectId),
    /// Guid
    /// In bson representation this will be expressed as UUID binary
    Guid(Guid),
    /// Boolean
    Boolean(bool),
    /// DateTime in unix milliseconds
    DateTime(DateTime),
    /// The MaxValue. The biggest value of bson value
    MaxValue,
}

impl Value {
    pub fn ty(&self) -> BsonType {
        match self {
            Value::MinValue => BsonType::MinValue,
            Value::Null => BsonType::Null,
            Value::Int32(_) => BsonType::Int32,
            Value::Int64(_) => BsonType::Int64,
            Value::Double(_) => BsonType::Double,
            Value::String(_) => BsonType::String,
            Value::Document(_) => BsonType::Document,
            Value::Array(_) => BsonType::Array,
            Value::Binary(_) => BsonType::Binary,
            Value::ObjectId(_) => BsonType::ObjectId,
            Value::Guid(_) => BsonType::Guid,
            Value::Boolean(_) => BsonType::Boolean,
            Value::DateTime(_) => BsonType::DateTime,
            Value::MaxValue => BsonType::MaxValue,
        }
    }

    /// Returns true for Int32, Int64 and Double
    pub fn is_number(&self) -> bool {
        self.ty().is_numeric()
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i32(&self) -> Option<i32> {
        match *self {
            Value::Int32(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the integer value of Int32 or Int64
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Int32(v) => Some(v as i64),
            Value::Int64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Int32(v) => Some(v as f64),
            Value::Int64(v) => Some(v as f64),
            Value::Double(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Boolean(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Value::Document(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }
}

impl Value {
    /// Returns the size of serialized value.
    ///
    /// This doesn't include tag or name of key.
    pub fn get_serialized_value_len(&self) -> usize {
        match self {
            // tag only types
            Value::MinValue => 0,
            Value::Null => 0,
            Value::MaxValue => 0,

            // constant length types
            Value::Int32(_) => 4,
            Value::Int64(_) => 8,
            Value::Double(_) => 8,
            Value::ObjectId(_) => 12,
            Value::Boolean(_) => 1,
            Value::DateTime(_) => 8,

            // binary type (len, subtype, data)
            Value::Binary(b) => b.get_serialized_value_len(),
            Value::Guid(_) => 4 + 1 + 16,

            // string type (len, data, trailing null)
            Value::String(s) => 4 + s.len() + 1,

            // complex (embedded) types
            Value::Document(d) => d.get_serialized_value_len(),
            Value::Array(a) => a.get_serialized_value_len(),
        }
    }

    /// Writes the value to the BsonWriter
    pub fn write_value<W: BsonWriter>(&self, w: &mut W) -> Result<(), W::Error> {
        match self {
            Value::MinValue => Ok(()),
            Value::Null => Ok(()),
            Value::MaxValue => Ok(()),

            Value::Int32(v) => w.write_bytes(&v.to_le_bytes()),
            Value::Int64(v) => w.write_bytes(&v.to_le_bytes()),
            Value::Double(v) => w.write_bytes(&v.to_le_bytes()),
            Value::ObjectId(v) => w.write_bytes(v.as_bytes()),
            &Value::Boolean(v) => w.write_bytes(&[v as u8]),
            &Value::DateTime(v) => w.write_bytes(&v.as_unix_milliseconds().to_le_bytes()),

            Value::Binary(b) => b.write_value(w),
            Value::Guid(g) => {
                w.write_bytes(&16i32.to_le_bytes())?;
                w.write_bytes(&[0x04])?;
                w.write_bytes(g.as_bytes())
            }

            Value::String(s) => {
                let len = s.len() + 1;
                let len = i32::try_from(len).map_err(|_| W::when_too_large(len))?;
                w.write_bytes(&len.to_le_bytes())?;
                w.write_bytes(s.as_bytes())?;
                w.write_bytes(&[0])
            }

            Value::Document(d) => d.write_value(w),
            Value::Array(a) => a.write_value(w),
        }
    }
}

pub trait BsonWriter {
    type Error;
    /// Returns the error for the data exceeds size limit
    fn when_too_large(size: usize) -> Self::Error;
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;
}

impl BsonWriter for Vec<u8> {
    type Error = ParseError;

    fn when_too_large(_: usize) -> Self::Error {
        ParseError::SizeExceeded
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}

/// The total ordering used for index keys and query comparison.
///
/// Numbers compare by numeric value across Int32 / Int64 / Double,
/// other values of different types compare by [`BsonType`].
pub trait TotalOrd {
    fn total_cmp(&self, other: &Self) -> Ordering;
}

impl TotalOrd for f64 {
    fn total_cmp(&self, other: &Self) -> Ordering {
        f64::total_cmp(self, other)
    }
}

impl TotalOrd for Value {
    fn total_cmp(&self, other: &Self) -> Ordering {
        let (l_ty, r_ty) = (self.ty(), other.ty());

        if l_ty.is_numeric() && r_ty.is_numeric() {
            return match (self, other) {
                (Value::Int32(l), Value::Int32(r)) => l.cmp(r),
                (Value::Double(_), _) | (_, Value::Double(_)) => {
                    // both are numeric, so as_f64 never fails
                    let l = self.as_f64().unwrap_or_default();
                    let r = other.as_f64().unwrap_or_default();
                    TotalOrd::total_cmp(&l, &r)
                }
                _ => self.as_i64().cmp(&other.as_i64()),
            };
        }

        if l_ty != r_ty {
            return l_ty.cmp(&r_ty);
        }

        match (self, other) {
            (Value::String(l), Value::String(r)) => l.cmp(r),
            (Value::Document(l), Value::Document(r)) => l.total_cmp(r),
            (Value::Array(l), Value::Array(r)) => l.total_cmp(r),
            (Value::Binary(l), Value::Binary(r)) => l.cmp(r),
            (Value::ObjectId(l), Value::ObjectId(r)) => l.cmp(r),
            (Value::Guid(l), Value::Guid(r)) => l.cmp(r),
            (Value::Boolean(l), Value::Boolean(r)) => l.cmp(r),
            (Value::DateTime(l), Value::DateTime(r)) => l.cmp(r),
            // MinValue, Null, MaxValue
            _ => Ordering::Equal,
        }
    }
}

macro_rules! from_impl {
    ($($ty: ty => $variant: ident),* $(,)?) => {
        $(
        impl From<$ty> for Value {
            fn from(value: $ty) -> Self {
                Value::$variant(value)
            }
        }
        )*
    };
}

from_impl! {
    i32 => Int32,
    i64 => Int64,
    f64 => Double,
    String => String,
    Document => Document,
    Array => Array,
    Binary => Binary,
    ObjectId => ObjectId,
    Guid => Guid,
    bool => Boolean,
    DateTime => DateTime,
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Binary(Binary::new(value))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_compare_across_types() {
        assert_eq!(Value::Int32(1).total_cmp(&Value::Int64(1)), Ordering::Equal);
        assert_eq!(Value::Int64(2).total_cmp(&Value::Double(1.5)), Ordering::Greater);
        assert_eq!(Value::Double(-0.5).total_cmp(&Value::Int32(0)), Ordering::Less);
        assert_eq!(
            Value::Int64(i64::MAX).total_cmp(&Value::Int32(i32::MAX)),
            Ordering::Greater
        );
    }

    #[test]
    fn types_compare_by_type_order() {
        let ordered = [
            Value::MinValue,
            Value::Null,
            Value::Int32(100),
            Value::String("a".into()),
            Value::Binary(Binary::new(vec![1])),
            Value::ObjectId(ObjectId::from_bytes([0; 12])),
            Value::Guid(Guid::from_bytes([0; 16])),
            Value::Boolean(false),
            Value::Boolean(true),
            Value::DateTime(DateTime::from_unix_milliseconds(0)),
            Value::MaxValue,
        ];

        for pair in ordered.windows(2) {
            assert_eq!(pair[0].total_cmp(&pair[1]), Ordering::Less, "{pair:?}");
        }
    }

    #[test]
    fn strings_are_ordinal() {
        assert_eq!(
            Value::from("B").total_cmp(&Value::from("a")),
            Ordering::Less
        );
        assert_eq!(
            Value::from("abc").total_cmp(&Value::from("abd")),
            Ordering::Less
        );
    }
}
