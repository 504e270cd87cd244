use crate::bson::BsonWriter;
use std::fmt::{Debug, Formatter};

pub(super) fn write_c_string<W: BsonWriter>(w: &mut W, s: &str) -> Result<(), W::Error> {
    w.write_bytes(s.as_bytes())?;
    w.write_bytes(&[0])?;
    Ok(())
}

/// Formats the bytes as lowercase hex without quotes
pub(super) struct ToHex<const N: usize>(pub [u8; N]);

impl<const N: usize> Debug for ToHex<N> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}
