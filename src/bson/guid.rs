use super::utils::ToHex;
use std::fmt::{Debug, Display, Formatter};

/// Represents GUID (or UUID)
#[derive(Copy, Clone, Eq, Hash, PartialEq, Ord, PartialOrd)]
pub struct Guid {
    bytes: [u8; 16],
}

impl Guid {
    /// Creates a random (version 4) guid
    pub fn new() -> Guid {
        let mut bytes = rand::random::<[u8; 16]>();
        bytes[6] = (bytes[6] & 0x0F) | 0x40;
        bytes[8] = (bytes[8] & 0x3F) | 0x80;
        Guid { bytes }
    }

    pub fn from_bytes(bytes: [u8; 16]) -> Guid {
        Guid { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.bytes
    }
}

impl Default for Guid {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Guid {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Guid").field(&ToHex(self.bytes)).finish()
    }
}

impl Display for Guid {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let hex = hex::encode(self.bytes);
        write!(
            f,
            "{}-{}-{}-{}-{}",
            &hex[0..8],
            &hex[8..12],
            &hex[12..16],
            &hex[16..20],
            &hex[20..32]
        )
    }
}

#[test]
fn new_guid_is_v4() {
    let guid = Guid::new();
    assert_eq!(guid.as_bytes()[6] >> 4, 4);
    assert_ne!(guid, Guid::new());
    assert_eq!(guid.to_string().len(), 36);
}
