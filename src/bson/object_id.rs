use super::utils::ToHex;
use std::fmt::{Debug, Display, Formatter};
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Represents ObjectId
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ObjectId {
    bytes: [u8; 12],
}

impl ObjectId {
    pub fn new() -> Self {
        static INCREMENT: LazyLock<AtomicU32> = LazyLock::new(|| AtomicU32::new(rand::random()));
        static MACHINE: LazyLock<u32> = LazyLock::new(|| rand::random::<u32>() & 0xFFFFFF);

        // clock before 1970 is treated as the epoch itself
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let increment = INCREMENT.fetch_add(1, Ordering::Relaxed);
        let pid = std::process::id();

        let mut bytes = [0; 12];
        bytes[0..4].copy_from_slice(&((timestamp & 0xFFFFFFFF) as u32).to_be_bytes());
        bytes[4..7].copy_from_slice(&MACHINE.to_be_bytes()[1..]);
        bytes[7..9].copy_from_slice(&pid.to_be_bytes()[2..]);
        bytes[9..12].copy_from_slice(&increment.to_be_bytes()[1..]);

        Self::from_bytes(bytes)
    }

    pub fn from_bytes(bytes: [u8; 12]) -> Self {
        ObjectId { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; 12] {
        &self.bytes
    }

    /// The creation time in unix seconds
    pub fn timestamp(&self) -> u32 {
        u32::from_be_bytes([self.bytes[0], self.bytes[1], self.bytes[2], self.bytes[3]])
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for ObjectId {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.debug_tuple("ObjectId").field(&ToHex(self.bytes)).finish()
    }
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&hex::encode(self.bytes))
    }
}

#[test]
fn object_ids_increase() {
    let a = ObjectId::new();
    let b = ObjectId::new();
    assert_ne!(a, b);
    assert_eq!(a.to_string().len(), 24);
    assert!(a.timestamp() > 0);
}
