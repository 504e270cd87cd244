use std::fmt::{Debug, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

/// DateTime in bson
///
/// This represents milliseconds since the unix epoch, which is exactly the serialized form.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DateTime(i64);

impl DateTime {
    pub const MIN: DateTime = DateTime(i64::MIN);
    pub const MAX: DateTime = DateTime(i64::MAX);

    /// Create new DateTime represents now
    pub fn now() -> Self {
        Self::from_system(SystemTime::now())
    }

    /// Creates new DateTime from [`SystemTime`], discarding precision below milliseconds.
    pub fn from_system(system: SystemTime) -> Self {
        match system.duration_since(UNIX_EPOCH) {
            Ok(after) => DateTime(i64::try_from(after.as_millis()).unwrap_or(i64::MAX)),
            Err(before) => {
                DateTime(-i64::try_from(before.duration().as_millis()).unwrap_or(i64::MAX))
            }
        }
    }

    pub const fn from_unix_milliseconds(millis: i64) -> Self {
        DateTime(millis)
    }

    pub const fn as_unix_milliseconds(&self) -> i64 {
        self.0
    }
}

impl Debug for DateTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("DateTime").field(&self.0).finish()
    }
}

#[test]
fn now_is_after_2020() {
    // 2020-01-01T00:00:00Z
    assert!(DateTime::now().as_unix_milliseconds() > 1_577_836_800_000);
}
