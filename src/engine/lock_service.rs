use crate::{Error, Result};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

/// The single reader/writer lock of the database file
pub(crate) struct LockService {
    timeout: Duration,
    transaction: RwLock<()>,
}

impl LockService {
    pub fn new(timeout: Duration) -> Self {
        LockService {
            timeout,
            transaction: RwLock::new(()),
        }
    }

    /// Enters the lock shared with other readers
    pub fn enter_read(&self) -> Result<LockScope<'_>> {
        match self.transaction.try_read_for(self.timeout) {
            Some(lock) => Ok(LockScope::Read(lock)),
            None => {
                tracing::warn!(timeout = ?self.timeout, "timeout while waiting for the read lock");
                Err(Error::lock_timeout("read"))
            }
        }
    }

    /// Enters the exclusive lock for writing
    pub fn enter_write(&self) -> Result<LockScope<'_>> {
        match self.transaction.try_write_for(self.timeout) {
            Some(lock) => Ok(LockScope::Write(lock)),
            None => {
                tracing::warn!(timeout = ?self.timeout, "timeout while waiting for the write lock");
                Err(Error::lock_timeout("write"))
            }
        }
    }
}

#[must_use]
pub(crate) enum LockScope<'a> {
    Read(#[allow(dead_code)] RwLockReadGuard<'a, ()>),
    Write(#[allow(dead_code)] RwLockWriteGuard<'a, ()>),
}

impl LockScope<'_> {
    pub fn is_write(&self) -> bool {
        matches!(self, LockScope::Write(_))
    }
}
