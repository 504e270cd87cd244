use crate::Result;
use crate::engine::disk::DiskReader;
use crate::engine::lock_service::{LockScope, LockService};
use crate::engine::transaction_pages::TransactionPages;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum LockMode {
    Read,
    Write,
}

/// One read or write transaction holding the database lock until it ends
pub(crate) struct TransactionService<'e> {
    disk: &'e DiskReader,
    pages: TransactionPages<'e>,
    checkpoint_pages: usize,
    checkpoints: usize,
    // dropped last so the pages are released before the lock
    scope: LockScope<'e>,
}

impl<'e> TransactionService<'e> {
    pub fn new(
        locker: &'e LockService,
        disk: &'e DiskReader,
        mode: LockMode,
        checkpoint_pages: usize,
    ) -> Result<Self> {
        let scope = match mode {
            LockMode::Read => locker.enter_read()?,
            LockMode::Write => locker.enter_write()?,
        };
        debug_log!(TRANSACTION: "begin {mode:?} transaction");

        Ok(Self {
            disk,
            pages: TransactionPages::new(disk, mode == LockMode::Write),
            checkpoint_pages,
            checkpoints: 0,
            scope,
        })
    }

    pub fn pages(&mut self) -> &mut TransactionPages<'e> {
        &mut self.pages
    }

    pub fn mode(&self) -> LockMode {
        if self.scope.is_write() {
            LockMode::Write
        } else {
            LockMode::Read
        }
    }

    /// Persists the dirty pages if there are too many of them.
    ///
    /// Must be called only between documents, when all pages are consistent.
    pub fn safe_point(&mut self) -> Result<()> {
        if self.mode() == LockMode::Write && self.pages.dirty_count() >= self.checkpoint_pages {
            let count = self.pages.persist_dirty_pages()?;
            self.checkpoints += 1;
            tracing::info!(pages = count, "checkpoint of write transaction");
        }
        Ok(())
    }

    pub fn commit(mut self) -> Result<()> {
        if self.mode() == LockMode::Read || (self.pages.dirty_count() == 0 && self.checkpoints == 0) {
            debug_log!(TRANSACTION: "end of transaction without changes");
            return Ok(());
        }

        let header = self.pages.header_mut()?;
        header.change_id = header.change_id.wrapping_add(1);
        let count = self.pages.persist_dirty_pages()?;
        self.disk.flush()?;

        debug_log!(TRANSACTION: "commit {count} pages");
        Ok(())
    }

    /// Discards the changes since the last checkpoint
    pub fn rollback(mut self) {
        if self.checkpoints > 0 {
            tracing::warn!(
                checkpoints = self.checkpoints,
                "rollback of a write transaction after checkpoint; checkpointed pages are kept"
            );
        }
        debug_log!(TRANSACTION: "rollback {} dirty pages", self.pages.dirty_count());
        self.pages.discard();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::disk::MemoryDisk;
    use crate::engine::pages::{HeaderPage, Page};
    use std::time::Duration;

    fn disk() -> DiskReader {
        let disk = DiskReader::new(Box::new(MemoryDisk::new()), None, 10);
        {
            let mut pages = TransactionPages::new(&disk, true);
            pages.set_page(0, Page::Header(HeaderPage::new(None)));
            pages.persist_dirty_pages().unwrap();
        }
        disk
    }

    #[test]
    fn commit_bumps_change_id() {
        let disk = disk();
        let locker = LockService::new(Duration::from_millis(10));

        let mut transaction = TransactionService::new(&locker, &disk, LockMode::Write, 100).unwrap();
        transaction.pages().header_mut().unwrap().user_version = 4;
        transaction.commit().unwrap();

        let mut transaction = TransactionService::new(&locker, &disk, LockMode::Read, 100).unwrap();
        let header = transaction.pages().header().unwrap();
        assert_eq!(header.user_version, 4);
        assert_eq!(header.change_id, 1);
    }

    #[test]
    fn rollback_discards_changes() {
        let disk = disk();
        let locker = LockService::new(Duration::from_millis(10));

        let mut transaction = TransactionService::new(&locker, &disk, LockMode::Write, 100).unwrap();
        transaction.pages().header_mut().unwrap().user_version = 4;
        transaction.rollback();

        let mut transaction = TransactionService::new(&locker, &disk, LockMode::Read, 100).unwrap();
        assert_eq!(transaction.pages().header().unwrap().user_version, 0);
    }

    #[test]
    fn safe_point_persists_when_threshold_reached() {
        let disk = disk();
        let locker = LockService::new(Duration::from_millis(10));

        let mut transaction = TransactionService::new(&locker, &disk, LockMode::Write, 1).unwrap();
        transaction.pages().header_mut().unwrap().user_version = 9;
        transaction.safe_point().unwrap();
        assert_eq!(transaction.pages().dirty_count(), 0);
        transaction.rollback();

        let mut transaction = TransactionService::new(&locker, &disk, LockMode::Read, 1).unwrap();
        assert_eq!(transaction.pages().header().unwrap().user_version, 9);
    }
}
