use super::{DiskService, MemoryCache, PageCipher};
use crate::Result;
use crate::engine::PageBuffer;
use parking_lot::Mutex;
use std::sync::Arc;

/// Reads and writes pages through the cache, applying the cipher to non-header pages.
pub(crate) struct DiskReader {
    disk: Mutex<Box<dyn DiskService>>,
    cipher: Option<Box<dyn PageCipher>>,
    cache: MemoryCache,
}

impl DiskReader {
    pub fn new(
        disk: Box<dyn DiskService>,
        cipher: Option<Box<dyn PageCipher>>,
        cache_pages: usize,
    ) -> Self {
        Self {
            disk: Mutex::new(disk),
            cipher,
            cache: MemoryCache::new(cache_pages),
        }
    }

    pub fn page_count(&self) -> Result<u32> {
        Ok(self.disk.lock().page_count()?)
    }

    pub fn read_page(&self, page_id: u32) -> Result<Arc<PageBuffer>> {
        if let Some(page) = self.cache.get(page_id) {
            return Ok(page);
        }

        let mut buffer = PageBuffer::new();
        self.disk.lock().read_page(page_id, buffer.buffer_mut())?;
        if let (Some(cipher), true) = (&self.cipher, page_id != 0) {
            cipher.decrypt(page_id, buffer.buffer_mut());
        }

        let buffer = Arc::<PageBuffer>::from(buffer);
        self.cache.insert(page_id, buffer.clone());
        Ok(buffer)
    }

    /// Writes the pages in the order given
    pub fn write_pages(&self, pages: impl IntoIterator<Item = (u32, Box<PageBuffer>)>) -> Result<()> {
        let mut disk = self.disk.lock();

        for (page_id, buffer) in pages {
            let buffer = Arc::<PageBuffer>::from(buffer);
            match (&self.cipher, page_id != 0) {
                (Some(cipher), true) => {
                    let mut encrypted = PageBuffer::new();
                    encrypted.buffer_mut().copy_from_slice(buffer.buffer());
                    cipher.encrypt(page_id, encrypted.buffer_mut());
                    disk.write_page(page_id, encrypted.buffer())?;
                }
                _ => disk.write_page(page_id, buffer.buffer())?,
            }
            self.cache.insert(page_id, buffer);
        }

        Ok(())
    }

    pub fn flush(&self) -> Result<()> {
        Ok(self.disk.lock().flush()?)
    }
}
