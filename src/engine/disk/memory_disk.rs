use super::DiskService;
use crate::engine::PAGE_SIZE;
use parking_lot::Mutex;
use std::io;
use std::sync::Arc;

/// In-memory page storage.
///
/// Clones share the same bytes, so a clone can be used to reopen the database.
#[derive(Clone, Default)]
pub struct MemoryDisk {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl MemoryDisk {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Arc::new(Mutex::new(bytes)),
        }
    }

    /// Returns a copy of the stored bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        self.bytes.lock().clone()
    }
}

impl DiskService for MemoryDisk {
    fn read_page(&mut self, page_id: u32, buffer: &mut [u8; PAGE_SIZE]) -> io::Result<()> {
        let bytes = self.bytes.lock();
        let start = page_id as usize * PAGE_SIZE;
        let page = bytes
            .get(start..start + PAGE_SIZE)
            .ok_or_else(|| io::Error::from(io::ErrorKind::UnexpectedEof))?;
        buffer.copy_from_slice(page);
        Ok(())
    }

    fn write_page(&mut self, page_id: u32, buffer: &[u8; PAGE_SIZE]) -> io::Result<()> {
        let mut bytes = self.bytes.lock();
        let start = page_id as usize * PAGE_SIZE;
        if bytes.len() < start + PAGE_SIZE {
            bytes.resize(start + PAGE_SIZE, 0);
        }
        bytes[start..start + PAGE_SIZE].copy_from_slice(buffer);
        Ok(())
    }

    fn page_count(&mut self) -> io::Result<u32> {
        Ok(self.bytes.lock().len().div_ceil(PAGE_SIZE) as u32)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_page_is_counted() {
        let mut disk = MemoryDisk::from_bytes(vec![1; PAGE_SIZE + 1]);
        assert_eq!(disk.page_count().unwrap(), 2);

        let mut buffer = [0; PAGE_SIZE];
        disk.read_page(0, &mut buffer).unwrap();
        let err = disk.read_page(1, &mut buffer).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        assert_eq!(MemoryDisk::new().page_count().unwrap(), 0);
    }
}
