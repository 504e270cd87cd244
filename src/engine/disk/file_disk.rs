use super::DiskService;
use crate::engine::PAGE_SIZE;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Page storage in a file
pub struct FileDisk {
    file: File,
}

impl FileDisk {
    /// Opens the file, creating it if it does not exist
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        Ok(Self { file })
    }

    pub fn new(file: File) -> Self {
        Self { file }
    }
}

impl DiskService for FileDisk {
    fn read_page(&mut self, page_id: u32, buffer: &mut [u8; PAGE_SIZE]) -> io::Result<()> {
        self.file
            .seek(SeekFrom::Start(page_id as u64 * PAGE_SIZE as u64))?;
        self.file.read_exact(buffer)
    }

    fn write_page(&mut self, page_id: u32, buffer: &[u8; PAGE_SIZE]) -> io::Result<()> {
        self.file
            .seek(SeekFrom::Start(page_id as u64 * PAGE_SIZE as u64))?;
        self.file.write_all(buffer)
    }

    fn page_count(&mut self) -> io::Result<u32> {
        Ok(self.file.metadata()?.len().div_ceil(PAGE_SIZE as u64) as u32)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()?;
        self.file.sync_data()
    }
}
