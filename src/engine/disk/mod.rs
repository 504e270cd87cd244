//! The disk collaborators of the engine and the shared page cache above them

mod disk_reader;
mod file_disk;
mod memory_cache;
mod memory_disk;

pub(crate) use disk_reader::DiskReader;
pub use file_disk::FileDisk;
pub(crate) use memory_cache::MemoryCache;
pub use memory_disk::MemoryDisk;

use crate::engine::PAGE_SIZE;
use std::io;

/// The raw page storage.
///
/// Page `n` occupies bytes `n * PAGE_SIZE .. (n + 1) * PAGE_SIZE`.
/// Writing a page past the end grows the storage.
pub trait DiskService: Send {
    fn read_page(&mut self, page_id: u32, buffer: &mut [u8; PAGE_SIZE]) -> io::Result<()>;
    fn write_page(&mut self, page_id: u32, buffer: &[u8; PAGE_SIZE]) -> io::Result<()>;
    /// The number of pages currently stored
    fn page_count(&mut self) -> io::Result<u32>;
    fn flush(&mut self) -> io::Result<()>;
}

/// Transparent encryption of every page except the header page.
///
/// Both functions transform the whole page in place and must be inverse of each other.
pub trait PageCipher: Send + Sync {
    fn encrypt(&self, page_id: u32, page: &mut [u8; PAGE_SIZE]);
    fn decrypt(&self, page_id: u32, page: &mut [u8; PAGE_SIZE]);
}

impl<T: DiskService + ?Sized> DiskService for Box<T> {
    fn read_page(&mut self, page_id: u32, buffer: &mut [u8; PAGE_SIZE]) -> io::Result<()> {
        (**self).read_page(page_id, buffer)
    }

    fn write_page(&mut self, page_id: u32, buffer: &[u8; PAGE_SIZE]) -> io::Result<()> {
        (**self).write_page(page_id, buffer)
    }

    fn page_count(&mut self) -> io::Result<u32> {
        (**self).page_count()
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}
