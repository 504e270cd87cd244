use crate::engine::disk::DiskReader;
use crate::engine::pages::{
    CollectionPage, DataPage, ExtendPage, HeaderPage, IndexPage, Page,
};
use crate::engine::PageBuffer;
use crate::Result;
use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};

/// The pages read or written by one transaction, keyed by page id.
///
/// Pages are borrowed only for the duration of one call; links between pages
/// are always followed by page id.
pub(crate) struct TransactionPages<'e> {
    disk: &'e DiskReader,
    writable: bool,
    pages: HashMap<u32, Page>,
    dirty: BTreeSet<u32>,
}

impl<'e> TransactionPages<'e> {
    pub fn new(disk: &'e DiskReader, writable: bool) -> Self {
        Self {
            disk,
            writable,
            pages: HashMap::new(),
            dirty: BTreeSet::new(),
        }
    }

    fn load(&mut self, page_id: u32) -> Result<&mut Page> {
        match self.pages.entry(page_id) {
            Entry::Occupied(e) => Ok(e.into_mut()),
            Entry::Vacant(e) => {
                let buffer = self.disk.read_page(page_id)?;
                Ok(e.insert(Page::load(page_id, &buffer)?))
            }
        }
    }

    pub fn get_page(&mut self, page_id: u32) -> Result<&Page> {
        Ok(self.load(page_id)?)
    }

    /// Returns the page for modification, marking it dirty
    pub fn get_page_mut(&mut self, page_id: u32) -> Result<&mut Page> {
        debug_assert!(self.writable, "modifying page {page_id} in read transaction");
        self.dirty.insert(page_id);
        self.load(page_id)
    }

    /// Puts the newly created (or reformatted) page
    pub fn set_page(&mut self, page_id: u32, page: Page) {
        debug_assert!(self.writable, "creating page {page_id} in read transaction");
        debug_assert_eq!(page.base().page_id(), page_id, "page id mismatch");
        self.dirty.insert(page_id);
        self.pages.insert(page_id, page);
    }

    pub fn dirty_count(&self) -> usize {
        self.dirty.len()
    }

    /// Writes all dirty pages to the disk, header page last.
    ///
    /// All loaded pages are released so memory is bounded by the dirty pages of one checkpoint.
    pub fn persist_dirty_pages(&mut self) -> Result<usize> {
        let mut buffers = Vec::with_capacity(self.dirty.len());

        // page 0 is the first element of the set
        for &page_id in self.dirty.iter().rev() {
            let Some(page) = self.pages.get(&page_id) else {
                continue;
            };
            let mut buffer = PageBuffer::new();
            page.update_buffer(&mut buffer)?;
            buffers.push((page_id, buffer));
        }

        let count = buffers.len();
        self.disk.write_pages(buffers)?;
        self.dirty.clear();
        self.pages.clear();

        Ok(count)
    }

    /// Drops all changes not persisted yet
    pub fn discard(&mut self) {
        self.dirty.clear();
        self.pages.clear();
    }
}

macro_rules! typed_page {
    ($($get: ident, $get_mut: ident => $as_ref: ident, $as_mut: ident: $ty: ty;)*) => {
        impl TransactionPages<'_> {
            $(
            pub fn $get(&mut self, page_id: u32) -> Result<&$ty> {
                self.get_page(page_id)?.$as_ref()
            }

            pub fn $get_mut(&mut self, page_id: u32) -> Result<&mut $ty> {
                self.get_page_mut(page_id)?.$as_mut()
            }
            )*
        }
    };
}

typed_page! {
    collection_page, collection_page_mut => as_collection, as_collection_mut: CollectionPage;
    index_page, index_page_mut => as_index, as_index_mut: IndexPage;
    data_page, data_page_mut => as_data, as_data_mut: DataPage;
    extend_page, extend_page_mut => as_extend, as_extend_mut: ExtendPage;
}

impl TransactionPages<'_> {
    pub fn header(&mut self) -> Result<&HeaderPage> {
        self.get_page(0)?.as_header()
    }

    pub fn header_mut(&mut self) -> Result<&mut HeaderPage> {
        self.get_page_mut(0)?.as_header_mut()
    }
}
