use crate::engine::data_block::{DATA_BLOCK_FIXED_SIZE, DataBlock};
use crate::engine::page_address::PageAddress;
use crate::engine::page_service::{FreeList, PageService};
use crate::engine::pages::{DataPage, ExtendPage, Page};
use crate::engine::transaction_pages::TransactionPages;
use crate::engine::{MAX_DOCUMENT_SIZE, NO_PAGE, PAGE_AVAILABLE_BYTES};
use crate::{Error, Result};

/// The largest document stored inline in a data block
const MAX_INLINE_DATA: usize = PAGE_AVAILABLE_BYTES - DATA_BLOCK_FIXED_SIZE;

/// Stores serialized documents in data blocks and extend page chains
pub(crate) struct DataService<'a, 'e> {
    pages: &'a mut TransactionPages<'e>,
    collection_page: u32,
}

impl<'a, 'e> DataService<'a, 'e> {
    pub fn new(pages: &'a mut TransactionPages<'e>, collection_page: u32) -> Self {
        Self {
            pages,
            collection_page,
        }
    }
}

impl DataService<'_, '_> {
    fn free_list(&self) -> FreeList {
        FreeList::Data {
            collection_page: self.collection_page,
        }
    }

    pub fn get_block(&mut self, address: PageAddress) -> Result<&DataBlock> {
        self.pages
            .data_page(address.page_id())?
            .block(address.index())
    }

    /// Records the index node of the document for the index slot
    pub fn set_index_ref(&mut self, address: PageAddress, slot: u8, node: PageAddress) -> Result<()> {
        self.pages
            .data_page_mut(address.page_id())?
            .block_mut(address.index())?
            .index_refs[slot as usize] = node;
        Ok(())
    }

    /// Stores the document bytes in a new data block
    pub fn insert(&mut self, data: Vec<u8>) -> Result<PageAddress> {
        if data.len() > MAX_DOCUMENT_SIZE {
            return Err(Error::document_size_exceeded(MAX_DOCUMENT_SIZE));
        }

        let inline = data.len() <= MAX_INLINE_DATA;
        let needed = DATA_BLOCK_FIXED_SIZE + if inline { data.len() } else { 0 };
        let list = self.free_list();

        let page_id = PageService::new(self.pages)
            .get_free_page(list, needed, |id| Page::Data(DataPage::new(id)))?;

        let position = if inline {
            self.pages.data_page_mut(page_id)?.insert_block(data)
        } else {
            let position = self.pages.data_page_mut(page_id)?.insert_block(Vec::new());
            let extend = self.write_extend(&data)?;
            self.pages
                .data_page_mut(page_id)?
                .block_mut(position.index())?
                .extend_page_id = extend;
            position
        };

        PageService::new(self.pages).reindex_free_list(list, page_id)?;

        debug_log!(ENGINE: "inserted data block {position:?} ({} bytes, inline: {inline})", needed);
        Ok(position)
    }

    /// Replaces the document bytes. The address of the block does not change.
    pub fn update(&mut self, address: PageAddress, data: Vec<u8>) -> Result<()> {
        if data.len() > MAX_DOCUMENT_SIZE {
            return Err(Error::document_size_exceeded(MAX_DOCUMENT_SIZE));
        }

        let page = self.pages.data_page(address.page_id())?;
        let block = page.block(address.index())?;
        let old_extend = block.extend_page_id;
        let available = page.free_bytes() + block.data.len();

        if old_extend != NO_PAGE {
            PageService::new(self.pages).delete_chain(old_extend)?;
        }

        let new_extend = if data.len() <= MAX_INLINE_DATA && data.len() <= available {
            let page = self.pages.data_page_mut(address.page_id())?;
            let block = page.block_mut(address.index())?;
            block.data = data;
            block.extend_page_id = NO_PAGE;
            None
        } else {
            Some(self.write_extend(&data)?)
        };

        let page = self.pages.data_page_mut(address.page_id())?;
        if let Some(extend) = new_extend {
            let block = page.block_mut(address.index())?;
            block.data = Vec::new();
            block.extend_page_id = extend;
        }
        page.update_usage();

        let list = self.free_list();
        PageService::new(self.pages).reindex_free_list(list, address.page_id())
    }

    /// Reads the document bytes of the block
    pub fn read(&mut self, address: PageAddress) -> Result<Vec<u8>> {
        let block = self.get_block(address)?;
        if !block.has_extend() {
            return Ok(block.data.clone());
        }

        let guard = self.pages.header()?.last_page_id;
        let mut current = self.get_block(address)?.extend_page_id;
        let mut data = Vec::new();
        let mut count = 0;

        while current != NO_PAGE {
            let page = self.pages.extend_page(current)?;
            data.extend_from_slice(page.data());
            current = page.next_page_id;
            count += 1;
            assert!(count <= guard, "Detected loop in extend chain of {address:?}");
        }

        Ok(data)
    }

    /// Deletes the block and its extend pages, returning the deleted block
    pub fn delete(&mut self, address: PageAddress) -> Result<DataBlock> {
        let block = self
            .pages
            .data_page_mut(address.page_id())?
            .delete_block(address.index())?;

        let empty = self.pages.data_page(address.page_id())?.item_count() == 0;
        let list = self.free_list();
        let mut pager = PageService::new(self.pages);

        if block.has_extend() {
            pager.delete_chain(block.extend_page_id)?;
        }

        if empty {
            pager.delete_list_page(list, address.page_id())?;
        } else {
            pager.reindex_free_list(list, address.page_id())?;
        }

        Ok(block)
    }

    /// Writes the data into a new chain of extend pages and returns the first page id
    fn write_extend(&mut self, data: &[u8]) -> Result<u32> {
        let mut first = NO_PAGE;
        let mut prev = NO_PAGE;

        for chunk in data.chunks(PAGE_AVAILABLE_BYTES) {
            let page_id = PageService::new(self.pages).new_page(|id| Page::Extend(ExtendPage::new(id)))?;
            let page = self.pages.extend_page_mut(page_id)?;
            page.set_data(chunk);
            page.prev_page_id = prev;

            if prev == NO_PAGE {
                first = page_id;
            } else {
                self.pages.extend_page_mut(prev)?.next_page_id = page_id;
            }
            prev = page_id;
        }

        debug_log!(DISK: "wrote {} bytes to extend chain from {first}", data.len());
        Ok(first)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::disk::{DiskReader, MemoryDisk};
    use crate::engine::pages::{CollectionPage, HeaderPage};
    use crate::ErrorKind;

    fn with_data(f: impl FnOnce(&mut DataService<'_, '_>)) {
        let disk = DiskReader::new(Box::new(MemoryDisk::new()), None, 100);
        let mut pages = TransactionPages::new(&disk, true);
        pages.set_page(0, Page::Header(HeaderPage::new(None)));
        let collection = PageService::new(&mut pages)
            .new_page(|id| Page::Collection(CollectionPage::new(id, "col".into())))
            .unwrap();
        f(&mut DataService::new(&mut pages, collection));
    }

    fn bytes(len: usize) -> Vec<u8> {
        (0..len).map(|x| (x % 251) as u8).collect()
    }

    #[test]
    fn small_documents_share_pages() {
        with_data(|data| {
            let a = data.insert(bytes(100)).unwrap();
            let b = data.insert(bytes(200)).unwrap();
            assert_eq!(a.page_id(), b.page_id());
            assert_eq!(data.read(a).unwrap(), bytes(100));
            assert_eq!(data.read(b).unwrap(), bytes(200));

            // a block too large for the remaining space goes to another page
            let c = data.insert(bytes(3500)).unwrap();
            assert_ne!(c.page_id(), a.page_id());
            assert!(!data.get_block(c).unwrap().has_extend());
        });
    }

    #[test]
    fn oversized_document_uses_extend_chain() {
        with_data(|data| {
            let doc = bytes(PAGE_AVAILABLE_BYTES * 3 + 10);
            let address = data.insert(doc.clone()).unwrap();
            let block = data.get_block(address).unwrap();
            assert!(block.has_extend());
            assert!(block.data.is_empty());
            assert_eq!(data.read(address).unwrap(), doc);

            let last_page = data.pages.header().unwrap().last_page_id;
            data.delete(address).unwrap();

            // the data page and 4 extend pages are recycled
            let mut pager = PageService::new(data.pages);
            for _ in 0..5 {
                let page = pager.new_page(|id| Page::Data(DataPage::new(id))).unwrap();
                assert!(page <= last_page);
            }
            assert_eq!(data.pages.header().unwrap().free_empty_page_id, NO_PAGE);
        });
    }

    #[test]
    fn update_keeps_address() {
        with_data(|data| {
            let address = data.insert(bytes(50)).unwrap();
            data.insert(bytes(1000)).unwrap();

            data.update(address, bytes(3500)).unwrap();
            assert_eq!(data.read(address).unwrap(), bytes(3500));
            assert!(data.get_block(address).unwrap().has_extend());

            data.update(address, bytes(10)).unwrap();
            assert_eq!(data.read(address).unwrap(), bytes(10));
            assert!(!data.get_block(address).unwrap().has_extend());
        });
    }

    #[test]
    fn document_size_limit() {
        with_data(|data| {
            let err = data.insert(vec![0; MAX_DOCUMENT_SIZE + 1]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::DocumentSizeExceeded);
        });
    }
}
