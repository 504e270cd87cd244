use crate::engine::pages::{BasePage, Page, PageType};
use crate::engine::transaction_pages::TransactionPages;
use crate::engine::{DATA_RESERVED_BYTES, INDEX_RESERVED_BYTES, NO_PAGE};
use crate::{Error, Result};

/// A list of pages with free space, ordered by descending free bytes.
///
/// The head of the list is stored in the collection page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FreeList {
    Data { collection_page: u32 },
    Index { collection_page: u32, slot: u8 },
}

impl FreeList {
    /// A page with less free bytes than this is not kept in the list
    fn reserved_bytes(self) -> usize {
        match self {
            FreeList::Data { .. } => DATA_RESERVED_BYTES,
            FreeList::Index { .. } => INDEX_RESERVED_BYTES,
        }
    }
}

/// The page allocator: new pages, the empty page list and the free lists
pub(crate) struct PageService<'a, 'e> {
    pages: &'a mut TransactionPages<'e>,
}

impl<'a, 'e> PageService<'a, 'e> {
    pub fn new(pages: &'a mut TransactionPages<'e>) -> Self {
        Self { pages }
    }

    fn base(&mut self, page_id: u32) -> Result<&BasePage> {
        Ok(self.pages.get_page(page_id)?.base())
    }

    fn base_mut(&mut self, page_id: u32) -> Result<&mut BasePage> {
        Ok(self.pages.get_page_mut(page_id)?.base_mut())
    }

    fn loop_guard(&mut self) -> Result<u32> {
        Ok(self.pages.header()?.last_page_id + 1)
    }

    /// Creates a page with the id from empty page list or the end of the file
    pub fn new_page(&mut self, create: impl FnOnce(u32) -> Page) -> Result<u32> {
        let free = self.pages.header()?.free_empty_page_id;

        let page_id = if free != NO_PAGE {
            let empty = self.base(free)?;
            if empty.page_type() != PageType::Empty {
                return Err(Error::invalid_page(free));
            }
            let next = empty.next_page_id;
            if next != NO_PAGE {
                self.base_mut(next)?.prev_page_id = NO_PAGE;
            }
            self.pages.header_mut()?.free_empty_page_id = next;
            free
        } else {
            let header = self.pages.header_mut()?;
            if header.last_page_id >= NO_PAGE - 1 {
                return Err(Error::invalid_page(header.last_page_id));
            }
            header.last_page_id += 1;
            header.last_page_id
        };

        self.pages.set_page(page_id, create(page_id));
        Ok(page_id)
    }

    /// Converts the page to an empty page and pushes it to the empty page list.
    ///
    /// The page must not be linked in any list.
    pub fn delete_page(&mut self, page_id: u32) -> Result<()> {
        debug_assert_ne!(page_id, 0, "header page cannot be deleted");

        let head = self.pages.header()?.free_empty_page_id;
        let mut empty = BasePage::new(page_id, PageType::Empty);
        empty.next_page_id = head;
        if head != NO_PAGE {
            self.base_mut(head)?.prev_page_id = page_id;
        }

        self.pages.set_page(page_id, Page::Empty(empty));
        self.pages.header_mut()?.free_empty_page_id = page_id;
        Ok(())
    }

    /// Deletes every page of the chain linked by `next_page_id`
    pub fn delete_chain(&mut self, first_page_id: u32) -> Result<usize> {
        let guard = self.loop_guard()? as usize;
        let mut count = 0usize;
        let mut current = first_page_id;

        while current != NO_PAGE {
            let next = self.base(current)?.next_page_id;
            self.delete_page(current)?;
            current = next;
            count += 1;
            assert!(count <= guard, "Detected loop in extend chain from {first_page_id}");
        }

        Ok(count)
    }

    /// Returns the head page of the list if it has `needed` bytes, otherwise a new page linked at the head
    pub fn get_free_page(
        &mut self,
        list: FreeList,
        needed: usize,
        create: impl FnOnce(u32) -> Page,
    ) -> Result<u32> {
        let head = self.list_head(list)?;
        if head != NO_PAGE && self.base(head)?.free_bytes() >= needed {
            return Ok(head);
        }

        let page_id = self.new_page(create)?;
        debug_assert!(self.base(page_id)?.free_bytes() >= needed, "{needed} bytes never fit in a page");

        {
            let page = self.base_mut(page_id)?;
            page.prev_page_id = NO_PAGE;
            page.next_page_id = head;
        }
        if head != NO_PAGE {
            self.base_mut(head)?.prev_page_id = page_id;
        }
        self.set_list_head(list, page_id)?;

        Ok(page_id)
    }

    /// Moves the page to the right position of the list after its free bytes changed.
    ///
    /// A page without enough free bytes is removed from the list.
    pub fn reindex_free_list(&mut self, list: FreeList, page_id: u32) -> Result<()> {
        let in_list = self.is_in_list(list, page_id)?;
        let page = self.base(page_id)?;
        let free = page.free_bytes();
        let (prev, next) = (page.prev_page_id, page.next_page_id);

        if free < list.reserved_bytes() {
            if in_list {
                self.remove_from_list(list, page_id)?;
            }
            return Ok(());
        }

        if in_list {
            let prev_ok = prev == NO_PAGE || self.base(prev)?.free_bytes() >= free;
            let next_ok = next == NO_PAGE || self.base(next)?.free_bytes() <= free;
            if prev_ok && next_ok {
                return Ok(());
            }
            self.remove_from_list(list, page_id)?;
        }

        self.insert_ordered(list, page_id, free)
    }

    /// Removes the page from the list (if linked) and deletes the page
    pub fn delete_list_page(&mut self, list: FreeList, page_id: u32) -> Result<()> {
        if self.is_in_list(list, page_id)? {
            self.remove_from_list(list, page_id)?;
        }
        self.delete_page(page_id)
    }

    fn insert_ordered(&mut self, list: FreeList, page_id: u32, free: usize) -> Result<()> {
        let guard = self.loop_guard()?;
        let mut prev = NO_PAGE;
        let mut current = self.list_head(list)?;
        let mut count = 0;

        while current != NO_PAGE {
            let page = self.base(current)?;
            if page.free_bytes() <= free {
                break;
            }
            prev = current;
            current = page.next_page_id;
            count += 1;
            assert!(count <= guard, "Detected loop in free list {list:?}");
        }

        {
            let page = self.base_mut(page_id)?;
            page.prev_page_id = prev;
            page.next_page_id = current;
        }
        if prev == NO_PAGE {
            self.set_list_head(list, page_id)?;
        } else {
            self.base_mut(prev)?.next_page_id = page_id;
        }
        if current != NO_PAGE {
            self.base_mut(current)?.prev_page_id = page_id;
        }

        Ok(())
    }

    fn remove_from_list(&mut self, list: FreeList, page_id: u32) -> Result<()> {
        let page = self.base_mut(page_id)?;
        let (prev, next) = (page.prev_page_id, page.next_page_id);
        page.prev_page_id = NO_PAGE;
        page.next_page_id = NO_PAGE;

        if prev == NO_PAGE {
            self.set_list_head(list, next)?;
        } else {
            self.base_mut(prev)?.next_page_id = next;
        }
        if next != NO_PAGE {
            self.base_mut(next)?.prev_page_id = prev;
        }

        Ok(())
    }

    fn is_in_list(&mut self, list: FreeList, page_id: u32) -> Result<bool> {
        if self.list_head(list)? == page_id {
            return Ok(true);
        }
        let page = self.base(page_id)?;
        Ok(page.prev_page_id != NO_PAGE || page.next_page_id != NO_PAGE)
    }

    pub fn list_head(&mut self, list: FreeList) -> Result<u32> {
        Ok(match list {
            FreeList::Data { collection_page } => {
                self.pages.collection_page(collection_page)?.free_data_page_id
            }
            FreeList::Index {
                collection_page,
                slot,
            } => {
                self.pages
                    .collection_page(collection_page)?
                    .index(slot)
                    .free_index_page_id
            }
        })
    }

    fn set_list_head(&mut self, list: FreeList, page_id: u32) -> Result<()> {
        match list {
            FreeList::Data { collection_page } => {
                self.pages
                    .collection_page_mut(collection_page)?
                    .free_data_page_id = page_id;
            }
            FreeList::Index {
                collection_page,
                slot,
            } => {
                self.pages
                    .collection_page_mut(collection_page)?
                    .index_mut(slot)
                    .free_index_page_id = page_id;
            }
        }
        Ok(())
    }

    /// Returns (page id, free bytes) of the pages in the list from the head
    #[cfg(test)]
    pub fn list_pages(&mut self, list: FreeList) -> Result<Vec<(u32, usize)>> {
        let guard = self.loop_guard()?;
        let mut result = Vec::new();
        let mut current = self.list_head(list)?;

        while current != NO_PAGE {
            let page = self.base(current)?;
            result.push((current, page.free_bytes()));
            current = page.next_page_id;
            assert!(result.len() as u32 <= guard, "Detected loop in free list {list:?}");
        }

        Ok(result)
    }
}
