use crate::engine::{NO_PAGE, PAGE_AVAILABLE_BYTES, PageBuffer};
use crate::{Error, Result};

/// The common variables for each page

const P_PAGE_ID: usize = 0; // 00-03 [uint]
const P_PAGE_TYPE: usize = 4; // 04-04 [byte]
const P_PREV_PAGE_ID: usize = 5; // 05-08 [uint]
const P_NEXT_PAGE_ID: usize = 9; // 09-12 [uint]
const P_ITEM_COUNT: usize = 13; // 13-14 [ushort]
const P_FREE_BYTES: usize = 15; // 15-16 [ushort]
// 17-24 reserved

#[derive(Debug, Clone)]
pub(crate) struct BasePage {
    page_id: u32,
    page_type: PageType,
    pub prev_page_id: u32,
    pub next_page_id: u32,
    item_count: u16,
    free_bytes: u16,
}

impl BasePage {
    pub fn new(page_id: u32, page_type: PageType) -> Self {
        BasePage {
            page_id,
            page_type,
            prev_page_id: NO_PAGE,
            next_page_id: NO_PAGE,
            item_count: 0,
            free_bytes: PAGE_AVAILABLE_BYTES as u16,
        }
    }

    /// Reads the header of the page. `page_id` is the id the page was read from.
    pub fn load(page_id: u32, buffer: &PageBuffer) -> Result<Self> {
        let stored_id = buffer.read_u32(P_PAGE_ID);
        if stored_id != page_id {
            return Err(Error::invalid_page(page_id));
        }

        let page_type = PageType::from_u8(buffer.read_byte(P_PAGE_TYPE))
            .ok_or_else(|| Error::invalid_page(page_id))?;

        Ok(BasePage {
            page_id,
            page_type,
            prev_page_id: buffer.read_u32(P_PREV_PAGE_ID),
            next_page_id: buffer.read_u32(P_NEXT_PAGE_ID),
            item_count: buffer.read_u16(P_ITEM_COUNT),
            free_bytes: buffer.read_u16(P_FREE_BYTES),
        })
    }

    pub fn update_buffer(&self, buffer: &mut PageBuffer) {
        buffer.write_u32(P_PAGE_ID, self.page_id);
        buffer.write_byte(P_PAGE_TYPE, self.page_type as u8);
        buffer.write_u32(P_PREV_PAGE_ID, self.prev_page_id);
        buffer.write_u32(P_NEXT_PAGE_ID, self.next_page_id);
        buffer.write_u16(P_ITEM_COUNT, self.item_count);
        buffer.write_u16(P_FREE_BYTES, self.free_bytes);
        buffer.buffer_mut()[P_FREE_BYTES + 2..crate::engine::PAGE_HEADER_SIZE].fill(0);
    }

    pub fn page_id(&self) -> u32 {
        self.page_id
    }

    pub fn page_type(&self) -> PageType {
        self.page_type
    }

    pub fn item_count(&self) -> u16 {
        self.item_count
    }

    pub fn free_bytes(&self) -> usize {
        self.free_bytes as usize
    }

    /// Updates the item count and free bytes from the size of content
    pub(super) fn set_usage(&mut self, item_count: usize, used_bytes: usize) {
        debug_assert!(
            used_bytes <= PAGE_AVAILABLE_BYTES,
            "page {} overflow: {used_bytes} bytes",
            self.page_id
        );
        self.item_count = item_count as u16;
        self.free_bytes = PAGE_AVAILABLE_BYTES.saturating_sub(used_bytes) as u16;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PageType {
    Empty = 0,
    Header = 1,
    Collection = 2,
    Index = 3,
    Data = 4,
    Extend = 5,
}

impl PageType {
    fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(PageType::Empty),
            1 => Some(PageType::Header),
            2 => Some(PageType::Collection),
            3 => Some(PageType::Index),
            4 => Some(PageType::Data),
            5 => Some(PageType::Extend),
            _ => None,
        }
    }
}
