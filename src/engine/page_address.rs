use crate::engine::NO_PAGE;
use std::fmt;

/// The address of an item (index node or data block) in a page
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct PageAddress {
    page_id: u32,
    index: u16,
}

impl PageAddress {
    pub const SERIALIZED_SIZE: usize = 6;

    pub const EMPTY: PageAddress = PageAddress {
        page_id: NO_PAGE,
        index: u16::MAX,
    };

    pub(crate) fn new(page_id: u32, index: u16) -> Self {
        Self { page_id, index }
    }

    pub(crate) fn page_id(&self) -> u32 {
        self.page_id
    }

    pub(crate) fn index(&self) -> u16 {
        self.index
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.page_id == NO_PAGE
    }
}

impl fmt::Debug for PageAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str("(empty)")
        } else {
            write!(f, "({}:{})", self.page_id, self.index)
        }
    }
}
