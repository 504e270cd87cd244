use crate::engine::pages::{BasePage, PageType};
use crate::engine::{PAGE_AVAILABLE_BYTES, PageBuffer};
use crate::{Error, Result};
use std::ops::{Deref, DerefMut};

/// A slice of an oversized document. `item_count` is the number of bytes.
pub(crate) struct ExtendPage {
    base: BasePage,
    data: Vec<u8>,
}

impl ExtendPage {
    pub fn new(page_id: u32) -> Self {
        ExtendPage {
            base: BasePage::new(page_id, PageType::Extend),
            data: Vec::new(),
        }
    }

    pub fn load(base: BasePage, buffer: &PageBuffer) -> Result<Self> {
        let len = base.item_count() as usize;
        if len > PAGE_AVAILABLE_BYTES {
            return Err(Error::invalid_page(base.page_id()));
        }
        let data = buffer.content()[..len].to_vec();
        Ok(ExtendPage { base, data })
    }

    pub fn update_buffer(&self, buffer: &mut PageBuffer) -> Result<()> {
        self.base.update_buffer(buffer);
        let content = buffer.content_mut();
        content[..self.data.len()].copy_from_slice(&self.data);
        content[self.data.len()..].fill(0);
        Ok(())
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn set_data(&mut self, data: &[u8]) {
        debug_assert!(data.len() <= PAGE_AVAILABLE_BYTES, "extend page overflow");
        self.data = data.to_vec();
        self.base.set_usage(data.len(), data.len());
    }
}

impl Deref for ExtendPage {
    type Target = BasePage;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl DerefMut for ExtendPage {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.base
    }
}
