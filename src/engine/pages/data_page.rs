use crate::engine::buffer_reader::BufferReader;
use crate::engine::buffer_writer::BufferWriter;
use crate::engine::data_block::DataBlock;
use crate::engine::page_address::PageAddress;
use crate::engine::pages::{BasePage, PageType, next_free_index};
use crate::engine::PageBuffer;
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};

pub(crate) struct DataPage {
    base: BasePage,
    blocks: BTreeMap<u16, DataBlock>,
}

impl DataPage {
    pub fn new(page_id: u32) -> Self {
        DataPage {
            base: BasePage::new(page_id, PageType::Data),
            blocks: BTreeMap::new(),
        }
    }

    pub fn load(base: BasePage, buffer: &PageBuffer) -> Result<Self> {
        let page_id = base.page_id();
        let mut reader = BufferReader::new(page_id, buffer.content());
        let mut blocks = BTreeMap::new();

        for _ in 0..base.item_count() {
            let block = DataBlock::load(page_id, &mut reader)?;
            blocks.insert(block.position().index(), block);
        }

        let mut page = DataPage { base, blocks };
        page.update_usage();
        Ok(page)
    }

    pub fn update_buffer(&self, buffer: &mut PageBuffer) -> Result<()> {
        self.base.update_buffer(buffer);
        let mut writer = BufferWriter::new(self.page_id(), buffer.content_mut());
        for block in self.blocks.values() {
            block.update_buffer(&mut writer)?;
        }
        writer.fill_remaining();
        Ok(())
    }

    pub fn update_usage(&mut self) {
        let used = self.blocks.values().map(DataBlock::length).sum();
        self.base.set_usage(self.blocks.len(), used);
    }

    pub fn block(&self, index: u16) -> Result<&DataBlock> {
        self.blocks
            .get(&index)
            .ok_or_else(|| Error::invalid_page(self.page_id()))
    }

    /// Returns the block to be modified. [`DataPage::update_usage`] must be called if the length changes
    pub fn block_mut(&mut self, index: u16) -> Result<&mut DataBlock> {
        let page_id = self.page_id();
        self.blocks
            .get_mut(&index)
            .ok_or_else(|| Error::invalid_page(page_id))
    }

    pub fn insert_block(&mut self, data: Vec<u8>) -> PageAddress {
        let index = next_free_index(self.blocks.keys().copied());
        let position = PageAddress::new(self.page_id(), index);
        let block = DataBlock::new(position, data);
        debug_assert!(
            block.length() <= self.free_bytes(),
            "no space for the block in page {}",
            self.page_id()
        );
        self.blocks.insert(index, block);
        self.update_usage();
        position
    }

    pub fn delete_block(&mut self, index: u16) -> Result<DataBlock> {
        let block = self
            .blocks
            .remove(&index)
            .ok_or_else(|| Error::invalid_page(self.base.page_id()))?;
        self.update_usage();
        Ok(block)
    }
}

impl Deref for DataPage {
    type Target = BasePage;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl DerefMut for DataPage {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.base
    }
}
