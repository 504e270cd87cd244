use crate::engine::buffer_reader::BufferReader;
use crate::engine::buffer_writer::BufferWriter;
use crate::engine::index_node::IndexNode;
use crate::engine::page_address::PageAddress;
use crate::engine::pages::{BasePage, PageType, next_free_index};
use crate::engine::PageBuffer;
use crate::bson::Value;
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};

pub(crate) struct IndexPage {
    base: BasePage,
    nodes: BTreeMap<u16, IndexNode>,
}

impl IndexPage {
    pub fn new(page_id: u32) -> Self {
        IndexPage {
            base: BasePage::new(page_id, PageType::Index),
            nodes: BTreeMap::new(),
        }
    }

    pub fn load(base: BasePage, buffer: &PageBuffer) -> Result<Self> {
        let page_id = base.page_id();
        let mut reader = BufferReader::new(page_id, buffer.content());
        let mut nodes = BTreeMap::new();

        for _ in 0..base.item_count() {
            let node = IndexNode::load(page_id, &mut reader)?;
            nodes.insert(node.position().index(), node);
        }

        let mut page = IndexPage { base, nodes };
        page.update_usage();
        Ok(page)
    }

    pub fn update_buffer(&self, buffer: &mut PageBuffer) -> Result<()> {
        self.base.update_buffer(buffer);
        let mut writer = BufferWriter::new(self.page_id(), buffer.content_mut());
        for node in self.nodes.values() {
            node.update_buffer(&mut writer)?;
        }
        writer.fill_remaining();
        Ok(())
    }

    fn update_usage(&mut self) {
        let used = self.nodes.values().map(IndexNode::length).sum();
        self.base.set_usage(self.nodes.len(), used);
    }

    pub fn node(&self, index: u16) -> Result<&IndexNode> {
        self.nodes
            .get(&index)
            .ok_or_else(|| Error::invalid_page(self.page_id()))
    }

    pub fn node_mut(&mut self, index: u16) -> Result<&mut IndexNode> {
        let page_id = self.page_id();
        self.nodes
            .get_mut(&index)
            .ok_or_else(|| Error::invalid_page(page_id))
    }

    #[cfg(test)]
    pub fn nodes(&self) -> impl Iterator<Item = &IndexNode> {
        self.nodes.values()
    }

    /// Adds a node with unlinked prev / next. The caller must check the free bytes.
    pub fn insert_node(
        &mut self,
        slot: u8,
        levels: u8,
        key: Value,
        data_block: PageAddress,
    ) -> PageAddress {
        let index = next_free_index(self.nodes.keys().copied());
        let position = PageAddress::new(self.page_id(), index);
        let node = IndexNode::new(position, slot, levels, key, data_block);
        debug_assert!(
            node.length() <= self.free_bytes(),
            "no space for the node in page {}",
            self.page_id()
        );
        self.nodes.insert(index, node);
        self.update_usage();
        position
    }

    pub fn delete_node(&mut self, index: u16) -> Result<IndexNode> {
        let node = self
            .nodes
            .remove(&index)
            .ok_or_else(|| Error::invalid_page(self.base.page_id()))?;
        self.update_usage();
        Ok(node)
    }
}

impl Deref for IndexPage {
    type Target = BasePage;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl DerefMut for IndexPage {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.base
    }
}
