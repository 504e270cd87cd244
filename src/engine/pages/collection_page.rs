use crate::engine::buffer_reader::BufferReader;
use crate::engine::buffer_writer::BufferWriter;
use crate::engine::collection_index::CollectionIndex;
use crate::engine::pages::{BasePage, PageType};
use crate::engine::{INDEX_PER_COLLECTION, NO_PAGE, PageBuffer};
use crate::Result;
use std::ops::{Deref, DerefMut};

pub(crate) struct CollectionPage {
    base: BasePage,
    pub name: String,
    pub document_count: i64,
    /// the head of the data page list ordered by free bytes
    pub free_data_page_id: u32,
    pub sequence: i64,
    indexes: Vec<CollectionIndex>,
}

impl CollectionPage {
    pub fn new(page_id: u32, name: String) -> Self {
        let mut page = CollectionPage {
            base: BasePage::new(page_id, PageType::Collection),
            name,
            document_count: 0,
            free_data_page_id: NO_PAGE,
            sequence: 0,
            indexes: (0..INDEX_PER_COLLECTION as u8)
                .map(CollectionIndex::empty)
                .collect(),
        };
        page.update_usage();
        page
    }

    pub fn load(base: BasePage, buffer: &PageBuffer) -> Result<Self> {
        let page_id = base.page_id();
        let mut reader = BufferReader::new(page_id, buffer.content());

        let name = reader.read_short_string()?;
        let document_count = reader.read_i64()?;
        let free_data_page_id = reader.read_u32()?;
        let sequence = reader.read_i64()?;

        let mut indexes = Vec::with_capacity(INDEX_PER_COLLECTION);
        for slot in 0..INDEX_PER_COLLECTION as u8 {
            indexes.push(CollectionIndex::load(slot, &mut reader)?);
        }

        Ok(CollectionPage {
            base,
            name,
            document_count,
            free_data_page_id,
            sequence,
            indexes,
        })
    }

    pub fn update_buffer(&self, buffer: &mut PageBuffer) -> Result<()> {
        self.base.update_buffer(buffer);
        let mut writer = BufferWriter::new(self.page_id(), buffer.content_mut());

        writer.write_short_string(&self.name)?;
        writer.write_i64(self.document_count)?;
        writer.write_u32(self.free_data_page_id)?;
        writer.write_i64(self.sequence)?;

        for index in &self.indexes {
            index.update_buffer(&mut writer)?;
        }
        writer.fill_remaining();

        Ok(())
    }

    pub fn update_usage(&mut self) {
        let used = 1 + self.name.len() + 8 + 4 + 8
            + INDEX_PER_COLLECTION * CollectionIndex::MAX_SERIALIZED_SIZE;
        let count = self.indexes.iter().filter(|x| !x.is_empty()).count();
        self.base.set_usage(count, used);
    }

    /// The primary key index in slot 0
    #[cfg(test)]
    pub fn pk_index(&self) -> &CollectionIndex {
        &self.indexes[0]
    }

    pub fn get_index(&self, field: &str) -> Option<&CollectionIndex> {
        self.indexes
            .iter()
            .find(|x| !x.is_empty() && x.field().eq_ignore_ascii_case(field))
    }

    pub fn index(&self, slot: u8) -> &CollectionIndex {
        &self.indexes[slot as usize]
    }

    pub fn index_mut(&mut self, slot: u8) -> &mut CollectionIndex {
        &mut self.indexes[slot as usize]
    }

    pub fn active_indexes(&self) -> impl Iterator<Item = &CollectionIndex> {
        self.indexes.iter().filter(|x| !x.is_empty())
    }

    /// Returns the free slot for a new index
    pub fn free_index_slot(&self) -> Option<u8> {
        self.indexes
            .iter()
            .position(|x| x.is_empty())
            .map(|x| x as u8)
    }

    pub fn set_index(&mut self, index: CollectionIndex) {
        let slot = index.slot() as usize;
        self.indexes[slot] = index;
        self.update_usage();
    }

    pub fn clear_index(&mut self, slot: u8) {
        self.indexes[slot as usize] = CollectionIndex::empty(slot);
        self.update_usage();
    }
}

impl Deref for CollectionPage {
    type Target = BasePage;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl DerefMut for CollectionPage {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.base
    }
}
