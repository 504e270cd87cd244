use crate::Result;
use crate::engine::buffer_reader::BufferReader;
use crate::engine::buffer_writer::BufferWriter;
use crate::engine::page_address::PageAddress;
use crate::engine::{INDEX_PER_COLLECTION, NO_PAGE};

pub(crate) const DATA_BLOCK_FIXED_SIZE: usize = 2 // position index
    + 4 // extend page id
    + PageAddress::SERIALIZED_SIZE * INDEX_PER_COLLECTION // index refs
    + 2; // data length

/// One stored document in a data page.
///
/// When `extend_page_id` is set the whole document lives in the extend page chain
/// and `data` is empty.
#[derive(Debug, Clone)]
pub(crate) struct DataBlock {
    position: PageAddress,
    pub extend_page_id: u32,
    /// the index node of this document per index slot
    pub index_refs: [PageAddress; INDEX_PER_COLLECTION],
    pub data: Vec<u8>,
}

impl DataBlock {
    pub fn new(position: PageAddress, data: Vec<u8>) -> Self {
        Self {
            position,
            extend_page_id: NO_PAGE,
            index_refs: [PageAddress::EMPTY; INDEX_PER_COLLECTION],
            data,
        }
    }

    pub fn load(page_id: u32, reader: &mut BufferReader) -> Result<Self> {
        let index = reader.read_u16()?;
        let extend_page_id = reader.read_u32()?;
        let mut index_refs = [PageAddress::EMPTY; INDEX_PER_COLLECTION];
        for index_ref in &mut index_refs {
            *index_ref = reader.read_page_address()?;
        }
        let len = reader.read_u16()? as usize;
        let data = reader.read_bytes(len)?.to_vec();

        Ok(Self {
            position: PageAddress::new(page_id, index),
            extend_page_id,
            index_refs,
            data,
        })
    }

    pub fn update_buffer(&self, writer: &mut BufferWriter) -> Result<()> {
        writer.write_u16(self.position.index())?;
        writer.write_u32(self.extend_page_id)?;
        for index_ref in &self.index_refs {
            writer.write_page_address(*index_ref)?;
        }
        writer.write_u16(self.data.len() as u16)?;
        writer.write_bytes(&self.data)
    }

    pub fn position(&self) -> PageAddress {
        self.position
    }

    pub fn length(&self) -> usize {
        DATA_BLOCK_FIXED_SIZE + self.data.len()
    }

    pub fn has_extend(&self) -> bool {
        self.extend_page_id != NO_PAGE
    }
}
