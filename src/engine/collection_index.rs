use crate::Result;
use crate::engine::buffer_reader::BufferReader;
use crate::engine::buffer_writer::BufferWriter;
use crate::engine::page_address::PageAddress;
use crate::engine::{MAX_INDEX_FIELD_LENGTH, NO_PAGE};

/// One index descriptor slot of a collection page.
///
/// An unused slot has an empty field name.
#[derive(Debug, Clone)]
pub(crate) struct CollectionIndex {
    slot: u8,
    field: String,
    unique: bool,
    pub head: PageAddress,
    pub tail: PageAddress,
    pub free_index_page_id: u32,
    pub max_level: u8,
}

impl CollectionIndex {
    pub const MAX_SERIALIZED_SIZE: usize = 1
        + MAX_INDEX_FIELD_LENGTH
        + 1 // unique
        + PageAddress::SERIALIZED_SIZE * 2
        + 4 // free index page
        + 1; // max level

    pub fn empty(slot: u8) -> Self {
        Self::new(slot, String::new(), false)
    }

    pub fn new(slot: u8, field: String, unique: bool) -> Self {
        Self {
            slot,
            field,
            unique,
            head: PageAddress::EMPTY,
            tail: PageAddress::EMPTY,
            free_index_page_id: NO_PAGE,
            max_level: 1,
        }
    }

    pub fn load(slot: u8, reader: &mut BufferReader) -> Result<Self> {
        let field = reader.read_short_string()?;
        let unique = reader.read_bool()?;
        let head = reader.read_page_address()?;
        let tail = reader.read_page_address()?;
        let free_index_page_id = reader.read_u32()?;
        let max_level = reader.read_u8()?;

        Ok(Self {
            slot,
            field,
            unique,
            head,
            tail,
            free_index_page_id,
            max_level,
        })
    }

    pub fn update_buffer(&self, writer: &mut BufferWriter) -> Result<()> {
        writer.write_short_string(&self.field)?;
        writer.write_bool(self.unique)?;
        writer.write_page_address(self.head)?;
        writer.write_page_address(self.tail)?;
        writer.write_u32(self.free_index_page_id)?;
        writer.write_u8(self.max_level)
    }

    pub fn slot(&self) -> u8 {
        self.slot
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn unique(&self) -> bool {
        self.unique
    }

    pub fn is_empty(&self) -> bool {
        self.field.is_empty()
    }
}
