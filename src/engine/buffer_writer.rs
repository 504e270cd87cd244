use crate::engine::page_address::PageAddress;
use crate::{Error, Result};

/// Sequential writer over the content of a page.
pub(crate) struct BufferWriter<'a> {
    page_id: u32,
    slice: &'a mut [u8],
    position: usize,
}

impl<'a> BufferWriter<'a> {
    pub fn new(page_id: u32, slice: &'a mut [u8]) -> BufferWriter<'a> {
        BufferWriter {
            page_id,
            slice,
            position: 0,
        }
    }

    pub fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        let end = self.position + data.len();
        if end > self.slice.len() {
            return Err(Error::invalid_page(self.page_id));
        }
        self.slice[self.position..end].copy_from_slice(data);
        self.position = end;
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.write_bytes(&[value])
    }

    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.write_u8(value as u8)
    }

    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_i64(&mut self, value: i64) -> Result<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_f64(&mut self, value: f64) -> Result<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Writes the string prefixed with one byte length
    pub fn write_short_string(&mut self, value: &str) -> Result<()> {
        debug_assert!(value.len() <= u8::MAX as usize, "string too long: {value}");
        self.write_u8(value.len() as u8)?;
        self.write_bytes(value.as_bytes())
    }

    pub fn write_page_address(&mut self, address: PageAddress) -> Result<()> {
        self.write_u32(address.page_id())?;
        self.write_u16(address.index())
    }

    /// Zeroes the remaining bytes
    pub fn fill_remaining(&mut self) {
        self.slice[self.position..].fill(0);
        self.position = self.slice.len();
    }
}
