use crate::engine::page_address::PageAddress;
use crate::{Error, Result};

/// Sequential reader over the content of a page.
///
/// Reading past the end fails with [`Error::invalid_page`] of the page being read.
pub(crate) struct BufferReader<'a> {
    page_id: u32,
    slice: &'a [u8],
    position: usize,
}

impl<'a> BufferReader<'a> {
    pub fn new(page_id: u32, slice: &'a [u8]) -> BufferReader<'a> {
        BufferReader {
            page_id,
            slice,
            position: 0,
        }
    }

    #[cfg(test)]
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.position + len;
        if end > self.slice.len() {
            return Err(Error::invalid_page(self.page_id));
        }
        let bytes = &self.slice[self.position..end];
        self.position = end;
        Ok(bytes)
    }

    fn read_fixed<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut bytes = [0; N];
        bytes.copy_from_slice(self.read_bytes(N)?);
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_fixed::<1>()?[0])
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_fixed()?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_fixed()?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_fixed()?))
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(i64::from_le_bytes(self.read_fixed()?))
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_le_bytes(self.read_fixed()?))
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.read_fixed()
    }

    /// Reads the string prefixed with one byte length
    pub fn read_short_string(&mut self) -> Result<String> {
        let len = self.read_u8()? as usize;
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| Error::invalid_page(self.page_id))
    }

    pub fn read_page_address(&mut self) -> Result<PageAddress> {
        let page_id = self.read_u32()?;
        let index = self.read_u16()?;
        Ok(PageAddress::new(page_id, index))
    }
}
