use crate::engine::*;

/// The raw bytes of one page
#[derive(Clone)]
pub(crate) struct PageBuffer {
    buffer: [u8; PAGE_SIZE],
}

impl PageBuffer {
    pub fn new() -> Box<Self> {
        Box::new(PageBuffer {
            buffer: [0; PAGE_SIZE],
        })
    }

    pub fn buffer(&self) -> &[u8; PAGE_SIZE] {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut [u8; PAGE_SIZE] {
        &mut self.buffer
    }

    pub fn content(&self) -> &[u8] {
        &self.buffer[PAGE_HEADER_SIZE..]
    }

    pub fn content_mut(&mut self) -> &mut [u8] {
        &mut self.buffer[PAGE_HEADER_SIZE..]
    }
}

// header fields are at fixed offsets, so out-of-range access is a programming error
impl PageBuffer {
    pub fn read_byte(&self, offset: usize) -> u8 {
        self.buffer[offset]
    }

    pub fn read_u16(&self, offset: usize) -> u16 {
        u16::from_le_bytes([self.buffer[offset], self.buffer[offset + 1]])
    }

    pub fn read_u32(&self, offset: usize) -> u32 {
        let mut bytes = [0; 4];
        bytes.copy_from_slice(&self.buffer[offset..][..4]);
        u32::from_le_bytes(bytes)
    }

    pub fn write_byte(&mut self, offset: usize, value: u8) {
        self.buffer[offset] = value;
    }

    pub fn write_u16(&mut self, offset: usize, value: u16) {
        self.buffer[offset..][..2].copy_from_slice(&value.to_le_bytes());
    }

    pub fn write_u32(&mut self, offset: usize, value: u32) {
        self.buffer[offset..][..4].copy_from_slice(&value.to_le_bytes());
    }
}
