use crate::bson::{Binary, BsonType, DateTime, Guid, ObjectId, TotalOrd, Value};
use crate::engine::buffer_reader::BufferReader;
use crate::engine::buffer_writer::BufferWriter;
use crate::engine::page_address::PageAddress;
use crate::engine::MAX_INDEX_KEY_LENGTH;
use crate::{Error, Result};
use std::cmp::Ordering;

const INDEX_NODE_FIXED_SIZE: usize = 2 // position index
    + 1 // slot
    + 1 // levels
    + PageAddress::SERIALIZED_SIZE; // data block

/// A skip-list node stored in an index page
#[derive(Debug, Clone)]
pub(crate) struct IndexNode {
    position: PageAddress,
    slot: u8,
    key: Value,
    data_block: PageAddress,
    pub prev: Vec<PageAddress>,
    pub next: Vec<PageAddress>,
}

impl IndexNode {
    pub fn new(position: PageAddress, slot: u8, levels: u8, key: Value, data_block: PageAddress) -> Self {
        Self {
            position,
            slot,
            key,
            data_block,
            prev: vec![PageAddress::EMPTY; levels as usize],
            next: vec![PageAddress::EMPTY; levels as usize],
        }
    }

    pub fn get_node_length(levels: u8, key: &Value) -> Result<usize> {
        Ok(INDEX_NODE_FIXED_SIZE
            + get_key_length(key)?
            + levels as usize * PageAddress::SERIALIZED_SIZE * 2)
    }

    pub fn length(&self) -> usize {
        // the key has been validated on creation
        INDEX_NODE_FIXED_SIZE
            + get_key_length(&self.key).unwrap_or(0)
            + self.levels() as usize * PageAddress::SERIALIZED_SIZE * 2
    }

    pub fn load(page_id: u32, reader: &mut BufferReader) -> Result<Self> {
        let index = reader.read_u16()?;
        let slot = reader.read_u8()?;
        let levels = reader.read_u8()?;
        let data_block = reader.read_page_address()?;
        let key = read_key(page_id, reader)?;

        let mut prev = Vec::with_capacity(levels as usize);
        let mut next = Vec::with_capacity(levels as usize);
        for _ in 0..levels {
            prev.push(reader.read_page_address()?);
            next.push(reader.read_page_address()?);
        }

        Ok(Self {
            position: PageAddress::new(page_id, index),
            slot,
            key,
            data_block,
            prev,
            next,
        })
    }

    pub fn update_buffer(&self, writer: &mut BufferWriter) -> Result<()> {
        writer.write_u16(self.position.index())?;
        writer.write_u8(self.slot)?;
        writer.write_u8(self.levels())?;
        writer.write_page_address(self.data_block)?;
        write_key(writer, &self.key)?;
        for (prev, next) in self.prev.iter().zip(&self.next) {
            writer.write_page_address(*prev)?;
            writer.write_page_address(*next)?;
        }
        Ok(())
    }

    pub fn position(&self) -> PageAddress {
        self.position
    }

    pub fn slot(&self) -> u8 {
        self.slot
    }

    pub fn levels(&self) -> u8 {
        self.prev.len() as u8
    }

    pub fn key(&self) -> &Value {
        &self.key
    }

    #[cfg(test)]
    pub fn into_key(self) -> Value {
        self.key
    }

    pub fn data_block(&self) -> PageAddress {
        self.data_block
    }

    /// The order of nodes in the skip list.
    ///
    /// Equal keys (in non-unique indexes) are ordered by the address of the data block.
    pub fn cmp_position(&self, key: &Value, data_block: PageAddress) -> Ordering {
        self.key
            .total_cmp(key)
            .then_with(|| self.data_block.cmp(&data_block))
    }
}

/// Returns the serialized length of the key, or error if the value cannot be a key
pub(crate) fn get_key_length(key: &Value) -> Result<usize> {
    let len = 1 + match key {
        Value::MinValue | Value::Null | Value::MaxValue => 0,
        Value::Int32(_) => 4,
        Value::Int64(_) => 8,
        Value::Double(_) => 8,
        Value::Boolean(_) => 1,
        Value::DateTime(_) => 8,
        Value::ObjectId(_) => 12,
        Value::Guid(_) => 16,
        Value::String(s) => 2 + s.len(),
        Value::Binary(b) => 2 + b.bytes().len(),
        Value::Document(_) | Value::Array(_) => return Err(Error::invalid_index_key(key)),
    };

    if len > MAX_INDEX_KEY_LENGTH {
        return Err(Error::index_key_too_long());
    }

    Ok(len)
}

fn write_key(writer: &mut BufferWriter, key: &Value) -> Result<()> {
    writer.write_u8(key.ty() as u8)?;

    match key {
        Value::MinValue | Value::Null | Value::MaxValue => Ok(()),
        Value::Int32(v) => writer.write_i32(*v),
        Value::Int64(v) => writer.write_i64(*v),
        Value::Double(v) => writer.write_f64(*v),
        Value::Boolean(v) => writer.write_bool(*v),
        Value::DateTime(v) => writer.write_i64(v.as_unix_milliseconds()),
        Value::ObjectId(v) => writer.write_bytes(v.as_bytes()),
        Value::Guid(v) => writer.write_bytes(v.as_bytes()),
        Value::String(s) => {
            writer.write_u16(s.len() as u16)?;
            writer.write_bytes(s.as_bytes())
        }
        Value::Binary(b) => {
            writer.write_u16(b.bytes().len() as u16)?;
            writer.write_bytes(b.bytes())
        }
        Value::Document(_) | Value::Array(_) => Err(Error::invalid_index_key(key)),
    }
}

fn read_key(page_id: u32, reader: &mut BufferReader) -> Result<Value> {
    let tag = reader.read_u8()?;
    let ty = BsonType::from_u8(tag).ok_or_else(|| Error::invalid_page(page_id))?;

    Ok(match ty {
        BsonType::MinValue => Value::MinValue,
        BsonType::Null => Value::Null,
        BsonType::MaxValue => Value::MaxValue,
        BsonType::Int32 => Value::Int32(reader.read_i32()?),
        BsonType::Int64 => Value::Int64(reader.read_i64()?),
        BsonType::Double => Value::Double(reader.read_f64()?),
        BsonType::Boolean => Value::Boolean(reader.read_bool()?),
        BsonType::DateTime => Value::DateTime(DateTime::from_unix_milliseconds(reader.read_i64()?)),
        BsonType::ObjectId => Value::ObjectId(ObjectId::from_bytes(reader.read_array()?)),
        BsonType::Guid => Value::Guid(Guid::from_bytes(reader.read_array()?)),
        BsonType::String => {
            let len = reader.read_u16()? as usize;
            let bytes = reader.read_bytes(len)?;
            Value::String(
                String::from_utf8(bytes.to_vec()).map_err(|_| Error::invalid_page(page_id))?,
            )
        }
        BsonType::Binary => {
            let len = reader.read_u16()? as usize;
            Value::Binary(Binary::new(reader.read_bytes(len)?.to_vec()))
        }
        BsonType::Document | BsonType::Array => return Err(Error::invalid_page(page_id)),
    })
}
