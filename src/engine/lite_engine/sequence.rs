use super::*;
use crate::bson::{Guid, ObjectId};

impl TransactionLiteEngine<'_> {
    /// Creates the `_id` for a document without one
    pub(super) fn next_id(&mut self, collection_page: u32, auto_id: BsonAutoId) -> Result<Value> {
        let next = match auto_id {
            BsonAutoId::ObjectId => return Ok(Value::ObjectId(ObjectId::new())),
            BsonAutoId::Guid => return Ok(Value::Guid(Guid::new())),
            BsonAutoId::Int32 | BsonAutoId::Int64 => {
                let page = self.pages().collection_page_mut(collection_page)?;
                page.sequence = page.sequence.wrapping_add(1);
                page.sequence
            }
        };

        match auto_id {
            BsonAutoId::Int32 => Ok(Value::Int32((next & 0xFFFFFFFF) as u32 as i32)),
            _ => Ok(Value::Int64(next)),
        }
    }

    /// Raises the sequence of the collection to the explicit numeric `_id`
    pub(super) fn set_sequence(&mut self, collection_page: u32, id: i64) -> Result<()> {
        if self.pages().collection_page(collection_page)?.sequence < id {
            self.pages().collection_page_mut(collection_page)?.sequence = id;
        }
        Ok(())
    }
}
