use super::*;
use crate::engine::index_node::get_key_length;

/// The type of the `_id` created for documents without one
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BsonAutoId {
    Int32 = 2,
    Int64 = 3,
    ObjectId = 10,
    Guid = 11,
}

impl TransactionLiteEngine<'_> {
    /// Inserts the documents, creating the collection if needed. Returns the inserted count.
    pub fn insert(
        &mut self,
        collection: &str,
        docs: Vec<Document>,
        auto_id: BsonAutoId,
    ) -> Result<usize> {
        let collection_page = self
            .collections()
            .get(collection, true)?
            .ok_or_else(|| Error::collection_not_found(collection))?;

        let mut count = 0;
        for doc in docs {
            self.insert_document(collection_page, doc, auto_id)?;
            self.transaction.safe_point()?;
            count += 1;
        }

        Ok(count)
    }

    pub(super) fn insert_document(
        &mut self,
        collection_page: u32,
        mut doc: Document,
        auto_id: BsonAutoId,
    ) -> Result<PageAddress> {
        let id = match doc.get("_id") {
            Some(id) => id.clone(),
            None => {
                let id = self.next_id(collection_page, auto_id)?;
                // keep `_id` the first field
                let mut with_id = Document::new();
                with_id.insert("_id", id.clone());
                for (key, value) in doc.iter() {
                    with_id.insert(key, value.clone());
                }
                doc = with_id;
                id
            }
        };

        if matches!(id, Value::Null | Value::MinValue | Value::MaxValue) {
            return Err(Error::invalid_id(&id));
        }

        let indexes = self
            .pages()
            .collection_page(collection_page)?
            .active_indexes()
            .cloned()
            .collect::<Vec<_>>();

        // checks before any modification so a failed insert leaves no partial document
        let keys = indexes
            .iter()
            .map(|index| (index.slot(), index_key(&doc, index.field())))
            .collect::<Vec<_>>();
        for (index, (slot, key)) in indexes.iter().zip(&keys) {
            get_key_length(key)?;
            if index.unique() && self.indexer(collection_page).find(*slot, key)?.is_some() {
                return Err(Error::index_duplicate_key(index.field(), key.clone()));
            }
        }

        let bytes = doc.to_bytes()?;
        let block = self.data(collection_page).insert(bytes)?;
        if let Some(id) = id.as_i64() {
            self.set_sequence(collection_page, id)?;
        }

        for (slot, key) in keys {
            let node = self.indexer(collection_page).add_node(slot, key, block)?;
            self.data(collection_page).set_index_ref(block, slot, node)?;
        }

        self.pages().collection_page_mut(collection_page)?.document_count += 1;

        debug_log!(COMMAND: "inserted document {id:?} at {block:?}");
        Ok(block)
    }
}

transaction_wrapper!(Write pub fn insert(
    &mut self,
    collection: &str,
    docs: Vec<Document>,
    auto_id: BsonAutoId,
) -> Result<usize>);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::disk::MemoryDisk;
    use crate::engine::query::Query;
    use crate::{ErrorKind, LiteSettings};

    #[test]
    fn failed_insert_keeps_sequence() {
        let engine = LiteEngine::new(LiteSettings::new(MemoryDisk::new())).unwrap();
        engine
            .insert("items", vec![document! { "_id" => 5, "code" => "a" }], BsonAutoId::Int32)
            .unwrap();
        engine.ensure_index("items", "code", true).unwrap();

        engine
            .with_transaction(LockMode::Write, |tx| {
                let page = tx.collections().get("items", false)?.unwrap();

                let duplicate = document! { "_id" => 50, "code" => "a" };
                let err = tx.insert_document(page, duplicate, BsonAutoId::Int32).unwrap_err();
                assert_eq!(err.kind(), ErrorKind::DuplicateKey);
                assert_eq!(tx.pages().collection_page(page)?.sequence, 5);
                assert_eq!(tx.pages().collection_page(page)?.document_count, 1);

                tx.insert_document(page, document! { "code" => "b" }, BsonAutoId::Int32)?;
                Ok(())
            })
            .unwrap();

        let found = engine.find("items", Query::eq("code", "b"), 0, usize::MAX).unwrap();
        assert_eq!(found[0].get("_id"), Some(&Value::Int32(6)));
    }
}
