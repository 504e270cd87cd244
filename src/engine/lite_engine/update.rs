use super::*;
use crate::bson::TotalOrd;
use crate::engine::index_node::get_key_length;
use std::cmp::Ordering;

impl TransactionLiteEngine<'_> {
    /// Replaces the documents with the same `_id`. Returns the count of updated documents.
    ///
    /// Documents without `_id` or with an unknown `_id` are skipped.
    pub fn update(&mut self, collection: &str, docs: Vec<Document>) -> Result<usize> {
        let Some(collection_page) = self.collections().get(collection, false)? else {
            return Ok(0);
        };

        let mut count = 0;
        for doc in docs {
            if self.update_document(collection_page, &doc)? {
                count += 1;
            }
            self.transaction.safe_point()?;
        }

        Ok(count)
    }

    /// Returns false if no document has the `_id`
    pub(super) fn update_document(&mut self, collection_page: u32, doc: &Document) -> Result<bool> {
        let Some(id) = doc.get("_id") else {
            return Ok(false);
        };
        if matches!(id, Value::Null | Value::MinValue | Value::MaxValue) {
            return Err(Error::invalid_id(id));
        }

        let Some(pk_node) = self.indexer(collection_page).find(0, id)? else {
            return Ok(false);
        };
        let block = pk_node.data_block();
        let old = self.read_document(collection_page, block)?;

        let indexes = self
            .pages()
            .collection_page(collection_page)?
            .active_indexes()
            .filter(|x| x.slot() != 0)
            .cloned()
            .collect::<Vec<_>>();

        let mut changes = Vec::new();
        for index in &indexes {
            let old_key = index_key(&old, index.field());
            let new_key = index_key(doc, index.field());
            if old_key == new_key {
                continue;
            }

            get_key_length(&new_key)?;
            if index.unique() && old_key.total_cmp(&new_key) != Ordering::Equal {
                if let Some(found) = self.indexer(collection_page).find(index.slot(), &new_key)? {
                    if found.data_block() != block {
                        return Err(Error::index_duplicate_key(index.field(), new_key));
                    }
                }
            }
            changes.push((index.slot(), new_key));
        }

        self.data(collection_page).update(block, doc.to_bytes()?)?;

        for (slot, key) in changes {
            let old_node = self.data(collection_page).get_block(block)?.index_refs[slot as usize];
            self.indexer(collection_page).delete_node(old_node)?;
            let node = self.indexer(collection_page).add_node(slot, key, block)?;
            self.data(collection_page).set_index_ref(block, slot, node)?;
        }

        debug_log!(COMMAND: "updated document {id:?}");
        Ok(true)
    }
}

transaction_wrapper!(Write pub fn update(&mut self, collection: &str, docs: Vec<Document>) -> Result<usize>);
