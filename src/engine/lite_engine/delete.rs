use super::*;
use crate::engine::query::Query;

impl TransactionLiteEngine<'_> {
    /// Deletes the documents matching the query. Returns the deleted count.
    pub fn delete(&mut self, collection: &str, query: Query) -> Result<usize> {
        let Some(collection_page) = self.collections().get(collection, false)? else {
            return Ok(0);
        };

        // matches are collected before any page is modified
        let blocks = self.resolve_query(collection_page, &query)?;
        let count = blocks.len();

        for block in blocks {
            self.delete_document(collection_page, block)?;
            self.transaction.safe_point()?;
        }

        debug_log!(COMMAND: "deleted {count} documents from {collection}");
        Ok(count)
    }

    pub fn delete_by_id(&mut self, collection: &str, id: Value) -> Result<bool> {
        let Some(collection_page) = self.collections().get(collection, false)? else {
            return Ok(false);
        };

        match self.indexer(collection_page).find(0, &id)? {
            Some(node) => {
                self.delete_document(collection_page, node.data_block())?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_document(&mut self, collection_page: u32, block: PageAddress) -> Result<()> {
        let slots = self
            .pages()
            .collection_page(collection_page)?
            .active_indexes()
            .map(|x| x.slot())
            .collect::<Vec<_>>();

        let index_refs = self.data(collection_page).get_block(block)?.index_refs;
        for slot in slots {
            let node = index_refs[slot as usize];
            if !node.is_empty() {
                self.indexer(collection_page).delete_node(node)?;
            }
        }

        self.data(collection_page).delete(block)?;
        self.pages().collection_page_mut(collection_page)?.document_count -= 1;

        Ok(())
    }
}

transaction_wrapper!(Write pub fn delete(&mut self, collection: &str, query: Query) -> Result<usize>);
transaction_wrapper!(Write pub fn delete_by_id(&mut self, collection: &str, id: Value) -> Result<bool>);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::disk::MemoryDisk;
    use crate::LiteSettings;

    fn node_counts(engine: &mut TransactionLiteEngine<'_>, collection_page: u32) -> Result<Vec<usize>> {
        let slots = engine
            .pages()
            .collection_page(collection_page)?
            .active_indexes()
            .map(|x| x.slot())
            .collect::<Vec<_>>();
        slots
            .into_iter()
            .map(|slot| engine.indexer(collection_page).count_nodes(slot))
            .collect()
    }

    #[test]
    fn delete_removes_one_node_per_index() {
        let engine = LiteEngine::new(LiteSettings::new(MemoryDisk::new()).with_level_seed(3)).unwrap();
        let docs = (1..=20)
            .map(|i| document! { "_id" => i, "name" => format!("p{i:02}"), "age" => i % 5 })
            .collect();
        engine.insert("people", docs, BsonAutoId::Int32).unwrap();
        engine.ensure_index("people", "name", true).unwrap();
        engine.ensure_index("people", "age", false).unwrap();

        engine
            .with_transaction(LockMode::Write, |tx| {
                let page = tx.collections().get("people", false)?.unwrap();
                assert_eq!(node_counts(tx, page)?, vec![20, 20, 20]);

                assert!(tx.delete_by_id("people", Value::Int32(7))?);
                assert_eq!(node_counts(tx, page)?, vec![19, 19, 19]);

                // 5, 10, 15 and 20
                assert_eq!(tx.delete("people", Query::eq("age", 0))?, 4);
                assert_eq!(node_counts(tx, page)?, vec![15, 15, 15]);
                assert_eq!(tx.pages().collection_page(page)?.document_count, 15);
                Ok(())
            })
            .unwrap();
    }
}
