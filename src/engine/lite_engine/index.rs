use super::*;
use crate::engine::MAX_INDEX_FIELD_LENGTH;
use crate::utils::{Order, is_word};
use std::ops::Bound;

/// Description of an index of a collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexInfo {
    pub slot: u8,
    pub field: String,
    pub unique: bool,
    pub max_level: u8,
}

fn check_index_field(field: &str) -> Result<()> {
    let valid = field.len() <= MAX_INDEX_FIELD_LENGTH
        && !field.starts_with('$')
        && field.split('.').all(is_word);
    if !valid {
        return Err(Error::invalid_index_field(field));
    }
    Ok(())
}

impl TransactionLiteEngine<'_> {
    /// Creates the index on the (dotted) field and indexes every document.
    ///
    /// Returns false if the index already exists.
    pub fn ensure_index(&mut self, collection: &str, field: &str, unique: bool) -> Result<bool> {
        check_index_field(field)?;
        if field.eq_ignore_ascii_case("_id") {
            return Ok(false);
        }

        let collection_page = self
            .collections()
            .get(collection, true)?
            .ok_or_else(|| Error::collection_not_found(collection))?;

        let page = self.pages().collection_page(collection_page)?;
        if let Some(index) = page.get_index(field) {
            return if index.unique() == unique {
                Ok(false)
            } else {
                Err(Error::index_already_exists(field))
            };
        }
        let slot = page
            .free_index_slot()
            .ok_or_else(|| Error::index_limit_exceeded(collection))?;

        debug_log!(COMMAND: "ensure index {field} (unique: {unique}) on {collection}");
        self.indexer(collection_page).create_index(slot, field, unique)?;

        let mut cursor = self.indexer(collection_page).range(
            0,
            Bound::Unbounded,
            Bound::Unbounded,
            Order::Ascending,
        )?;
        let mut blocks = Vec::new();
        while let Some(node) = cursor.next(self.pages())? {
            blocks.push(node.data_block());
        }

        for block in blocks {
            let doc = self.read_document(collection_page, block)?;
            let key = index_key(&doc, field);
            let node = self.indexer(collection_page).add_node(slot, key, block)?;
            self.data(collection_page).set_index_ref(block, slot, node)?;
        }

        Ok(true)
    }

    /// Removes the index on the field. Returns false if there is no such index.
    pub fn drop_index(&mut self, collection: &str, field: &str) -> Result<bool> {
        if field.eq_ignore_ascii_case("_id") {
            return Err(Error::invalid_index_field(field));
        }

        let collection_page = self
            .collections()
            .get(collection, false)?
            .ok_or_else(|| Error::collection_not_found(collection))?;

        let Some(slot) = self
            .pages()
            .collection_page(collection_page)?
            .get_index(field)
            .map(|x| x.slot())
        else {
            return Ok(false);
        };

        let blocks = self.indexer(collection_page).drop_index(slot)?;
        for block in blocks {
            self.data(collection_page)
                .set_index_ref(block, slot, PageAddress::EMPTY)?;
        }

        debug_log!(COMMAND: "dropped index {field} of {collection}");
        Ok(true)
    }

    pub fn indexes(&mut self, collection: &str) -> Result<Vec<IndexInfo>> {
        let Some(collection_page) = self.collections().get(collection, false)? else {
            return Ok(Vec::new());
        };

        Ok(self
            .pages()
            .collection_page(collection_page)?
            .active_indexes()
            .map(|x| IndexInfo {
                slot: x.slot(),
                field: x.field().to_string(),
                unique: x.unique(),
                max_level: x.max_level,
            })
            .collect())
    }
}

transaction_wrapper!(Write pub fn ensure_index(&mut self, collection: &str, field: &str, unique: bool) -> Result<bool>);
transaction_wrapper!(Write pub fn drop_index(&mut self, collection: &str, field: &str) -> Result<bool>);
transaction_wrapper!(Read pub fn indexes(&mut self, collection: &str) -> Result<Vec<IndexInfo>>);
