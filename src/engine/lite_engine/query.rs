use super::*;
use crate::engine::query::Query;
use crate::utils::Order;
use itertools::Itertools;
use std::ops::Bound;

impl TransactionLiteEngine<'_> {
    /// Returns the data blocks of the documents matching the query
    pub(super) fn resolve_query(
        &mut self,
        collection_page: u32,
        query: &Query,
    ) -> Result<Vec<PageAddress>> {
        match query {
            Query::All(order) => self.scan_index(collection_page, 0, *order),
            Query::And(left, right) => {
                let mut result = Vec::new();
                for block in self.resolve_query(collection_page, left)? {
                    let doc = self.read_document(collection_page, block)?;
                    if right.matches(&doc) {
                        result.push(block);
                    }
                }
                Ok(result)
            }
            Query::Or(left, right) => {
                let left = self.resolve_query(collection_page, left)?;
                let right = self.resolve_query(collection_page, right)?;
                Ok(left.into_iter().chain(right).unique().collect())
            }
            leaf => {
                let field = leaf.field().unwrap_or("_id");
                let slot = self
                    .pages()
                    .collection_page(collection_page)?
                    .get_index(field)
                    .map(|x| x.slot());

                match slot {
                    Some(slot) => self.scan_index_query(collection_page, slot, leaf),
                    None => {
                        debug_log!(COMMAND: "full scan for {leaf:?}");
                        let mut result = Vec::new();
                        for block in self.scan_index(collection_page, 0, Order::Ascending)? {
                            let doc = self.read_document(collection_page, block)?;
                            if leaf.matches(&doc) {
                                result.push(block);
                            }
                        }
                        Ok(result)
                    }
                }
            }
        }
    }

    /// Every data block of the index in order
    fn scan_index(&mut self, collection_page: u32, slot: u8, order: Order) -> Result<Vec<PageAddress>> {
        let mut cursor = self.indexer(collection_page).range(
            slot,
            Bound::Unbounded,
            Bound::Unbounded,
            order,
        )?;

        let mut result = Vec::new();
        while let Some(node) = cursor.next(self.pages())? {
            result.push(node.data_block());
        }
        Ok(result)
    }

    /// The data blocks of the index nodes matching a leaf query, in key order
    fn scan_index_query(&mut self, collection_page: u32, slot: u8, query: &Query) -> Result<Vec<PageAddress>> {
        let mut result = Vec::new();

        for (lower, upper) in query.index_ranges() {
            let mut cursor = self.indexer(collection_page).range(
                slot,
                lower.as_ref(),
                upper.as_ref(),
                Order::Ascending,
            )?;

            while let Some(node) = cursor.next(self.pages())? {
                if query.is_past_range(node.key()) {
                    break;
                }
                if query.matches_value(node.key()) {
                    result.push(node.data_block());
                }
            }
        }

        Ok(result)
    }

    fn read_documents(
        &mut self,
        collection_page: u32,
        blocks: impl IntoIterator<Item = PageAddress>,
    ) -> Result<Vec<Document>> {
        blocks
            .into_iter()
            .map(|block| self.read_document(collection_page, block))
            .collect()
    }

    pub fn find(
        &mut self,
        collection: &str,
        query: Query,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<Document>> {
        let Some(collection_page) = self.collections().get(collection, false)? else {
            return Ok(Vec::new());
        };

        let blocks = self.resolve_query(collection_page, &query)?;
        self.read_documents(collection_page, blocks.into_iter().skip(skip).take(limit))
    }

    pub fn find_by_id(&mut self, collection: &str, id: Value) -> Result<Option<Document>> {
        let Some(collection_page) = self.collections().get(collection, false)? else {
            return Ok(None);
        };

        match self.indexer(collection_page).find(0, &id)? {
            Some(node) => Ok(Some(self.read_document(collection_page, node.data_block())?)),
            None => Ok(None),
        }
    }

    pub fn count(&mut self, collection: &str, query: Query) -> Result<usize> {
        let Some(collection_page) = self.collections().get(collection, false)? else {
            return Ok(0);
        };

        if let Query::All(_) = query {
            let count = self.pages().collection_page(collection_page)?.document_count;
            return Ok(count as usize);
        }

        Ok(self.resolve_query(collection_page, &query)?.len())
    }

    pub fn exists(&mut self, collection: &str, query: Query) -> Result<bool> {
        Ok(self.count(collection, query)? != 0)
    }

    /// The smallest key of the index on the field
    pub fn min(&mut self, collection: &str, field: &str) -> Result<Option<Value>> {
        self.index_bound(collection, field, Order::Ascending)
    }

    /// The largest key of the index on the field
    pub fn max(&mut self, collection: &str, field: &str) -> Result<Option<Value>> {
        self.index_bound(collection, field, Order::Descending)
    }

    fn index_bound(&mut self, collection: &str, field: &str, order: Order) -> Result<Option<Value>> {
        let Some(collection_page) = self.collections().get(collection, false)? else {
            return Ok(None);
        };

        let index = self
            .pages()
            .collection_page(collection_page)?
            .get_index(field)
            .cloned()
            .ok_or_else(|| Error::index_not_found(field))?;

        let mut indexer = self.indexer(collection_page);
        let (edge, sentinel) = match order {
            Order::Ascending => (indexer.node(index.head)?.next[0], index.tail),
            Order::Descending => (indexer.node(index.tail)?.prev[0], index.head),
        };

        if edge == sentinel {
            return Ok(None);
        }

        Ok(Some(indexer.node(edge)?.key().clone()))
    }
}

transaction_wrapper!(Read pub fn find(
    &mut self,
    collection: &str,
    query: Query,
    skip: usize,
    limit: usize,
) -> Result<Vec<Document>>);
transaction_wrapper!(Read pub fn find_by_id(&mut self, collection: &str, id: Value) -> Result<Option<Document>>);
transaction_wrapper!(Read pub fn count(&mut self, collection: &str, query: Query) -> Result<usize>);
transaction_wrapper!(Read pub fn exists(&mut self, collection: &str, query: Query) -> Result<bool>);
transaction_wrapper!(Read pub fn min(&mut self, collection: &str, field: &str) -> Result<Option<Value>>);
transaction_wrapper!(Read pub fn max(&mut self, collection: &str, field: &str) -> Result<Option<Value>>);
