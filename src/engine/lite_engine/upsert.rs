use super::*;

impl TransactionLiteEngine<'_> {
    /// Updates the documents with a known `_id` and inserts the others.
    ///
    /// Returns the count of inserted documents.
    pub fn upsert(
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
            if !self.update_document(collection_page, &doc)? {
                self.insert_document(collection_page, doc, auto_id)?;
                count += 1;
            }
            self.transaction.safe_point()?;
        }

        Ok(count)
    }
}

transaction_wrapper!(Write pub fn upsert(
    &mut self,
    collection: &str,
    docs: Vec<Document>,
    auto_id: BsonAutoId,
) -> Result<usize>);
