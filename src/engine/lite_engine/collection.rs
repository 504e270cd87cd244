use super::*;

impl TransactionLiteEngine<'_> {
    pub fn collection_names(&mut self) -> Result<Vec<String>> {
        Ok(self
            .pages()
            .header()?
            .collection_names()
            .map(str::to_string)
            .collect())
    }

    pub fn drop_collection(&mut self, name: &str) -> Result<bool> {
        self.collections().drop(name)
    }

    /// Renames the collection. Fails if `old_name` does not exist or `new_name` exists.
    pub fn rename_collection(&mut self, old_name: &str, new_name: &str) -> Result<bool> {
        self.collections().rename(old_name, new_name)?;
        Ok(true)
    }
}

transaction_wrapper!(Read pub fn collection_names(&mut self) -> Result<Vec<String>>);
transaction_wrapper!(Write pub fn drop_collection(&mut self, name: &str) -> Result<bool>);
transaction_wrapper!(Write pub fn rename_collection(&mut self, old_name: &str, new_name: &str) -> Result<bool>);
