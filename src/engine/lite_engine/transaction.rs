use super::*;

impl LiteEngine {
    /// Runs `f` in a transaction, committing on success and rolling back on error
    pub(crate) fn with_transaction<R>(
        &self,
        mode: LockMode,
        f: impl FnOnce(&mut TransactionLiteEngine<'_>) -> Result<R>,
    ) -> Result<R> {
        let transaction =
            TransactionService::new(&self.locker, &self.disk, mode, self.checkpoint_pages)?;

        let mut engine = TransactionLiteEngine {
            levels: &self.levels,
            transaction,
        };

        match f(&mut engine) {
            Ok(result) => {
                engine.transaction.commit()?;
                Ok(result)
            }
            Err(err) => {
                debug_log!(TRANSACTION: "rollback by error: {err}");
                engine.transaction.rollback();
                Err(err)
            }
        }
    }
}
