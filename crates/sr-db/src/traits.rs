//! Database gateway traits

use crate::error::DbResult;
use async_trait::async_trait;
use futures::future::BoxFuture;

/// Work executed inside a transaction by [`Database::run_in_transaction`].
///
/// The body receives the open transaction and returns a boxed future so it
/// can borrow the transaction for the duration of the work.
pub type TransactionBody<'b> =
    Box<dyn for<'t> FnOnce(&'t mut dyn Transaction) -> BoxFuture<'t, DbResult<()>> + Send + 'b>;

/// Box a closure as a [`TransactionBody`].
///
/// Passing the closure through this function lets the compiler infer its
/// higher-ranked signature:
///
/// ```ignore
/// db.run_in_transaction(transaction_body(|tx| {
///     Box::pin(async move { tx.execute("INSERT INTO t VALUES (1)").await })
/// }))
/// ```
pub fn transaction_body<'b, F>(body: F) -> TransactionBody<'b>
where
    F: for<'t> FnOnce(&'t mut dyn Transaction) -> BoxFuture<'t, DbResult<()>> + Send + 'b,
{
    Box::new(body)
}

/// An open database transaction.
///
/// Dropping a transaction without calling [`commit`](Transaction::commit)
/// rolls it back.
#[async_trait]
pub trait Transaction: Send {
    /// Execute SQL inside the transaction
    async fn execute(&mut self, sql: &str) -> DbResult<()>;

    /// Commit the transaction
    async fn commit(self: Box<Self>) -> DbResult<()>;

    /// Roll the transaction back
    async fn rollback(self: Box<Self>) -> DbResult<()>;
}

/// Gateway to the database server.
///
/// The script runner only talks to the server through this trait, which
/// keeps it testable against in-memory doubles. Implementations must be
/// Send + Sync for async operation.
#[async_trait]
pub trait Database: Send + Sync {
    /// Execute free-form SQL (possibly several statements) without returning rows
    async fn execute(&self, sql: &str) -> DbResult<()>;

    /// Begin a transaction with the server's default isolation level
    async fn begin(&self) -> DbResult<Box<dyn Transaction>>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;

    /// Run `body` inside a transaction.
    ///
    /// Rolls back and returns the body's error if it fails, commits otherwise.
    async fn run_in_transaction(&self, body: TransactionBody<'_>) -> DbResult<()> {
        let mut tx = self.begin().await?;
        let outcome = body(tx.as_mut()).await;
        match outcome {
            Ok(()) => tx.commit().await,
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    log::error!("Rollback failed after transaction error: {rollback_err}");
                }
                Err(err)
            }
        }
    }
}
