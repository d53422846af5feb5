//! Storage access for the `bolso` catalog table
//!
//! Every operation opens its own connection, runs a single statement and
//! releases the connection before returning, on success and failure alike.
//! Nothing is pooled or shared between calls.

pub mod models;
pub mod mysql;
pub mod sqlite;

pub use models::*;
pub use mysql::MySqlBagStore;
pub use sqlite::SqliteBagStore;

use crate::config::{Backend, DatabaseConfig};
use crate::{Error, Result};
use async_trait::async_trait;
use sqlx::{Connection, Database, Transaction};
use std::sync::Arc;
use tracing::warn;

/// Data-access operations over the `bolso` table
///
/// Absence is a normal outcome: `get_by_id` returns `None`, `update` and
/// `delete` return `false`. Only driver, connectivity and constraint
/// failures are errors.
#[async_trait]
pub trait BagStore: Send + Sync {
    /// Short backend name for logs
    fn backend(&self) -> &'static str;

    /// Open a connection and verify the `bolso` table is reachable
    async fn ping(&self) -> Result<()>;

    /// Create the `bolso` table if it does not exist
    async fn ensure_schema(&self) -> Result<()>;

    /// All rows, most recently created first
    async fn list_all(&self) -> Result<Vec<BagRow>>;

    async fn get_by_id(&self, id: u64) -> Result<Option<BagRow>>;

    /// Insert a row and return the id the storage assigned to it
    async fn create(&self, bag: &NewBag) -> Result<u64>;

    /// Replace every column of row `id`; `false` if no row matched
    async fn update(&self, id: u64, bag: &NewBag) -> Result<bool>;

    /// Remove row `id`; `false` if no row matched
    async fn delete(&self, id: u64) -> Result<bool>;
}

/// Build the store selected by `config`
///
/// No connection is opened here; call [`BagStore::ping`] to fail fast on bad
/// parameters.
pub fn open_store(config: &DatabaseConfig) -> Arc<dyn BagStore> {
    match config.backend {
        Backend::MySql => Arc::new(MySqlBagStore::new(config)),
        Backend::Sqlite => Arc::new(SqliteBagStore::new(&config.path)),
    }
}

/// Column list shared by every SELECT
pub(crate) const BAG_COLUMNS: &str = "id, name, description, price, category, stock, sku, active";

/// Close a per-operation connection, logging instead of failing if the
/// server already went away
pub(crate) async fn release<C: Connection>(conn: C, operation: &'static str) {
    if let Err(e) = conn.close().await {
        warn!(operation, error = %e, "Failed to close database connection cleanly");
    }
}

/// Commit or roll back a single-statement write
///
/// The statement outcome is accepted only if it succeeded and `accept`
/// agrees with its result; anything else rolls back before the error is
/// returned.
pub(crate) async fn settle<DB, F>(
    tx: Transaction<'_, DB>,
    operation: &'static str,
    outcome: std::result::Result<DB::QueryResult, sqlx::Error>,
    accept: F,
) -> Result<DB::QueryResult>
where
    DB: Database,
    F: FnOnce(&DB::QueryResult) -> bool,
{
    match outcome {
        Ok(done) if accept(&done) => {
            tx.commit()
                .await
                .map_err(|e| Error::storage(operation, e))?;
            Ok(done)
        }
        Ok(_) => {
            rollback(tx, operation).await;
            Err(Error::NothingWritten { operation })
        }
        Err(source) => {
            rollback(tx, operation).await;
            Err(Error::storage(operation, source))
        }
    }
}

async fn rollback<DB: Database>(tx: Transaction<'_, DB>, operation: &'static str) {
    if let Err(e) = tx.rollback().await {
        warn!(operation, error = %e, "Rollback failed");
    }
}

/// Map a conversion failure onto the driver's decode error
pub(crate) fn decode_error<E>(e: E) -> sqlx::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    sqlx::Error::Decode(Box::new(e))
}
