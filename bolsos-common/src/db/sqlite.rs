//! SQLite backend for the bag catalog
//!
//! File-backed database used for local development and tests. Prices are
//! stored as canonical decimal strings so no precision is lost in SQLite's
//! REAL affinity.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqliteRow};
use sqlx::{Connection, Row, SqliteConnection};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

use super::{decode_error, release, settle, BagRow, BagStore, NewBag, BAG_COLUMNS};
use crate::{Error, Result};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS bolso (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        description TEXT,
        price TEXT NOT NULL,
        category TEXT NOT NULL,
        stock INTEGER NOT NULL,
        sku TEXT NOT NULL UNIQUE,
        active INTEGER NOT NULL DEFAULT 1
    )
"#;

/// SQLite-backed [`BagStore`]
#[derive(Debug, Clone)]
pub struct SqliteBagStore {
    path: PathBuf,
    options: SqliteConnectOptions,
}

impl SqliteBagStore {
    /// Store over the database file at `path`
    ///
    /// The file must already exist unless [`BagStore::ensure_schema`] is
    /// called first.
    pub fn new(path: &Path) -> Self {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(false)
            .foreign_keys(true);

        Self {
            path: path.to_path_buf(),
            options,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn connect(&self, operation: &'static str) -> Result<SqliteConnection> {
        SqliteConnection::connect_with(&self.options)
            .await
            .map_err(|e| Error::storage(operation, e))
    }
}

#[async_trait]
impl BagStore for SqliteBagStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.connect("ping").await?;
        let probe = sqlx::query("SELECT 1 FROM bolso LIMIT 1")
            .fetch_optional(&mut conn)
            .await;
        release(conn, "ping").await;

        probe.map_err(|e| Error::storage("ping", e))?;
        Ok(())
    }

    async fn ensure_schema(&self) -> Result<()> {
        let options = self.options.clone().create_if_missing(true);
        let mut conn = SqliteConnection::connect_with(&options)
            .await
            .map_err(|e| Error::storage("ensure_schema", e))?;
        let created = sqlx::query(CREATE_TABLE).execute(&mut conn).await;
        release(conn, "ensure_schema").await;

        created.map_err(|e| Error::storage("ensure_schema", e))?;
        info!("Schema ready: {}", self.path.display());
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<BagRow>> {
        let mut conn = self.connect("list_all").await?;
        let rows = sqlx::query(&format!("SELECT {} FROM bolso ORDER BY id DESC", BAG_COLUMNS))
            .fetch_all(&mut conn)
            .await;
        release(conn, "list_all").await;

        rows.map_err(|e| Error::storage("list_all", e))?
            .iter()
            .map(|row| row_to_bag(row).map_err(|e| Error::storage("list_all", e)))
            .collect()
    }

    async fn get_by_id(&self, id: u64) -> Result<Option<BagRow>> {
        // SQLite rowids are signed; anything above i64::MAX cannot exist
        let Ok(key) = i64::try_from(id) else {
            return Ok(None);
        };

        let mut conn = self.connect("get_by_id").await?;
        let row = sqlx::query(&format!("SELECT {} FROM bolso WHERE id = ?", BAG_COLUMNS))
            .bind(key)
            .fetch_optional(&mut conn)
            .await;
        release(conn, "get_by_id").await;

        match row.map_err(|e| Error::storage("get_by_id", e))? {
            Some(row) => Ok(Some(
                row_to_bag(&row).map_err(|e| Error::storage("get_by_id", e))?,
            )),
            None => Ok(None),
        }
    }

    async fn create(&self, bag: &NewBag) -> Result<u64> {
        let mut conn = self.connect("create").await?;
        let created = insert(&mut conn, bag).await;
        release(conn, "create").await;

        let id = created?;
        debug!(id, "Inserted bag");
        Ok(id)
    }

    async fn update(&self, id: u64, bag: &NewBag) -> Result<bool> {
        let Ok(key) = i64::try_from(id) else {
            return Ok(false);
        };

        let mut conn = self.connect("update").await?;
        let updated = replace(&mut conn, key, bag).await;
        release(conn, "update").await;

        updated
    }

    async fn delete(&self, id: u64) -> Result<bool> {
        let Ok(key) = i64::try_from(id) else {
            return Ok(false);
        };

        let mut conn = self.connect("delete").await?;
        let deleted = remove(&mut conn, key).await;
        release(conn, "delete").await;

        deleted
    }
}

async fn insert(conn: &mut SqliteConnection, bag: &NewBag) -> Result<u64> {
    let mut tx = conn
        .begin()
        .await
        .map_err(|e| Error::storage("create", e))?;

    let outcome = sqlx::query(
        r#"
        INSERT INTO bolso (name, description, price, category, stock, sku, active)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&bag.name)
    .bind(&bag.description)
    .bind(bag.price.to_string())
    .bind(&bag.category)
    .bind(bag.stock)
    .bind(&bag.sku)
    .bind(bag.active)
    .execute(&mut *tx)
    .await;

    let done = settle(tx, "create", outcome, |done| {
        done.rows_affected() == 1 && done.last_insert_rowid() > 0
    })
    .await?;

    u64::try_from(done.last_insert_rowid())
        .map_err(|e| Error::Internal(format!("Invalid rowid from SQLite: {}", e)))
}

async fn replace(conn: &mut SqliteConnection, id: i64, bag: &NewBag) -> Result<bool> {
    let mut tx = conn
        .begin()
        .await
        .map_err(|e| Error::storage("update", e))?;

    let outcome = sqlx::query(
        r#"
        UPDATE bolso
        SET name = ?, description = ?, price = ?,
            category = ?, stock = ?, sku = ?, active = ?
        WHERE id = ?
        "#,
    )
    .bind(&bag.name)
    .bind(&bag.description)
    .bind(bag.price.to_string())
    .bind(&bag.category)
    .bind(bag.stock)
    .bind(&bag.sku)
    .bind(bag.active)
    .bind(id)
    .execute(&mut *tx)
    .await;

    let done = settle(tx, "update", outcome, |_| true).await?;
    Ok(done.rows_affected() == 1)
}

async fn remove(conn: &mut SqliteConnection, id: i64) -> Result<bool> {
    let mut tx = conn
        .begin()
        .await
        .map_err(|e| Error::storage("delete", e))?;

    let outcome = sqlx::query("DELETE FROM bolso WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await;

    let done = settle(tx, "delete", outcome, |_| true).await?;
    Ok(done.rows_affected() == 1)
}

fn row_to_bag(row: &SqliteRow) -> std::result::Result<BagRow, sqlx::Error> {
    let id: i64 = row.try_get("id")?;
    let price: String = row.try_get("price")?;
    let stock: i64 = row.try_get("stock")?;

    Ok(BagRow {
        id: u64::try_from(id).map_err(decode_error)?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        price: Decimal::from_str(&price).map_err(decode_error)?,
        category: row.try_get("category")?,
        stock: i32::try_from(stock).map_err(decode_error)?,
        sku: row.try_get("sku")?,
        active: row.try_get("active")?,
    })
}
