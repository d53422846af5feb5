//! MySQL backend for the bag catalog

use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlRow};
use sqlx::{Connection, MySqlConnection, Row};
use tracing::{debug, info};

use super::{release, settle, BagRow, BagStore, NewBag, BAG_COLUMNS};
use crate::config::DatabaseConfig;
use crate::{Error, Result};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS bolso (
        id INT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        description TEXT NULL,
        price DECIMAL(10, 2) NOT NULL,
        category VARCHAR(50) NOT NULL,
        stock INT NOT NULL,
        sku VARCHAR(50) NOT NULL UNIQUE,
        active TINYINT(1) NOT NULL DEFAULT 1
    ) ENGINE = InnoDB
"#;

/// MySQL-backed [`BagStore`]
///
/// Holds only connect options; each call dials the server afresh.
#[derive(Clone)]
pub struct MySqlBagStore {
    options: MySqlConnectOptions,
    target: String,
}

impl std::fmt::Debug for MySqlBagStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlBagStore")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

impl MySqlBagStore {
    pub fn new(config: &DatabaseConfig) -> Self {
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.name)
            .charset(&config.charset);

        Self {
            options,
            target: config.describe(),
        }
    }

    async fn connect(&self, operation: &'static str) -> Result<MySqlConnection> {
        MySqlConnection::connect_with(&self.options)
            .await
            .map_err(|e| Error::storage(operation, e))
    }
}

#[async_trait]
impl BagStore for MySqlBagStore {
    fn backend(&self) -> &'static str {
        "mysql"
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
        let mut conn = self.connect("ensure_schema").await?;
        let created = sqlx::query(CREATE_TABLE).execute(&mut conn).await;
        release(conn, "ensure_schema").await;

        created.map_err(|e| Error::storage("ensure_schema", e))?;
        info!("Schema ready: {}", self.target);
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
        let mut conn = self.connect("get_by_id").await?;
        let row = sqlx::query(&format!("SELECT {} FROM bolso WHERE id = ?", BAG_COLUMNS))
            .bind(id)
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
        let mut conn = self.connect("update").await?;
        let updated = replace(&mut conn, id, bag).await;
        release(conn, "update").await;

        updated
    }

    async fn delete(&self, id: u64) -> Result<bool> {
        let mut conn = self.connect("delete").await?;
        let deleted = remove(&mut conn, id).await;
        release(conn, "delete").await;

        deleted
    }
}

async fn insert(conn: &mut MySqlConnection, bag: &NewBag) -> Result<u64> {
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
    .bind(bag.price)
    .bind(&bag.category)
    .bind(bag.stock)
    .bind(&bag.sku)
    .bind(bag.active)
    .execute(&mut *tx)
    .await;

    let done = settle(tx, "create", outcome, |done| {
        done.rows_affected() == 1 && done.last_insert_id() > 0
    })
    .await?;

    Ok(done.last_insert_id())
}

// The driver negotiates CLIENT_FOUND_ROWS, so rows_affected counts matched
// rows even when an update rewrites identical values.
async fn replace(conn: &mut MySqlConnection, id: u64, bag: &NewBag) -> Result<bool> {
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
    .bind(bag.price)
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

async fn remove(conn: &mut MySqlConnection, id: u64) -> Result<bool> {
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

fn row_to_bag(row: &MySqlRow) -> std::result::Result<BagRow, sqlx::Error> {
    let id: u32 = row.try_get("id")?;
    // TINYINT(1) may surface as an integer-like value; keep it integer here
    let active: i8 = row.try_get("active")?;

    Ok(BagRow {
        id: u64::from(id),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        price: row.try_get("price")?,
        category: row.try_get("category")?,
        stock: row.try_get("stock")?,
        sku: row.try_get("sku")?,
        active: i64::from(active),
    })
}
