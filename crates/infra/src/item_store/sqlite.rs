//! SQLite-backed item store.
//!
//! One `items` table holds every record. The checkout check-and-set is a
//! conditional `UPDATE ... WHERE taken_by IS NULL` inside a transaction, so
//! concurrent attempts on one item serialize in the database and exactly one
//! of them changes a row.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;

use depot_inventory::{Checkout, Item, ItemId, ItemParts, ItemState, ScanArtifact};

use super::r#trait::{ItemStore, StoreError};

/// Upper bound on waiting for another writer's lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: [&str; 2] = [
    r#"
    CREATE TABLE IF NOT EXISTS items (
        id                 TEXT    PRIMARY KEY NOT NULL,
        name               TEXT    NOT NULL,
        brought_by         TEXT    NOT NULL,
        location           TEXT    NOT NULL,
        time_in_ms         INTEGER NOT NULL,
        identifier_payload TEXT    NOT NULL UNIQUE,
        scan_artifact      BLOB    NOT NULL,
        taken_by           TEXT    NULL,
        time_out_ms        INTEGER NULL,
        CHECK ((taken_by IS NULL) = (time_out_ms IS NULL)),
        CHECK (time_out_ms IS NULL OR time_out_ms >= time_in_ms)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS items_time_in_idx ON items (time_in_ms DESC, id DESC)",
];

const SELECT_COLUMNS: &str = "SELECT id, name, brought_by, location, time_in_ms, \
     identifier_payload, scan_artifact, taken_by, time_out_ms FROM items";

/// Durable item store over a sqlx SQLite pool.
///
/// Each operation acquires a pooled connection (or a transaction) for its own
/// duration; dropping an uncommitted transaction rolls it back.
#[derive(Debug, Clone)]
pub struct SqliteItemStore {
    pool: SqlitePool,
}

impl SqliteItemStore {
    /// Wrap an existing pool. Call [`Self::migrate`] before first use.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the database at `url` and bootstrap the schema.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .busy_timeout(BUSY_TIMEOUT);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// Private in-memory database, for tests/dev.
    ///
    /// Pinned to a single connection that never expires: every new
    /// `:memory:` connection would otherwise see an empty database.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl ItemStore for SqliteItemStore {
    async fn insert(&self, item: &Item) -> Result<(), StoreError> {
        let (taken_by, time_out_ms) = match item.checkout() {
            Some(c) => (Some(c.taken_by.as_str()), Some(c.time_out.timestamp_millis())),
            None => (None, None),
        };

        let result = sqlx::query(
            r#"
            INSERT INTO items (
                id, name, brought_by, location, time_in_ms,
                identifier_payload, scan_artifact, taken_by, time_out_ms
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(item.id_typed().to_string())
        .bind(item.name())
        .bind(item.brought_by())
        .bind(item.location())
        .bind(item.time_in().timestamp_millis())
        .bind(item.identifier_payload())
        .bind(item.scan_artifact().as_bytes())
        .bind(taken_by)
        .bind(time_out_ms)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => Err(insert_error(e, item)),
        }
    }

    async fn get(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = ?1"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(item_from_row).transpose()
    }

    async fn list_recent_first(&self) -> Result<Vec<Item>, StoreError> {
        let rows = sqlx::query(&format!(
            "{SELECT_COLUMNS} ORDER BY time_in_ms DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(item_from_row).collect()
    }

    async fn record_checkout(&self, id: ItemId, checkout: &Checkout) -> Result<Item, StoreError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE items SET taken_by = ?1, time_out_ms = ?2 WHERE id = ?3 AND taken_by IS NULL",
        )
        .bind(&checkout.taken_by)
        .bind(checkout.time_out.timestamp_millis())
        .bind(id.to_string())
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = ?1"))
            .bind(id.to_string())
            .fetch_optional(&mut *tx)
            .await?;
        tx.commit().await?;

        let item = match row {
            Some(row) => item_from_row(&row)?,
            None => return Err(StoreError::NotFound(id)),
        };

        if updated.rows_affected() == 1 {
            return Ok(item);
        }
        match item.checkout() {
            Some(existing) => Err(StoreError::AlreadyCheckedOut {
                id,
                taken_by: existing.taken_by.clone(),
            }),
            None => Err(StoreError::Corrupt(format!(
                "checkout of {id} changed no rows but the item is available"
            ))),
        }
    }
}

fn insert_error(e: sqlx::Error, item: &Item) -> StoreError {
    let unique_column = e
        .as_database_error()
        .filter(|db| db.is_unique_violation())
        .map(|db| db.message().to_string());

    match unique_column {
        Some(msg) if msg.contains("identifier_payload") => {
            StoreError::DuplicatePayload(item.identifier_payload().to_string())
        }
        Some(_) => StoreError::DuplicateId(item.id_typed()),
        None => StoreError::Sqlx(e),
    }
}

fn item_from_row(row: &SqliteRow) -> Result<Item, StoreError> {
    let raw_id: String = row.try_get("id")?;
    let id = raw_id
        .parse::<ItemId>()
        .map_err(|e| StoreError::Corrupt(format!("id {raw_id:?}: {e}")))?;

    let time_in = from_millis(row.try_get("time_in_ms")?)?;
    let time_out = row
        .try_get::<Option<i64>, _>("time_out_ms")?
        .map(from_millis)
        .transpose()?;
    let taken_by: Option<String> = row.try_get("taken_by")?;
    let state = ItemState::from_parts(taken_by, time_out)
        .map_err(|e| StoreError::Corrupt(format!("item {id}: {e}")))?;

    Item::restore(ItemParts {
        id,
        name: row.try_get("name")?,
        brought_by: row.try_get("brought_by")?,
        location: row.try_get("location")?,
        time_in,
        identifier_payload: row.try_get("identifier_payload")?,
        scan_artifact: ScanArtifact::from_bytes(row.try_get("scan_artifact")?),
        state,
    })
    .map_err(|e| StoreError::Corrupt(format!("item {id}: {e}")))
}

fn from_millis(ms: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .ok_or_else(|| StoreError::Corrupt(format!("timestamp {ms} out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use depot_inventory::{IdentifierEncoder, NewItem};

    fn item(name: &str) -> Item {
        Item::register(
            ItemId::new(),
            &NewItem::new(name, "Bob", "Aisle 3"),
            Utc::now(),
            &IdentifierEncoder::default(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn round_trips_an_available_item() {
        let store = SqliteItemStore::in_memory().await.unwrap();
        let drill = item("Drill");
        store.insert(&drill).await.unwrap();

        let loaded = store.get(drill.id_typed()).await.unwrap().unwrap();
        assert_eq!(loaded, drill);
        assert_eq!(loaded.scan_artifact().decode().unwrap(), drill.identifier_payload());
    }

    #[tokio::test]
    async fn checkout_is_recorded_once() {
        let store = SqliteItemStore::in_memory().await.unwrap();
        let drill = item("Drill");
        store.insert(&drill).await.unwrap();

        let first = Checkout {
            taken_by: "Alice".to_string(),
            time_out: drill.time_in() + ChronoDuration::seconds(1),
        };
        let updated = store.record_checkout(drill.id_typed(), &first).await.unwrap();
        assert_eq!(updated.checkout(), Some(&first));

        let second = Checkout {
            taken_by: "Bob".to_string(),
            time_out: drill.time_in() + ChronoDuration::seconds(2),
        };
        let err = store
            .record_checkout(drill.id_typed(), &second)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyCheckedOut { ref taken_by, .. } if taken_by == "Alice"));

        let stored = store.get(drill.id_typed()).await.unwrap().unwrap();
        assert_eq!(stored.checkout(), Some(&first));
    }

    #[tokio::test]
    async fn checkout_of_unknown_item_changes_nothing() {
        let store = SqliteItemStore::in_memory().await.unwrap();
        let checkout = Checkout {
            taken_by: "Alice".to_string(),
            time_out: Utc::now(),
        };
        let err = store.record_checkout(ItemId::new(), &checkout).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert!(store.list_recent_first().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_id_and_payload_are_distinguished() {
        let store = SqliteItemStore::in_memory().await.unwrap();
        let drill = item("Drill");
        store.insert(&drill).await.unwrap();

        let mut same_id = serde_json::to_value(&drill).unwrap();
        same_id["identifier_payload"] = serde_json::json!("Drill-Bob-other");
        let same_id: Item = serde_json::from_value(same_id).unwrap();
        let err = store.insert(&same_id).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId(_)), "{err:?}");

        let mut same_payload = serde_json::to_value(&drill).unwrap();
        same_payload["id"] = serde_json::json!(ItemId::new());
        let same_payload: Item = serde_json::from_value(same_payload).unwrap();
        let err = store.insert(&same_payload).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicatePayload(_)), "{err:?}");

        assert_eq!(store.list_recent_first().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn half_populated_row_is_reported_as_corrupt() {
        let store = SqliteItemStore::in_memory().await.unwrap();
        let drill = item("Drill");
        store.insert(&drill).await.unwrap();

        // Bypass the table's check constraint to simulate a damaged file.
        sqlx::query("PRAGMA ignore_check_constraints = ON")
            .execute(store.pool())
            .await
            .unwrap();
        sqlx::query("UPDATE items SET taken_by = 'Carol' WHERE id = ?1")
            .bind(drill.id_typed().to_string())
            .execute(store.pool())
            .await
            .unwrap();

        let err = store.get(drill.id_typed()).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)), "{err:?}");
    }
}
