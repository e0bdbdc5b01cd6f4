// 🗄️ Record Store - hosted table API + local SQLite backend
// Two operations only: select everything in a collection, append one row.
// Rows are JSON objects; ids are assigned by the caller.

use crate::error::StoreError;
use crate::records::{Collection, Record};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use serde_json::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// One row as it travels to and from the store
pub type Row = Value;

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All rows currently in the collection, in insertion order
    async fn select_all(&self, collection: Collection) -> Result<Vec<Row>, StoreError>;

    /// Like `select_all`, but never answered from a cache. Id assignment reads this.
    async fn select_current(&self, collection: Collection) -> Result<Vec<Row>, StoreError> {
        self.select_all(collection).await
    }

    /// Append one row carrying a caller-assigned `id`
    async fn insert(&self, collection: Collection, row: Row) -> Result<(), StoreError>;
}

/// Load and decode every row of `R`'s collection.
/// Rows that don't decode are logged and skipped so one bad row can't blank the page.
pub async fn load_records<R: Record>(store: &dyn RecordStore) -> Result<Vec<R>, StoreError> {
    let collection = R::COLLECTION;
    let rows = store.select_all(collection).await?;
    let mut records = Vec::with_capacity(rows.len());

    for row in rows {
        match serde_json::from_value::<R>(row.clone()) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(collection = %collection, row = %row, error = %e, "Skipping malformed row");
            }
        }
    }

    Ok(records)
}

fn row_id(collection: Collection, row: &Row) -> Result<i64, StoreError> {
    row.get("id").and_then(Value::as_i64).ok_or_else(|| {
        StoreError::Parse(format!("row for {} has no integer id", collection))
    })
}

// ============================================================================
// HOSTED STORE (PostgREST-style table API)
// ============================================================================

pub struct RestStore {
    client: reqwest::Client,
    base_url: String,
    key: String,
}

impl RestStore {
    pub fn new(url: &str, key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: format!("{}/rest/v1", url.trim_end_matches('/')),
            key,
        }
    }

    fn table_url(&self, collection: Collection) -> String {
        format!("{}/{}", self.base_url, collection.table())
    }
}

#[async_trait]
impl RecordStore for RestStore {
    async fn select_all(&self, collection: Collection) -> Result<Vec<Row>, StoreError> {
        let url = format!("{}?select=*", self.table_url(collection));
        let resp = self
            .client
            .get(&url)
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let rows: Vec<Row> = resp.json().await?;
        debug!(collection = %collection, count = rows.len(), "Fetched rows");
        Ok(rows)
    }

    async fn insert(&self, collection: Collection, row: Row) -> Result<(), StoreError> {
        let id = row_id(collection, &row)?;
        let resp = self
            .client
            .post(self.table_url(collection))
            .header("apikey", &self.key)
            .header("Prefer", "return=minimal")
            .bearer_auth(&self.key)
            .json(&row)
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::CONFLICT {
            return Err(StoreError::Conflict {
                collection: collection.table().to_string(),
                id,
            });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(())
    }
}

// ============================================================================
// LOCAL STORE (SQLite)
// ============================================================================

/// rusqlite is blocking, so every statement runs on tokio's blocking pool
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        // WAL for crash recovery
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))?;
        setup_database(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        setup_database(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| StoreError::Database("connection lock poisoned".to_string()))?;
            f(&conn)
        })
        .await
        .map_err(|e| StoreError::Database(format!("blocking task failed: {}", e)))?
    }
}

pub fn setup_database(conn: &Connection) -> Result<(), StoreError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS records (
            collection TEXT NOT NULL,
            id INTEGER NOT NULL,
            data TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (collection, id)
        )",
        [],
    )?;

    Ok(())
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn select_all(&self, collection: Collection) -> Result<Vec<Row>, StoreError> {
        self.with_conn(move |conn| {
            let mut stmt =
                conn.prepare("SELECT data FROM records WHERE collection = ?1 ORDER BY rowid")?;

            let raw = stmt
                .query_map(params![collection.table()], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;

            raw.iter()
                .map(|json| serde_json::from_str(json).map_err(StoreError::from))
                .collect()
        })
        .await
    }

    async fn insert(&self, collection: Collection, row: Row) -> Result<(), StoreError> {
        let id = row_id(collection, &row)?;
        let data = serde_json::to_string(&row)?;

        self.with_conn(move |conn| {
            let result = conn.execute(
                "INSERT INTO records (collection, id, data) VALUES (?1, ?2, ?3)",
                params![collection.table(), id, data],
            );

            match result {
                Ok(_) => Ok(()),
                Err(rusqlite::Error::SqliteFailure(err, _))
                    if err.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    Err(StoreError::Conflict {
                        collection: collection.table().to_string(),
                        id,
                    })
                }
                Err(e) => Err(e.into()),
            }
        })
        .await
    }
}
