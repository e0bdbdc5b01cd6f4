// ⏱️ Read-through cache over a RecordStore
// Every page render re-reads whole collections; this bounds the remote calls.
// A successful insert drops the cached copy of that collection.

use crate::error::StoreError;
use crate::records::Collection;
use crate::store::{RecordStore, Row};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::debug;

struct CachedRows {
    fetched_at: Instant,
    rows: Vec<Row>,
}

/// Per-collection state. `generation` moves on every invalidation so a fill
/// that started before it can be recognised and dropped.
#[derive(Default)]
struct Slot {
    generation: u64,
    cached: Option<CachedRows>,
}

pub struct CachedStore {
    inner: Arc<dyn RecordStore>,
    ttl: Duration,
    slots: Mutex<HashMap<Collection, Slot>>,
}

impl CachedStore {
    pub fn new(inner: Arc<dyn RecordStore>, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn fresh(&self, collection: Collection) -> Option<Vec<Row>> {
        let slots = self.slots.lock().ok()?;
        slots
            .get(&collection)?
            .cached
            .as_ref()
            .filter(|cached| cached.fetched_at.elapsed() < self.ttl)
            .map(|cached| cached.rows.clone())
    }

    fn generation(&self, collection: Collection) -> u64 {
        self.slots
            .lock()
            .map(|slots| slots.get(&collection).map_or(0, |slot| slot.generation))
            .unwrap_or(0)
    }

    /// Keep `rows` unless the collection was invalidated after the read began
    fn remember(&self, collection: Collection, started_at: u64, rows: &[Row]) {
        if let Ok(mut slots) = self.slots.lock() {
            let slot = slots.entry(collection).or_default();
            if slot.generation != started_at {
                debug!(collection = %collection, "Dropping cache fill that raced an insert");
                return;
            }
            slot.cached = Some(CachedRows {
                fetched_at: Instant::now(),
                rows: rows.to_vec(),
            });
        }
    }

    pub fn invalidate(&self, collection: Collection) {
        if let Ok(mut slots) = self.slots.lock() {
            let slot = slots.entry(collection).or_default();
            slot.generation += 1;
            slot.cached = None;
        }
    }

    async fn read_through(&self, collection: Collection) -> Result<Vec<Row>, StoreError> {
        let started_at = self.generation(collection);
        let rows = self.inner.select_all(collection).await?;
        self.remember(collection, started_at, &rows);
        Ok(rows)
    }
}

#[async_trait]
impl RecordStore for CachedStore {
    async fn select_all(&self, collection: Collection) -> Result<Vec<Row>, StoreError> {
        if let Some(rows) = self.fresh(collection) {
            debug!(collection = %collection, "Cache hit");
            return Ok(rows);
        }

        self.read_through(collection).await
    }

    async fn select_current(&self, collection: Collection) -> Result<Vec<Row>, StoreError> {
        self.read_through(collection).await
    }

    async fn insert(&self, collection: Collection, row: Row) -> Result<(), StoreError> {
        self.inner.insert(collection, row).await?;
        self.invalidate(collection);
        Ok(())
    }
}
