// 📮 Submission Pipeline
// read collection -> next id -> build record -> write
//
// The read and the write are not atomic: two submitters that read the same
// max id will both try to write it. The second write surfaces as a conflict
// (or as a duplicate id on stores without a key constraint). No retry.

use crate::error::StoreError;
use crate::records::{ImpactDraft, ImpactEntry, QuoteDraft, QuoteEntry, Record};
use crate::store::RecordStore;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

/// One more than the largest id, or 0 when there are none.
pub fn next_id<I>(ids: I) -> Result<i64, StoreError>
where
    I: IntoIterator<Item = i64>,
{
    match ids.into_iter().max() {
        None => Ok(0),
        Some(max) => max
            .checked_add(1)
            .ok_or_else(|| StoreError::Parse(format!("id {} leaves no room for another", max))),
    }
}

pub struct SubmissionPipeline {
    store: Arc<dyn RecordStore>,
}

impl SubmissionPipeline {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Id the next record in `R`'s collection would get right now.
    /// Always an uncached read, so writes from other instances are seen.
    pub async fn peek_next_id<R: Record>(&self) -> Result<i64, StoreError> {
        let collection = R::COLLECTION;
        let rows = self.store.select_current(collection).await?;
        let ids = rows.iter().filter_map(|row| {
            let id = row.get("id").and_then(Value::as_i64);
            if id.is_none() {
                warn!(collection = %collection, "Row without integer id ignored for id assignment");
            }
            id
        });
        next_id(ids)
    }

    /// Assign the next id to `draft` and write it. Returns the stored record.
    pub async fn submit<R: Record>(&self, draft: R::Draft) -> Result<R, StoreError> {
        let id = self.peek_next_id::<R>().await?;
        let record = R::from_draft(id, draft);
        let row = serde_json::to_value(&record)?;

        let collection = R::COLLECTION;
        self.store.insert(collection, row).await?;
        info!(collection = %collection, id, "Record submitted");

        Ok(record)
    }

    pub async fn submit_impact(&self, draft: ImpactDraft) -> Result<ImpactEntry, StoreError> {
        self.submit::<ImpactEntry>(draft).await
    }

    pub async fn submit_quote(&self, draft: QuoteDraft) -> Result<QuoteEntry, StoreError> {
        self.submit::<QuoteEntry>(draft).await
    }
}
