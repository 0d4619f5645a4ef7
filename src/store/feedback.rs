use crate::domain::models::FeedbackRecord;
use crate::store::{Keyspace, StoreError};
use tokio::sync::RwLock;

const KEY: &str = "feedbacks";

/// Append-only sequence of submitted feedback. Records are never deleted or
/// reordered; the only rewrite is the sync workflow's bulk enrichment, which
/// keeps every record in place.
///
/// The full sequence is cached in memory and flushed to the key space on
/// every mutation, all under one write lock, so the wizard's appends and the
/// sync rewrite never interleave mid-mutation.
pub struct FeedbackStore {
    keyspace: Keyspace,
    records: RwLock<Vec<FeedbackRecord>>,
}

impl FeedbackStore {
    pub fn open(keyspace: Keyspace) -> Result<Self, StoreError> {
        let records = keyspace.load::<Vec<FeedbackRecord>>(KEY)?.unwrap_or_default();
        Ok(Self {
            keyspace,
            records: RwLock::new(records),
        })
    }

    pub async fn append(&self, record: FeedbackRecord) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        records.push(record);
        if let Err(e) = self.keyspace.save(KEY, &*records) {
            records.pop();
            return Err(e);
        }
        tracing::info!("feedback stored, {} records total", records.len());
        Ok(())
    }

    pub async fn load_all(&self) -> Vec<FeedbackRecord> {
        self.records.read().await.clone()
    }

    pub async fn count(&self) -> usize {
        self.records.read().await.len()
    }

    /// Wholesale replacement used only by bulk enrichment. `replacement` must
    /// be derived from an earlier `load_all` snapshot with order and
    /// cardinality preserved; any records appended since that snapshot are
    /// carried over unchanged so a concurrent kiosk submission is never lost.
    pub async fn update_all(&self, mut replacement: Vec<FeedbackRecord>) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        if records.len() > replacement.len() {
            replacement.extend_from_slice(&records[replacement.len()..]);
        }
        self.keyspace.save(KEY, &replacement)?;
        *records = replacement;
        Ok(())
    }
}
