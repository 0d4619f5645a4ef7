use crate::domain::models::{ConnectionState, FeedbackRecord, PostgresConfig};
use crate::services::directory::{DirectoryError, GuestDirectory};
use crate::store::{FeedbackStore, StoreError};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("fill in host, user, password and database before testing the connection")]
    MissingFields,
    #[error("validate the directory connection before synchronizing")]
    NotConnected,
    #[error("a connection test or sync is already in progress")]
    Busy,
    #[error("directory returned a malformed enrichment batch")]
    MalformedBatch,
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Connection workflow gating bulk enrichment of stored feedback.
///
/// States follow `disconnected -> connecting -> connected | error`, with
/// `connected` and `error` both able to return to `connecting` on a retry.
/// The state is session-scoped; a service restart always begins
/// disconnected.
pub struct SyncEngine {
    directory: Arc<dyn GuestDirectory>,
    store: Arc<FeedbackStore>,
    state: Mutex<ConnectionState>,
    test_gate: Mutex<()>,
    sync_gate: Mutex<()>,
}

impl SyncEngine {
    pub fn new(directory: Arc<dyn GuestDirectory>, store: Arc<FeedbackStore>) -> Self {
        Self {
            directory,
            store,
            state: Mutex::new(ConnectionState::Disconnected),
            test_gate: Mutex::new(()),
            sync_gate: Mutex::new(()),
        }
    }

    pub async fn connection_state(&self) -> ConnectionState {
        *self.state.lock().await
    }

    /// Validates the config and performs the directory handshake. An
    /// incomplete config fails immediately without touching the state; a
    /// failed handshake lands in `Error`, from where retrying is allowed.
    pub async fn test_connection(&self, config: &PostgresConfig) -> Result<(), SyncError> {
        if !config.is_complete() {
            return Err(SyncError::MissingFields);
        }
        let _in_flight = self.test_gate.try_lock().map_err(|_| SyncError::Busy)?;

        *self.state.lock().await = ConnectionState::Connecting;
        match self.directory.test_connection(config).await {
            Ok(()) => {
                *self.state.lock().await = ConnectionState::Connected;
                tracing::info!(host = %config.host, "guest directory connection established");
                Ok(())
            }
            Err(e) => {
                *self.state.lock().await = ConnectionState::Error;
                tracing::warn!("guest directory handshake failed: {e}");
                Err(e.into())
            }
        }
    }

    /// Bulk-enriches every stored record that has no guest contact yet and
    /// commits the rewritten sequence in one step. Requires a validated
    /// connection; a drop mid-operation moves the state to `Error` and
    /// leaves the store untouched. Re-running after success is a no-op.
    ///
    /// Returns the number of newly enriched records.
    pub async fn sync_guest_data(&self) -> Result<usize, SyncError> {
        let _in_flight = self.sync_gate.try_lock().map_err(|_| SyncError::Busy)?;

        if *self.state.lock().await != ConnectionState::Connected {
            return Err(SyncError::NotConnected);
        }

        let snapshot = self.store.load_all().await;
        let pending = snapshot.iter().filter(|r| !r.is_enriched()).count();
        if pending == 0 {
            tracing::info!("sync requested but every record is already enriched");
            return Ok(0);
        }

        let batch = match self.directory.bulk_enrich(&snapshot).await {
            Ok(batch) => batch,
            Err(e) => {
                *self.state.lock().await = ConnectionState::Error;
                tracing::warn!("guest data sync failed: {e}");
                return Err(e.into());
            }
        };
        if batch.len() != snapshot.len() {
            *self.state.lock().await = ConnectionState::Error;
            return Err(SyncError::MalformedBatch);
        }

        // Contact fields move from the batch onto unenriched records only;
        // everything else stays byte-for-byte as it was stored.
        let rewritten: Vec<FeedbackRecord> = snapshot
            .into_iter()
            .zip(batch)
            .map(|(original, enriched)| {
                if original.is_enriched() {
                    original
                } else {
                    FeedbackRecord {
                        guest_name: enriched.guest_name,
                        guest_email: enriched.guest_email,
                        guest_phone: enriched.guest_phone,
                        ..original
                    }
                }
            })
            .collect();

        self.store.update_all(rewritten).await?;
        tracing::info!("guest data sync enriched {pending} records");
        Ok(pending)
    }
}
