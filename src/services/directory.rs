use crate::domain::models::{FeedbackRecord, PostgresConfig};
use async_trait::async_trait;
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("handshake with the guest directory failed")]
    HandshakeFailed,
    #[error("connection dropped during synchronization")]
    ConnectionDropped,
}

/// External guest-directory boundary. The simulated implementation below is
/// the reference collaborator; a real database client can replace it without
/// touching the sync state machine.
#[async_trait]
pub trait GuestDirectory: Send + Sync {
    /// Abstract handshake. May be slow, may fail; must not be assumed
    /// instantaneous by callers.
    async fn test_connection(&self, config: &PostgresConfig) -> Result<(), DirectoryError>;

    /// Returns contact details for each record, preserving order and
    /// cardinality. The sync engine only reads the contact fields of
    /// records it considers unenriched.
    async fn bulk_enrich(
        &self,
        records: &[FeedbackRecord],
    ) -> Result<Vec<FeedbackRecord>, DirectoryError>;
}

/// Simulated directory: fixed latencies with a little jitter, contacts
/// derived deterministically from the apartment number. Failures are
/// injectable so the error paths stay testable.
pub struct SimulatedDirectory {
    handshake_delay: Duration,
    enrich_delay: Duration,
    fail_next_handshake: AtomicBool,
    fail_next_enrich: AtomicBool,
}

impl SimulatedDirectory {
    pub fn new() -> Self {
        Self::with_delays(Duration::from_millis(1500), Duration::from_millis(2000))
    }

    pub fn with_delays(handshake_delay: Duration, enrich_delay: Duration) -> Self {
        Self {
            handshake_delay,
            enrich_delay,
            fail_next_handshake: AtomicBool::new(false),
            fail_next_enrich: AtomicBool::new(false),
        }
    }

    pub fn fail_next_handshake(&self) {
        self.fail_next_handshake.store(true, Ordering::SeqCst);
    }

    pub fn fail_next_enrich(&self) {
        self.fail_next_enrich.store(true, Ordering::SeqCst);
    }

    async fn simulated_latency(&self, base: Duration) {
        if base.is_zero() {
            return;
        }
        let jitter = rand::thread_rng().gen_range(0..250);
        tokio::time::sleep(base + Duration::from_millis(jitter)).await;
    }

    fn derive_contact(apartment: &str) -> (String, String, String) {
        (
            format!("Hóspede Apto {apartment}"),
            format!("hospede.{apartment}@gmail.com"),
            format!("(73) 999{:0>2}-0000", apartment),
        )
    }
}

impl Default for SimulatedDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GuestDirectory for SimulatedDirectory {
    async fn test_connection(&self, config: &PostgresConfig) -> Result<(), DirectoryError> {
        self.simulated_latency(self.handshake_delay).await;
        if self.fail_next_handshake.swap(false, Ordering::SeqCst) {
            return Err(DirectoryError::HandshakeFailed);
        }
        tracing::debug!(host = %config.host, database = %config.database, "simulated handshake ok");
        Ok(())
    }

    async fn bulk_enrich(
        &self,
        records: &[FeedbackRecord],
    ) -> Result<Vec<FeedbackRecord>, DirectoryError> {
        self.simulated_latency(self.enrich_delay).await;
        if self.fail_next_enrich.swap(false, Ordering::SeqCst) {
            return Err(DirectoryError::ConnectionDropped);
        }

        let enriched = records
            .iter()
            .map(|r| {
                let mut record = r.clone();
                if !record.is_enriched() {
                    let (name, email, phone) = Self::derive_contact(&record.apartment_number);
                    record.guest_name = Some(name);
                    record.guest_email = Some(email);
                    record.guest_phone = Some(phone);
                }
                record
            })
            .collect();
        Ok(enriched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn record(apartment: &str) -> FeedbackRecord {
        FeedbackRecord {
            overall: crate::domain::models::RatingLevel::Satisfied,
            categories: BTreeMap::new(),
            comments: String::new(),
            apartment_number: apartment.to_string(),
            timestamp: 0,
            guest_name: None,
            guest_email: None,
            guest_phone: None,
        }
    }

    #[tokio::test]
    async fn derivation_is_deterministic_per_apartment() {
        let dir = SimulatedDirectory::with_delays(Duration::ZERO, Duration::ZERO);
        let first = dir.bulk_enrich(&[record("7")]).await.unwrap();
        let second = dir.bulk_enrich(&[record("7")]).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first[0].guest_name.as_deref(), Some("Hóspede Apto 7"));
        assert_eq!(first[0].guest_phone.as_deref(), Some("(73) 99907-0000"));
    }

    #[tokio::test]
    async fn enriched_records_are_left_untouched() {
        let dir = SimulatedDirectory::with_delays(Duration::ZERO, Duration::ZERO);
        let mut existing = record("12");
        existing.guest_name = Some("Custom Name".to_string());
        let out = dir.bulk_enrich(&[existing.clone()]).await.unwrap();
        assert_eq!(out[0], existing);
    }

    #[tokio::test]
    async fn injected_failures_fire_once() {
        let dir = SimulatedDirectory::with_delays(Duration::ZERO, Duration::ZERO);
        let config = PostgresConfig::default();

        dir.fail_next_handshake();
        assert!(dir.test_connection(&config).await.is_err());
        assert!(dir.test_connection(&config).await.is_ok());
    }
}
