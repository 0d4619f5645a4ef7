use crate::store::{Keyspace, StoreError};
use base64::{engine::general_purpose, Engine as _};
use thiserror::Error;
use tokio::sync::watch;

const KEY: &str = "custom_logo";

#[derive(Debug, Error)]
pub enum BrandingError {
    #[error("branding asset must be a base64 image data URI")]
    InvalidDataUri,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Custom brand mark as a single data-URI string. Every component that
/// displays the brand subscribes through a watch channel and re-reads on
/// notification instead of polling ambient storage.
pub struct BrandingStore {
    keyspace: Keyspace,
    tx: watch::Sender<Option<String>>,
}

impl BrandingStore {
    pub fn open(keyspace: Keyspace) -> Result<Self, StoreError> {
        let current = keyspace.load::<String>(KEY)?;
        let (tx, _rx) = watch::channel(current);
        Ok(Self { keyspace, tx })
    }

    pub fn current(&self) -> Option<String> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.tx.subscribe()
    }

    pub fn set(&self, data_uri: String) -> Result<(), BrandingError> {
        let payload = data_uri
            .strip_prefix("data:image/")
            .and_then(|rest| rest.split_once(";base64,"))
            .map(|(_, payload)| payload)
            .ok_or(BrandingError::InvalidDataUri)?;
        general_purpose::STANDARD
            .decode(payload)
            .map_err(|_| BrandingError::InvalidDataUri)?;

        self.keyspace.save(KEY, &data_uri)?;
        self.tx.send_replace(Some(data_uri));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A 1x1 transparent PNG.
    const LOGO: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8BQDwAEhQGAhKmMIQAAAABJRU5ErkJggg==";

    #[tokio::test]
    async fn set_notifies_subscribers() {
        let dir = tempfile::tempdir().unwrap();
        let store = BrandingStore::open(Keyspace::open(dir.path()).unwrap()).unwrap();
        let mut rx = store.subscribe();
        assert!(store.current().is_none());

        store.set(LOGO.to_string()).unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().as_deref(), Some(LOGO));
    }

    #[test]
    fn set_rejects_non_image_payloads() {
        let dir = tempfile::tempdir().unwrap();
        let store = BrandingStore::open(Keyspace::open(dir.path()).unwrap()).unwrap();
        assert!(matches!(
            store.set("hello".to_string()),
            Err(BrandingError::InvalidDataUri)
        ));
        assert!(matches!(
            store.set("data:image/png;base64,@@@".to_string()),
            Err(BrandingError::InvalidDataUri)
        ));
        assert!(store.current().is_none());
    }

    #[test]
    fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let ks = Keyspace::open(dir.path()).unwrap();
        BrandingStore::open(ks.clone()).unwrap().set(LOGO.to_string()).unwrap();
        let reopened = BrandingStore::open(ks).unwrap();
        assert_eq!(reopened.current().as_deref(), Some(LOGO));
    }
}
