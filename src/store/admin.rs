use crate::domain::models::AdminUser;
use crate::store::{Keyspace, StoreError};
use thiserror::Error;
use tokio::sync::RwLock;

const KEY: &str = "admins";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("all fields are required")]
    MissingFields,
    #[error("passwords do not match")]
    PasswordMismatch,
    #[error("an account with this name already exists")]
    DuplicateName,
    #[error("invalid name or password")]
    InvalidCredentials,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Staff accounts for the dashboard. Names are matched case-insensitively;
/// passwords are stored and compared as entered (single-device clear text,
/// preserved from the source system).
pub struct AdminStore {
    keyspace: Keyspace,
    admins: RwLock<Vec<AdminUser>>,
}

impl AdminStore {
    pub fn open(keyspace: Keyspace) -> Result<Self, StoreError> {
        let admins = keyspace.load::<Vec<AdminUser>>(KEY)?.unwrap_or_default();
        Ok(Self {
            keyspace,
            admins: RwLock::new(admins),
        })
    }

    pub async fn register(&self, user: AdminUser) -> Result<(), AuthError> {
        if user.name.is_empty() || user.sector.is_empty() || user.password.is_empty() {
            return Err(AuthError::MissingFields);
        }

        let mut admins = self.admins.write().await;
        let exists = admins
            .iter()
            .any(|a| a.name.eq_ignore_ascii_case(&user.name));
        if exists {
            return Err(AuthError::DuplicateName);
        }

        admins.push(user);
        if let Err(e) = self.keyspace.save(KEY, &*admins) {
            admins.pop();
            return Err(e.into());
        }
        Ok(())
    }

    pub async fn login(&self, name: &str, password: &str) -> Result<AdminUser, AuthError> {
        let admins = self.admins.read().await;
        admins
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name) && a.password == password)
            .cloned()
            .ok_or(AuthError::InvalidCredentials)
    }
}
