//! Narrow CRUD interface over the two persisted tables.
//!
//! Production runs against Postgres; tests run against the in-memory
//! backend. The database is the source of truth — there is no multi-table
//! transaction anywhere, each call is a single atomic statement.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use super::models::{Account, Purchase};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

/// Result of an admin verification attempt.
#[derive(Debug)]
pub enum VerifyOutcome {
    /// The purchase transitioned from unverified to verified.
    Verified(Purchase),
    /// Already terminal; verifying again is a no-op success.
    AlreadyVerified(Purchase),
    NotFound,
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap connectivity probe for the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;

    async fn create_account(&self, username: &str, email: &str) -> Result<Account, StoreError>;
    async fn get_account_by_username(&self, username: &str)
    -> Result<Option<Account>, StoreError>;
    async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;
    /// All accounts, newest first.
    async fn list_accounts(&self) -> Result<Vec<Account>, StoreError>;

    async fn insert_purchase(&self, purchase: &Purchase) -> Result<(), StoreError>;
    async fn get_purchase(&self, id: Uuid) -> Result<Option<Purchase>, StoreError>;
    /// All purchases, newest first. The dataset is assumed small; no pagination.
    async fn list_purchases(&self) -> Result<Vec<Purchase>, StoreError>;
    /// Sets status and verification_status to verified in one logical update.
    async fn verify_purchase(&self, id: Uuid) -> Result<VerifyOutcome, StoreError>;

    /// Bulk wipe of both tables. The only way purchases are ever removed.
    async fn clear_all(&self) -> Result<(), StoreError>;
}
