//! In-memory implementation of [`Store`], used by tests.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{Account, Purchase, PurchaseStatus, VerificationStatus};
use super::store::{Store, StoreError, VerifyOutcome};

#[derive(Default)]
struct State {
    accounts: Vec<Account>,
    purchases: Vec<Purchase>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn create_account(&self, username: &str, email: &str) -> Result<Account, StoreError> {
        let mut state = self.inner.write().await;
        if state
            .accounts
            .iter()
            .any(|a| a.username == username || a.email == email)
        {
            return Err(StoreError::Conflict(
                "Username or email already exists".to_string(),
            ));
        }

        let account = Account::new(username.to_string(), email.to_string());
        state.accounts.push(account.clone());
        Ok(account)
    }

    async fn get_account_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Account>, StoreError> {
        let state = self.inner.read().await;
        Ok(state
            .accounts
            .iter()
            .find(|a| a.username == username)
            .cloned())
    }

    async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let state = self.inner.read().await;
        Ok(state.accounts.iter().find(|a| a.email == email).cloned())
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, StoreError> {
        let state = self.inner.read().await;
        let mut accounts = state.accounts.clone();
        accounts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(accounts)
    }

    async fn insert_purchase(&self, purchase: &Purchase) -> Result<(), StoreError> {
        self.inner.write().await.purchases.push(purchase.clone());
        Ok(())
    }

    async fn get_purchase(&self, id: Uuid) -> Result<Option<Purchase>, StoreError> {
        let state = self.inner.read().await;
        Ok(state.purchases.iter().find(|p| p.id == id).cloned())
    }

    async fn list_purchases(&self) -> Result<Vec<Purchase>, StoreError> {
        let state = self.inner.read().await;
        let mut purchases = state.purchases.clone();
        purchases.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(purchases)
    }

    async fn verify_purchase(&self, id: Uuid) -> Result<VerifyOutcome, StoreError> {
        let mut state = self.inner.write().await;
        match state.purchases.iter_mut().find(|p| p.id == id) {
            Some(purchase) => {
                if purchase.verification_status == VerificationStatus::Verified {
                    return Ok(VerifyOutcome::AlreadyVerified(purchase.clone()));
                }
                purchase.status = PurchaseStatus::Verified;
                purchase.verification_status = VerificationStatus::Verified;
                Ok(VerifyOutcome::Verified(purchase.clone()))
            }
            None => Ok(VerifyOutcome::NotFound),
        }
    }

    async fn clear_all(&self) -> Result<(), StoreError> {
        let mut state = self.inner.write().await;
        state.purchases.clear();
        state.accounts.clear();
        Ok(())
    }
}
