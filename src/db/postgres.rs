//! Postgres implementation of [`Store`].

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::models::{Account, Purchase, PurchaseItem};
use super::store::{Store, StoreError, VerifyOutcome};

/// Postgres unique-violation SQLSTATE.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn create_account(&self, username: &str, email: &str) -> Result<Account, StoreError> {
        let account = Account::new(username.to_string(), email.to_string());

        sqlx::query(
            r#"
            INSERT INTO accounts (id, username, email, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(account.id)
        .bind(&account.username)
        .bind(&account.email)
        .bind(account.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db) = &e {
                if db.code().as_deref() == Some(UNIQUE_VIOLATION) {
                    return StoreError::Conflict("Username or email already exists".to_string());
                }
            }
            StoreError::from(e)
        })?;

        Ok(account)
    }

    async fn get_account_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query_as::<_, AccountRow>("SELECT * FROM accounts WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(AccountRow::into_domain))
    }

    async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query_as::<_, AccountRow>("SELECT * FROM accounts WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(AccountRow::into_domain))
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, StoreError> {
        let rows =
            sqlx::query_as::<_, AccountRow>("SELECT * FROM accounts ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(AccountRow::into_domain).collect())
    }

    async fn insert_purchase(&self, purchase: &Purchase) -> Result<(), StoreError> {
        let items = serde_json::to_value(&purchase.items)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO purchases (
                id, username, email, minecraft_username, items, amount, provider,
                status, verification_status, ip, transaction_id, phone_number,
                currency, submitted_at, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(purchase.id)
        .bind(&purchase.username)
        .bind(&purchase.email)
        .bind(&purchase.minecraft_username)
        .bind(items)
        .bind(&purchase.amount)
        .bind(purchase.provider.as_str())
        .bind(purchase.status.as_str())
        .bind(purchase.verification_status.as_str())
        .bind(&purchase.ip)
        .bind(&purchase.transaction_id)
        .bind(&purchase.phone_number)
        .bind(&purchase.currency)
        .bind(purchase.submitted_at)
        .bind(purchase.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_purchase(&self, id: Uuid) -> Result<Option<Purchase>, StoreError> {
        let row = sqlx::query_as::<_, PurchaseRow>("SELECT * FROM purchases WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(PurchaseRow::into_domain).transpose()
    }

    async fn list_purchases(&self) -> Result<Vec<Purchase>, StoreError> {
        let rows =
            sqlx::query_as::<_, PurchaseRow>("SELECT * FROM purchases ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(PurchaseRow::into_domain).collect()
    }

    async fn verify_purchase(&self, id: Uuid) -> Result<VerifyOutcome, StoreError> {
        let updated = sqlx::query_as::<_, PurchaseRow>(
            r#"
            UPDATE purchases
            SET status = 'verified', verification_status = 'verified'
            WHERE id = $1 AND verification_status <> 'verified'
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = updated {
            return Ok(VerifyOutcome::Verified(row.into_domain()?));
        }

        // No row updated: either already verified or unknown id.
        match self.get_purchase(id).await? {
            Some(purchase) => Ok(VerifyOutcome::AlreadyVerified(purchase)),
            None => Ok(VerifyOutcome::NotFound),
        }
    }

    async fn clear_all(&self) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM purchases")
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM accounts")
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

/// Internal row types for SQLx. Not exposed outside this backend.
#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    username: String,
    email: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl AccountRow {
    fn into_domain(self) -> Account {
        Account {
            id: self.id,
            username: self.username,
            email: self.email,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PurchaseRow {
    id: Uuid,
    username: String,
    email: String,
    minecraft_username: String,
    items: serde_json::Value,
    amount: bigdecimal::BigDecimal,
    provider: String,
    status: String,
    verification_status: String,
    ip: String,
    transaction_id: String,
    phone_number: String,
    currency: String,
    submitted_at: Option<chrono::DateTime<chrono::Utc>>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl PurchaseRow {
    fn into_domain(self) -> Result<Purchase, StoreError> {
        let items: Vec<PurchaseItem> =
            serde_json::from_value(self.items).map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Purchase {
            id: self.id,
            username: self.username,
            email: self.email,
            minecraft_username: self.minecraft_username,
            items,
            amount: self.amount,
            provider: self.provider.parse().map_err(StoreError::Database)?,
            status: self.status.parse().map_err(StoreError::Database)?,
            verification_status: self
                .verification_status
                .parse()
                .map_err(StoreError::Database)?,
            ip: self.ip,
            transaction_id: self.transaction_id,
            phone_number: self.phone_number,
            currency: self.currency,
            submitted_at: self.submitted_at,
            created_at: self.created_at,
        })
    }
}
