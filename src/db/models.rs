use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(username: String, email: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            email,
            created_at: Utc::now(),
        }
    }
}

/// Payment providers the storefront accepts references for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Esewa,
    Khalti,
    Paypal,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Esewa => "esewa",
            Provider::Khalti => "khalti",
            Provider::Paypal => "paypal",
        }
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "esewa" => Ok(Provider::Esewa),
            "khalti" => Ok(Provider::Khalti),
            "paypal" => Ok(Provider::Paypal),
            other => Err(format!("unknown payment provider: {}", other)),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseStatus {
    Pending,
    Unverified,
    Completed,
    Failed,
    Verified,
}

impl PurchaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseStatus::Pending => "pending",
            PurchaseStatus::Unverified => "unverified",
            PurchaseStatus::Completed => "completed",
            PurchaseStatus::Failed => "failed",
            PurchaseStatus::Verified => "verified",
        }
    }
}

impl FromStr for PurchaseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PurchaseStatus::Pending),
            "unverified" => Ok(PurchaseStatus::Unverified),
            "completed" => Ok(PurchaseStatus::Completed),
            "failed" => Ok(PurchaseStatus::Failed),
            "verified" => Ok(PurchaseStatus::Verified),
            other => Err(format!("unknown purchase status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Unverified,
    Verified,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Unverified => "unverified",
            VerificationStatus::Verified => "verified",
        }
    }
}

impl FromStr for VerificationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unverified" => Ok(VerificationStatus::Unverified),
            "verified" => Ok(VerificationStatus::Verified),
            other => Err(format!("unknown verification status: {}", other)),
        }
    }
}

/// One cart line as frozen into a purchase at checkout time. Catalog or
/// discount changes after submission never touch these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseItem {
    pub id: String,
    pub name: String,
    pub quantity: i64,
    pub unit_price: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Purchase {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub minecraft_username: String,
    pub items: Vec<PurchaseItem>,
    pub amount: BigDecimal,
    pub provider: Provider,
    pub status: PurchaseStatus,
    pub verification_status: VerificationStatus,
    pub ip: String,
    pub transaction_id: String,
    pub phone_number: String,
    pub currency: String,
    pub submitted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Purchase {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        username: String,
        email: String,
        items: Vec<PurchaseItem>,
        amount: BigDecimal,
        provider: Provider,
        transaction_id: String,
        phone_number: String,
        currency: String,
        ip: String,
        submitted_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            minecraft_username: username.clone(),
            username,
            email,
            items,
            amount,
            provider,
            status: PurchaseStatus::Unverified,
            verification_status: VerificationStatus::Unverified,
            ip,
            transaction_id,
            phone_number,
            currency,
            submitted_at,
            created_at: Utc::now(),
        }
    }
}
