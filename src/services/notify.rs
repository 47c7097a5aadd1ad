//! Best-effort Discord webhook notifications for ledger events.
//!
//! Delivery is a side effect of the purchase flow, never part of its outcome:
//! every failure here is logged and swallowed, and an unconfigured webhook URL
//! just skips the send.

use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;

use crate::db::models::Purchase;

const EMBED_FOOTER: &str = "Infinity Realms Shop";
const COLOR_UNVERIFIED: u32 = 0x6366f1;
const COLOR_VERIFIED: u32 = 0x10b981;

#[derive(Clone)]
pub struct DiscordNotifier {
    client: Client,
    webhook_url: Option<String>,
    staff_role_id: Option<String>,
}

impl DiscordNotifier {
    pub fn new(webhook_url: Option<String>, staff_role_id: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            client,
            webhook_url,
            staff_role_id,
        }
    }

    pub async fn purchase_created(&self, purchase: &Purchase) {
        self.send_purchase_embed(purchase, false).await;
    }

    pub async fn purchase_verified(&self, purchase: &Purchase) {
        self.send_purchase_embed(purchase, true).await;
    }

    /// Plain broadcast message from the admin panel.
    pub async fn announce(&self, message: &str) {
        self.post(json!({ "content": message })).await;
    }

    async fn send_purchase_embed(&self, purchase: &Purchase, is_verified: bool) {
        let payload = build_purchase_payload(purchase, is_verified, self.staff_role_id.as_deref());
        self.post(payload).await;
    }

    async fn post(&self, payload: Value) {
        let Some(url) = &self.webhook_url else {
            tracing::info!("Discord webhook URL not configured, skipping notification");
            return;
        };

        match self.client.post(url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {
                tracing::info!("Discord notification sent");
            }
            Ok(response) => {
                tracing::error!("Discord webhook returned {}", response.status());
            }
            Err(e) => {
                tracing::error!("error sending Discord notification: {}", e);
            }
        }
    }
}

fn items_text(purchase: &Purchase) -> String {
    if purchase.items.is_empty() {
        return "Unknown items".to_string();
    }

    purchase
        .items
        .iter()
        .map(|item| format!("{} (x{})", item.name, item.quantity))
        .collect::<Vec<_>>()
        .join(", ")
}

fn build_purchase_payload(
    purchase: &Purchase,
    is_verified: bool,
    staff_role_id: Option<&str>,
) -> Value {
    let embed = json!({
        "title": if is_verified { "✅ Purchase Verified" } else { "🛒 New Purchase Completed" },
        "color": if is_verified { COLOR_VERIFIED } else { COLOR_UNVERIFIED },
        "fields": [
            { "name": "Username", "value": purchase.username, "inline": true },
            { "name": "Product Name", "value": items_text(purchase), "inline": true },
            { "name": "Paid Price", "value": format!("${}", purchase.amount), "inline": true },
            {
                "name": "Verification Status",
                "value": if is_verified { "Verified" } else { "Unverified" },
                "inline": false
            },
        ],
        "timestamp": purchase.created_at.to_rfc3339(),
        "footer": { "text": EMBED_FOOTER },
    });

    let mut payload = json!({ "embeds": [embed] });

    // Staff only get pinged for purchases still waiting on review.
    if let Some(role_id) = staff_role_id {
        if !is_verified {
            payload["content"] = json!(format!("<@&{}>", role_id));
        }
    }

    payload
}
