//! Discount overlay and price computation.
//!
//! Catalog prices are immutable; sales live in a process-wide overlay that is
//! consulted at render and checkout time. Pricing itself is done over a
//! [`DiscountSnapshot`] so the math stays pure and testable. Discounts are
//! memory-only and reset on restart. Concurrent admin writes to the same entry
//! are last-write-wins.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::catalog::Item;

/// Sales above this cut are rejected as validation errors, never clamped.
pub const MAX_SALE_PERCENTAGE: i64 = 90;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSale {
    pub percentage: u8,
    pub applied_at: DateTime<Utc>,
}

/// Immutable view of the overlay taken at the start of a request.
#[derive(Debug, Clone, Default)]
pub struct DiscountSnapshot {
    pub global: Option<u8>,
    pub products: HashMap<String, ProductSale>,
}

impl DiscountSnapshot {
    /// A per-product sale overrides the global one when both are set.
    pub fn percentage_for(&self, item_id: &str) -> Option<u8> {
        self.products
            .get(item_id)
            .map(|sale| sale.percentage)
            .or(self.global)
    }

    pub fn effective_price(&self, item: &Item) -> i64 {
        match self.percentage_for(item.id) {
            Some(pct) => discounted_price(item.base_price, pct),
            None => item.base_price,
        }
    }
}

/// `round(base * (1 - pct/100))`, half-up, in whole NPR.
pub fn discounted_price(base_price: i64, percentage: u8) -> i64 {
    (base_price * (100 - i64::from(percentage)) + 50) / 100
}

#[derive(Clone, Default)]
pub struct DiscountOverlay {
    inner: Arc<RwLock<DiscountSnapshot>>,
}

impl DiscountOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> DiscountSnapshot {
        self.inner.read().await.clone()
    }

    pub async fn set_global(&self, percentage: u8) {
        self.inner.write().await.global = Some(percentage);
        tracing::info!("applied {}% global sale", percentage);
    }

    pub async fn clear_global(&self) {
        self.inner.write().await.global = None;
        tracing::info!("removed global sale");
    }

    pub async fn set_product(&self, product_id: &str, percentage: u8) {
        let mut inner = self.inner.write().await;
        inner.products.insert(
            product_id.to_string(),
            ProductSale {
                percentage,
                applied_at: Utc::now(),
            },
        );
        tracing::info!("applied {}% sale to product {}", percentage, product_id);
    }

    pub async fn clear_product(&self, product_id: &str) {
        self.inner.write().await.products.remove(product_id);
        tracing::info!("removed sale from product {}", product_id);
    }

    pub async fn product_sales(&self) -> HashMap<String, ProductSale> {
        self.inner.read().await.products.clone()
    }
}

/// One cart line as submitted by the client.
#[derive(Debug, Clone, serde::Deserialize, Serialize)]
pub struct CartLine {
    pub id: String,
    pub quantity: i64,
}

/// A cart line priced against the current catalog and overlay state.
#[derive(Debug, Clone, Serialize)]
pub struct PricedLine {
    pub id: String,
    pub name: String,
    pub quantity: i64,
    pub unit_price: i64,
    pub line_total: i64,
    /// False when the item id is no longer in the catalog; such lines
    /// price at zero instead of failing the whole cart.
    pub valid: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PricedCart {
    pub lines: Vec<PricedLine>,
    pub total: i64,
}

/// Prices a cart fresh against the given overlay snapshot. Pure.
pub fn price_cart(lines: &[CartLine], discounts: &DiscountSnapshot) -> PricedCart {
    let mut priced = Vec::with_capacity(lines.len());
    let mut total = 0;

    for line in lines {
        let quantity = line.quantity.max(1);
        match crate::catalog::find_item(&line.id) {
            Some(item) => {
                let unit_price = discounts.effective_price(item);
                let line_total = unit_price * quantity;
                total += line_total;
                priced.push(PricedLine {
                    id: line.id.clone(),
                    name: item.name.to_string(),
                    quantity,
                    unit_price,
                    line_total,
                    valid: true,
                });
            }
            None => priced.push(PricedLine {
                id: line.id.clone(),
                name: line.id.clone(),
                quantity,
                unit_price: 0,
                line_total: 0,
                valid: false,
            }),
        }
    }

    PricedCart {
        lines: priced,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::find_item;

    #[test]
    fn discounted_price_rounds_half_up() {
        assert_eq!(discounted_price(100, 20), 80);
        assert_eq!(discounted_price(30, 33), 20); // 20.1 rounds down
        assert_eq!(discounted_price(99, 50), 50); // 49.5 rounds up
        assert_eq!(discounted_price(1000, 0), 1000);
        assert_eq!(discounted_price(1000, 90), 100);
    }

    #[test]
    fn discounted_price_is_monotonically_non_increasing() {
        for base in [1, 30, 99, 100, 350, 1000] {
            let mut previous = i64::MAX;
            for pct in 0..=90u8 {
                let price = discounted_price(base, pct);
                assert!(
                    price <= previous,
                    "price went up at base={} pct={}",
                    base,
                    pct
                );
                previous = price;
            }
        }
    }

    #[test]
    fn product_sale_overrides_global() {
        let mut discounts = DiscountSnapshot {
            global: Some(50),
            ..Default::default()
        };
        discounts.products.insert(
            "vip".to_string(),
            ProductSale {
                percentage: 20,
                applied_at: Utc::now(),
            },
        );

        let vip = find_item("vip").unwrap();
        let mvp = find_item("mvp").unwrap();
        assert_eq!(discounts.effective_price(vip), 80); // per-item 20%
        assert_eq!(discounts.effective_price(mvp), 100); // global 50%
    }

    #[test]
    fn cart_total_reflects_discounts_at_pricing_time() {
        let mut discounts = DiscountSnapshot::default();
        discounts.products.insert(
            "vip".to_string(),
            ProductSale {
                percentage: 20,
                applied_at: Utc::now(),
            },
        );

        let cart = price_cart(
            &[CartLine {
                id: "vip".to_string(),
                quantity: 3,
            }],
            &discounts,
        );

        assert_eq!(cart.total, 240);
        assert_eq!(cart.lines[0].unit_price, 80);
        assert!(cart.lines[0].valid);
    }

    #[test]
    fn unknown_item_prices_at_zero_and_is_flagged() {
        let cart = price_cart(
            &[
                CartLine {
                    id: "vip".to_string(),
                    quantity: 1,
                },
                CartLine {
                    id: "gone-item".to_string(),
                    quantity: 2,
                },
            ],
            &DiscountSnapshot::default(),
        );

        assert_eq!(cart.total, 100);
        assert!(!cart.lines[1].valid);
        assert_eq!(cart.lines[1].unit_price, 0);
    }

    #[tokio::test]
    async fn overlay_mutations_show_up_in_snapshots() {
        let overlay = DiscountOverlay::new();
        overlay.set_global(10).await;
        overlay.set_product("vip", 25).await;

        let snapshot = overlay.snapshot().await;
        assert_eq!(snapshot.global, Some(10));
        assert_eq!(snapshot.percentage_for("vip"), Some(25));
        assert_eq!(snapshot.percentage_for("mvp"), Some(10));

        overlay.clear_product("vip").await;
        overlay.clear_global().await;
        let snapshot = overlay.snapshot().await;
        assert_eq!(snapshot.percentage_for("vip"), None);
    }
}
