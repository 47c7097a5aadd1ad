//! Static item catalog for the storefront.
//!
//! Items are defined in code and immutable at runtime; discounts are applied
//! on top by the overlay in [`crate::pricing`], never written back here.

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Ranks,
    Keys,
    Coins,
}

#[derive(Debug, Clone, Serialize)]
pub struct Item {
    pub id: &'static str,
    pub category: Category,
    pub name: &'static str,
    /// Whole NPR; the canonical unit for all stored amounts.
    pub base_price: i64,
    pub description: &'static str,
    pub image: &'static str,
}

const fn item(
    id: &'static str,
    category: Category,
    name: &'static str,
    base_price: i64,
    description: &'static str,
    image: &'static str,
) -> Item {
    Item {
        id,
        category,
        name,
        base_price,
        description,
        image,
    }
}

pub fn all_items() -> &'static [Item] {
    static ITEMS: OnceLock<Vec<Item>> = OnceLock::new();
    ITEMS.get_or_init(|| {
        vec![
            // Ranks
            item(
                "vip",
                Category::Ranks,
                "VIP Rank",
                100,
                "VIP Chat Tag, 2 Home Points, Access to /fly",
                "vip-r.png",
            ),
            item(
                "mvp",
                Category::Ranks,
                "ELITE Rank",
                200,
                "ELITE Chat Tag, 5 Home Points, Access to /fly",
                "elite-r.png",
            ),
            item(
                "pro",
                Category::Ranks,
                "NINJA Rank",
                350,
                "NINJA Chat Tag, 8 Home Points, All Basic Commands",
                "king-r.png",
            ),
            item(
                "elite",
                Category::Ranks,
                "KING Rank",
                500,
                "KING Chat Tag, 12 Home Points, All Commands",
                "infinity-r.png",
            ),
            item(
                "legend",
                Category::Ranks,
                "Infinity Rank",
                1000,
                "INFINITY Chat Tag, Unlimited Homes, All Features",
                "boss-r.png",
            ),
            // Crate keys
            item(
                "manaslu-key",
                Category::Keys,
                "Manaslu Key",
                30,
                "Opens Common Crates with guaranteed basic rewards",
                "terai.png",
            ),
            item(
                "makalu-key",
                Category::Keys,
                "Makalu Key",
                40,
                "Opens Rare Crates with enchanted items",
                "pahadi.png",
            ),
            item(
                "lhotse-key",
                Category::Keys,
                "Lhotse Key",
                50,
                "Opens Epic Crates with premium drops and cosmetics",
                "himali.png",
            ),
            item(
                "infinity-key",
                Category::Keys,
                "Infinity Key",
                60,
                "Opens Infinity Crates with the highest tier rewards",
                "infinity.png",
            ),
            // Coin bundles
            item(
                "coins-1000",
                Category::Coins,
                "1,000 Coins",
                100,
                "1,000 in-game coins, stackable with other packs",
                "pile.png",
            ),
            item(
                "coins-2000",
                Category::Coins,
                "2,000 Coins",
                200,
                "2,000 in-game coins, great value pack",
                "pouch.png",
            ),
            item(
                "coins-3000",
                Category::Coins,
                "3,000 Coins",
                300,
                "3,000 in-game coins, premium bundle",
                "bucket.png",
            ),
            item(
                "coins-4000",
                Category::Coins,
                "4,000 Coins",
                400,
                "4,000 in-game coins, large currency pack",
                "chest.png",
            ),
            item(
                "coins-5000",
                Category::Coins,
                "5,000 Coins",
                500,
                "5,000 in-game coins, maximum value pack",
                "vault.png",
            ),
        ]
    })
}

pub fn find_item(id: &str) -> Option<&'static Item> {
    all_items().iter().find(|it| it.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalog_ids_are_unique() {
        let mut seen = HashSet::new();
        for it in all_items() {
            assert!(seen.insert(it.id), "duplicate catalog id: {}", it.id);
        }
    }

    #[test]
    fn finds_known_item() {
        let vip = find_item("vip").expect("vip should exist");
        assert_eq!(vip.name, "VIP Rank");
        assert_eq!(vip.base_price, 100);
        assert_eq!(vip.category, Category::Ranks);
    }

    #[test]
    fn unknown_item_is_none() {
        assert!(find_item("no-such-item").is_none());
    }

    #[test]
    fn all_prices_are_positive() {
        assert!(all_items().iter().all(|it| it.base_price > 0));
    }
}
