//! Cart Models

use serde::{Deserialize, Serialize};
use validator::Validate;

/// What a cart / order line refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum LineKind {
    Item,
    Combo,
}

/// Addon snapshot carried on a line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineAddon {
    pub id: i64,
    pub name: String,
    pub price: f64,
}

/// Stored cart line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CartLine {
    pub id: i64,
    pub kind: LineKind,
    pub ref_id: i64,
    pub name: String,
    pub unit_price: f64,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub addons: Vec<LineAddon>,
    pub quantity: i32,
    pub note: Option<String>,
}

impl CartLine {
    /// Sorted addon ids, the addon identity of a line
    pub fn addon_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.addons.iter().map(|a| a.id).collect();
        ids.sort_unstable();
        ids
    }
}

/// Order line snapshot (stored as JSON on order requests and orders)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub kind: LineKind,
    pub ref_id: i64,
    pub name: String,
    pub unit_price: f64,
    pub addons: Vec<LineAddon>,
    pub quantity: i32,
    pub note: Option<String>,
    pub line_total: f64,
}

/// Cart with totals computed at read time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartView {
    pub restaurant_id: Option<i64>,
    pub lines: Vec<CartLineView>,
    pub coupon_code: Option<String>,
    /// Why the stored coupon currently grants nothing
    pub coupon_error: Option<String>,
    pub subtotal: f64,
    pub discount: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLineView {
    #[serde(flatten)]
    pub line: CartLine,
    pub line_total: f64,
}

/// Add-to-cart payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CartLineAdd {
    pub restaurant_id: i64,
    pub kind: LineKind,
    pub ref_id: i64,
    #[serde(default)]
    pub addon_ids: Vec<i64>,
    #[validate(range(min = 1, max = 99))]
    pub quantity: i32,
    #[validate(length(max = 255))]
    pub note: Option<String>,
}

/// Change line quantity
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CartLineUpdate {
    #[validate(range(min = 1, max = 99))]
    pub quantity: i32,
}

/// Apply coupon payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ApplyCoupon {
    #[validate(length(min = 1, max = 32))]
    pub code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addon_ids_are_sorted() {
        let line = CartLine {
            id: 1,
            kind: LineKind::Item,
            ref_id: 10,
            name: "Burger".into(),
            unit_price: 8.5,
            addons: vec![
                LineAddon { id: 9, name: "Bacon".into(), price: 1.5 },
                LineAddon { id: 3, name: "Cheese".into(), price: 1.0 },
            ],
            quantity: 1,
            note: None,
        };
        assert_eq!(line.addon_ids(), vec![3, 9]);
    }
}
