//! Coupon Model

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::util::double_option;

/// Discount calculation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum DiscountType {
    Percentage,
    Fixed,
}

/// Coupon entity
///
/// `restaurant_id = None` means a platform-wide coupon managed by
/// super-admins.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Coupon {
    pub id: i64,
    pub restaurant_id: Option<i64>,
    /// Upper-cased
    pub code: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: f64,
    pub max_discount: Option<f64>,
    pub min_order_amount: f64,
    pub usage_limit: Option<i64>,
    pub used_count: i64,
    pub per_customer_limit: Option<i64>,
    pub first_order_only: bool,
    pub valid_from: Option<i64>,
    pub valid_until: Option<i64>,
    pub is_active: bool,
    pub created_at: i64,
}

/// Create coupon payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CouponCreate {
    #[validate(length(min = 3, max = 32))]
    pub code: String,
    #[validate(length(max = 255))]
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: f64,
    #[validate(range(min = 0.0))]
    pub max_discount: Option<f64>,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub min_order_amount: f64,
    #[validate(range(min = 1))]
    pub usage_limit: Option<i64>,
    #[validate(range(min = 1))]
    pub per_customer_limit: Option<i64>,
    #[serde(default)]
    pub first_order_only: bool,
    pub valid_from: Option<i64>,
    pub valid_until: Option<i64>,
}

/// Update coupon payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CouponUpdate {
    #[validate(length(max = 255))]
    pub description: Option<String>,
    pub discount_type: Option<DiscountType>,
    pub discount_value: Option<f64>,
    /// `null` removes the cap
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0))]
    pub max_discount: Option<Option<f64>>,
    #[validate(range(min = 0.0))]
    pub min_order_amount: Option<f64>,
    /// `null` removes the limit
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1))]
    pub usage_limit: Option<Option<i64>>,
    /// `null` removes the limit
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1))]
    pub per_customer_limit: Option<Option<i64>>,
    pub first_order_only: Option<bool>,
    pub valid_from: Option<i64>,
    /// `null` makes the coupon open-ended
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<Option<i64>>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_tells_null_from_absent() {
        let patch: CouponUpdate =
            serde_json::from_str(r#"{"max_discount": null, "usage_limit": 5}"#).unwrap();
        assert_eq!(patch.max_discount, Some(None));
        assert_eq!(patch.usage_limit, Some(Some(5)));
        assert_eq!(patch.per_customer_limit, None);
        assert_eq!(patch.valid_until, None);
        assert!(patch.validate().is_ok());

        let patch: CouponUpdate = serde_json::from_str(r#"{"usage_limit": 0}"#).unwrap();
        assert!(patch.validate().is_err());
    }
}
