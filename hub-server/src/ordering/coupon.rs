//! Coupon eligibility and discount
//!
//! Checks run in a fixed order and the first failing one decides the error:
//! active, validity window, restaurant scope, minimum order, global usage
//! limit, per-customer limit, first order only.

use crate::db::repository::coupon as coupon_repo;
use crate::utils::money::{round, to_decimal};
use rust_decimal::Decimal;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Coupon, DiscountType};
use sqlx::SqliteConnection;

/// Per-customer counters a coupon is checked against
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomerHistory {
    /// Redemptions of this coupon by the customer
    pub coupon_uses: i64,
    /// Customer has an order that was not cancelled
    pub has_orders: bool,
}

/// Run all eligibility checks
pub fn check_eligibility(
    coupon: &Coupon,
    restaurant_id: i64,
    subtotal: Decimal,
    history: CustomerHistory,
    now: i64,
) -> Result<(), ErrorCode> {
    if !coupon.is_active {
        return Err(ErrorCode::CouponInactive);
    }
    if coupon.valid_from.is_some_and(|from| now < from) {
        return Err(ErrorCode::CouponNotStarted);
    }
    if coupon.valid_until.is_some_and(|until| now > until) {
        return Err(ErrorCode::CouponExpired);
    }
    if coupon.restaurant_id.is_some_and(|r| r != restaurant_id) {
        return Err(ErrorCode::CouponNotApplicable);
    }
    if subtotal < to_decimal(coupon.min_order_amount) {
        return Err(ErrorCode::CouponMinOrderNotMet);
    }
    if coupon.usage_limit.is_some_and(|limit| coupon.used_count >= limit) {
        return Err(ErrorCode::CouponUsageLimitReached);
    }
    if coupon
        .per_customer_limit
        .is_some_and(|limit| history.coupon_uses >= limit)
    {
        return Err(ErrorCode::CouponCustomerLimitReached);
    }
    if coupon.first_order_only && history.has_orders {
        return Err(ErrorCode::CouponFirstOrderOnly);
    }
    Ok(())
}

/// Discount granted on `subtotal`
///
/// Percentage is capped by `max_discount`; both kinds are clamped to the
/// subtotal and rounded to 2 dp.
pub fn discount_amount(coupon: &Coupon, subtotal: Decimal) -> Decimal {
    let raw = match coupon.discount_type {
        DiscountType::Percentage => {
            let pct = subtotal * to_decimal(coupon.discount_value) / Decimal::ONE_HUNDRED;
            match coupon.max_discount {
                Some(cap) => pct.min(to_decimal(cap)),
                None => pct,
            }
        }
        DiscountType::Fixed => to_decimal(coupon.discount_value),
    };
    round(raw.clamp(Decimal::ZERO, subtotal.max(Decimal::ZERO)))
}

/// Human readable reason for an eligibility failure
pub fn rejection_message(code: ErrorCode, coupon: &Coupon) -> String {
    match code {
        ErrorCode::CouponMinOrderNotMet => format!(
            "Minimum order amount for {} is {:.2}",
            coupon.code, coupon.min_order_amount
        ),
        other => other.message().to_string(),
    }
}

/// A coupon that passed every check
#[derive(Debug, Clone)]
pub struct AppliedCoupon {
    pub coupon: Coupon,
    pub discount: Decimal,
}

/// Resolve `code` for a cart and run the checks against stored counters
pub async fn evaluate(
    conn: &mut SqliteConnection,
    code: &str,
    restaurant_id: i64,
    customer_id: i64,
    subtotal: Decimal,
    now: i64,
) -> AppResult<AppliedCoupon> {
    let coupon = coupon_repo::find_for_restaurant(&mut *conn, restaurant_id, code)
        .await?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::CouponNotFound, format!("Coupon '{code}' not found"))
        })?;

    let history = CustomerHistory {
        coupon_uses: coupon_repo::customer_usage(&mut *conn, coupon.id, customer_id).await?,
        has_orders: if coupon.first_order_only {
            coupon_repo::customer_has_orders(&mut *conn, customer_id).await?
        } else {
            false
        },
    };

    check_eligibility(&coupon, restaurant_id, subtotal, history, now).map_err(|code| {
        AppError::with_message(code, rejection_message(code, &coupon))
            .with_detail("coupon_code", coupon.code.clone())
    })?;

    let discount = discount_amount(&coupon, subtotal);
    Ok(AppliedCoupon { coupon, discount })
}
