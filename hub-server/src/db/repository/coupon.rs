//! Coupon Repository
//!
//! `scope` is the owning restaurant; `None` addresses platform coupons.

use super::{RepoError, RepoResult};
use shared::error::ErrorCode;
use shared::models::{Coupon, CouponCreate, CouponUpdate, DiscountType};
use shared::util::{normalize_code, now_millis, snowflake_id};
use sqlx::{SqliteExecutor, SqlitePool};

const COLUMNS: &str = "id, restaurant_id, code, description, discount_type, discount_value, max_discount, min_order_amount, usage_limit, used_count, per_customer_limit, first_order_only, valid_from, valid_until, is_active, created_at";

fn not_found(id: i64) -> RepoError {
    RepoError::Business(ErrorCode::CouponNotFound, format!("Coupon {id} not found"))
}

/// Percentage in (0, 100], fixed amount > 0
fn check_value(discount_type: DiscountType, value: f64) -> RepoResult<()> {
    let ok = match discount_type {
        DiscountType::Percentage => value > 0.0 && value <= 100.0,
        DiscountType::Fixed => value > 0.0 && value.is_finite(),
    };
    if ok {
        Ok(())
    } else {
        Err(RepoError::Business(
            ErrorCode::InvalidDiscount,
            format!("Invalid discount value {value}"),
        ))
    }
}

fn check_window(from: Option<i64>, until: Option<i64>) -> RepoResult<()> {
    match (from, until) {
        (Some(f), Some(u)) if f >= u => Err(RepoError::Validation(
            "valid_from must be before valid_until".into(),
        )),
        _ => Ok(()),
    }
}

pub async fn list(pool: &SqlitePool, scope: Option<i64>) -> RepoResult<Vec<Coupon>> {
    let rows = sqlx::query_as::<_, Coupon>(&format!(
        "SELECT {COLUMNS} FROM coupon WHERE restaurant_id IS ? ORDER BY created_at DESC"
    ))
    .bind(scope)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn get(pool: &SqlitePool, scope: Option<i64>, id: i64) -> RepoResult<Coupon> {
    sqlx::query_as::<_, Coupon>(&format!(
        "SELECT {COLUMNS} FROM coupon WHERE id = ? AND restaurant_id IS ?"
    ))
    .bind(id)
    .bind(scope)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| not_found(id))
}

/// Resolve a code entered at a restaurant's cart
///
/// The restaurant's own coupon wins over a platform coupon with the same
/// code; a coupon of another restaurant is still returned so the caller can
/// report it as not applicable.
pub async fn find_for_restaurant<'e>(
    ex: impl SqliteExecutor<'e>,
    restaurant_id: i64,
    code: &str,
) -> RepoResult<Option<Coupon>> {
    let coupon = sqlx::query_as::<_, Coupon>(&format!(
        "SELECT {COLUMNS} FROM coupon WHERE code = ?1 \
         ORDER BY CASE WHEN restaurant_id = ?2 THEN 0 WHEN restaurant_id IS NULL THEN 1 ELSE 2 END \
         LIMIT 1"
    ))
    .bind(normalize_code(code))
    .bind(restaurant_id)
    .fetch_optional(ex)
    .await?;
    Ok(coupon)
}

pub async fn create(pool: &SqlitePool, scope: Option<i64>, data: &CouponCreate) -> RepoResult<Coupon> {
    check_value(data.discount_type, data.discount_value)?;
    check_window(data.valid_from, data.valid_until)?;

    let id = snowflake_id();
    let code = normalize_code(&data.code);
    sqlx::query(
        "INSERT INTO coupon (id, restaurant_id, code, description, discount_type, discount_value, max_discount, min_order_amount, usage_limit, used_count, per_customer_limit, first_order_only, valid_from, valid_until, is_active, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?, ?, ?, 1, ?)",
    )
    .bind(id)
    .bind(scope)
    .bind(&code)
    .bind(&data.description)
    .bind(data.discount_type)
    .bind(data.discount_value)
    .bind(data.max_discount)
    .bind(data.min_order_amount)
    .bind(data.usage_limit)
    .bind(data.per_customer_limit)
    .bind(data.first_order_only)
    .bind(data.valid_from)
    .bind(data.valid_until)
    .bind(now_millis())
    .execute(pool)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(_) => RepoError::Business(
            ErrorCode::CouponCodeExists,
            format!("Coupon code '{code}' already exists"),
        ),
        other => other,
    })?;

    get(pool, scope, id).await
}

pub async fn update(
    pool: &SqlitePool,
    scope: Option<i64>,
    id: i64,
    data: &CouponUpdate,
) -> RepoResult<Coupon> {
    let current = get(pool, scope, id).await?;
    check_value(
        data.discount_type.unwrap_or(current.discount_type),
        data.discount_value.unwrap_or(current.discount_value),
    )?;
    check_window(
        data.valid_from.or(current.valid_from),
        data.valid_until.unwrap_or(current.valid_until),
    )?;

    // Nullable columns take a set flag so an explicit null clears them
    sqlx::query(
        "UPDATE coupon SET \
         description = COALESCE(?1, description), discount_type = COALESCE(?2, discount_type), discount_value = COALESCE(?3, discount_value), \
         max_discount = CASE WHEN ?4 THEN ?5 ELSE max_discount END, min_order_amount = COALESCE(?6, min_order_amount), \
         usage_limit = CASE WHEN ?7 THEN ?8 ELSE usage_limit END, per_customer_limit = CASE WHEN ?9 THEN ?10 ELSE per_customer_limit END, \
         first_order_only = COALESCE(?11, first_order_only), valid_from = COALESCE(?12, valid_from), \
         valid_until = CASE WHEN ?13 THEN ?14 ELSE valid_until END, is_active = COALESCE(?15, is_active) \
         WHERE id = ?16",
    )
    .bind(&data.description)
    .bind(data.discount_type)
    .bind(data.discount_value)
    .bind(data.max_discount.is_some())
    .bind(data.max_discount.flatten())
    .bind(data.min_order_amount)
    .bind(data.usage_limit.is_some())
    .bind(data.usage_limit.flatten())
    .bind(data.per_customer_limit.is_some())
    .bind(data.per_customer_limit.flatten())
    .bind(data.first_order_only)
    .bind(data.valid_from)
    .bind(data.valid_until.is_some())
    .bind(data.valid_until.flatten())
    .bind(data.is_active)
    .bind(id)
    .execute(pool)
    .await?;

    get(pool, scope, id).await
}

pub async fn delete(pool: &SqlitePool, scope: Option<i64>, id: i64) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM coupon WHERE id = ? AND restaurant_id IS ?")
        .bind(id)
        .bind(scope)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(not_found(id));
    }
    Ok(())
}

/// Number of times the customer redeemed the coupon
pub async fn customer_usage<'e>(
    ex: impl SqliteExecutor<'e>,
    coupon_id: i64,
    customer_id: i64,
) -> RepoResult<i64> {
    let n = sqlx::query_scalar(
        "SELECT COUNT(*) FROM coupon_usage WHERE coupon_id = ? AND customer_id = ?",
    )
    .bind(coupon_id)
    .bind(customer_id)
    .fetch_one(ex)
    .await?;
    Ok(n)
}

/// Whether the customer has any order that was not cancelled
pub async fn customer_has_orders<'e>(
    ex: impl SqliteExecutor<'e>,
    customer_id: i64,
) -> RepoResult<bool> {
    let n: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM orders WHERE customer_id = ? AND status != 'cancelled'",
    )
    .bind(customer_id)
    .fetch_one(ex)
    .await?;
    Ok(n > 0)
}

/// Count one redemption
///
/// The increment is guarded by the usage limit so two concurrent placements
/// cannot both take the last use.
pub async fn record_usage(
    conn: &mut sqlx::SqliteConnection,
    coupon_id: i64,
    customer_id: i64,
    order_id: i64,
    discount: f64,
) -> RepoResult<()> {
    let rows = sqlx::query(
        "UPDATE coupon SET used_count = used_count + 1 WHERE id = ? AND (usage_limit IS NULL OR used_count < usage_limit)",
    )
    .bind(coupon_id)
    .execute(&mut *conn)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::Business(
            ErrorCode::CouponUsageLimitReached,
            "Coupon usage limit reached".into(),
        ));
    }

    sqlx::query(
        "INSERT INTO coupon_usage (id, coupon_id, customer_id, order_id, discount, created_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(snowflake_id())
    .bind(coupon_id)
    .bind(customer_id)
    .bind(order_id)
    .bind(discount)
    .bind(now_millis())
    .execute(&mut *conn)
    .await?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::repository::order::{self, tests::placed};
    use crate::db::repository::restaurant::tests::approved;
    use crate::db::repository::customer;
    use shared::models::OrderStatus;

    pub(crate) fn percent(code: &str, value: f64) -> CouponCreate {
        CouponCreate {
            code: code.into(),
            description: None,
            discount_type: DiscountType::Percentage,
            discount_value: value,
            max_discount: None,
            min_order_amount: 0.0,
            usage_limit: None,
            per_customer_limit: None,
            first_order_only: false,
            valid_from: None,
            valid_until: None,
        }
    }

    #[tokio::test]
    async fn codes_are_unique_per_scope() {
        let db = DbService::in_memory().await.unwrap();
        let (a, _) = approved(&db.pool, "a").await;
        let (b, _) = approved(&db.pool, "b").await;

        let c = create(&db.pool, Some(a.id), &percent("save10", 10.0)).await.unwrap();
        assert_eq!(c.code, "SAVE10");
        create(&db.pool, Some(b.id), &percent("SAVE10", 10.0)).await.unwrap();
        create(&db.pool, None, &percent("SAVE10", 5.0)).await.unwrap();

        let err = create(&db.pool, Some(a.id), &percent("Save10", 20.0))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::CouponCodeExists, _)));
        let err = create(&db.pool, None, &percent("SAVE10", 20.0)).await.unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::CouponCodeExists, _)));

        assert_eq!(list(&db.pool, None).await.unwrap().len(), 1);
        assert_eq!(list(&db.pool, Some(a.id)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn restaurant_coupon_wins_lookup() {
        let db = DbService::in_memory().await.unwrap();
        let (a, _) = approved(&db.pool, "a").await;
        let (b, _) = approved(&db.pool, "b").await;
        create(&db.pool, None, &percent("WELCOME", 5.0)).await.unwrap();
        let own = create(&db.pool, Some(a.id), &percent("WELCOME", 15.0)).await.unwrap();
        let foreign = create(&db.pool, Some(b.id), &percent("BONLY", 15.0)).await.unwrap();

        let found = find_for_restaurant(&db.pool, a.id, "welcome").await.unwrap().unwrap();
        assert_eq!(found.id, own.id);
        let found = find_for_restaurant(&db.pool, b.id, "WELCOME").await.unwrap().unwrap();
        assert_eq!(found.restaurant_id, None);
        let found = find_for_restaurant(&db.pool, a.id, "BONLY").await.unwrap().unwrap();
        assert_eq!(found.id, foreign.id);
        assert!(find_for_restaurant(&db.pool, a.id, "NOPE").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn invalid_values_rejected() {
        let db = DbService::in_memory().await.unwrap();
        let err = create(&db.pool, None, &percent("BIG", 120.0)).await.unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::InvalidDiscount, _)));

        let c = create(&db.pool, None, &percent("OK", 50.0)).await.unwrap();
        let err = update(
            &db.pool,
            None,
            c.id,
            &CouponUpdate {
                discount_value: Some(0.0),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::InvalidDiscount, _)));
    }

    #[tokio::test]
    async fn scope_isolates_management() {
        let db = DbService::in_memory().await.unwrap();
        let (a, _) = approved(&db.pool, "a").await;
        let platform = create(&db.pool, None, &percent("P", 5.0)).await.unwrap();
        let err = delete(&db.pool, Some(a.id), platform.id).await.unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::CouponNotFound, _)));
        delete(&db.pool, None, platform.id).await.unwrap();
    }

    #[tokio::test]
    async fn usage_is_counted_per_customer() {
        let db = DbService::in_memory().await.unwrap();
        let (a, _) = approved(&db.pool, "a").await;
        let kim = customer::create(&db.pool, "Kim", "kim@mail.com", None, "h").await.unwrap();
        let lee = customer::create(&db.pool, "Lee", "lee@mail.com", None, "h").await.unwrap();
        let mut limited = percent("TWICE", 10.0);
        limited.usage_limit = Some(2);
        let c = create(&db.pool, Some(a.id), &limited).await.unwrap();

        let mut conn = db.pool.acquire().await.unwrap();
        record_usage(&mut conn, c.id, kim.id, 1, 1.5).await.unwrap();
        record_usage(&mut conn, c.id, lee.id, 2, 1.5).await.unwrap();
        let err = record_usage(&mut conn, c.id, kim.id, 3, 1.5).await.unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::CouponUsageLimitReached, _)));
        drop(conn);

        assert_eq!(customer_usage(&db.pool, c.id, kim.id).await.unwrap(), 1);
        assert_eq!(customer_usage(&db.pool, c.id, lee.id).await.unwrap(), 1);
        assert_eq!(get(&db.pool, Some(a.id), c.id).await.unwrap().used_count, 2);
    }

    #[tokio::test]
    async fn cancelled_orders_do_not_make_a_returning_customer() {
        let db = DbService::in_memory().await.unwrap();
        let (a, _) = approved(&db.pool, "a").await;
        let kim = customer::create(&db.pool, "Kim", "kim@mail.com", None, "h").await.unwrap();
        assert!(!customer_has_orders(&db.pool, kim.id).await.unwrap());

        let first = placed(&db.pool, a.id, kim.id, "R0001-20260101-001").await.unwrap();
        assert!(customer_has_orders(&db.pool, kim.id).await.unwrap());

        order::set_status(&db.pool, &first, OrderStatus::Cancelled).await.unwrap();
        assert!(!customer_has_orders(&db.pool, kim.id).await.unwrap());

        placed(&db.pool, a.id, kim.id, "R0001-20260101-002").await.unwrap();
        assert!(customer_has_orders(&db.pool, kim.id).await.unwrap());
    }

    #[tokio::test]
    async fn explicit_null_clears_limits() {
        let db = DbService::in_memory().await.unwrap();
        let mut capped = percent("CAP", 20.0);
        capped.max_discount = Some(5.0);
        capped.usage_limit = Some(10);
        capped.per_customer_limit = Some(1);
        capped.valid_until = Some(i64::MAX);
        let c = create(&db.pool, None, &capped).await.unwrap();

        // Absent fields keep their value
        let kept = update(
            &db.pool,
            None,
            c.id,
            &CouponUpdate {
                description: Some("Weekend".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(kept.max_discount, Some(5.0));
        assert_eq!(kept.usage_limit, Some(10));

        let patch: CouponUpdate = serde_json::from_str(
            r#"{"max_discount": null, "usage_limit": null, "per_customer_limit": 3, "valid_until": null}"#,
        )
        .unwrap();
        let cleared = update(&db.pool, None, c.id, &patch).await.unwrap();
        assert_eq!(cleared.max_discount, None);
        assert_eq!(cleared.usage_limit, None);
        assert_eq!(cleared.per_customer_limit, Some(3));
        assert_eq!(cleared.valid_until, None);
        assert_eq!(cleared.description.as_deref(), Some("Weekend"));
    }
}
