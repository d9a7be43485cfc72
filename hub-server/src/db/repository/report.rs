//! Report queries

use super::RepoResult;
use shared::models::{AdminSummary, RestaurantSummary, StatusCount};
use sqlx::SqlitePool;

pub async fn admin_summary(pool: &SqlitePool) -> RepoResult<AdminSummary> {
    let restaurants_by_status = sqlx::query_as::<_, StatusCount>(
        "SELECT status, COUNT(*) AS count FROM restaurant GROUP BY status ORDER BY status",
    )
    .fetch_all(pool)
    .await?;

    let customer_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customer")
        .fetch_one(pool)
        .await?;
    let order_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(pool)
        .await?;
    let revenue: f64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(total), 0.0) FROM orders WHERE payment_status = 'paid'",
    )
    .fetch_one(pool)
    .await?;

    Ok(AdminSummary {
        restaurants_by_status,
        customer_count,
        order_count,
        revenue: crate::utils::money::round_money(revenue),
    })
}

/// Figures of one restaurant over `[from, to)`
pub async fn restaurant_summary(
    pool: &SqlitePool,
    restaurant_id: i64,
    from: i64,
    to: i64,
) -> RepoResult<RestaurantSummary> {
    let requests_by_status = sqlx::query_as::<_, StatusCount>(
        "SELECT status, COUNT(*) AS count FROM order_request \
         WHERE restaurant_id = ? AND created_at >= ? AND created_at < ? GROUP BY status ORDER BY status",
    )
    .bind(restaurant_id)
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;

    let orders_by_status = sqlx::query_as::<_, StatusCount>(
        "SELECT status, COUNT(*) AS count FROM orders \
         WHERE restaurant_id = ? AND created_at >= ? AND created_at < ? GROUP BY status ORDER BY status",
    )
    .bind(restaurant_id)
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;

    let revenue: f64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(total), 0.0) FROM orders \
         WHERE restaurant_id = ? AND payment_status = 'paid' AND created_at >= ? AND created_at < ?",
    )
    .bind(restaurant_id)
    .bind(from)
    .bind(to)
    .fetch_one(pool)
    .await?;

    Ok(RestaurantSummary {
        restaurant_id,
        from,
        to,
        requests_by_status,
        orders_by_status,
        revenue: crate::utils::money::round_money(revenue),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::repository::restaurant::tests::{approved, register_payload};
    use crate::db::repository::{customer, order_request, restaurant};

    #[tokio::test]
    async fn admin_counts() {
        let db = DbService::in_memory().await.unwrap();
        approved(&db.pool, "a").await;
        restaurant::register(&db.pool, &register_payload("b"), "h").await.unwrap();
        customer::create(&db.pool, "Kim", "kim@mail.com", None, "h").await.unwrap();

        let s = admin_summary(&db.pool).await.unwrap();
        assert_eq!(
            s.restaurants_by_status,
            vec![
                StatusCount { status: "approved".into(), count: 1 },
                StatusCount { status: "pending".into(), count: 1 },
            ]
        );
        assert_eq!(s.customer_count, 1);
        assert_eq!(s.order_count, 0);
        assert_eq!(s.revenue, 0.0);
    }

    #[tokio::test]
    async fn restaurant_range_is_half_open() {
        let db = DbService::in_memory().await.unwrap();
        let (r, _) = approved(&db.pool, "a").await;
        let c = customer::create(&db.pool, "Kim", "kim@mail.com", None, "h").await.unwrap();

        let mut early = order_request::tests::request(c.id, r.id);
        early.created_at = 1_000;
        order_request::insert(&db.pool, &early).await.unwrap();
        let mut late = order_request::tests::request(c.id, r.id);
        late.created_at = 2_000;
        order_request::insert(&db.pool, &late).await.unwrap();

        let s = restaurant_summary(&db.pool, r.id, 1_000, 2_000).await.unwrap();
        assert_eq!(
            s.requests_by_status,
            vec![StatusCount { status: "pending".into(), count: 1 }]
        );
        assert!(s.orders_by_status.is_empty());
    }
}
