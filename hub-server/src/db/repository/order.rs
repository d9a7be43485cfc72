//! Order Repository

use super::{RepoError, RepoResult, to_json};
use shared::error::ErrorCode;
use shared::models::{Order, OrderStatus, PaymentStatus};
use shared::util::now_millis;
use sqlx::{SqliteExecutor, SqlitePool};

const COLUMNS: &str = "id, order_number, request_id, customer_id, restaurant_id, lines, subtotal, discount, total, coupon_code, order_type, scheduled_for, delivery_address, note, payment_method, payment_status, status, created_at, updated_at";

fn not_found(id: i64) -> RepoError {
    RepoError::Business(ErrorCode::OrderNotFound, format!("Order {id} not found"))
}

/// Next value of the restaurant's daily order sequence (starts at 1)
pub async fn next_sequence<'e>(
    ex: impl SqliteExecutor<'e>,
    restaurant_id: i64,
    day: &str,
) -> RepoResult<i64> {
    let seq = sqlx::query_scalar(
        "INSERT INTO order_sequence (restaurant_id, day, seq) VALUES (?, ?, 1) \
         ON CONFLICT(restaurant_id, day) DO UPDATE SET seq = seq + 1 \
         RETURNING seq",
    )
    .bind(restaurant_id)
    .bind(day)
    .fetch_one(ex)
    .await?;
    Ok(seq)
}

pub async fn insert<'e>(ex: impl SqliteExecutor<'e>, order: &Order) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO orders (id, order_number, request_id, customer_id, restaurant_id, lines, subtotal, discount, total, coupon_code, order_type, scheduled_for, delivery_address, note, payment_method, payment_status, status, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(order.id)
    .bind(&order.order_number)
    .bind(order.request_id)
    .bind(order.customer_id)
    .bind(order.restaurant_id)
    .bind(to_json(&order.lines)?)
    .bind(order.subtotal)
    .bind(order.discount)
    .bind(order.total)
    .bind(&order.coupon_code)
    .bind(order.order_type)
    .bind(order.scheduled_for)
    .bind(&order.delivery_address)
    .bind(&order.note)
    .bind(order.payment_method)
    .bind(order.payment_status)
    .bind(order.status)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(ex)
    .await?;
    Ok(())
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(&format!("SELECT {COLUMNS} FROM orders WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(order)
}

pub async fn get_for_customer(pool: &SqlitePool, customer_id: i64, id: i64) -> RepoResult<Order> {
    match find_by_id(pool, id).await? {
        Some(o) if o.customer_id == customer_id => Ok(o),
        _ => Err(not_found(id)),
    }
}

pub async fn get_for_restaurant(pool: &SqlitePool, restaurant_id: i64, id: i64) -> RepoResult<Order> {
    match find_by_id(pool, id).await? {
        Some(o) if o.restaurant_id == restaurant_id => Ok(o),
        _ => Err(not_found(id)),
    }
}

pub async fn list_for_customer(pool: &SqlitePool, customer_id: i64) -> RepoResult<Vec<Order>> {
    let rows = sqlx::query_as::<_, Order>(&format!(
        "SELECT {COLUMNS} FROM orders WHERE customer_id = ? ORDER BY created_at DESC"
    ))
    .bind(customer_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn list_for_restaurant(
    pool: &SqlitePool,
    restaurant_id: i64,
    status: Option<OrderStatus>,
) -> RepoResult<Vec<Order>> {
    let rows = sqlx::query_as::<_, Order>(&format!(
        "SELECT {COLUMNS} FROM orders WHERE restaurant_id = ?1 AND (?2 IS NULL OR status = ?2) ORDER BY created_at DESC"
    ))
    .bind(restaurant_id)
    .bind(status)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Guarded fulfilment status change
pub async fn set_status(
    pool: &SqlitePool,
    order: &Order,
    next: OrderStatus,
) -> RepoResult<Order> {
    if !order.status.can_transition_to(next) {
        return Err(RepoError::Business(
            ErrorCode::InvalidStatusTransition,
            format!(
                "Order cannot move from {} to {}",
                order.status.as_str(),
                next.as_str()
            ),
        ));
    }
    let rows = sqlx::query("UPDATE orders SET status = ?, updated_at = ? WHERE id = ? AND status = ?")
        .bind(next)
        .bind(now_millis())
        .bind(order.id)
        .bind(order.status)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::Business(
            ErrorCode::InvalidStatusTransition,
            format!("Order {} is no longer {}", order.id, order.status.as_str()),
        ));
    }
    find_by_id(pool, order.id).await?.ok_or_else(|| not_found(order.id))
}

/// Guarded payment status change
pub async fn set_payment_status(
    pool: &SqlitePool,
    order: &Order,
    next: PaymentStatus,
) -> RepoResult<Order> {
    if !order.payment_status.can_transition_to(next) {
        return Err(RepoError::Business(
            ErrorCode::InvalidStatusTransition,
            format!(
                "Payment cannot move from {} to {}",
                order.payment_status.as_str(),
                next.as_str()
            ),
        ));
    }
    let rows = sqlx::query(
        "UPDATE orders SET payment_status = ?, updated_at = ? WHERE id = ? AND payment_status = ?",
    )
    .bind(next)
    .bind(now_millis())
    .bind(order.id)
    .bind(order.payment_status)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::Business(
            ErrorCode::InvalidStatusTransition,
            format!(
                "Payment of order {} is no longer {}",
                order.id,
                order.payment_status.as_str()
            ),
        ));
    }
    find_by_id(pool, order.id).await?.ok_or_else(|| not_found(order.id))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::repository::order_request::{self, tests::request};
    use crate::db::repository::restaurant::tests::approved;
    use crate::db::repository::customer;
    use shared::models::PaymentMethod;
    use shared::util::snowflake_id;

    /// Insert a request and its placed order under the given number
    pub(crate) async fn placed(pool: &SqlitePool, restaurant_id: i64, customer_id: i64, number: &str) -> RepoResult<Order> {
        let req = request(customer_id, restaurant_id);
        order_request::insert(pool, &req).await?;
        let order = Order {
            id: snowflake_id(),
            order_number: number.to_string(),
            request_id: req.id,
            customer_id,
            restaurant_id,
            lines: req.lines,
            subtotal: req.subtotal,
            discount: req.discount,
            total: req.total,
            coupon_code: None,
            order_type: req.order_type,
            scheduled_for: None,
            delivery_address: None,
            note: None,
            payment_method: PaymentMethod::Cash,
            payment_status: PaymentStatus::Pending,
            status: OrderStatus::Placed,
            created_at: 0,
            updated_at: 0,
        };
        insert(pool, &order).await?;
        Ok(order)
    }

    #[tokio::test]
    async fn daily_sequence_per_restaurant() {
        let db = DbService::in_memory().await.unwrap();
        assert_eq!(next_sequence(&db.pool, 1, "20260101").await.unwrap(), 1);
        assert_eq!(next_sequence(&db.pool, 1, "20260101").await.unwrap(), 2);
        assert_eq!(next_sequence(&db.pool, 2, "20260101").await.unwrap(), 1);
        assert_eq!(next_sequence(&db.pool, 1, "20260102").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn order_numbers_unique_per_restaurant() {
        let db = DbService::in_memory().await.unwrap();
        let (a, _) = approved(&db.pool, "a").await;
        let (b, _) = approved(&db.pool, "b").await;
        let c = customer::create(&db.pool, "Kim", "kim@mail.com", None, "h").await.unwrap();

        // Short restaurant numbers can coincide across restaurants
        placed(&db.pool, a.id, c.id, "R0001-20260101-001").await.unwrap();
        placed(&db.pool, b.id, c.id, "R0001-20260101-001").await.unwrap();

        let err = placed(&db.pool, a.id, c.id, "R0001-20260101-001").await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
        assert_eq!(list_for_customer(&db.pool, c.id).await.unwrap().len(), 2);
    }
}
