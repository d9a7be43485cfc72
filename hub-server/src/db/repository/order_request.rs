//! Order Request Repository

use super::{RepoError, RepoResult, to_json};
use shared::error::ErrorCode;
use shared::models::{OrderRequest, OrderRequestStatus};
use sqlx::{SqliteExecutor, SqlitePool};

const COLUMNS: &str = "id, customer_id, restaurant_id, lines, subtotal, discount, total, coupon_code, order_type, scheduled_for, delivery_address, note, status, wait_minutes, response_note, created_at, responded_at";

fn not_found(id: i64) -> RepoError {
    RepoError::Business(
        ErrorCode::OrderRequestNotFound,
        format!("Order request {id} not found"),
    )
}

pub async fn insert<'e>(ex: impl SqliteExecutor<'e>, req: &OrderRequest) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO order_request (id, customer_id, restaurant_id, lines, subtotal, discount, total, coupon_code, order_type, scheduled_for, delivery_address, note, status, wait_minutes, response_note, created_at, responded_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(req.id)
    .bind(req.customer_id)
    .bind(req.restaurant_id)
    .bind(to_json(&req.lines)?)
    .bind(req.subtotal)
    .bind(req.discount)
    .bind(req.total)
    .bind(&req.coupon_code)
    .bind(req.order_type)
    .bind(req.scheduled_for)
    .bind(&req.delivery_address)
    .bind(&req.note)
    .bind(req.status)
    .bind(req.wait_minutes)
    .bind(&req.response_note)
    .bind(req.created_at)
    .bind(req.responded_at)
    .execute(ex)
    .await?;
    Ok(())
}

pub async fn find_by_id<'e>(ex: impl SqliteExecutor<'e>, id: i64) -> RepoResult<Option<OrderRequest>> {
    let req = sqlx::query_as::<_, OrderRequest>(&format!(
        "SELECT {COLUMNS} FROM order_request WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(ex)
    .await?;
    Ok(req)
}

/// Request owned by the customer, or `OrderRequestNotFound`
pub async fn get_for_customer(pool: &SqlitePool, customer_id: i64, id: i64) -> RepoResult<OrderRequest> {
    match find_by_id(pool, id).await? {
        Some(r) if r.customer_id == customer_id => Ok(r),
        _ => Err(not_found(id)),
    }
}

/// Request addressed to the restaurant, or `OrderRequestNotFound`
pub async fn get_for_restaurant(
    pool: &SqlitePool,
    restaurant_id: i64,
    id: i64,
) -> RepoResult<OrderRequest> {
    match find_by_id(pool, id).await? {
        Some(r) if r.restaurant_id == restaurant_id => Ok(r),
        _ => Err(not_found(id)),
    }
}

pub async fn list_for_customer(
    pool: &SqlitePool,
    customer_id: i64,
    status: Option<OrderRequestStatus>,
) -> RepoResult<Vec<OrderRequest>> {
    let rows = sqlx::query_as::<_, OrderRequest>(&format!(
        "SELECT {COLUMNS} FROM order_request WHERE customer_id = ?1 AND (?2 IS NULL OR status = ?2) ORDER BY created_at DESC"
    ))
    .bind(customer_id)
    .bind(status)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn list_for_restaurant(
    pool: &SqlitePool,
    restaurant_id: i64,
    status: Option<OrderRequestStatus>,
) -> RepoResult<Vec<OrderRequest>> {
    let rows = sqlx::query_as::<_, OrderRequest>(&format!(
        "SELECT {COLUMNS} FROM order_request WHERE restaurant_id = ?1 AND (?2 IS NULL OR status = ?2) ORDER BY created_at DESC"
    ))
    .bind(restaurant_id)
    .bind(status)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// The customer's requests at the restaurant still awaiting a decision
pub async fn find_open<'e>(
    ex: impl SqliteExecutor<'e>,
    customer_id: i64,
    restaurant_id: i64,
) -> RepoResult<Vec<OrderRequest>> {
    let rows = sqlx::query_as::<_, OrderRequest>(&format!(
        "SELECT {COLUMNS} FROM order_request WHERE customer_id = ? AND restaurant_id = ? AND status IN ('pending', 'waiting') ORDER BY created_at"
    ))
    .bind(customer_id)
    .bind(restaurant_id)
    .fetch_all(ex)
    .await?;
    Ok(rows)
}

/// Restaurant decision written together with a status change
///
/// A decision replaces the previous note and stamps `responded_at`;
/// `wait_minutes` keeps the last estimate when the decision has none.
#[derive(Debug, Clone)]
pub struct Response<'a> {
    pub wait_minutes: Option<i32>,
    pub note: Option<&'a str>,
    pub at: i64,
}

/// Move a request from `from` to `next`
///
/// The update only applies while the row still has status `from`; a
/// concurrent change makes it fail with `InvalidStatusTransition`.
/// Transitions without a restaurant decision leave the response fields alone.
pub async fn transition<'e>(
    ex: impl SqliteExecutor<'e>,
    id: i64,
    from: OrderRequestStatus,
    next: OrderRequestStatus,
    response: Option<Response<'_>>,
) -> RepoResult<()> {
    if !from.can_transition_to(next) {
        return Err(RepoError::Business(
            ErrorCode::InvalidStatusTransition,
            format!(
                "Order request cannot move from {} to {}",
                from.as_str(),
                next.as_str()
            ),
        ));
    }

    let query = match &response {
        Some(r) => sqlx::query(
            "UPDATE order_request SET status = ?, wait_minutes = COALESCE(?, wait_minutes), response_note = ?, responded_at = ? \
             WHERE id = ? AND status = ?",
        )
        .bind(next)
        .bind(r.wait_minutes)
        .bind(r.note)
        .bind(r.at),
        None => sqlx::query("UPDATE order_request SET status = ? WHERE id = ? AND status = ?").bind(next),
    };
    let rows = query.bind(id).bind(from).execute(ex).await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::Business(
            ErrorCode::InvalidStatusTransition,
            format!("Order request {id} is no longer {}", from.as_str()),
        ));
    }
    Ok(())
}

/// Confirmed requests whose confirmation is older than `cutoff`
pub async fn find_stale_confirmed(pool: &SqlitePool, cutoff: i64) -> RepoResult<Vec<OrderRequest>> {
    let rows = sqlx::query_as::<_, OrderRequest>(&format!(
        "SELECT {COLUMNS} FROM order_request WHERE status = 'confirmed' AND responded_at <= ?"
    ))
    .bind(cutoff)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::repository::customer;
    use crate::db::repository::restaurant::tests::approved;
    use shared::models::{LineKind, OrderLine, OrderType};
    use shared::util::{now_millis, snowflake_id};

    pub(crate) fn request(customer_id: i64, restaurant_id: i64) -> OrderRequest {
        OrderRequest {
            id: snowflake_id(),
            customer_id,
            restaurant_id,
            lines: vec![OrderLine {
                kind: LineKind::Item,
                ref_id: 1,
                name: "Soup".into(),
                unit_price: 4.0,
                addons: vec![],
                quantity: 2,
                note: None,
                line_total: 8.0,
            }],
            subtotal: 8.0,
            discount: 0.0,
            total: 8.0,
            coupon_code: None,
            order_type: OrderType::Takeaway,
            scheduled_for: None,
            delivery_address: None,
            note: None,
            status: OrderRequestStatus::Pending,
            wait_minutes: None,
            response_note: None,
            created_at: now_millis(),
            responded_at: None,
        }
    }

    #[tokio::test]
    async fn insert_and_scope() {
        let db = DbService::in_memory().await.unwrap();
        let (r, _) = approved(&db.pool, "a").await;
        let c = customer::create(&db.pool, "Kim", "kim@mail.com", None, "h").await.unwrap();
        let req = request(c.id, r.id);
        insert(&db.pool, &req).await.unwrap();

        let back = get_for_customer(&db.pool, c.id, req.id).await.unwrap();
        assert_eq!(back.lines, req.lines);
        assert_eq!(back.order_type, OrderType::Takeaway);
        assert!(get_for_customer(&db.pool, c.id + 1, req.id).await.is_err());
        assert!(get_for_restaurant(&db.pool, r.id + 1, req.id).await.is_err());
        assert_eq!(find_open(&db.pool, c.id, r.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn guarded_transitions() {
        let db = DbService::in_memory().await.unwrap();
        let (r, _) = approved(&db.pool, "a").await;
        let c = customer::create(&db.pool, "Kim", "kim@mail.com", None, "h").await.unwrap();
        let req = request(c.id, r.id);
        insert(&db.pool, &req).await.unwrap();

        transition(
            &db.pool,
            req.id,
            OrderRequestStatus::Pending,
            OrderRequestStatus::Waiting,
            Some(Response {
                wait_minutes: Some(20),
                note: Some("Busy kitchen"),
                at: 1_000,
            }),
        )
        .await
        .unwrap();
        let back = get_for_restaurant(&db.pool, r.id, req.id).await.unwrap();
        assert_eq!(back.status, OrderRequestStatus::Waiting);
        assert_eq!(back.wait_minutes, Some(20));
        assert_eq!(back.responded_at, Some(1_000));

        // Stale expectation
        let err = transition(
            &db.pool,
            req.id,
            OrderRequestStatus::Pending,
            OrderRequestStatus::Confirmed,
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            RepoError::Business(ErrorCode::InvalidStatusTransition, _)
        ));

        // Not allowed by the machine
        let err = transition(
            &db.pool,
            req.id,
            OrderRequestStatus::Waiting,
            OrderRequestStatus::Converted,
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            RepoError::Business(ErrorCode::InvalidStatusTransition, _)
        ));
    }

    #[tokio::test]
    async fn decision_replaces_note_and_stamps_time() {
        let db = DbService::in_memory().await.unwrap();
        let (r, _) = approved(&db.pool, "a").await;
        let c = customer::create(&db.pool, "Kim", "kim@mail.com", None, "h").await.unwrap();
        let req = request(c.id, r.id);
        insert(&db.pool, &req).await.unwrap();

        let wait = Response {
            wait_minutes: Some(10),
            note: Some("Oven warming up"),
            at: 1_000,
        };
        transition(&db.pool, req.id, OrderRequestStatus::Pending, OrderRequestStatus::Waiting, Some(wait))
            .await
            .unwrap();
        let confirm = Response {
            wait_minutes: None,
            note: None,
            at: 2_000,
        };
        transition(&db.pool, req.id, OrderRequestStatus::Waiting, OrderRequestStatus::Confirmed, Some(confirm))
            .await
            .unwrap();

        let back = get_for_restaurant(&db.pool, r.id, req.id).await.unwrap();
        assert_eq!(back.response_note, None);
        assert_eq!(back.wait_minutes, Some(10));
        assert_eq!(back.responded_at, Some(2_000));

        // Expiry is not a decision and keeps the confirmation time
        transition(&db.pool, req.id, OrderRequestStatus::Confirmed, OrderRequestStatus::Expired, None)
            .await
            .unwrap();
        let back = get_for_restaurant(&db.pool, r.id, req.id).await.unwrap();
        assert_eq!(back.status, OrderRequestStatus::Expired);
        assert_eq!(back.responded_at, Some(2_000));
        assert_eq!(find_stale_confirmed(&db.pool, i64::MAX).await.unwrap().len(), 0);
    }
}
