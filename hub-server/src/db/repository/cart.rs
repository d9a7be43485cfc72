//! Cart Repository
//!
//! One `cart` row per customer plus its `cart_line` rows. The cart is bound
//! to a restaurant while it holds lines; emptying it unbinds it and drops
//! the applied coupon.

use super::{RepoError, RepoResult, to_json};
use shared::error::ErrorCode;
use shared::models::{CartLine, LineAddon, LineKind};
use shared::util::{now_millis, snowflake_id};
use sqlx::{Sqlite, SqlitePool, Transaction};

const LINE_COLUMNS: &str = "id, kind, ref_id, name, unit_price, addons, quantity, note";

/// Upper bound of a line quantity
pub const MAX_LINE_QUANTITY: i32 = 99;

/// Persisted cart state
#[derive(Debug, Clone, Default)]
pub struct StoredCart {
    pub restaurant_id: Option<i64>,
    pub coupon_code: Option<String>,
    pub lines: Vec<CartLine>,
}

/// Line about to be added, already priced from the menu
#[derive(Debug, Clone)]
pub struct NewLine {
    pub kind: LineKind,
    pub ref_id: i64,
    pub name: String,
    pub unit_price: f64,
    pub addons: Vec<LineAddon>,
    pub quantity: i32,
    pub note: Option<String>,
}

impl NewLine {
    fn same_as(&self, line: &CartLine) -> bool {
        let mut ids: Vec<i64> = self.addons.iter().map(|a| a.id).collect();
        ids.sort_unstable();
        line.kind == self.kind
            && line.ref_id == self.ref_id
            && line.addon_ids() == ids
            && line.note == self.note
    }
}

#[derive(sqlx::FromRow)]
struct CartRow {
    restaurant_id: Option<i64>,
    coupon_code: Option<String>,
}

pub async fn get(pool: &SqlitePool, customer_id: i64) -> RepoResult<StoredCart> {
    let row = sqlx::query_as::<_, CartRow>(
        "SELECT restaurant_id, coupon_code FROM cart WHERE customer_id = ?",
    )
    .bind(customer_id)
    .fetch_optional(pool)
    .await?;
    let Some(row) = row else {
        return Ok(StoredCart::default());
    };

    let lines = sqlx::query_as::<_, CartLine>(&format!(
        "SELECT {LINE_COLUMNS} FROM cart_line WHERE customer_id = ? ORDER BY created_at, id"
    ))
    .bind(customer_id)
    .fetch_all(pool)
    .await?;

    Ok(StoredCart {
        restaurant_id: row.restaurant_id,
        coupon_code: row.coupon_code,
        lines,
    })
}

/// Add a line, merging it into an identical existing line
///
/// Identical means same kind, reference, addon set and note.
pub async fn add_line(
    pool: &SqlitePool,
    customer_id: i64,
    restaurant_id: i64,
    line: &NewLine,
) -> RepoResult<StoredCart> {
    let current = get(pool, customer_id).await?;
    if !current.lines.is_empty() && current.restaurant_id != Some(restaurant_id) {
        return Err(RepoError::Business(
            ErrorCode::CartRestaurantMismatch,
            "Cart already holds items from another restaurant".into(),
        ));
    }

    let mut tx = pool.begin().await?;
    let now = now_millis();

    sqlx::query(
        "INSERT INTO cart (customer_id, restaurant_id, coupon_code, updated_at) VALUES (?1, ?2, NULL, ?3) \
         ON CONFLICT(customer_id) DO UPDATE SET restaurant_id = ?2, updated_at = ?3",
    )
    .bind(customer_id)
    .bind(restaurant_id)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    match current.lines.iter().find(|l| line.same_as(l)) {
        Some(existing) => {
            let quantity = existing.quantity + line.quantity;
            if quantity > MAX_LINE_QUANTITY {
                return Err(RepoError::Business(
                    ErrorCode::InvalidQuantity,
                    format!("Quantity cannot exceed {MAX_LINE_QUANTITY}"),
                ));
            }
            sqlx::query("UPDATE cart_line SET quantity = ? WHERE id = ?")
                .bind(quantity)
                .bind(existing.id)
                .execute(&mut *tx)
                .await?;
        }
        None => {
            sqlx::query(
                "INSERT INTO cart_line (id, customer_id, kind, ref_id, name, unit_price, addons, quantity, note, created_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(snowflake_id())
            .bind(customer_id)
            .bind(line.kind)
            .bind(line.ref_id)
            .bind(&line.name)
            .bind(line.unit_price)
            .bind(to_json(&line.addons)?)
            .bind(line.quantity)
            .bind(&line.note)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;
    get(pool, customer_id).await
}

pub async fn update_quantity(
    pool: &SqlitePool,
    customer_id: i64,
    line_id: i64,
    quantity: i32,
) -> RepoResult<StoredCart> {
    if !(1..=MAX_LINE_QUANTITY).contains(&quantity) {
        return Err(RepoError::Business(
            ErrorCode::InvalidQuantity,
            format!("Quantity must be between 1 and {MAX_LINE_QUANTITY}"),
        ));
    }
    let rows = sqlx::query("UPDATE cart_line SET quantity = ? WHERE id = ? AND customer_id = ?")
        .bind(quantity)
        .bind(line_id)
        .bind(customer_id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::Business(
            ErrorCode::CartLineNotFound,
            format!("Cart line {line_id} not found"),
        ));
    }
    get(pool, customer_id).await
}

pub async fn remove_line(pool: &SqlitePool, customer_id: i64, line_id: i64) -> RepoResult<StoredCart> {
    let mut tx = pool.begin().await?;
    let rows = sqlx::query("DELETE FROM cart_line WHERE id = ? AND customer_id = ?")
        .bind(line_id)
        .bind(customer_id)
        .execute(&mut *tx)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::Business(
            ErrorCode::CartLineNotFound,
            format!("Cart line {line_id} not found"),
        ));
    }

    let left: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cart_line WHERE customer_id = ?")
        .bind(customer_id)
        .fetch_one(&mut *tx)
        .await?;
    if left == 0 {
        clear_in_tx(&mut tx, customer_id).await?;
    }
    tx.commit().await?;
    get(pool, customer_id).await
}

pub async fn clear(pool: &SqlitePool, customer_id: i64) -> RepoResult<()> {
    let mut tx = pool.begin().await?;
    clear_in_tx(&mut tx, customer_id).await?;
    tx.commit().await?;
    Ok(())
}

/// Delete all lines and unbind the cart
pub async fn clear_in_tx(tx: &mut Transaction<'_, Sqlite>, customer_id: i64) -> RepoResult<()> {
    sqlx::query("DELETE FROM cart_line WHERE customer_id = ?")
        .bind(customer_id)
        .execute(&mut **tx)
        .await?;
    sqlx::query("DELETE FROM cart WHERE customer_id = ?")
        .bind(customer_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Store (or drop, with `None`) the coupon code of a non-empty cart
pub async fn set_coupon(
    pool: &SqlitePool,
    customer_id: i64,
    code: Option<&str>,
) -> RepoResult<StoredCart> {
    let rows = sqlx::query("UPDATE cart SET coupon_code = ?, updated_at = ? WHERE customer_id = ?")
        .bind(code)
        .bind(now_millis())
        .bind(customer_id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 && code.is_some() {
        return Err(RepoError::Business(ErrorCode::CartEmpty, "Cart is empty".into()));
    }
    get(pool, customer_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::repository::customer;
    use crate::db::repository::restaurant::tests::approved;

    fn line(ref_id: i64, addons: &[i64], quantity: i32) -> NewLine {
        NewLine {
            kind: LineKind::Item,
            ref_id,
            name: format!("Item {ref_id}"),
            unit_price: 5.0,
            addons: addons
                .iter()
                .map(|id| LineAddon {
                    id: *id,
                    name: format!("Addon {id}"),
                    price: 0.5,
                })
                .collect(),
            quantity,
            note: None,
        }
    }

    async fn setup() -> (DbService, i64, i64, i64) {
        let db = DbService::in_memory().await.unwrap();
        let (a, _) = approved(&db.pool, "a").await;
        let (b, _) = approved(&db.pool, "b").await;
        let c = customer::create(&db.pool, "Kim", "kim@mail.com", None, "hash")
            .await
            .unwrap();
        (db, c.id, a.id, b.id)
    }

    #[tokio::test]
    async fn identical_lines_merge() {
        let (db, cid, rid, _) = setup().await;
        add_line(&db.pool, cid, rid, &line(1, &[3, 2], 1)).await.unwrap();
        let cart = add_line(&db.pool, cid, rid, &line(1, &[2, 3], 2)).await.unwrap();
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.lines[0].quantity, 3);

        // Different addon set is a separate line
        let cart = add_line(&db.pool, cid, rid, &line(1, &[2], 1)).await.unwrap();
        assert_eq!(cart.lines.len(), 2);
        assert_eq!(cart.restaurant_id, Some(rid));
    }

    #[tokio::test]
    async fn other_restaurant_is_rejected() {
        let (db, cid, a, b) = setup().await;
        add_line(&db.pool, cid, a, &line(1, &[], 1)).await.unwrap();
        let err = add_line(&db.pool, cid, b, &line(2, &[], 1)).await.unwrap_err();
        assert!(matches!(
            err,
            RepoError::Business(ErrorCode::CartRestaurantMismatch, _)
        ));
    }

    #[tokio::test]
    async fn emptying_unbinds_cart() {
        let (db, cid, a, b) = setup().await;
        let cart = add_line(&db.pool, cid, a, &line(1, &[], 1)).await.unwrap();
        set_coupon(&db.pool, cid, Some("SAVE10")).await.unwrap();

        let cart = remove_line(&db.pool, cid, cart.lines[0].id).await.unwrap();
        assert!(cart.lines.is_empty());
        assert_eq!(cart.coupon_code, None);
        assert_eq!(cart.restaurant_id, None);

        // Now another restaurant is fine
        add_line(&db.pool, cid, b, &line(2, &[], 1)).await.unwrap();
    }

    #[tokio::test]
    async fn quantity_bounds() {
        let (db, cid, a, _) = setup().await;
        let cart = add_line(&db.pool, cid, a, &line(1, &[], 98)).await.unwrap();
        let err = add_line(&db.pool, cid, a, &line(1, &[], 2)).await.unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::InvalidQuantity, _)));

        let err = update_quantity(&db.pool, cid, cart.lines[0].id, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::InvalidQuantity, _)));
        let err = update_quantity(&db.pool, cid, 12345, 2).await.unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::CartLineNotFound, _)));
    }

    #[tokio::test]
    async fn coupon_needs_a_cart() {
        let (db, cid, _, _) = setup().await;
        let err = set_coupon(&db.pool, cid, Some("X")).await.unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::CartEmpty, _)));
    }
}
