//! Customer cart service
//!
//! Lines are priced from the live menu when they are added and again when
//! an order request is created. Totals and the coupon discount are
//! computed on every read.

use rust_decimal::Decimal;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{CartLine, CartLineAdd, CartView, LineAddon, LineKind, Restaurant, RestaurantStatus};
use shared::util::normalize_code;
use sqlx::SqlitePool;

use super::coupon::{self, AppliedCoupon};
use super::pricing;
use crate::db::repository::cart::{self as cart_repo, NewLine, StoredCart};
use crate::db::repository::{menu, restaurant as restaurant_repo};
use crate::utils::money::to_f64;

/// Menu data a line is priced from
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub name: String,
    pub unit_price: f64,
    pub addons: Vec<LineAddon>,
}

fn unavailable(what: &str, name: &str) -> AppError {
    AppError::with_message(ErrorCode::MenuItemUnavailable, format!("{what} '{name}' is unavailable"))
}

/// Approved restaurant or `RestaurantNotApproved`
pub async fn orderable_restaurant(pool: &SqlitePool, restaurant_id: i64) -> AppResult<Restaurant> {
    let restaurant = restaurant_repo::get(pool, restaurant_id).await?;
    if restaurant.status != RestaurantStatus::Approved {
        return Err(AppError::with_message(
            ErrorCode::RestaurantNotApproved,
            format!("{} is not open for orders on the platform", restaurant.name),
        ));
    }
    Ok(restaurant)
}

/// Price a line from the current menu
///
/// Items must be available, and every addon must be attached to the item
/// and available. Combos take no addons and need every component
/// available.
pub async fn snapshot(
    pool: &SqlitePool,
    restaurant_id: i64,
    kind: LineKind,
    ref_id: i64,
    addon_ids: &[i64],
) -> AppResult<Snapshot> {
    match kind {
        LineKind::Item => {
            let item = menu::item_get(pool, restaurant_id, ref_id).await?;
            if !item.is_available {
                return Err(unavailable("Menu item", &item.name));
            }

            let mut ids = addon_ids.to_vec();
            ids.sort_unstable();
            ids.dedup();

            let mut addons = Vec::with_capacity(ids.len());
            for id in ids {
                if !item.addon_ids.contains(&id) {
                    return Err(AppError::with_message(
                        ErrorCode::InvalidMenuReference,
                        format!("Addon {id} is not offered with {}", item.name),
                    ));
                }
                let addon = menu::addon_get(pool, restaurant_id, id).await?;
                if !addon.is_available {
                    return Err(unavailable("Addon", &addon.name));
                }
                addons.push(LineAddon {
                    id: addon.id,
                    name: addon.name,
                    price: addon.price,
                });
            }

            Ok(Snapshot {
                name: item.name,
                unit_price: item.price,
                addons,
            })
        }
        LineKind::Combo => {
            if !addon_ids.is_empty() {
                return Err(AppError::with_message(
                    ErrorCode::InvalidMenuReference,
                    "Combos do not take addons",
                ));
            }
            let combo = menu::combo_get(pool, restaurant_id, ref_id).await?;
            if !combo.is_available {
                return Err(unavailable("Combo", &combo.name));
            }
            for component in &combo.items {
                let item = menu::item_get(pool, restaurant_id, component.item_id).await?;
                if !item.is_available {
                    return Err(unavailable("Menu item", &item.name));
                }
            }
            Ok(Snapshot {
                name: combo.name,
                unit_price: combo.price,
                addons: vec![],
            })
        }
    }
}

/// Re-price every stored line from the current menu
pub async fn resnapshot(pool: &SqlitePool, restaurant_id: i64, lines: &[CartLine]) -> AppResult<Vec<CartLine>> {
    let mut fresh = Vec::with_capacity(lines.len());
    for line in lines {
        let snap = snapshot(pool, restaurant_id, line.kind, line.ref_id, &line.addon_ids()).await?;
        fresh.push(CartLine {
            name: snap.name,
            unit_price: snap.unit_price,
            addons: snap.addons,
            ..line.clone()
        });
    }
    Ok(fresh)
}

/// Evaluate a coupon against a cart using a pooled connection
async fn evaluate_coupon(
    pool: &SqlitePool,
    code: &str,
    restaurant_id: i64,
    customer_id: i64,
    subtotal: Decimal,
    now: i64,
) -> AppResult<AppliedCoupon> {
    let mut conn = pool
        .acquire()
        .await
        .map_err(|e| AppError::database(format!("Failed to acquire connection: {e}")))?;
    coupon::evaluate(&mut conn, code, restaurant_id, customer_id, subtotal, now).await
}

/// Cart with totals; an ineligible stored coupon yields `coupon_error`
pub async fn build_view(
    pool: &SqlitePool,
    customer_id: i64,
    cart: StoredCart,
    now: i64,
) -> AppResult<CartView> {
    let subtotal = pricing::subtotal(&cart.lines);

    let (discount, coupon_error) = match (&cart.coupon_code, cart.restaurant_id) {
        (Some(code), Some(restaurant_id)) => {
            match evaluate_coupon(pool, code, restaurant_id, customer_id, subtotal, now).await {
                Ok(applied) => (applied.discount, None),
                Err(e) if e.code.category() == shared::ErrorCategory::Cart => {
                    (Decimal::ZERO, Some(e.message))
                }
                Err(e) => return Err(e),
            }
        }
        _ => (Decimal::ZERO, None),
    };

    Ok(CartView {
        restaurant_id: cart.restaurant_id,
        lines: cart.lines.into_iter().map(pricing::line_view).collect(),
        coupon_code: cart.coupon_code,
        coupon_error,
        subtotal: to_f64(subtotal),
        discount: to_f64(discount),
        total: to_f64(pricing::total(subtotal, discount)),
    })
}

pub async fn view(pool: &SqlitePool, customer_id: i64, now: i64) -> AppResult<CartView> {
    let cart = cart_repo::get(pool, customer_id).await?;
    build_view(pool, customer_id, cart, now).await
}

pub async fn add_line(
    pool: &SqlitePool,
    customer_id: i64,
    data: &CartLineAdd,
    now: i64,
) -> AppResult<CartView> {
    orderable_restaurant(pool, data.restaurant_id).await?;
    let snap = snapshot(pool, data.restaurant_id, data.kind, data.ref_id, &data.addon_ids).await?;

    let line = NewLine {
        kind: data.kind,
        ref_id: data.ref_id,
        name: snap.name,
        unit_price: snap.unit_price,
        addons: snap.addons,
        quantity: data.quantity,
        note: data
            .note
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string),
    };
    let cart = cart_repo::add_line(pool, customer_id, data.restaurant_id, &line).await?;
    build_view(pool, customer_id, cart, now).await
}

pub async fn update_quantity(
    pool: &SqlitePool,
    customer_id: i64,
    line_id: i64,
    quantity: i32,
    now: i64,
) -> AppResult<CartView> {
    let cart = cart_repo::update_quantity(pool, customer_id, line_id, quantity).await?;
    build_view(pool, customer_id, cart, now).await
}

pub async fn remove_line(pool: &SqlitePool, customer_id: i64, line_id: i64, now: i64) -> AppResult<CartView> {
    let cart = cart_repo::remove_line(pool, customer_id, line_id).await?;
    build_view(pool, customer_id, cart, now).await
}

pub async fn clear(pool: &SqlitePool, customer_id: i64) -> AppResult<CartView> {
    cart_repo::clear(pool, customer_id).await?;
    build_view(pool, customer_id, StoredCart::default(), 0).await
}

/// Apply a coupon code; an ineligible code is rejected outright
pub async fn apply_coupon(pool: &SqlitePool, customer_id: i64, code: &str, now: i64) -> AppResult<CartView> {
    let cart = cart_repo::get(pool, customer_id).await?;
    let Some(restaurant_id) = cart.restaurant_id.filter(|_| !cart.lines.is_empty()) else {
        return Err(AppError::new(ErrorCode::CartEmpty));
    };

    let subtotal = pricing::subtotal(&cart.lines);
    let applied = evaluate_coupon(pool, code, restaurant_id, customer_id, subtotal, now).await?;
    tracing::debug!(
        customer_id,
        coupon = %applied.coupon.code,
        discount = %applied.discount,
        "Coupon applied to cart"
    );

    let cart = cart_repo::set_coupon(pool, customer_id, Some(&normalize_code(code))).await?;
    build_view(pool, customer_id, cart, now).await
}

pub async fn remove_coupon(pool: &SqlitePool, customer_id: i64, now: i64) -> AppResult<CartView> {
    let cart = cart_repo::set_coupon(pool, customer_id, None).await?;
    build_view(pool, customer_id, cart, now).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::repository::coupon::{self as coupon_repo, tests::percent};
    use crate::db::repository::customer;
    use crate::db::repository::menu::tests::fixture;
    use crate::db::repository::restaurant::tests::approved;
    use shared::models::{AddonUpdate, MenuItemUpdate};

    const NOW: i64 = 1_767_268_800_000;

    fn add(restaurant_id: i64, kind: LineKind, ref_id: i64, addon_ids: Vec<i64>, quantity: i32) -> CartLineAdd {
        CartLineAdd {
            restaurant_id,
            kind,
            ref_id,
            addon_ids,
            quantity,
            note: None,
        }
    }

    async fn setup() -> (SqlitePool, crate::db::repository::menu::tests::Fixture, i64) {
        let db = DbService::in_memory().await.unwrap();
        let (r, _) = approved(&db.pool, "cart-svc").await;
        let fx = fixture(&db.pool, r.id).await;
        let c = customer::create(&db.pool, "Cleo", "cleo@example.com", None, "h")
            .await
            .unwrap();
        (db.pool, fx, c.id)
    }

    #[tokio::test]
    async fn totals_include_addons_and_merge_lines() {
        let (pool, fx, cid) = setup().await;
        let rid = fx.restaurant_id;

        add_line(&pool, cid, &add(rid, LineKind::Item, fx.burger.id, vec![fx.cheese.id], 1), NOW)
            .await
            .unwrap();
        let view = add_line(&pool, cid, &add(rid, LineKind::Item, fx.burger.id, vec![fx.cheese.id], 1), NOW)
            .await
            .unwrap();
        assert_eq!(view.lines.len(), 1);
        assert_eq!(view.lines[0].line.quantity, 2);
        assert_eq!(view.subtotal, 19.0);

        let view = add_line(&pool, cid, &add(rid, LineKind::Combo, fx.meal.id, vec![], 1), NOW)
            .await
            .unwrap();
        assert_eq!(view.lines.len(), 2);
        assert_eq!(view.total, 29.0);
    }

    #[tokio::test]
    async fn unattached_or_unavailable_addons_rejected() {
        let (pool, fx, cid) = setup().await;
        let rid = fx.restaurant_id;

        let err = add_line(&pool, cid, &add(rid, LineKind::Item, fx.fries.id, vec![fx.cheese.id], 1), NOW)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidMenuReference);

        menu::addon_update(
            &pool,
            rid,
            fx.cheese.id,
            &AddonUpdate {
                name: None,
                price: None,
                is_available: Some(false),
            },
        )
        .await
        .unwrap();
        let err = add_line(&pool, cid, &add(rid, LineKind::Item, fx.burger.id, vec![fx.cheese.id], 1), NOW)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::MenuItemUnavailable);
    }

    #[tokio::test]
    async fn combo_with_unavailable_component_rejected() {
        let (pool, fx, cid) = setup().await;
        menu::item_update(
            &pool,
            fx.restaurant_id,
            fx.fries.id,
            &MenuItemUpdate {
                is_available: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let err = add_line(&pool, cid, &add(fx.restaurant_id, LineKind::Combo, fx.meal.id, vec![], 1), NOW)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::MenuItemUnavailable);
    }

    #[tokio::test]
    async fn stale_coupon_reported_not_applied() {
        let (pool, fx, cid) = setup().await;
        let rid = fx.restaurant_id;
        let mut data = percent("TENOFF", 10.0);
        data.min_order_amount = 15.0;
        coupon_repo::create(&pool, Some(rid), &data).await.unwrap();

        add_line(&pool, cid, &add(rid, LineKind::Item, fx.burger.id, vec![], 2), NOW)
            .await
            .unwrap();
        let view = apply_coupon(&pool, cid, "tenoff", NOW).await.unwrap();
        assert_eq!(view.coupon_code.as_deref(), Some("TENOFF"));
        assert_eq!(view.discount, 1.7);
        assert_eq!(view.total, 15.3);

        let line_id = view.lines[0].line.id;
        let view = update_quantity(&pool, cid, line_id, 1, NOW).await.unwrap();
        assert_eq!(view.discount, 0.0);
        assert!(view.coupon_error.is_some());
        assert_eq!(view.total, 8.5);
    }

    #[tokio::test]
    async fn coupon_needs_a_cart() {
        let (pool, _, cid) = setup().await;
        let err = apply_coupon(&pool, cid, "ANY", NOW).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CartEmpty);
    }
}
