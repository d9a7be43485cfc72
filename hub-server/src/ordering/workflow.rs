//! Order request and order workflow
//!
//! Request lifecycle, conversion into orders and fulfilment updates. Every
//! state change is written first and pushed to the live rooms after the
//! write succeeds.

use shared::error::{AppError, AppResult, ErrorCode};
use shared::live::{LiveEventKind, room};
use shared::models::{
    Order, OrderRequest, OrderRequestCreate, OrderRequestStatus, OrderStatus, OrderType,
    PaymentMethod, PaymentStatus,
};
use shared::util::snowflake_id;

use super::{cart, coupon, duplicate, pricing, time_slot};
use crate::core::ServerState;
use crate::db::repository::cart as cart_repo;
use crate::db::repository::coupon as coupon_repo;
use crate::db::repository::order as order_repo;
use crate::db::repository::order_request::{self as request_repo, Response};
use crate::utils::money::to_f64;
use crate::utils::time::local_day_stamp;

fn trimmed(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// `R{restaurant short}-{yyyymmdd}-{seq}`
pub fn order_number(restaurant_id: i64, day: &str, seq: i64) -> String {
    format!("R{:04}-{day}-{seq:03}", restaurant_id.rem_euclid(10_000))
}

// ============================================================================
// Order requests
// ============================================================================

/// Turn the customer's cart into a pending order request
///
/// Lines are re-priced from the menu and the coupon is evaluated again.
/// Duplicate check, insert and cart clear share one transaction.
pub async fn create_request(
    state: &ServerState,
    customer_id: i64,
    data: &OrderRequestCreate,
    now: i64,
) -> AppResult<OrderRequest> {
    let pool = state.pool();
    let stored = cart_repo::get(pool, customer_id).await?;
    let restaurant_id = match stored.restaurant_id {
        Some(id) if !stored.lines.is_empty() => id,
        _ => return Err(AppError::new(ErrorCode::CartEmpty)),
    };

    let restaurant = cart::orderable_restaurant(pool, restaurant_id).await?;
    if !restaurant.is_accepting_orders {
        return Err(AppError::with_message(
            ErrorCode::RestaurantNotAcceptingOrders,
            format!("{} is not accepting orders right now", restaurant.name),
        ));
    }

    let delivery_address = match data.order_type {
        OrderType::Delivery => Some(
            trimmed(data.delivery_address.as_deref())
                .ok_or_else(|| AppError::new(ErrorCode::DeliveryAddressRequired))?,
        ),
        _ => None,
    };

    time_slot::validate_slot(&restaurant, data.scheduled_for, now, state.slot_rules())?;

    let lines = cart::resnapshot(pool, restaurant_id, &stored.lines).await?;
    let subtotal = pricing::subtotal(&lines);

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

    let applied = match stored.coupon_code.as_deref() {
        Some(code) => {
            Some(coupon::evaluate(&mut tx, code, restaurant_id, customer_id, subtotal, now).await?)
        }
        None => None,
    };
    let discount = applied
        .as_ref()
        .map(|a| a.discount)
        .unwrap_or_default();

    let candidate = OrderRequest {
        id: snowflake_id(),
        customer_id,
        restaurant_id,
        lines: lines.iter().map(pricing::order_line).collect(),
        subtotal: to_f64(subtotal),
        discount: to_f64(discount),
        total: to_f64(pricing::total(subtotal, discount)),
        coupon_code: applied.map(|a| a.coupon.code),
        order_type: data.order_type,
        scheduled_for: data.scheduled_for,
        delivery_address,
        note: trimmed(data.note.as_deref()),
        status: OrderRequestStatus::Pending,
        wait_minutes: None,
        response_note: None,
        created_at: now,
        responded_at: None,
    };

    let open = request_repo::find_open(&mut *tx, customer_id, restaurant_id).await?;
    if let Some(existing) = duplicate::find_duplicate(&open, &candidate) {
        return Err(AppError::with_message(
            ErrorCode::DuplicateOrderRequest,
            "An identical order request is already awaiting the restaurant",
        )
        .with_detail("existing_request_id", existing.id));
    }

    request_repo::insert(&mut *tx, &candidate).await?;
    cart_repo::clear_in_tx(&mut tx, customer_id).await?;
    tx.commit()
        .await
        .map_err(|e| AppError::database(format!("Failed to commit order request: {e}")))?;

    tracing::info!(
        request_id = candidate.id,
        customer_id,
        restaurant_id,
        total = candidate.total,
        "Order request created"
    );
    state.live.emit(
        room::restaurant(restaurant_id),
        LiveEventKind::OrderRequestCreated,
        &candidate,
    );
    Ok(candidate)
}

/// Restaurant decision on an open request
#[derive(Debug, Clone)]
pub enum Decision {
    Confirm { note: Option<String> },
    Reject { reason: String },
    Wait { minutes: i32, note: Option<String> },
}

impl Decision {
    fn status(&self) -> OrderRequestStatus {
        match self {
            Decision::Confirm { .. } => OrderRequestStatus::Confirmed,
            Decision::Reject { .. } => OrderRequestStatus::Rejected,
            Decision::Wait { .. } => OrderRequestStatus::Waiting,
        }
    }
}

/// Apply a staff decision and notify the customer
pub async fn respond(
    state: &ServerState,
    restaurant_id: i64,
    request_id: i64,
    decision: Decision,
    now: i64,
) -> AppResult<OrderRequest> {
    let pool = state.pool();
    let request = request_repo::get_for_restaurant(pool, restaurant_id, request_id).await?;
    let next = decision.status();

    let note = match &decision {
        Decision::Confirm { note } | Decision::Wait { note, .. } => trimmed(note.as_deref()),
        Decision::Reject { reason } => trimmed(Some(reason.as_str())),
    };
    let wait_minutes = match decision {
        Decision::Wait { minutes, .. } => Some(minutes),
        _ => None,
    };

    request_repo::transition(
        pool,
        request.id,
        request.status,
        next,
        Some(Response {
            wait_minutes,
            note: note.as_deref(),
            at: now,
        }),
    )
    .await?;
    let updated = request_repo::get_for_restaurant(pool, restaurant_id, request_id).await?;

    tracing::info!(
        request_id,
        restaurant_id,
        status = next.as_str(),
        "Order request answered"
    );
    state.live.emit(
        room::customer(updated.customer_id),
        LiveEventKind::OrderRequestUpdated,
        &updated,
    );
    Ok(updated)
}

/// Customer withdraws a request that has not been converted
pub async fn cancel_request(
    state: &ServerState,
    customer_id: i64,
    request_id: i64,
) -> AppResult<OrderRequest> {
    let pool = state.pool();
    let request = request_repo::get_for_customer(pool, customer_id, request_id).await?;
    request_repo::transition(
        pool,
        request.id,
        request.status,
        OrderRequestStatus::Cancelled,
        None,
    )
    .await?;
    let updated = request_repo::get_for_customer(pool, customer_id, request_id).await?;

    tracing::info!(request_id, customer_id, "Order request cancelled by customer");
    state.live.emit(
        room::restaurant(updated.restaurant_id),
        LiveEventKind::OrderRequestUpdated,
        &updated,
    );
    Ok(updated)
}

/// Expire confirmed requests answered at or before `cutoff`
pub async fn expire_stale(state: &ServerState, cutoff: i64) -> AppResult<usize> {
    let pool = state.pool();
    let stale = request_repo::find_stale_confirmed(pool, cutoff).await?;

    let mut expired = 0;
    for request in stale {
        match request_repo::transition(
            pool,
            request.id,
            OrderRequestStatus::Confirmed,
            OrderRequestStatus::Expired,
            None,
        )
        .await
        {
            Ok(()) => {
                expired += 1;
                let payload = OrderRequest {
                    status: OrderRequestStatus::Expired,
                    ..request
                };
                state.live.emit_to_both(
                    payload.restaurant_id,
                    payload.customer_id,
                    LiveEventKind::OrderRequestUpdated,
                    &payload,
                );
            }
            // Placed or cancelled between the scan and the update
            Err(crate::db::repository::RepoError::Business(ErrorCode::InvalidStatusTransition, _)) => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(expired)
}

// ============================================================================
// Orders
// ============================================================================

/// Convert a confirmed request into an order
///
/// The amounts agreed on the request are kept. A coupon on the request is
/// checked again and its usage recorded in the same transaction.
pub async fn place_order(
    state: &ServerState,
    customer_id: i64,
    request_id: i64,
    payment_method: PaymentMethod,
    now: i64,
) -> AppResult<Order> {
    let pool = state.pool();
    let request = request_repo::get_for_customer(pool, customer_id, request_id).await?;
    if request.status != OrderRequestStatus::Confirmed {
        return Err(AppError::with_message(
            ErrorCode::OrderRequestNotConfirmed,
            format!("Order request is {}", request.status.as_str()),
        ));
    }
    let restaurant = cart::orderable_restaurant(pool, request.restaurant_id).await?;

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

    let order_id = snowflake_id();
    if let Some(code) = request.coupon_code.as_deref() {
        let subtotal = crate::utils::money::to_decimal(request.subtotal);
        let applied =
            coupon::evaluate(&mut tx, code, request.restaurant_id, customer_id, subtotal, now).await?;
        coupon_repo::record_usage(&mut tx, applied.coupon.id, customer_id, order_id, request.discount)
            .await?;
    }

    let day = local_day_stamp(now, restaurant.utc_offset_minutes);
    let seq = order_repo::next_sequence(&mut *tx, restaurant.id, &day).await?;

    let order = Order {
        id: order_id,
        order_number: order_number(restaurant.id, &day, seq),
        request_id: request.id,
        customer_id,
        restaurant_id: request.restaurant_id,
        lines: request.lines,
        subtotal: request.subtotal,
        discount: request.discount,
        total: request.total,
        coupon_code: request.coupon_code,
        order_type: request.order_type,
        scheduled_for: request.scheduled_for,
        delivery_address: request.delivery_address,
        note: request.note,
        payment_method,
        payment_status: PaymentStatus::Pending,
        status: OrderStatus::Placed,
        created_at: now,
        updated_at: now,
    };
    order_repo::insert(&mut *tx, &order).await?;
    request_repo::transition(
        &mut *tx,
        request.id,
        OrderRequestStatus::Confirmed,
        OrderRequestStatus::Converted,
        None,
    )
    .await?;
    tx.commit()
        .await
        .map_err(|e| AppError::database(format!("Failed to commit order: {e}")))?;

    tracing::info!(
        order_id = order.id,
        order_number = %order.order_number,
        restaurant_id = order.restaurant_id,
        total = order.total,
        "Order placed"
    );
    state
        .live
        .emit(room::restaurant(order.restaurant_id), LiveEventKind::OrderCreated, &order);
    Ok(order)
}

fn notify_order(state: &ServerState, order: &Order) {
    state.live.emit_to_both(
        order.restaurant_id,
        order.customer_id,
        LiveEventKind::OrderUpdated,
        order,
    );
}

/// Staff fulfilment update
pub async fn update_order_status(
    state: &ServerState,
    restaurant_id: i64,
    order_id: i64,
    next: OrderStatus,
) -> AppResult<Order> {
    let pool = state.pool();
    let order = order_repo::get_for_restaurant(pool, restaurant_id, order_id).await?;
    let updated = order_repo::set_status(pool, &order, next).await?;
    tracing::info!(order_id, from = order.status.as_str(), to = next.as_str(), "Order status changed");
    notify_order(state, &updated);
    Ok(updated)
}

/// Staff payment update
pub async fn update_payment_status(
    state: &ServerState,
    restaurant_id: i64,
    order_id: i64,
    next: PaymentStatus,
) -> AppResult<Order> {
    let pool = state.pool();
    let order = order_repo::get_for_restaurant(pool, restaurant_id, order_id).await?;
    let updated = order_repo::set_payment_status(pool, &order, next).await?;
    tracing::info!(order_id, to = next.as_str(), "Order payment status changed");
    notify_order(state, &updated);
    Ok(updated)
}

/// Customer cancels an order still `placed`
pub async fn cancel_order(state: &ServerState, customer_id: i64, order_id: i64) -> AppResult<Order> {
    let pool = state.pool();
    let order = order_repo::get_for_customer(pool, customer_id, order_id).await?;
    if order.status != OrderStatus::Placed {
        return Err(AppError::with_message(
            ErrorCode::InvalidStatusTransition,
            format!("Order is already {}", order.status.as_str()),
        ));
    }
    let updated = order_repo::set_status(pool, &order, OrderStatus::Cancelled).await?;
    tracing::info!(order_id, customer_id, "Order cancelled by customer");
    notify_order(state, &updated);
    Ok(updated)
}
