//! Restaurant Repository

use super::{RepoError, RepoResult, role, staff_user};
use shared::error::ErrorCode;
use shared::models::{
    Restaurant, RestaurantRegister, RestaurantRegistered, RestaurantStatus, RestaurantUpdate,
};
use shared::util::{normalize_email, now_millis, snowflake_id};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, name, email, phone, address, latitude, longitude, cuisine, opening_time, closing_time, utc_offset_minutes, is_accepting_orders, status, rejection_reason, created_at, reviewed_at, reviewed_by";

fn not_found(id: i64) -> RepoError {
    RepoError::Business(
        ErrorCode::RestaurantNotFound,
        format!("Restaurant {id} not found"),
    )
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Restaurant>> {
    let restaurant = sqlx::query_as::<_, Restaurant>(&format!(
        "SELECT {COLUMNS} FROM restaurant WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(restaurant)
}

/// Fetch or fail with `RestaurantNotFound`
pub async fn get(pool: &SqlitePool, id: i64) -> RepoResult<Restaurant> {
    find_by_id(pool, id).await?.ok_or_else(|| not_found(id))
}

/// Approved restaurant, as seen by the public API
pub async fn get_approved(pool: &SqlitePool, id: i64) -> RepoResult<Restaurant> {
    match find_by_id(pool, id).await? {
        Some(r) if r.status == RestaurantStatus::Approved => Ok(r),
        _ => Err(not_found(id)),
    }
}

pub async fn find_all(
    pool: &SqlitePool,
    status: Option<RestaurantStatus>,
) -> RepoResult<Vec<Restaurant>> {
    let restaurants = match status {
        Some(status) => {
            sqlx::query_as::<_, Restaurant>(&format!(
                "SELECT {COLUMNS} FROM restaurant WHERE status = ? ORDER BY created_at DESC"
            ))
            .bind(status)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Restaurant>(&format!(
                "SELECT {COLUMNS} FROM restaurant ORDER BY created_at DESC"
            ))
            .fetch_all(pool)
            .await?
        }
    };
    Ok(restaurants)
}

/// Create the restaurant, its `owner` role and the owner account atomically
pub async fn register(
    pool: &SqlitePool,
    data: &RestaurantRegister,
    owner_password_hash: &str,
) -> RepoResult<RestaurantRegistered> {
    let id = snowflake_id();
    let email = normalize_email(&data.email);

    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO restaurant (id, name, email, phone, address, latitude, longitude, cuisine, opening_time, closing_time, utc_offset_minutes, is_accepting_orders, status, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, 'pending', ?)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&email)
    .bind(&data.phone)
    .bind(&data.address)
    .bind(data.latitude)
    .bind(data.longitude)
    .bind(&data.cuisine)
    .bind(&data.opening_time)
    .bind(&data.closing_time)
    .bind(data.utc_offset_minutes)
    .bind(now_millis())
    .execute(&mut *tx)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(_) => RepoError::Business(
            ErrorCode::RestaurantEmailExists,
            format!("A restaurant with email '{email}' already exists"),
        ),
        other => other,
    })?;

    let owner_role_id = role::staff_create_owner(&mut tx, id).await?;
    let owner_id = staff_user::create_in_tx(
        &mut tx,
        id,
        &data.owner_name,
        &normalize_email(&data.owner_email),
        owner_password_hash,
        owner_role_id,
    )
    .await?;

    tx.commit().await?;

    let restaurant = get(pool, id).await?;
    Ok(RestaurantRegistered {
        restaurant,
        owner_id,
    })
}

/// Moderation transition performed by a super-admin
pub async fn set_status(
    pool: &SqlitePool,
    id: i64,
    next: RestaurantStatus,
    reason: Option<&str>,
    reviewer_id: i64,
) -> RepoResult<Restaurant> {
    let current = get(pool, id).await?;
    if !current.status.can_transition_to(next) {
        return Err(RepoError::Business(
            ErrorCode::InvalidStatusTransition,
            format!(
                "Restaurant cannot move from {} to {}",
                current.status.as_str(),
                next.as_str()
            ),
        ));
    }

    // Guarded on the observed status so concurrent reviews cannot both win
    let rows = sqlx::query(
        "UPDATE restaurant SET status = ?, rejection_reason = ?, reviewed_at = ?, reviewed_by = ? WHERE id = ? AND status = ?",
    )
    .bind(next)
    .bind(reason)
    .bind(now_millis())
    .bind(reviewer_id)
    .bind(id)
    .bind(current.status)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::Business(
            ErrorCode::InvalidStatusTransition,
            "Restaurant status changed concurrently".into(),
        ));
    }

    get(pool, id).await
}

pub async fn update(pool: &SqlitePool, id: i64, data: &RestaurantUpdate) -> RepoResult<Restaurant> {
    let rows = sqlx::query(
        "UPDATE restaurant SET \
         name = COALESCE(?1, name), phone = COALESCE(?2, phone), address = COALESCE(?3, address), \
         latitude = COALESCE(?4, latitude), longitude = COALESCE(?5, longitude), cuisine = COALESCE(?6, cuisine), \
         opening_time = COALESCE(?7, opening_time), closing_time = COALESCE(?8, closing_time), \
         utc_offset_minutes = COALESCE(?9, utc_offset_minutes), is_accepting_orders = COALESCE(?10, is_accepting_orders) \
         WHERE id = ?11",
    )
    .bind(&data.name)
    .bind(&data.phone)
    .bind(&data.address)
    .bind(data.latitude)
    .bind(data.longitude)
    .bind(&data.cuisine)
    .bind(&data.opening_time)
    .bind(&data.closing_time)
    .bind(data.utc_offset_minutes)
    .bind(data.is_accepting_orders)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(not_found(id));
    }
    get(pool, id).await
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::DbService;

    pub(crate) fn register_payload(tag: &str) -> RestaurantRegister {
        RestaurantRegister {
            name: format!("Bistro {tag}"),
            email: format!("bistro-{tag}@food.io"),
            phone: "555-0100".into(),
            address: "1 Main St".into(),
            latitude: 52.52,
            longitude: 13.405,
            cuisine: Some("german".into()),
            opening_time: "09:00".into(),
            closing_time: "22:00".into(),
            utc_offset_minutes: 0,
            owner_name: format!("Owner {tag}"),
            owner_email: format!("owner-{tag}@food.io"),
            owner_password: "password123".into(),
        }
    }

    /// Register and approve a restaurant, returning it with the owner id
    pub(crate) async fn approved(pool: &SqlitePool, tag: &str) -> (Restaurant, i64) {
        let reg = register(pool, &register_payload(tag), "hash").await.unwrap();
        let r = set_status(pool, reg.restaurant.id, RestaurantStatus::Approved, None, 1)
            .await
            .unwrap();
        (r, reg.owner_id)
    }

    #[tokio::test]
    async fn registration_creates_owner() {
        let db = DbService::in_memory().await.unwrap();
        let reg = register(&db.pool, &register_payload("x"), "hash")
            .await
            .unwrap();
        assert_eq!(reg.restaurant.status, RestaurantStatus::Pending);

        let roles = role::staff_find_all(&db.pool, reg.restaurant.id).await.unwrap();
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].name, "owner");
        assert!(roles[0].is_system);

        let owner = staff_user::find_by_id(&db.pool, reg.restaurant.id, reg.owner_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(owner.role_id, roles[0].id);
    }

    #[tokio::test]
    async fn duplicate_email_rolls_back() {
        let db = DbService::in_memory().await.unwrap();
        register(&db.pool, &register_payload("x"), "hash").await.unwrap();

        let mut again = register_payload("y");
        again.email = "BISTRO-x@food.io".into();
        let err = register(&db.pool, &again, "hash").await.unwrap_err();
        assert!(matches!(
            err,
            RepoError::Business(ErrorCode::RestaurantEmailExists, _)
        ));

        // Owner email clash: restaurant row must not survive
        let mut clash = register_payload("z");
        clash.owner_email = "owner-x@food.io".into();
        assert!(register(&db.pool, &clash, "hash").await.is_err());
        assert_eq!(find_all(&db.pool, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn moderation_flow() {
        let db = DbService::in_memory().await.unwrap();
        let reg = register(&db.pool, &register_payload("x"), "hash")
            .await
            .unwrap();
        let id = reg.restaurant.id;

        let r = set_status(&db.pool, id, RestaurantStatus::Rejected, Some("No license"), 9)
            .await
            .unwrap();
        assert_eq!(r.rejection_reason.as_deref(), Some("No license"));
        assert_eq!(r.reviewed_by, Some(9));

        let err = set_status(&db.pool, id, RestaurantStatus::Suspended, None, 9)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RepoError::Business(ErrorCode::InvalidStatusTransition, _)
        ));

        let r = set_status(&db.pool, id, RestaurantStatus::Approved, None, 9)
            .await
            .unwrap();
        assert_eq!(r.rejection_reason, None);
        assert_eq!(
            find_all(&db.pool, Some(RestaurantStatus::Approved))
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn profile_update_keeps_unset_fields() {
        let db = DbService::in_memory().await.unwrap();
        let (r, _) = approved(&db.pool, "x").await;
        let updated = update(
            &db.pool,
            r.id,
            &RestaurantUpdate {
                closing_time: Some("02:00".into()),
                is_accepting_orders: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.closing_time, "02:00");
        assert_eq!(updated.opening_time, "09:00");
        assert!(!updated.is_accepting_orders);
    }
}
