//! Staff User Repository
//!
//! Every query is scoped by restaurant; a staff member of one restaurant
//! never sees another restaurant's accounts.

use super::{RepoError, RepoResult};
use shared::error::ErrorCode;
use shared::models::StaffUser;
use shared::util::{now_millis, snowflake_id};
use sqlx::{Sqlite, SqlitePool, Transaction};

const COLUMNS: &str = "id, restaurant_id, name, email, password_hash, role_id, is_active, created_at";

fn email_conflict(err: sqlx::Error, email: &str) -> RepoError {
    match RepoError::from(err) {
        RepoError::Duplicate(_) => RepoError::Business(
            ErrorCode::EmailAlreadyRegistered,
            format!("Email '{email}' is already registered"),
        ),
        other => other,
    }
}

fn not_found(id: i64) -> RepoError {
    RepoError::Business(ErrorCode::StaffNotFound, format!("Staff {id} not found"))
}

pub async fn find_all(pool: &SqlitePool, restaurant_id: i64) -> RepoResult<Vec<StaffUser>> {
    let staff = sqlx::query_as::<_, StaffUser>(&format!(
        "SELECT {COLUMNS} FROM staff_user WHERE restaurant_id = ? ORDER BY created_at"
    ))
    .bind(restaurant_id)
    .fetch_all(pool)
    .await?;
    Ok(staff)
}

pub async fn find_by_id(
    pool: &SqlitePool,
    restaurant_id: i64,
    id: i64,
) -> RepoResult<Option<StaffUser>> {
    let staff = sqlx::query_as::<_, StaffUser>(&format!(
        "SELECT {COLUMNS} FROM staff_user WHERE id = ? AND restaurant_id = ?"
    ))
    .bind(id)
    .bind(restaurant_id)
    .fetch_optional(pool)
    .await?;
    Ok(staff)
}

/// Login lookup across all restaurants; `email` must already be normalized
pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<StaffUser>> {
    let staff = sqlx::query_as::<_, StaffUser>(&format!(
        "SELECT {COLUMNS} FROM staff_user WHERE email = ? LIMIT 1"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(staff)
}

/// Insert the owner account inside the registration transaction
pub async fn create_in_tx(
    tx: &mut Transaction<'_, Sqlite>,
    restaurant_id: i64,
    name: &str,
    email: &str,
    password_hash: &str,
    role_id: i64,
) -> RepoResult<i64> {
    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO staff_user (id, restaurant_id, name, email, password_hash, role_id, is_active, created_at) VALUES (?, ?, ?, ?, ?, ?, 1, ?)",
    )
    .bind(id)
    .bind(restaurant_id)
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role_id)
    .bind(now_millis())
    .execute(&mut **tx)
    .await
    .map_err(|e| email_conflict(e, email))?;
    Ok(id)
}

pub async fn create(
    pool: &SqlitePool,
    restaurant_id: i64,
    name: &str,
    email: &str,
    password_hash: &str,
    role_id: i64,
) -> RepoResult<StaffUser> {
    let mut tx = pool.begin().await?;
    let id = create_in_tx(&mut tx, restaurant_id, name, email, password_hash, role_id).await?;
    tx.commit().await?;

    find_by_id(pool, restaurant_id, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create staff".into()))
}

/// Apply the given changes; `None` keeps the current value
pub async fn update(
    pool: &SqlitePool,
    restaurant_id: i64,
    id: i64,
    name: Option<&str>,
    password_hash: Option<&str>,
    role_id: Option<i64>,
    is_active: Option<bool>,
) -> RepoResult<StaffUser> {
    let rows = sqlx::query(
        "UPDATE staff_user SET name = COALESCE(?1, name), password_hash = COALESCE(?2, password_hash), role_id = COALESCE(?3, role_id), is_active = COALESCE(?4, is_active) WHERE id = ?5 AND restaurant_id = ?6",
    )
    .bind(name)
    .bind(password_hash)
    .bind(role_id)
    .bind(is_active)
    .bind(id)
    .bind(restaurant_id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(not_found(id));
    }
    find_by_id(pool, restaurant_id, id)
        .await?
        .ok_or_else(|| not_found(id))
}

pub async fn delete(pool: &SqlitePool, restaurant_id: i64, id: i64) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM staff_user WHERE id = ? AND restaurant_id = ?")
        .bind(id)
        .bind(restaurant_id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(not_found(id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::repository::restaurant;
    use crate::db::repository::restaurant::tests::register_payload;

    #[tokio::test]
    async fn staff_is_scoped_to_restaurant() {
        let db = DbService::in_memory().await.unwrap();
        let a = restaurant::register(&db.pool, &register_payload("a"), "hash")
            .await
            .unwrap();
        let b = restaurant::register(&db.pool, &register_payload("b"), "hash")
            .await
            .unwrap();

        assert_eq!(find_all(&db.pool, a.restaurant.id).await.unwrap().len(), 1);
        assert!(
            find_by_id(&db.pool, b.restaurant.id, a.owner_id)
                .await
                .unwrap()
                .is_none()
        );
        let err = delete(&db.pool, b.restaurant.id, a.owner_id)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::StaffNotFound, _)));
    }

    #[tokio::test]
    async fn email_is_unique_across_restaurants() {
        let db = DbService::in_memory().await.unwrap();
        let a = restaurant::register(&db.pool, &register_payload("a"), "hash")
            .await
            .unwrap();
        let owner = find_by_id(&db.pool, a.restaurant.id, a.owner_id)
            .await
            .unwrap()
            .unwrap();
        let err = create(
            &db.pool,
            a.restaurant.id,
            "Clone",
            &owner.email,
            "hash",
            owner.role_id,
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            RepoError::Business(ErrorCode::EmailAlreadyRegistered, _)
        ));
    }
}
