//! Admin User Repository

use super::{RepoError, RepoResult};
use shared::error::ErrorCode;
use shared::models::AdminUser;
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, name, email, password_hash, role_id, is_active, created_at";

pub async fn count(pool: &SqlitePool) -> RepoResult<i64> {
    let n = sqlx::query_scalar("SELECT COUNT(*) FROM admin_user")
        .fetch_one(pool)
        .await?;
    Ok(n)
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<AdminUser>> {
    let admins = sqlx::query_as::<_, AdminUser>(&format!(
        "SELECT {COLUMNS} FROM admin_user ORDER BY created_at"
    ))
    .fetch_all(pool)
    .await?;
    Ok(admins)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<AdminUser>> {
    let admin = sqlx::query_as::<_, AdminUser>(&format!(
        "SELECT {COLUMNS} FROM admin_user WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(admin)
}

/// `email` must already be normalized
pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<AdminUser>> {
    let admin = sqlx::query_as::<_, AdminUser>(&format!(
        "SELECT {COLUMNS} FROM admin_user WHERE email = ? LIMIT 1"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(admin)
}

pub async fn create(
    pool: &SqlitePool,
    name: &str,
    email: &str,
    password_hash: &str,
    role_id: i64,
) -> RepoResult<AdminUser> {
    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO admin_user (id, name, email, password_hash, role_id, is_active, created_at) VALUES (?, ?, ?, ?, ?, 1, ?)",
    )
    .bind(id)
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role_id)
    .bind(now_millis())
    .execute(pool)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(_) => RepoError::Business(
            ErrorCode::EmailAlreadyRegistered,
            format!("Email '{email}' is already registered"),
        ),
        other => other,
    })?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create admin".into()))
}

/// Apply the given changes; `None` keeps the current value
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    name: Option<&str>,
    password_hash: Option<&str>,
    role_id: Option<i64>,
    is_active: Option<bool>,
) -> RepoResult<AdminUser> {
    let rows = sqlx::query(
        "UPDATE admin_user SET name = COALESCE(?1, name), password_hash = COALESCE(?2, password_hash), role_id = COALESCE(?3, role_id), is_active = COALESCE(?4, is_active) WHERE id = ?5",
    )
    .bind(name)
    .bind(password_hash)
    .bind(role_id)
    .bind(is_active)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::Business(
            ErrorCode::AdminNotFound,
            format!("Admin {id} not found"),
        ));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Business(ErrorCode::AdminNotFound, format!("Admin {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM admin_user WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::Business(
            ErrorCode::AdminNotFound,
            format!("Admin {id} not found"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::seed::super_admin_role;

    #[tokio::test]
    async fn create_update_delete() {
        let db = DbService::in_memory().await.unwrap();
        let role = super_admin_role(&db.pool).await.unwrap();

        let admin = create(&db.pool, "Ana", "ana@hub.io", "h1", role.id)
            .await
            .unwrap();
        assert!(admin.is_active);
        assert_eq!(count(&db.pool).await.unwrap(), 1);

        let updated = update(&db.pool, admin.id, Some("Ana B"), None, None, Some(false))
            .await
            .unwrap();
        assert_eq!(updated.name, "Ana B");
        assert_eq!(updated.password_hash, "h1");
        assert!(!updated.is_active);

        delete(&db.pool, admin.id).await.unwrap();
        assert!(find_by_id(&db.pool, admin.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email() {
        let db = DbService::in_memory().await.unwrap();
        let role = super_admin_role(&db.pool).await.unwrap();
        create(&db.pool, "Ana", "ana@hub.io", "h", role.id).await.unwrap();
        let err = create(&db.pool, "Other", "ana@hub.io", "h", role.id)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RepoError::Business(ErrorCode::EmailAlreadyRegistered, _)
        ));
    }
}
