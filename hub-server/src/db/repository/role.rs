//! Role Repository
//!
//! Two independent role sets share the [`Role`] model: `admin_role` for
//! super-admins and `staff_role`, scoped per restaurant.

use super::{RepoError, RepoResult, to_json};
use crate::auth::permissions::{
    ADMIN_PERMISSIONS, ALL, OWNER_ROLE, STAFF_PERMISSIONS, find_unknown,
};
use shared::error::ErrorCode;
use shared::models::{Role, RoleCreate, RoleUpdate};
use shared::util::{now_millis, snowflake_id};
use sqlx::{Sqlite, SqlitePool, Transaction};

const ADMIN_COLUMNS: &str = "id, name, description, permissions, is_system, created_at";
const STAFF_COLUMNS: &str =
    "id, restaurant_id, name, description, permissions, is_system, created_at";

fn name_conflict(err: RepoError, name: &str) -> RepoError {
    match err {
        RepoError::Duplicate(_) => RepoError::Business(
            ErrorCode::RoleNameExists,
            format!("Role '{name}' already exists"),
        ),
        other => other,
    }
}

fn check_permissions(catalogue: &[(&str, &str)], permissions: &[String]) -> RepoResult<()> {
    match find_unknown(catalogue, permissions) {
        Some(p) => Err(RepoError::Business(
            ErrorCode::UnknownPermission,
            format!("Unknown permission '{p}'"),
        )),
        None => Ok(()),
    }
}

fn system_guard(role: &Role, action: &str) -> RepoResult<()> {
    if role.is_system {
        return Err(RepoError::Business(
            ErrorCode::RoleIsSystem,
            format!("Cannot {action} system role"),
        ));
    }
    Ok(())
}

// ==================== Admin roles ====================

pub async fn admin_find_all(pool: &SqlitePool) -> RepoResult<Vec<Role>> {
    let roles = sqlx::query_as::<_, Role>(&format!(
        "SELECT {ADMIN_COLUMNS} FROM admin_role ORDER BY name"
    ))
    .fetch_all(pool)
    .await?;
    Ok(roles)
}

pub async fn admin_find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Role>> {
    let role = sqlx::query_as::<_, Role>(&format!(
        "SELECT {ADMIN_COLUMNS} FROM admin_role WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(role)
}

pub async fn admin_find_by_name(pool: &SqlitePool, name: &str) -> RepoResult<Option<Role>> {
    let role = sqlx::query_as::<_, Role>(&format!(
        "SELECT {ADMIN_COLUMNS} FROM admin_role WHERE name = ? LIMIT 1"
    ))
    .bind(name)
    .fetch_optional(pool)
    .await?;
    Ok(role)
}

pub async fn admin_create(pool: &SqlitePool, data: &RoleCreate) -> RepoResult<Role> {
    check_permissions(ADMIN_PERMISSIONS, &data.permissions)?;

    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO admin_role (id, name, description, permissions, is_system, created_at) VALUES (?, ?, ?, ?, 0, ?)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(to_json(&data.permissions)?)
    .bind(now_millis())
    .execute(pool)
    .await
    .map_err(|e| name_conflict(e.into(), &data.name))?;

    admin_find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create role".into()))
}

pub async fn admin_update(pool: &SqlitePool, id: i64, data: &RoleUpdate) -> RepoResult<Role> {
    let existing = admin_find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Business(ErrorCode::RoleNotFound, format!("Role {id} not found")))?;
    system_guard(&existing, "modify")?;

    if let Some(permissions) = &data.permissions {
        check_permissions(ADMIN_PERMISSIONS, permissions)?;
    }
    let permissions_json = data.permissions.as_ref().map(to_json).transpose()?;

    sqlx::query(
        "UPDATE admin_role SET name = COALESCE(?1, name), description = COALESCE(?2, description), permissions = COALESCE(?3, permissions) WHERE id = ?4",
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(permissions_json)
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| name_conflict(e.into(), data.name.as_deref().unwrap_or_default()))?;

    admin_find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Business(ErrorCode::RoleNotFound, format!("Role {id} not found")))
}

pub async fn admin_delete(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let existing = admin_find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Business(ErrorCode::RoleNotFound, format!("Role {id} not found")))?;
    system_guard(&existing, "delete")?;

    let in_use: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admin_user WHERE role_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    if in_use > 0 {
        return Err(RepoError::Business(
            ErrorCode::RoleInUse,
            format!("Role is assigned to {in_use} admin(s)"),
        ));
    }

    sqlx::query("DELETE FROM admin_role WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

// ==================== Staff roles ====================

pub async fn staff_find_all(pool: &SqlitePool, restaurant_id: i64) -> RepoResult<Vec<Role>> {
    let roles = sqlx::query_as::<_, Role>(&format!(
        "SELECT {STAFF_COLUMNS} FROM staff_role WHERE restaurant_id = ? ORDER BY name"
    ))
    .bind(restaurant_id)
    .fetch_all(pool)
    .await?;
    Ok(roles)
}

pub async fn staff_find_by_id(
    pool: &SqlitePool,
    restaurant_id: i64,
    id: i64,
) -> RepoResult<Option<Role>> {
    let role = sqlx::query_as::<_, Role>(&format!(
        "SELECT {STAFF_COLUMNS} FROM staff_role WHERE id = ? AND restaurant_id = ?"
    ))
    .bind(id)
    .bind(restaurant_id)
    .fetch_optional(pool)
    .await?;
    Ok(role)
}

/// Create the `owner` system role of a newly registered restaurant
pub async fn staff_create_owner(
    tx: &mut Transaction<'_, Sqlite>,
    restaurant_id: i64,
) -> RepoResult<i64> {
    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO staff_role (id, restaurant_id, name, description, permissions, is_system, created_at) VALUES (?, ?, ?, 'Restaurant owner', ?, 1, ?)",
    )
    .bind(id)
    .bind(restaurant_id)
    .bind(OWNER_ROLE)
    .bind(to_json(&[ALL])?)
    .bind(now_millis())
    .execute(&mut **tx)
    .await?;
    Ok(id)
}

pub async fn staff_create(
    pool: &SqlitePool,
    restaurant_id: i64,
    data: &RoleCreate,
) -> RepoResult<Role> {
    check_permissions(STAFF_PERMISSIONS, &data.permissions)?;

    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO staff_role (id, restaurant_id, name, description, permissions, is_system, created_at) VALUES (?, ?, ?, ?, ?, 0, ?)",
    )
    .bind(id)
    .bind(restaurant_id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(to_json(&data.permissions)?)
    .bind(now_millis())
    .execute(pool)
    .await
    .map_err(|e| name_conflict(e.into(), &data.name))?;

    staff_find_by_id(pool, restaurant_id, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create role".into()))
}

pub async fn staff_update(
    pool: &SqlitePool,
    restaurant_id: i64,
    id: i64,
    data: &RoleUpdate,
) -> RepoResult<Role> {
    let existing = staff_find_by_id(pool, restaurant_id, id)
        .await?
        .ok_or_else(|| RepoError::Business(ErrorCode::RoleNotFound, format!("Role {id} not found")))?;
    system_guard(&existing, "modify")?;

    if let Some(permissions) = &data.permissions {
        check_permissions(STAFF_PERMISSIONS, permissions)?;
    }
    let permissions_json = data.permissions.as_ref().map(to_json).transpose()?;

    sqlx::query(
        "UPDATE staff_role SET name = COALESCE(?1, name), description = COALESCE(?2, description), permissions = COALESCE(?3, permissions) WHERE id = ?4 AND restaurant_id = ?5",
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(permissions_json)
    .bind(id)
    .bind(restaurant_id)
    .execute(pool)
    .await
    .map_err(|e| name_conflict(e.into(), data.name.as_deref().unwrap_or_default()))?;

    staff_find_by_id(pool, restaurant_id, id)
        .await?
        .ok_or_else(|| RepoError::Business(ErrorCode::RoleNotFound, format!("Role {id} not found")))
}

pub async fn staff_delete(pool: &SqlitePool, restaurant_id: i64, id: i64) -> RepoResult<()> {
    let existing = staff_find_by_id(pool, restaurant_id, id)
        .await?
        .ok_or_else(|| RepoError::Business(ErrorCode::RoleNotFound, format!("Role {id} not found")))?;
    system_guard(&existing, "delete")?;

    let in_use: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM staff_user WHERE role_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    if in_use > 0 {
        return Err(RepoError::Business(
            ErrorCode::RoleInUse,
            format!("Role is assigned to {in_use} staff member(s)"),
        ));
    }

    sqlx::query("DELETE FROM staff_role WHERE id = ? AND restaurant_id = ?")
        .bind(id)
        .bind(restaurant_id)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::repository::admin_user;

    fn create(name: &str, permissions: &[&str]) -> RoleCreate {
        RoleCreate {
            name: name.to_string(),
            description: None,
            permissions: permissions.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn admin_role_crud() {
        let db = DbService::in_memory().await.unwrap();
        let role = admin_create(&db.pool, &create("moderator", &["restaurants:*"]))
            .await
            .unwrap();
        assert!(!role.is_system);
        assert_eq!(role.restaurant_id, None);

        let updated = admin_update(
            &db.pool,
            role.id,
            &RoleUpdate {
                name: None,
                description: Some("Reviews restaurants".into()),
                permissions: Some(vec!["restaurants:read".into()]),
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.permissions, vec!["restaurants:read".to_string()]);
        assert_eq!(updated.name, "moderator");

        admin_delete(&db.pool, role.id).await.unwrap();
        assert!(admin_find_by_id(&db.pool, role.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unknown_permission_rejected() {
        let db = DbService::in_memory().await.unwrap();
        let err = admin_create(&db.pool, &create("bad", &["menu:manage"]))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::UnknownPermission, _)));
    }

    #[tokio::test]
    async fn duplicate_name_rejected() {
        let db = DbService::in_memory().await.unwrap();
        admin_create(&db.pool, &create("support", &[])).await.unwrap();
        let err = admin_create(&db.pool, &create("support", &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::RoleNameExists, _)));
    }

    #[tokio::test]
    async fn system_role_is_immutable() {
        let db = DbService::in_memory().await.unwrap();
        let sa = admin_find_by_name(&db.pool, "super_admin")
            .await
            .unwrap()
            .unwrap();
        let err = admin_delete(&db.pool, sa.id).await.unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::RoleIsSystem, _)));
    }

    #[tokio::test]
    async fn role_in_use_cannot_be_deleted() {
        let db = DbService::in_memory().await.unwrap();
        let role = admin_create(&db.pool, &create("support", &["customers:read"]))
            .await
            .unwrap();
        admin_user::create(&db.pool, "Sam", "sam@hub.io", "hash", role.id)
            .await
            .unwrap();
        let err = admin_delete(&db.pool, role.id).await.unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::RoleInUse, _)));
    }
}
