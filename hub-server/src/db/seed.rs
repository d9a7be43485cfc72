//! Catalogue seeding and admin bootstrap

use super::repository::{RepoResult, admin_user, role};
use crate::auth::permissions::{
    ADMIN_PERMISSIONS, ALL, STAFF_PERMISSIONS, SUPER_ADMIN_ROLE,
};
use shared::models::Role;
use shared::util::{normalize_email, now_millis, snowflake_id};
use sqlx::SqlitePool;

/// Insert both permission catalogues and the `super_admin` system role
pub async fn seed_catalogues(pool: &SqlitePool) -> RepoResult<()> {
    for (code, description) in ADMIN_PERMISSIONS {
        sqlx::query("INSERT OR IGNORE INTO admin_permission (code, description) VALUES (?, ?)")
            .bind(*code)
            .bind(*description)
            .execute(pool)
            .await?;
    }
    for (code, description) in STAFF_PERMISSIONS {
        sqlx::query("INSERT OR IGNORE INTO staff_permission (code, description) VALUES (?, ?)")
            .bind(*code)
            .bind(*description)
            .execute(pool)
            .await?;
    }

    sqlx::query(
        "INSERT OR IGNORE INTO admin_role (id, name, description, permissions, is_system, created_at) \
         VALUES (?, ?, 'Platform super administrator', ?, 1, ?)",
    )
    .bind(snowflake_id())
    .bind(SUPER_ADMIN_ROLE)
    .bind(super::repository::to_json(&[ALL])?)
    .bind(now_millis())
    .execute(pool)
    .await?;

    Ok(())
}

/// The seeded `super_admin` role
pub async fn super_admin_role(pool: &SqlitePool) -> RepoResult<Role> {
    role::admin_find_by_name(pool, SUPER_ADMIN_ROLE)
        .await?
        .ok_or_else(|| super::repository::RepoError::NotFound("super_admin role".into()))
}

/// Create the first super-admin when no admin account exists yet
///
/// Returns the id of the created admin, or `None` when admins already exist.
pub async fn ensure_bootstrap_admin(
    pool: &SqlitePool,
    email: &str,
    password_hash: &str,
) -> RepoResult<Option<i64>> {
    if admin_user::count(pool).await? > 0 {
        return Ok(None);
    }

    let role = super_admin_role(pool).await?;
    let admin = admin_user::create(
        pool,
        "Administrator",
        &normalize_email(email),
        password_hash,
        role.id,
    )
    .await?;
    tracing::info!(admin_id = admin.id, email = %admin.email, "Bootstrap super-admin created");
    Ok(Some(admin.id))
}
