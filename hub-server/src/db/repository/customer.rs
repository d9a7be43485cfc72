//! Customer Repository

use super::{RepoError, RepoResult};
use shared::error::ErrorCode;
use shared::models::Customer;
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, name, email, phone, password_hash, is_active, created_at";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Customer>> {
    let customer = sqlx::query_as::<_, Customer>(&format!(
        "SELECT {COLUMNS} FROM customer WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(customer)
}

/// `email` must already be normalized
pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<Customer>> {
    let customer = sqlx::query_as::<_, Customer>(&format!(
        "SELECT {COLUMNS} FROM customer WHERE email = ? LIMIT 1"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(customer)
}

pub async fn find_page(pool: &SqlitePool, limit: i64, offset: i64) -> RepoResult<Vec<Customer>> {
    let customers = sqlx::query_as::<_, Customer>(&format!(
        "SELECT {COLUMNS} FROM customer ORDER BY created_at DESC LIMIT ? OFFSET ?"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(customers)
}

pub async fn count(pool: &SqlitePool) -> RepoResult<i64> {
    let n = sqlx::query_scalar("SELECT COUNT(*) FROM customer")
        .fetch_one(pool)
        .await?;
    Ok(n)
}

pub async fn create(
    pool: &SqlitePool,
    name: &str,
    email: &str,
    phone: Option<&str>,
    password_hash: &str,
) -> RepoResult<Customer> {
    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO customer (id, name, email, phone, password_hash, is_active, created_at) VALUES (?, ?, ?, ?, ?, 1, ?)",
    )
    .bind(id)
    .bind(name)
    .bind(email)
    .bind(phone)
    .bind(password_hash)
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
        .ok_or_else(|| RepoError::Database("Failed to create customer".into()))
}

pub async fn set_active(pool: &SqlitePool, id: i64, is_active: bool) -> RepoResult<Customer> {
    let rows = sqlx::query("UPDATE customer SET is_active = ? WHERE id = ?")
        .bind(is_active)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::Business(
            ErrorCode::CustomerNotFound,
            format!("Customer {id} not found"),
        ));
    }
    find_by_id(pool, id).await?.ok_or_else(|| {
        RepoError::Business(ErrorCode::CustomerNotFound, format!("Customer {id} not found"))
    })
}
