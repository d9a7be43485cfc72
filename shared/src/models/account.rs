//! Account Models (admin users, staff users, customers)

use serde::{Deserialize, Serialize};

/// Super-admin account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct AdminUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role_id: i64,
    pub is_active: bool,
    pub created_at: i64,
}

/// Restaurant staff account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct StaffUser {
    pub id: i64,
    pub restaurant_id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role_id: i64,
    pub is_active: bool,
    pub created_at: i64,
}

/// End customer account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub is_active: bool,
    pub created_at: i64,
}

/// Create admin / staff payload
#[derive(Debug, Clone, Serialize, Deserialize, validator::Validate)]
pub struct AccountCreate {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    pub role_id: i64,
}

/// Update admin / staff payload
#[derive(Debug, Clone, Serialize, Deserialize, validator::Validate)]
pub struct AccountUpdate {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 8, max = 128))]
    pub password: Option<String>,
    pub role_id: Option<i64>,
    pub is_active: Option<bool>,
}

/// Customer self-registration payload
#[derive(Debug, Clone, Serialize, Deserialize, validator::Validate)]
pub struct CustomerRegister {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, max = 32))]
    pub phone: Option<String>,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}
