//! Role Model (admin and staff role sets)

use serde::{Deserialize, Serialize};

/// Role entity
///
/// Used for both `admin_role` and `staff_role`. Admin roles carry no
/// restaurant; staff roles are scoped to one restaurant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Role {
    pub id: i64,
    #[cfg_attr(feature = "db", sqlx(default))]
    pub restaurant_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    /// JSON array of permission strings (e.g. ["all"], ["orders:*", "menu:read"])
    #[cfg_attr(feature = "db", sqlx(json))]
    pub permissions: Vec<String>,
    pub is_system: bool,
    pub created_at: i64,
}

/// Catalogue entry of a grantable permission
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Permission {
    pub code: String,
    pub description: String,
}

/// Create role payload
#[derive(Debug, Clone, Serialize, Deserialize, validator::Validate)]
pub struct RoleCreate {
    #[validate(length(min = 1, max = 64))]
    pub name: String,
    #[validate(length(max = 255))]
    pub description: Option<String>,
    pub permissions: Vec<String>,
}

/// Update role payload
#[derive(Debug, Clone, Serialize, Deserialize, validator::Validate)]
pub struct RoleUpdate {
    #[validate(length(min = 1, max = 64))]
    pub name: Option<String>,
    #[validate(length(max = 255))]
    pub description: Option<String>,
    pub permissions: Option<Vec<String>>,
}
