//! Restaurant Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Onboarding / moderation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum RestaurantStatus {
    Pending,
    Approved,
    Rejected,
    Suspended,
}

impl RestaurantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Suspended => "suspended",
        }
    }

    /// Moderation transitions allowed to a super-admin
    pub fn can_transition_to(&self, next: RestaurantStatus) -> bool {
        use RestaurantStatus::*;
        matches!(
            (self, next),
            (Pending, Approved)
                | (Pending, Rejected)
                | (Rejected, Approved)
                | (Approved, Suspended)
                | (Suspended, Approved)
        )
    }
}

/// Restaurant entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Restaurant {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub cuisine: Option<String>,
    /// "HH:MM", local time
    pub opening_time: String,
    /// "HH:MM", local time; `closing <= opening` wraps past midnight
    pub closing_time: String,
    /// Offset of the restaurant's local time from UTC
    pub utc_offset_minutes: i32,
    pub is_accepting_orders: bool,
    pub status: RestaurantStatus,
    pub rejection_reason: Option<String>,
    pub created_at: i64,
    pub reviewed_at: Option<i64>,
    pub reviewed_by: Option<i64>,
}

/// Public registration payload, creates the restaurant and its owner account
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RestaurantRegister {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 3, max = 32))]
    pub phone: String,
    #[validate(length(min = 1, max = 255))]
    pub address: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[validate(length(max = 64))]
    pub cuisine: Option<String>,
    pub opening_time: String,
    pub closing_time: String,
    #[serde(default)]
    #[validate(range(min = -720, max = 840))]
    pub utc_offset_minutes: i32,
    #[validate(length(min = 1, max = 100))]
    pub owner_name: String,
    #[validate(email)]
    pub owner_email: String,
    #[validate(length(min = 8, max = 128))]
    pub owner_password: String,
}

/// Staff-side profile update
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct RestaurantUpdate {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    #[validate(length(min = 3, max = 32))]
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub address: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    #[validate(length(max = 64))]
    pub cuisine: Option<String>,
    pub opening_time: Option<String>,
    pub closing_time: Option<String>,
    #[validate(range(min = -720, max = 840))]
    pub utc_offset_minutes: Option<i32>,
    pub is_accepting_orders: Option<bool>,
}

/// Reject payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RestaurantReject {
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
}

/// Result of a successful registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantRegistered {
    pub restaurant: Restaurant,
    pub owner_id: i64,
}
