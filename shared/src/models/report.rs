//! Report Models

use serde::{Deserialize, Serialize};

/// Count of rows sharing a status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

/// Platform-wide dashboard figures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSummary {
    pub restaurants_by_status: Vec<StatusCount>,
    pub customer_count: i64,
    pub order_count: i64,
    /// Sum of paid order totals
    pub revenue: f64,
}

/// One restaurant's figures over a time range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantSummary {
    pub restaurant_id: i64,
    pub from: i64,
    pub to: i64,
    pub requests_by_status: Vec<StatusCount>,
    pub orders_by_status: Vec<StatusCount>,
    pub revenue: f64,
}

/// `[from, to)` range query in epoch ms
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RangeQuery {
    pub from: Option<i64>,
    pub to: Option<i64>,
}
