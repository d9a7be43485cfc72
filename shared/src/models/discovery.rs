//! Discovery query / result types

use super::restaurant::Restaurant;
use serde::{Deserialize, Serialize};

/// Restaurants along the straight route from A to B
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlongRouteQuery {
    pub from_lat: f64,
    pub from_lng: f64,
    pub to_lat: f64,
    pub to_lng: f64,
    pub radius_km: Option<f64>,
}

/// Restaurants around a point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyQuery {
    pub lat: f64,
    pub lng: f64,
    pub radius_km: Option<f64>,
}

/// A matching restaurant with its geometry relative to the query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantMatch {
    #[serde(flatten)]
    pub restaurant: Restaurant,
    pub distance_km: f64,
    /// Position along the route in [0, 1]; absent for nearby queries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
}
