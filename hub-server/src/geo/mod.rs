//! Restaurant discovery
//!
//! - [`along_route`] - restaurants within a corridor ahead on a straight route
//! - [`nearby`] - restaurants around a point (haversine)

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{AlongRouteQuery, NearbyQuery, Restaurant, RestaurantMatch, RestaurantStatus};
use sqlx::SqlitePool;

use crate::db::repository::restaurant as restaurant_repo;

/// Mean Earth radius (km)
pub const EARTH_RADIUS_KM: f64 = 6371.0;
pub const DEFAULT_RADIUS_KM: f64 = 2.0;
pub const MAX_RADIUS_KM: f64 = 50.0;

/// Geographic point in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> AppResult<Self> {
        let valid = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);
        if !valid {
            return Err(AppError::with_message(
                ErrorCode::InvalidCoordinates,
                format!("Coordinates out of range: {lat}, {lng}"),
            ));
        }
        Ok(Self { lat, lng })
    }
}

/// Radius from a query, defaulted and bounded
pub fn radius_km(requested: Option<f64>) -> AppResult<f64> {
    match requested {
        None => Ok(DEFAULT_RADIUS_KM),
        Some(r) if r.is_finite() && r > 0.0 && r <= MAX_RADIUS_KM => Ok(r),
        Some(r) => Err(AppError::validation(format!(
            "radius_km must be in (0, {MAX_RADIUS_KM}], got {r}"
        ))),
    }
}

/// Great-circle distance (km)
pub fn haversine_km(a: LatLng, b: LatLng) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = lat2 - lat1;
    let dlng = (b.lng - a.lng).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Local planar frame (km) centred on the route's mean latitude
#[derive(Debug, Clone, Copy)]
struct Projection {
    origin: LatLng,
    cos_lat: f64,
}

impl Projection {
    fn new(a: LatLng, b: LatLng) -> Self {
        Self {
            origin: a,
            cos_lat: ((a.lat + b.lat) / 2.0).to_radians().cos(),
        }
    }

    fn project(&self, p: LatLng) -> (f64, f64) {
        let x = (p.lng - self.origin.lng).to_radians() * self.cos_lat * EARTH_RADIUS_KM;
        let y = (p.lat - self.origin.lat).to_radians() * EARTH_RADIUS_KM;
        (x, y)
    }
}

/// Position of a point relative to a route segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoutePosition {
    /// Distance to the segment (km)
    pub distance_km: f64,
    /// Projection parameter clamped to [0, 1]
    pub progress: f64,
    /// The point is not behind the start
    pub ahead: bool,
}

/// Locate `p` relative to the segment `a -> b`
pub fn route_position(a: LatLng, b: LatLng, p: LatLng) -> RoutePosition {
    let proj = Projection::new(a, b);
    let (bx, by) = proj.project(b);
    let (px, py) = proj.project(p);

    let len_sq = bx * bx + by * by;
    let dot = px * bx + py * by;
    if len_sq == 0.0 {
        return RoutePosition {
            distance_km: px.hypot(py),
            progress: 0.0,
            ahead: true,
        };
    }

    let t = (dot / len_sq).clamp(0.0, 1.0);
    let (cx, cy) = (bx * t, by * t);
    RoutePosition {
        distance_km: (px - cx).hypot(py - cy),
        progress: t,
        ahead: dot >= 0.0,
    }
}

fn location(r: &Restaurant) -> Option<LatLng> {
    LatLng::new(r.latitude, r.longitude).ok()
}

/// Filter and order candidates along the route
pub fn match_along_route(
    restaurants: Vec<Restaurant>,
    from: LatLng,
    to: LatLng,
    radius: f64,
) -> Vec<RestaurantMatch> {
    let mut matches: Vec<RestaurantMatch> = restaurants
        .into_iter()
        .filter_map(|r| {
            let pos = route_position(from, to, location(&r)?);
            (pos.ahead && pos.distance_km <= radius).then(|| RestaurantMatch {
                restaurant: r,
                distance_km: pos.distance_km,
                progress: Some(pos.progress),
            })
        })
        .collect();

    matches.sort_by(|a, b| {
        let (pa, pb) = (a.progress.unwrap_or_default(), b.progress.unwrap_or_default());
        pa.total_cmp(&pb).then(a.distance_km.total_cmp(&b.distance_km))
    });
    matches
}

/// Filter and order candidates by distance from a point
pub fn match_nearby(restaurants: Vec<Restaurant>, center: LatLng, radius: f64) -> Vec<RestaurantMatch> {
    let mut matches: Vec<RestaurantMatch> = restaurants
        .into_iter()
        .filter_map(|r| {
            let distance_km = haversine_km(center, location(&r)?);
            (distance_km <= radius).then_some(RestaurantMatch {
                restaurant: r,
                distance_km,
                progress: None,
            })
        })
        .collect();
    matches.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    matches
}

pub async fn along_route(pool: &SqlitePool, query: &AlongRouteQuery) -> AppResult<Vec<RestaurantMatch>> {
    let from = LatLng::new(query.from_lat, query.from_lng)?;
    let to = LatLng::new(query.to_lat, query.to_lng)?;
    let radius = radius_km(query.radius_km)?;

    let candidates = restaurant_repo::find_all(pool, Some(RestaurantStatus::Approved)).await?;
    let matches = match_along_route(candidates, from, to, radius);
    tracing::debug!(radius_km = radius, matches = matches.len(), "Along-route search");
    Ok(matches)
}

pub async fn nearby(pool: &SqlitePool, query: &NearbyQuery) -> AppResult<Vec<RestaurantMatch>> {
    let center = LatLng::new(query.lat, query.lng)?;
    let radius = radius_km(query.radius_km)?;

    let candidates = restaurant_repo::find_all(pool, Some(RestaurantStatus::Approved)).await?;
    Ok(match_nearby(candidates, center, radius))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(lat: f64, lng: f64) -> LatLng {
        LatLng::new(lat, lng).unwrap()
    }

    fn restaurant(id: i64, lat: f64, lng: f64) -> Restaurant {
        Restaurant {
            id,
            name: format!("R{id}"),
            email: format!("r{id}@x.io"),
            phone: "1".into(),
            address: "a".into(),
            latitude: lat,
            longitude: lng,
            cuisine: None,
            opening_time: "09:00".into(),
            closing_time: "22:00".into(),
            utc_offset_minutes: 0,
            is_accepting_orders: true,
            status: RestaurantStatus::Approved,
            rejection_reason: None,
            created_at: 0,
            reviewed_at: None,
            reviewed_by: None,
        }
    }

    #[test]
    fn haversine_one_degree_of_latitude() {
        let d = haversine_km(at(0.0, 0.0), at(1.0, 0.0));
        assert!((d - 111.19).abs() < 0.01, "{d}");
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(LatLng::new(91.0, 0.0).unwrap_err().code, ErrorCode::InvalidCoordinates);
        assert_eq!(LatLng::new(0.0, f64::NAN).unwrap_err().code, ErrorCode::InvalidCoordinates);
        assert_eq!(radius_km(None).unwrap(), DEFAULT_RADIUS_KM);
        assert!(radius_km(Some(0.0)).is_err());
        assert!(radius_km(Some(51.0)).is_err());
    }

    #[test]
    fn position_along_equator() {
        let (a, b) = (at(0.0, 0.0), at(0.0, 1.0));
        let mid = route_position(a, b, at(0.01, 0.5));
        assert!((mid.progress - 0.5).abs() < 1e-9);
        assert!((mid.distance_km - 1.112).abs() < 0.01);
        assert!(mid.ahead);

        let behind = route_position(a, b, at(0.0, -0.01));
        assert!(!behind.ahead);
        assert_eq!(behind.progress, 0.0);

        let past_end = route_position(a, b, at(0.0, 1.01));
        assert_eq!(past_end.progress, 1.0);
        assert!((past_end.distance_km - 1.112).abs() < 0.01);
    }

    #[test]
    fn degenerate_route_is_a_point() {
        let a = at(10.0, 10.0);
        let pos = route_position(a, a, at(10.0, 10.01));
        assert!(pos.ahead);
        assert!(pos.distance_km > 1.0 && pos.distance_km < 1.2);
    }

    #[test]
    fn along_route_orders_by_progress_then_distance() {
        let candidates = vec![
            restaurant(1, 0.005, 0.8),   // late, close
            restaurant(2, 0.001, 0.2),   // early, very close
            restaurant(3, 0.015, 0.2),   // early, farther
            restaurant(4, 0.0, -0.05),   // behind the start
            restaurant(5, 0.5, 0.5),     // far off the route
        ];
        let ids: Vec<i64> = match_along_route(candidates, at(0.0, 0.0), at(0.0, 1.0), 2.0)
            .iter()
            .map(|m| m.restaurant.id)
            .collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn nearby_sorted_by_distance() {
        let candidates = vec![
            restaurant(1, 52.53, 13.40),
            restaurant(2, 52.521, 13.405),
            restaurant(3, 53.5, 13.4),
        ];
        let found = match_nearby(candidates, at(52.52, 13.405), 5.0);
        let ids: Vec<i64> = found.iter().map(|m| m.restaurant.id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert!(found.iter().all(|m| m.progress.is_none()));
    }
}
