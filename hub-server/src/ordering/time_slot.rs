//! Time-slot validation for new order requests

use crate::utils::time::{is_within_hours, local_minute_of_day, parse_hhmm, plus_minutes};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::Restaurant;

/// Scheduling limits
#[derive(Debug, Clone, Copy)]
pub struct SlotRules {
    /// Earliest slot, relative to now
    pub min_lead_minutes: i64,
    /// Latest slot, relative to now
    pub max_days_ahead: i64,
}

/// Whether the restaurant is open at `millis`
pub fn is_open_at(restaurant: &Restaurant, millis: i64) -> AppResult<bool> {
    let opening = parse_hhmm(&restaurant.opening_time).ok_or_else(|| {
        AppError::with_message(
            ErrorCode::ConfigError,
            format!("Restaurant {} has invalid opening time", restaurant.id),
        )
    })?;
    let closing = parse_hhmm(&restaurant.closing_time).ok_or_else(|| {
        AppError::with_message(
            ErrorCode::ConfigError,
            format!("Restaurant {} has invalid closing time", restaurant.id),
        )
    })?;
    let minute = local_minute_of_day(millis, restaurant.utc_offset_minutes)
        .ok_or_else(|| AppError::with_message(ErrorCode::InvalidTimeSlot, "Time out of range"))?;
    Ok(is_within_hours(minute, opening, closing))
}

/// Validate `scheduled_for` (`None` = as soon as possible)
///
/// ASAP needs the restaurant open now. A scheduled slot must be at least
/// `min_lead_minutes` and at most `max_days_ahead` days away, and fall
/// inside opening hours.
pub fn validate_slot(
    restaurant: &Restaurant,
    scheduled_for: Option<i64>,
    now: i64,
    rules: SlotRules,
) -> AppResult<()> {
    let Some(slot) = scheduled_for else {
        if !is_open_at(restaurant, now)? {
            return Err(AppError::with_message(
                ErrorCode::RestaurantClosed,
                format!(
                    "{} is closed now (open {}-{})",
                    restaurant.name, restaurant.opening_time, restaurant.closing_time
                ),
            ));
        }
        return Ok(());
    };

    let earliest = plus_minutes(now, rules.min_lead_minutes);
    if slot < earliest {
        return Err(AppError::with_message(
            ErrorCode::SlotTooSoon,
            format!(
                "Scheduled time must be at least {} minutes from now",
                rules.min_lead_minutes
            ),
        )
        .with_detail("earliest", earliest));
    }

    let latest = plus_minutes(now, rules.max_days_ahead * 24 * 60);
    if slot > latest {
        return Err(AppError::with_message(
            ErrorCode::SlotTooFar,
            format!(
                "Scheduled time must be within {} days",
                rules.max_days_ahead
            ),
        )
        .with_detail("latest", latest));
    }

    if !is_open_at(restaurant, slot)? {
        return Err(AppError::with_message(
            ErrorCode::InvalidTimeSlot,
            format!(
                "Scheduled time is outside opening hours ({}-{})",
                restaurant.opening_time, restaurant.closing_time
            ),
        ));
    }
    Ok(())
}
