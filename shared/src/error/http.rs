//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::RoleNotFound
            | Self::RestaurantNotFound
            | Self::OrderRequestNotFound
            | Self::OrderNotFound
            | Self::CartLineNotFound
            | Self::CouponNotFound
            | Self::CategoryNotFound
            | Self::SubcategoryNotFound
            | Self::MenuItemNotFound
            | Self::ComboNotFound
            | Self::AddonNotFound
            | Self::AttributeNotFound
            | Self::AdminNotFound
            | Self::StaffNotFound
            | Self::CustomerNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::InvalidStatusTransition
            | Self::EmailAlreadyRegistered
            | Self::RoleNameExists
            | Self::RoleInUse
            | Self::RestaurantEmailExists
            | Self::DuplicateOrderRequest
            | Self::CouponCodeExists
            | Self::CategoryNotEmpty => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid
            | Self::SessionExpired
            | Self::AccountDisabled => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::PermissionDenied
            | Self::ActorMismatch
            | Self::RoleIsSystem
            | Self::CannotDeleteSelf
            | Self::RestaurantNotApproved => StatusCode::FORBIDDEN,

            // 429 Too Many Requests
            Self::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,

            // 503 Service Unavailable (transient errors, client can retry)
            Self::TimeoutError => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::InternalError | Self::DatabaseError | Self::ConfigError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            // 400 Bad Request (default for validation/business errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_status() {
        assert_eq!(ErrorCode::NotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorCode::OrderRequestNotFound.http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ErrorCode::MenuItemNotFound.http_status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_conflict_status() {
        assert_eq!(
            ErrorCode::DuplicateOrderRequest.http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ErrorCode::InvalidStatusTransition.http_status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_auth_statuses() {
        assert_eq!(
            ErrorCode::SessionExpired.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ErrorCode::ActorMismatch.http_status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ErrorCode::RestaurantNotApproved.http_status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_bad_request_default() {
        assert_eq!(
            ErrorCode::CouponMinOrderNotMet.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ErrorCode::SlotTooSoon.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorCode::DatabaseError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
