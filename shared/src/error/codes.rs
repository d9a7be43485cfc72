//! Unified error codes for the ordering hub
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission / RBAC errors
//! - 3xxx: Restaurant errors
//! - 4xxx: Order request & order errors
//! - 5xxx: Cart, coupon & payment errors
//! - 6xxx: Menu errors
//! - 7xxx: Discovery errors
//! - 8xxx: Account errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Status change not allowed from the current status
    InvalidStatusTransition = 9,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Session has expired or was evicted
    SessionExpired = 1005,
    /// Account is disabled
    AccountDisabled = 1007,
    /// Email already registered for this actor class
    EmailAlreadyRegistered = 1009,
    /// Too many login attempts
    TooManyRequests = 1010,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Token belongs to another actor class
    ActorMismatch = 2002,
    /// Role not found
    RoleNotFound = 2101,
    /// Role name already exists
    RoleNameExists = 2102,
    /// Role is in use
    RoleInUse = 2103,
    /// Cannot modify/delete system role
    RoleIsSystem = 2104,
    /// Permission string is not in the catalogue
    UnknownPermission = 2105,
    /// Cannot delete own account
    CannotDeleteSelf = 2106,

    // ==================== 3xxx: Restaurant ====================
    /// Restaurant not found
    RestaurantNotFound = 3001,
    /// Restaurant has not been approved
    RestaurantNotApproved = 3002,
    /// Restaurant email already registered
    RestaurantEmailExists = 3003,
    /// Restaurant is closed at the requested time
    RestaurantClosed = 3004,
    /// Restaurant is not accepting orders
    RestaurantNotAcceptingOrders = 3005,

    // ==================== 4xxx: Order ====================
    /// Order request not found
    OrderRequestNotFound = 4001,
    /// An identical open order request already exists
    DuplicateOrderRequest = 4002,
    /// Requested time slot is outside opening hours
    InvalidTimeSlot = 4003,
    /// Requested time slot is too soon
    SlotTooSoon = 4004,
    /// Requested time slot is too far ahead
    SlotTooFar = 4005,
    /// Delivery orders need an address
    DeliveryAddressRequired = 4006,
    /// Order not found
    OrderNotFound = 4101,
    /// Order request must be confirmed before placing
    OrderRequestNotConfirmed = 4102,

    // ==================== 5xxx: Cart / Coupon / Payment ====================
    /// Cart is empty
    CartEmpty = 5001,
    /// Cart already holds items from another restaurant
    CartRestaurantMismatch = 5002,
    /// Cart line not found
    CartLineNotFound = 5003,
    /// Quantity out of range
    InvalidQuantity = 5004,
    /// Coupon not found
    CouponNotFound = 5101,
    /// Coupon is inactive
    CouponInactive = 5102,
    /// Coupon validity has not started
    CouponNotStarted = 5103,
    /// Coupon has expired
    CouponExpired = 5104,
    /// Coupon does not apply to this restaurant
    CouponNotApplicable = 5105,
    /// Minimum order amount not reached
    CouponMinOrderNotMet = 5106,
    /// Coupon usage limit reached
    CouponUsageLimitReached = 5107,
    /// Per-customer usage limit reached
    CouponCustomerLimitReached = 5108,
    /// Coupon is only valid on a first order
    CouponFirstOrderOnly = 5109,
    /// Coupon code already exists
    CouponCodeExists = 5110,
    /// Discount definition is invalid
    InvalidDiscount = 5111,

    // ==================== 6xxx: Menu ====================
    /// Category not found
    CategoryNotFound = 6001,
    /// Category / subcategory still has children
    CategoryNotEmpty = 6002,
    /// Subcategory not found
    SubcategoryNotFound = 6003,
    /// Menu item not found
    MenuItemNotFound = 6101,
    /// Menu item, combo or addon unavailable
    MenuItemUnavailable = 6102,
    /// Combo not found
    ComboNotFound = 6201,
    /// Combo has no components
    ComboEmpty = 6202,
    /// Addon not found
    AddonNotFound = 6301,
    /// Attribute not found
    AttributeNotFound = 6401,
    /// Reference to a menu entity of another restaurant or unattached addon
    InvalidMenuReference = 6501,

    // ==================== 7xxx: Discovery ====================
    /// Coordinates out of range
    InvalidCoordinates = 7001,

    // ==================== 8xxx: Account ====================
    /// Admin user not found
    AdminNotFound = 8001,
    /// Staff user not found
    StaffNotFound = 8002,
    /// Customer not found
    CustomerNotFound = 8003,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Operation timeout
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Every defined code, used for u16 conversion
    pub const ALL: &'static [ErrorCode] = &[
        ErrorCode::Success,
        ErrorCode::Unknown,
        ErrorCode::ValidationFailed,
        ErrorCode::NotFound,
        ErrorCode::AlreadyExists,
        ErrorCode::InvalidStatusTransition,
        ErrorCode::NotAuthenticated,
        ErrorCode::InvalidCredentials,
        ErrorCode::TokenExpired,
        ErrorCode::TokenInvalid,
        ErrorCode::SessionExpired,
        ErrorCode::AccountDisabled,
        ErrorCode::EmailAlreadyRegistered,
        ErrorCode::TooManyRequests,
        ErrorCode::PermissionDenied,
        ErrorCode::ActorMismatch,
        ErrorCode::RoleNotFound,
        ErrorCode::RoleNameExists,
        ErrorCode::RoleInUse,
        ErrorCode::RoleIsSystem,
        ErrorCode::UnknownPermission,
        ErrorCode::CannotDeleteSelf,
        ErrorCode::RestaurantNotFound,
        ErrorCode::RestaurantNotApproved,
        ErrorCode::RestaurantEmailExists,
        ErrorCode::RestaurantClosed,
        ErrorCode::RestaurantNotAcceptingOrders,
        ErrorCode::OrderRequestNotFound,
        ErrorCode::DuplicateOrderRequest,
        ErrorCode::InvalidTimeSlot,
        ErrorCode::SlotTooSoon,
        ErrorCode::SlotTooFar,
        ErrorCode::DeliveryAddressRequired,
        ErrorCode::OrderNotFound,
        ErrorCode::OrderRequestNotConfirmed,
        ErrorCode::CartEmpty,
        ErrorCode::CartRestaurantMismatch,
        ErrorCode::CartLineNotFound,
        ErrorCode::InvalidQuantity,
        ErrorCode::CouponNotFound,
        ErrorCode::CouponInactive,
        ErrorCode::CouponNotStarted,
        ErrorCode::CouponExpired,
        ErrorCode::CouponNotApplicable,
        ErrorCode::CouponMinOrderNotMet,
        ErrorCode::CouponUsageLimitReached,
        ErrorCode::CouponCustomerLimitReached,
        ErrorCode::CouponFirstOrderOnly,
        ErrorCode::CouponCodeExists,
        ErrorCode::InvalidDiscount,
        ErrorCode::CategoryNotFound,
        ErrorCode::CategoryNotEmpty,
        ErrorCode::SubcategoryNotFound,
        ErrorCode::MenuItemNotFound,
        ErrorCode::MenuItemUnavailable,
        ErrorCode::ComboNotFound,
        ErrorCode::ComboEmpty,
        ErrorCode::AddonNotFound,
        ErrorCode::AttributeNotFound,
        ErrorCode::InvalidMenuReference,
        ErrorCode::InvalidCoordinates,
        ErrorCode::AdminNotFound,
        ErrorCode::StaffNotFound,
        ErrorCode::CustomerNotFound,
        ErrorCode::InternalError,
        ErrorCode::DatabaseError,
        ErrorCode::TimeoutError,
        ErrorCode::ConfigError,
    ];

    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidStatusTransition => "Status change is not allowed",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::SessionExpired => "Session has expired",
            ErrorCode::AccountDisabled => "Account is disabled",
            ErrorCode::EmailAlreadyRegistered => "Email is already registered",
            ErrorCode::TooManyRequests => "Too many attempts, try again later",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::ActorMismatch => "Token is not valid for this area",
            ErrorCode::RoleNotFound => "Role not found",
            ErrorCode::RoleNameExists => "Role name already exists",
            ErrorCode::RoleInUse => "Role is currently in use",
            ErrorCode::RoleIsSystem => "Cannot modify system role",
            ErrorCode::UnknownPermission => "Unknown permission",
            ErrorCode::CannotDeleteSelf => "Cannot delete own account",

            // Restaurant
            ErrorCode::RestaurantNotFound => "Restaurant not found",
            ErrorCode::RestaurantNotApproved => "Restaurant has not been approved",
            ErrorCode::RestaurantEmailExists => "Restaurant email already registered",
            ErrorCode::RestaurantClosed => "Restaurant is closed at the requested time",
            ErrorCode::RestaurantNotAcceptingOrders => "Restaurant is not accepting orders",

            // Order
            ErrorCode::OrderRequestNotFound => "Order request not found",
            ErrorCode::DuplicateOrderRequest => "An identical order request is already open",
            ErrorCode::InvalidTimeSlot => "Requested time is outside opening hours",
            ErrorCode::SlotTooSoon => "Requested time is too soon",
            ErrorCode::SlotTooFar => "Requested time is too far ahead",
            ErrorCode::DeliveryAddressRequired => "Delivery address is required",
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderRequestNotConfirmed => "Order request has not been confirmed",

            // Cart / Coupon / Payment
            ErrorCode::CartEmpty => "Cart is empty",
            ErrorCode::CartRestaurantMismatch => "Cart holds items from another restaurant",
            ErrorCode::CartLineNotFound => "Cart line not found",
            ErrorCode::InvalidQuantity => "Quantity is out of range",
            ErrorCode::CouponNotFound => "Coupon not found",
            ErrorCode::CouponInactive => "Coupon is not active",
            ErrorCode::CouponNotStarted => "Coupon is not valid yet",
            ErrorCode::CouponExpired => "Coupon has expired",
            ErrorCode::CouponNotApplicable => "Coupon does not apply to this restaurant",
            ErrorCode::CouponMinOrderNotMet => "Order total is below the coupon minimum",
            ErrorCode::CouponUsageLimitReached => "Coupon usage limit reached",
            ErrorCode::CouponCustomerLimitReached => "Coupon already used the maximum number of times",
            ErrorCode::CouponFirstOrderOnly => "Coupon is only valid on a first order",
            ErrorCode::CouponCodeExists => "Coupon code already exists",
            ErrorCode::InvalidDiscount => "Invalid discount definition",

            // Menu
            ErrorCode::CategoryNotFound => "Category not found",
            ErrorCode::CategoryNotEmpty => "Category still has entries",
            ErrorCode::SubcategoryNotFound => "Subcategory not found",
            ErrorCode::MenuItemNotFound => "Menu item not found",
            ErrorCode::MenuItemUnavailable => "Menu item is unavailable",
            ErrorCode::ComboNotFound => "Combo not found",
            ErrorCode::ComboEmpty => "Combo must contain at least one item",
            ErrorCode::AddonNotFound => "Addon not found",
            ErrorCode::AttributeNotFound => "Attribute not found",
            ErrorCode::InvalidMenuReference => "Invalid menu reference",

            // Discovery
            ErrorCode::InvalidCoordinates => "Invalid coordinates",

            // Account
            ErrorCode::AdminNotFound => "Admin user not found",
            ErrorCode::StaffNotFound => "Staff user not found",
            ErrorCode::CustomerNotFound => "Customer not found",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.code() == value)
            .ok_or(InvalidErrorCode(value))
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::NotFound.code(), 3);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::PermissionDenied.code(), 2001);
        assert_eq!(ErrorCode::RestaurantNotApproved.code(), 3002);
        assert_eq!(ErrorCode::DuplicateOrderRequest.code(), 4002);
        assert_eq!(ErrorCode::CouponMinOrderNotMet.code(), 5106);
        assert_eq!(ErrorCode::MenuItemUnavailable.code(), 6102);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_all_codes_are_unique_and_convertible() {
        let mut seen = std::collections::HashSet::new();
        for code in ErrorCode::ALL {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
            assert_eq!(ErrorCode::try_from(code.code()), Ok(*code));
        }
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(10000), Err(InvalidErrorCode(10000)));
    }

    #[test]
    fn test_serialize() {
        assert_eq!(serde_json::to_string(&ErrorCode::NotFound).unwrap(), "3");
        assert_eq!(
            serde_json::to_string(&ErrorCode::CouponExpired).unwrap(),
            "5104"
        );
    }

    #[test]
    fn test_deserialize() {
        let code: ErrorCode = serde_json::from_str("4101").unwrap();
        assert_eq!(code, ErrorCode::OrderNotFound);

        let result: Result<ErrorCode, _> = serde_json::from_str("999");
        assert!(result.is_err());
    }

    #[test]
    fn test_display_and_message() {
        assert_eq!(format!("{}", ErrorCode::OrderNotFound), "4101");
        assert_eq!(ErrorCode::OrderNotFound.message(), "Order not found");
        assert_eq!(ErrorCode::InternalError.message(), "Internal server error");
    }
}
