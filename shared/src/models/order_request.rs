//! Order Request Model

use super::cart::OrderLine;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// How the customer receives the order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum OrderType {
    DineIn,
    Takeaway,
    Delivery,
}

/// Order request lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum OrderRequestStatus {
    Pending,
    Waiting,
    Confirmed,
    Rejected,
    Cancelled,
    Converted,
    Expired,
}

impl OrderRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Waiting => "waiting",
            Self::Confirmed => "confirmed",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
            Self::Converted => "converted",
            Self::Expired => "expired",
        }
    }

    /// Still awaiting a restaurant decision
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Pending | Self::Waiting)
    }

    pub fn can_transition_to(&self, next: OrderRequestStatus) -> bool {
        use OrderRequestStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed | Rejected | Waiting | Cancelled)
                | (Waiting, Confirmed | Rejected | Cancelled)
                | (Confirmed, Converted | Cancelled | Expired)
        )
    }
}

/// Order request entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderRequest {
    pub id: i64,
    pub customer_id: i64,
    pub restaurant_id: i64,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub lines: Vec<OrderLine>,
    pub subtotal: f64,
    pub discount: f64,
    pub total: f64,
    pub coupon_code: Option<String>,
    pub order_type: OrderType,
    /// Epoch ms; `None` = as soon as possible
    pub scheduled_for: Option<i64>,
    pub delivery_address: Option<String>,
    pub note: Option<String>,
    pub status: OrderRequestStatus,
    pub wait_minutes: Option<i32>,
    pub response_note: Option<String>,
    pub created_at: i64,
    pub responded_at: Option<i64>,
}

/// Create order request from the current cart
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderRequestCreate {
    pub order_type: OrderType,
    pub scheduled_for: Option<i64>,
    #[validate(length(min = 1, max = 255))]
    pub delivery_address: Option<String>,
    #[validate(length(max = 500))]
    pub note: Option<String>,
}

/// Restaurant rejects a request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderRequestReject {
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
}

/// Restaurant asks the customer to wait
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderRequestWait {
    #[validate(range(min = 1, max = 240))]
    pub minutes: i32,
    #[validate(length(max = 500))]
    pub note: Option<String>,
}

/// Restaurant confirms a request
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct OrderRequestConfirm {
    #[validate(length(max = 500))]
    pub note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrderRequestStatus::*;

    #[test]
    fn open_statuses() {
        assert!(Pending.is_open());
        assert!(Waiting.is_open());
        assert!(!Confirmed.is_open());
        assert!(!Cancelled.is_open());
    }

    #[test]
    fn allowed_transitions() {
        for next in [Confirmed, Rejected, Waiting, Cancelled] {
            assert!(Pending.can_transition_to(next));
        }
        for next in [Confirmed, Rejected, Cancelled] {
            assert!(Waiting.can_transition_to(next));
        }
        for next in [Converted, Cancelled, Expired] {
            assert!(Confirmed.can_transition_to(next));
        }
    }

    #[test]
    fn rejected_transitions() {
        assert!(!Pending.can_transition_to(Converted));
        assert!(!Waiting.can_transition_to(Waiting));
        assert!(!Confirmed.can_transition_to(Rejected));
        for terminal in [Rejected, Cancelled, Converted, Expired] {
            for next in [Pending, Waiting, Confirmed, Converted] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn serde_names() {
        assert_eq!(serde_json::to_string(&OrderType::DineIn).unwrap(), "\"dine_in\"");
        assert_eq!(serde_json::to_string(&Waiting).unwrap(), "\"waiting\"");
    }
}
