//! Live push events
//!
//! Events are produced by the server's workflow code and relayed to
//! Socket.IO rooms. A room is addressed by actor class and id.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Live event names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LiveEventKind {
    #[serde(rename = "order_request.created")]
    OrderRequestCreated,
    #[serde(rename = "order_request.updated")]
    OrderRequestUpdated,
    #[serde(rename = "order.created")]
    OrderCreated,
    #[serde(rename = "order.updated")]
    OrderUpdated,
    #[serde(rename = "restaurant.registered")]
    RestaurantRegistered,
    #[serde(rename = "restaurant.status_changed")]
    RestaurantStatusChanged,
}

impl LiveEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OrderRequestCreated => "order_request.created",
            Self::OrderRequestUpdated => "order_request.updated",
            Self::OrderCreated => "order.created",
            Self::OrderUpdated => "order.updated",
            Self::RestaurantRegistered => "restaurant.registered",
            Self::RestaurantStatusChanged => "restaurant.status_changed",
        }
    }
}

impl std::fmt::Display for LiveEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Room naming
pub mod room {
    pub const ADMIN: &str = "admin";

    pub fn restaurant(id: i64) -> String {
        format!("restaurant:{}", id)
    }

    pub fn customer(id: i64) -> String {
        format!("customer:{}", id)
    }
}

/// A single event addressed to one room
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveEvent {
    pub room: String,
    pub event: LiveEventKind,
    pub payload: Value,
    pub timestamp: i64,
}

impl LiveEvent {
    pub fn new(room: impl Into<String>, event: LiveEventKind, payload: Value) -> Self {
        Self {
            room: room.into(),
            event,
            payload,
            timestamp: crate::util::now_millis(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_names() {
        assert_eq!(room::restaurant(7), "restaurant:7");
        assert_eq!(room::customer(9), "customer:9");
    }

    #[test]
    fn event_names_match_serde() {
        for kind in [
            LiveEventKind::OrderRequestCreated,
            LiveEventKind::OrderRequestUpdated,
            LiveEventKind::OrderCreated,
            LiveEventKind::OrderUpdated,
            LiveEventKind::RestaurantRegistered,
            LiveEventKind::RestaurantStatusChanged,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }
}
