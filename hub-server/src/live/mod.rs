//! Live order push
//!
//! - [`LiveHub`] - broadcast fan-out used by the workflow code
//! - [`socket`] - Socket.IO namespace and the hub → room forwarder

mod hub;
pub mod socket;

pub use hub::{DEFAULT_CAPACITY, LiveHub};
