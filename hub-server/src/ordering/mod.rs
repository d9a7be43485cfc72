//! Ordering domain
//!
//! - [`pricing`] - line and cart totals
//! - [`coupon`] - coupon eligibility and discount
//! - [`time_slot`] - scheduling rules
//! - [`duplicate`] - duplicate request detection
//! - [`cart`] - customer cart service
//! - [`workflow`] - order requests and orders

pub mod cart;
pub mod coupon;
pub mod duplicate;
pub mod pricing;
pub mod time_slot;
pub mod workflow;
