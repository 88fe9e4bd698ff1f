//! Services sitting between the routes and storage.
//!
//! - [`pricing`] - reads catalog/promotion data and runs the pure pricing rules
//! - [`payment`] - payment provider collaborator

pub mod payment;
pub mod pricing;
