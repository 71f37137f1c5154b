//! Shared types and calculations for the Distribution Back Office Platform
//!
//! This crate contains the domain types shared across the backend and the
//! pure financial math (cost valuation, journal line templates, cash
//! derivation), kept free of I/O so it is fully testable.

pub mod costing;
pub mod models;
pub mod posting;
pub mod types;
pub mod validation;

pub use costing::*;
pub use models::*;
pub use posting::*;
pub use types::*;
pub use validation::*;
