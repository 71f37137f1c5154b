//! Domain models for the Distribution Back Office Platform

mod cash;
mod journal;

pub use cash::*;
pub use journal::*;
