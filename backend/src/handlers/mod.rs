//! HTTP handlers for the distribution back office

pub mod cash;
pub mod expense;
pub mod health;
pub mod inventory;
pub mod journal;
pub mod order;
pub mod production;

pub use cash::*;
pub use expense::*;
pub use health::*;
pub use inventory::*;
pub use journal::*;
pub use order::*;
pub use production::*;
