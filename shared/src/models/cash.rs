//! Derived driver cash

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The four independent aggregates a driver's cash is derived from
///
/// Cash on hand is never a stored field; it is always recomputed as
/// `task_payments + pos_payments + cash_collections - deposits`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashStreams {
    pub task_payments: Decimal,
    pub pos_payments: Decimal,
    pub cash_collections: Decimal,
    pub deposits: Decimal,
}

impl CashStreams {
    /// Derive cash on hand from the four streams.
    ///
    /// The deposits stream holds every non-rejected deposit; a pending
    /// deposit already removes the cash from the driver's hands.
    pub fn cash_on_hand(&self) -> Decimal {
        self.task_payments + self.pos_payments + self.cash_collections - self.deposits
    }
}
