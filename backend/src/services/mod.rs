pub mod balance;
pub mod cash;
pub mod expense;
pub mod inventory;
pub mod journal;
pub mod order;
pub mod production;
pub mod returns;
pub mod valuation;

pub use balance::BalanceService;
pub use cash::CashService;
pub use expense::ExpenseService;
pub use inventory::InventoryService;
pub use journal::JournalService;
pub use order::OrderService;
pub use production::ProductionService;
pub use returns::ReturnService;
pub use valuation::ValuationService;
