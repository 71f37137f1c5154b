//! The fixed ledger account set the posting templates draw on

use serde::{Deserialize, Serialize};

/// High-level account kind (determines the normal balance side)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Asset,
    Liability,
    Equity,
    Revenue,
    Expense,
}

/// The fixed ledger accounts the posting templates draw on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Account {
    Cash,
    Bank,
    AccountsReceivable,
    Inventory,
    Revenue,
    SalesReturns,
    CostOfGoodsSold,
    ProductionOverhead,
    OperatingExpense,
    SalaryExpense,
}

impl Account {
    /// Stable ledger code stored with every journal line.
    pub fn code(&self) -> &'static str {
        match self {
            Account::Cash => "1000",
            Account::Bank => "1010",
            Account::AccountsReceivable => "1100",
            Account::Inventory => "1200",
            Account::Revenue => "4000",
            Account::SalesReturns => "4100",
            Account::CostOfGoodsSold => "5000",
            Account::ProductionOverhead => "5100",
            Account::OperatingExpense => "6000",
            Account::SalaryExpense => "6100",
        }
    }

    pub fn kind(&self) -> AccountKind {
        match self {
            Account::Cash
            | Account::Bank
            | Account::AccountsReceivable
            | Account::Inventory => AccountKind::Asset,
            Account::Revenue => AccountKind::Revenue,
            Account::SalesReturns => AccountKind::Revenue,
            Account::CostOfGoodsSold
            | Account::ProductionOverhead
            | Account::OperatingExpense
            | Account::SalaryExpense => AccountKind::Expense,
        }
    }
}

