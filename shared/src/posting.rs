//! Fixed journal line templates, one per money-moving business event
//!
//! The posting engine's job is arithmetic assembly, not bookkeeping policy:
//! each event type maps to a fixed set of lines, and every template returns a
//! balanced set by construction. `validate_lines` is the loud last-resort
//! check for programming defects.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::Account;
use crate::types::CollectionMethod;

/// One line of a posting before it is persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSpec {
    pub account: Account,
    pub debit: Decimal,
    pub credit: Decimal,
}

fn debit(account: Account, amount: Decimal) -> LineSpec {
    LineSpec {
        account,
        debit: amount,
        credit: Decimal::ZERO,
    }
}

fn credit(account: Account, amount: Decimal) -> LineSpec {
    LineSpec {
        account,
        debit: Decimal::ZERO,
        credit: amount,
    }
}

pub fn total_debits(lines: &[LineSpec]) -> Decimal {
    lines.iter().map(|l| l.debit).sum()
}

pub fn total_credits(lines: &[LineSpec]) -> Decimal {
    lines.iter().map(|l| l.credit).sum()
}

pub fn lines_balance(lines: &[LineSpec]) -> bool {
    total_debits(lines) == total_credits(lines)
}

/// Validate a line set before posting.
///
/// An unbalanced or malformed set is a programming defect in template
/// assembly, never user input.
pub fn validate_lines(lines: &[LineSpec]) -> Result<(), &'static str> {
    if lines.is_empty() {
        return Err("journal entry must have at least one line");
    }
    for line in lines {
        if line.debit < Decimal::ZERO || line.credit < Decimal::ZERO {
            return Err("journal amounts cannot be negative");
        }
        if !line.debit.is_zero() && !line.credit.is_zero() {
            return Err("a journal line is either a debit or a credit, not both");
        }
    }
    if !lines_balance(lines) {
        return Err("journal entry debits and credits do not balance");
    }
    Ok(())
}

/// Sale: receivable/cash against revenue, plus cost of goods against
/// inventory.
pub fn order_entry_lines(total: Decimal, paid: Decimal, cost_of_goods: Decimal) -> Vec<LineSpec> {
    let mut lines = Vec::new();
    let outstanding = total - paid;
    if !paid.is_zero() {
        lines.push(debit(Account::Cash, paid));
    }
    if !outstanding.is_zero() {
        lines.push(debit(Account::AccountsReceivable, outstanding));
    }
    lines.push(credit(Account::Revenue, total));
    if !cost_of_goods.is_zero() {
        lines.push(debit(Account::CostOfGoodsSold, cost_of_goods));
        lines.push(credit(Account::Inventory, cost_of_goods));
    }
    lines
}

/// Collection: cash (or bank for cheque/transfer) against the receivable.
pub fn collection_entry_lines(amount: Decimal, method: CollectionMethod) -> Vec<LineSpec> {
    let receiving = match method {
        CollectionMethod::Cash => Account::Cash,
        CollectionMethod::Cheque | CollectionMethod::BankTransfer => Account::Bank,
    };
    vec![
        debit(receiving, amount),
        credit(Account::AccountsReceivable, amount),
    ]
}

/// Confirmed deposit: driver cash moves to the bank.
pub fn deposit_entry_lines(amount: Decimal) -> Vec<LineSpec> {
    vec![debit(Account::Bank, amount), credit(Account::Cash, amount)]
}

/// Operating expense paid from cash.
pub fn expense_entry_lines(amount: Decimal) -> Vec<LineSpec> {
    vec![
        debit(Account::OperatingExpense, amount),
        credit(Account::Cash, amount),
    ]
}

/// Extra production cost paid while a run is still a draft.
///
/// Accumulates on the overhead account; completion absorbs it into finished
/// goods, and deleting the draft reverses it.
pub fn production_extra_cost_lines(amount: Decimal) -> Vec<LineSpec> {
    vec![
        debit(Account::ProductionOverhead, amount),
        credit(Account::Cash, amount),
    ]
}

/// Completed production run: finished goods absorb raw materials and
/// accumulated overhead.
pub fn production_entry_lines(material_cost: Decimal, extra_cost: Decimal) -> Vec<LineSpec> {
    let mut lines = vec![debit(Account::Inventory, material_cost + extra_cost)];
    if !material_cost.is_zero() {
        lines.push(credit(Account::Inventory, material_cost));
    }
    if !extra_cost.is_zero() {
        lines.push(credit(Account::ProductionOverhead, extra_cost));
    }
    lines
}

/// Customer return: contra-revenue against the receivable (when the customer
/// is credited) or against cash (refund), plus restocked goods back into
/// inventory at cost.
pub fn return_entry_lines(
    amount: Decimal,
    restock_cost: Decimal,
    credited: bool,
) -> Vec<LineSpec> {
    let mut lines = Vec::new();
    if !amount.is_zero() {
        lines.push(debit(Account::SalesReturns, amount));
        let refund_account = if credited {
            Account::AccountsReceivable
        } else {
            Account::Cash
        };
        lines.push(credit(refund_account, amount));
    }
    if !restock_cost.is_zero() {
        lines.push(debit(Account::Inventory, restock_cost));
        lines.push(credit(Account::CostOfGoodsSold, restock_cost));
    }
    lines
}

/// Salary payment from cash.
pub fn salary_entry_lines(amount: Decimal) -> Vec<LineSpec> {
    vec![
        debit(Account::SalaryExpense, amount),
        credit(Account::Cash, amount),
    ]
}

/// Offsetting lines for a correction record: debits and credits swapped.
pub fn reversal_lines(lines: &[LineSpec]) -> Vec<LineSpec> {
    lines
        .iter()
        .map(|l| LineSpec {
            account: l.account,
            debit: l.credit,
            credit: l.debit,
        })
        .collect()
}
