//! Common enums used across the platform
//!
//! Statuses are closed variants with exhaustive matches; the database stores
//! their `as_str()` form in TEXT columns guarded by CHECK constraints.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Inventory valuation method configured per company
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuationMethod {
    Fifo,
    Lifo,
    WeightedAverage,
    Standard,
}

impl ValuationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValuationMethod::Fifo => "fifo",
            ValuationMethod::Lifo => "lifo",
            ValuationMethod::WeightedAverage => "weighted_average",
            ValuationMethod::Standard => "standard",
        }
    }
}

impl FromStr for ValuationMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fifo" => Ok(ValuationMethod::Fifo),
            "lifo" => Ok(ValuationMethod::Lifo),
            "weighted_average" => Ok(ValuationMethod::WeightedAverage),
            "standard" => Ok(ValuationMethod::Standard),
            other => Err(format!("unknown valuation method: {}", other)),
        }
    }
}

/// Sales order lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(format!("unknown order status: {}", other)),
        }
    }
}

/// Bank deposit lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepositStatus {
    Pending,
    Confirmed,
    Rejected,
}

impl DepositStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DepositStatus::Pending => "pending",
            DepositStatus::Confirmed => "confirmed",
            DepositStatus::Rejected => "rejected",
        }
    }

    /// Valid transitions: pending may settle either way, settled states are
    /// terminal.
    pub fn can_transition_to(&self, next: DepositStatus) -> bool {
        matches!(
            (self, next),
            (DepositStatus::Pending, DepositStatus::Confirmed)
                | (DepositStatus::Pending, DepositStatus::Rejected)
        )
    }

    /// Pending and confirmed deposits both subtract from driver cash; only
    /// a rejection returns the amount to the driver.
    pub fn counts_toward_cash(&self) -> bool {
        !matches!(self, DepositStatus::Rejected)
    }
}

impl FromStr for DepositStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(DepositStatus::Pending),
            "confirmed" => Ok(DepositStatus::Confirmed),
            "rejected" => Ok(DepositStatus::Rejected),
            other => Err(format!("unknown deposit status: {}", other)),
        }
    }
}

/// Production run lifecycle; completed runs are immutable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductionStatus {
    Draft,
    Completed,
}

impl ProductionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductionStatus::Draft => "draft",
            ProductionStatus::Completed => "completed",
        }
    }
}

impl FromStr for ProductionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ProductionStatus::Draft),
            "completed" => Ok(ProductionStatus::Completed),
            other => Err(format!("unknown production status: {}", other)),
        }
    }
}

/// Delivery task lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Assigned,
    Completed,
    Delivered,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Assigned => "assigned",
            TaskStatus::Completed => "completed",
            TaskStatus::Delivered => "delivered",
            TaskStatus::Cancelled => "cancelled",
        }
    }

    /// Payments on a task count toward driver cash only once the task is
    /// completed or delivered.
    pub fn counts_toward_cash(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Delivered)
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "assigned" => Ok(TaskStatus::Assigned),
            "completed" => Ok(TaskStatus::Completed),
            "delivered" => Ok(TaskStatus::Delivered),
            "cancelled" => Ok(TaskStatus::Cancelled),
            other => Err(format!("unknown task status: {}", other)),
        }
    }
}

/// How a customer collection was paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionMethod {
    Cash,
    Cheque,
    BankTransfer,
}

impl CollectionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionMethod::Cash => "cash",
            CollectionMethod::Cheque => "cheque",
            CollectionMethod::BankTransfer => "bank_transfer",
        }
    }

    /// Only cash collections sit in the driver's hand.
    pub fn counts_toward_cash(&self) -> bool {
        matches!(self, CollectionMethod::Cash)
    }
}

impl FromStr for CollectionMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(CollectionMethod::Cash),
            "cheque" => Ok(CollectionMethod::Cheque),
            "bank_transfer" => Ok(CollectionMethod::BankTransfer),
            other => Err(format!("unknown collection method: {}", other)),
        }
    }
}

/// Reason a stock movement was recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    Purchase,
    Sale,
    SaleReturn,
    ProductionConsume,
    ProductionOutput,
    Adjustment,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Purchase => "purchase",
            MovementType::Sale => "sale",
            MovementType::SaleReturn => "sale_return",
            MovementType::ProductionConsume => "production_consume",
            MovementType::ProductionOutput => "production_output",
            MovementType::Adjustment => "adjustment",
        }
    }
}

impl FromStr for MovementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "purchase" => Ok(MovementType::Purchase),
            "sale" => Ok(MovementType::Sale),
            "sale_return" => Ok(MovementType::SaleReturn),
            "production_consume" => Ok(MovementType::ProductionConsume),
            "production_output" => Ok(MovementType::ProductionOutput),
            "adjustment" => Ok(MovementType::Adjustment),
            other => Err(format!("unknown movement type: {}", other)),
        }
    }
}

/// Business event kinds that produce a journal entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalEventType {
    Order,
    Collection,
    Deposit,
    Expense,
    Production,
    ProductionReversal,
    Return,
    Salary,
}

impl JournalEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JournalEventType::Order => "order",
            JournalEventType::Collection => "collection",
            JournalEventType::Deposit => "deposit",
            JournalEventType::Expense => "expense",
            JournalEventType::Production => "production",
            JournalEventType::ProductionReversal => "production_reversal",
            JournalEventType::Return => "return",
            JournalEventType::Salary => "salary",
        }
    }
}

impl FromStr for JournalEventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "order" => Ok(JournalEventType::Order),
            "collection" => Ok(JournalEventType::Collection),
            "deposit" => Ok(JournalEventType::Deposit),
            "expense" => Ok(JournalEventType::Expense),
            "production" => Ok(JournalEventType::Production),
            "production_reversal" => Ok(JournalEventType::ProductionReversal),
            "return" => Ok(JournalEventType::Return),
            "salary" => Ok(JournalEventType::Salary),
            other => Err(format!("unknown journal event type: {}", other)),
        }
    }
}
