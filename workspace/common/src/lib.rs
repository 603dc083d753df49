//! Common transport-layer types shared by the API client, the views and the CLI.
//! These structs mirror the backend's request/response payloads so every
//! consumer deserializes API responses without duplicating shapes.
//!
//! Besides the payloads, this crate hosts the pure derived-state functions
//! (goal partitioning, pacing, budget usage). They take "now" as an argument
//! and never touch the network.

mod budget;
mod category;
mod goal;
mod id;
mod profile;
mod timestamp;
mod transaction;

pub mod budget_usage;
pub mod goal_progress;

pub use budget::{Budget, BudgetFilters, BudgetPeriod, CreateBudgetRequest, UpdateBudgetRequest};
pub use budget_usage::{BudgetAlert, BudgetUsage};
pub use category::{Category, CategoryCatalog};
pub use goal::{
    AddSavingsRequest, CreateGoalRequest, Goal, GoalsResponse, SavingsReceipt, UpdateGoalRequest,
};
pub use goal_progress::{GoalPartition, GoalProgress, GoalTotals, PaceStatus};
pub use id::EntityId;
pub use profile::{Profile, Theme, UpdateProfileRequest};
pub use transaction::{
    BudgetWarning, CreateTransactionRequest, Transaction, TransactionCreated,
    TransactionFilters, TransactionSource, TransactionSummary, TransactionType,
    UpdateTransactionRequest,
};
