use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::id::EntityId;

/// Direction of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Income => f.write_str("income"),
            Self::Expense => f.write_str("expense"),
        }
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(format!("unknown transaction type '{}' (use income|expense)", other)),
        }
    }
}

/// How a transaction entered the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionSource {
    #[default]
    Manual,
    Ocr,
}

impl fmt::Display for TransactionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Manual => f.write_str("manual"),
            Self::Ocr => f.write_str("ocr"),
        }
    }
}

/// Transaction as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: EntityId,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub txn_type: TransactionType,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub payment_mode: Option<String>,
    #[serde(default)]
    pub txn_date: Option<NaiveDate>,
    #[serde(default)]
    pub source: TransactionSource,
    #[serde(default, with = "crate::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Amount with the sign of its direction, expenses negative.
    pub fn signed_amount(&self) -> Decimal {
        match self.txn_type {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }
}

/// Request body for creating a transaction (mirrors backend `TransactionCreate`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTransactionRequest {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub txn_type: TransactionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub txn_date: Option<NaiveDate>,
    #[serde(default)]
    pub source: TransactionSource,
}

/// Partial update for a transaction; absent fields are left untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UpdateTransactionRequest {
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txn_date: Option<NaiveDate>,
}

impl UpdateTransactionRequest {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Budget alert attached to a freshly created expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetWarning {
    pub budget_id: EntityId,
    #[serde(with = "rust_decimal::serde::float")]
    pub budget_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub current_spent: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub new_total: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub percentage: Decimal,
    pub alert_threshold: u8,
    #[serde(default)]
    pub warning: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response of `POST /transactions`: the stored record plus an optional budget alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionCreated {
    #[serde(flatten)]
    pub transaction: Transaction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_warning: Option<BudgetWarning>,
}

/// Filters accepted by `GET /transactions`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransactionFilters {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub category: Option<String>,
    pub payment_mode: Option<String>,
    pub search: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl TransactionFilters {
    /// Query pairs for the fields that are set, in a stable order.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(start) = self.start_date {
            query.push(("start_date".to_string(), start.to_string()));
        }
        if let Some(end) = self.end_date {
            query.push(("end_date".to_string(), end.to_string()));
        }
        if let Some(category) = &self.category {
            query.push(("category".to_string(), category.clone()));
        }
        if let Some(mode) = &self.payment_mode {
            query.push(("payment_mode".to_string(), mode.clone()));
        }
        if let Some(search) = &self.search {
            query.push(("search".to_string(), search.clone()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(offset) = self.offset {
            query.push(("offset".to_string(), offset.to_string()));
        }
        query
    }
}

/// Monthly totals from `GET /transactions/summary`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub month: u32,
    pub year: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_income: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_expense: Decimal,
    #[serde(default)]
    pub expenses_by_category: BTreeMap<String, Decimal>,
}

impl TransactionSummary {
    pub fn net(&self) -> Decimal {
        self.total_income - self.total_expense
    }

    /// Share of income kept this month, in percent. Zero without income.
    pub fn savings_rate(&self) -> Decimal {
        if self.total_income.is_zero() {
            return Decimal::ZERO;
        }
        (self.net() / self.total_income * Decimal::ONE_HUNDRED).round_dp(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_deserializes_backend_transaction() {
        let json = r#"{
            "id": 12,
            "user_id": "user-1",
            "amount": 250.5,
            "txn_type": "expense",
            "category": "food",
            "description": "Groceries",
            "payment_mode": "upi",
            "txn_date": "2025-02-03",
            "month": 2,
            "year": 2025,
            "created_at": "2025-02-03T09:15:00.123456",
            "updated_at": null
        }"#;

        let txn: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(txn.id, EntityId::from(12));
        assert_eq!(txn.amount, dec!(250.5));
        assert_eq!(txn.txn_type, TransactionType::Expense);
        assert_eq!(txn.source, TransactionSource::Manual);
        assert_eq!(txn.signed_amount(), dec!(-250.5));
        assert!(txn.created_at.is_some());
        assert!(txn.updated_at.is_none());
    }

    #[test]
    fn test_created_response_keeps_budget_warning() {
        let json = r#"{
            "id": 3,
            "amount": 900,
            "txn_type": "expense",
            "category": "food",
            "budget_warning": {
                "budget_id": 1,
                "budget_amount": 1000,
                "current_spent": 200,
                "new_total": 1100,
                "percentage": 110.0,
                "alert_threshold": 80,
                "warning": "budget_exceeded",
                "message": "Budget exceeded!"
            }
        }"#;

        let created: TransactionCreated = serde_json::from_str(json).unwrap();
        assert_eq!(created.transaction.amount, dec!(900));
        let warning = created.budget_warning.unwrap();
        assert_eq!(warning.warning.as_deref(), Some("budget_exceeded"));
        assert_eq!(warning.new_total, dec!(1100));
    }

    #[test]
    fn test_update_request_omits_absent_fields() {
        let update = UpdateTransactionRequest {
            description: Some("Dinner".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "description": "Dinner" }));
        assert!(UpdateTransactionRequest::default().is_empty());
    }

    #[test]
    fn test_filters_render_only_present_fields() {
        let filters = TransactionFilters {
            category: Some("food".to_string()),
            limit: Some(20),
            ..Default::default()
        };
        assert_eq!(
            filters.to_query(),
            vec![
                ("category".to_string(), "food".to_string()),
                ("limit".to_string(), "20".to_string()),
            ]
        );
    }

    #[test]
    fn test_summary_net_and_savings_rate() {
        let summary = TransactionSummary {
            month: 1,
            year: 2025,
            total_income: dec!(50000),
            total_expense: dec!(32000),
            expenses_by_category: BTreeMap::new(),
        };
        assert_eq!(summary.net(), dec!(18000));
        assert_eq!(summary.savings_rate(), dec!(36));

        let empty = TransactionSummary {
            total_income: Decimal::ZERO,
            ..summary
        };
        assert_eq!(empty.savings_rate(), Decimal::ZERO);
    }
}
