use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::id::EntityId;

/// Category key the backend uses for user-named budgets.
pub(crate) const OTHERS_CATEGORY: &str = "others";

fn default_alert_threshold() -> u8 {
    80
}

/// Period a budget limit applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BudgetPeriod {
    #[default]
    Monthly,
    Weekly,
}

impl fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Monthly => f.write_str("Monthly"),
            Self::Weekly => f.write_str("Weekly"),
        }
    }
}

impl FromStr for BudgetPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monthly" => Ok(Self::Monthly),
            "weekly" => Ok(Self::Weekly),
            other => Err(format!("unknown budget period '{}' (use monthly|weekly)", other)),
        }
    }
}

/// Budget as returned by the backend, with the amount spent in its period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: EntityId,
    pub category: String,
    pub budget_type: BudgetPeriod,
    /// Spending limit for the period.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub start_date: NaiveDate,
    #[serde(default = "default_alert_threshold")]
    pub alert_threshold: u8,
    #[serde(default)]
    pub custom_category_name: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub spent: Decimal,
    #[serde(default, with = "crate::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Budget {
    /// Name shown to the user: the custom name for "others" budgets.
    pub fn display_category(&self) -> &str {
        match (&self.custom_category_name, self.category.as_str()) {
            (Some(custom), OTHERS_CATEGORY) if !custom.is_empty() => custom,
            _ => &self.category,
        }
    }
}

/// Request body for `POST /budgets/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateBudgetRequest {
    pub category: String,
    pub budget_type: BudgetPeriod,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub start_date: NaiveDate,
    pub alert_threshold: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_category_name: Option<String>,
}

/// Request body for `PUT /budgets/{id}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UpdateBudgetRequest {
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_type: Option<BudgetPeriod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_threshold: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_category_name: Option<String>,
}

impl UpdateBudgetRequest {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Filters accepted by `GET /budgets/`. Month and year only apply together.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BudgetFilters {
    pub category: Option<String>,
    pub budget_type: Option<BudgetPeriod>,
    pub month: Option<u32>,
    pub year: Option<i32>,
}

impl BudgetFilters {
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(category) = &self.category {
            query.push(("category".to_string(), category.clone()));
        }
        if let Some(period) = self.budget_type {
            query.push(("budget_type".to_string(), period.to_string()));
        }
        if let (Some(month), Some(year)) = (self.month, self.year) {
            query.push(("month".to_string(), month.to_string()));
            query.push(("year".to_string(), year.to_string()));
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_deserializes_backend_budget() {
        let json = r#"{
            "id": 4,
            "user_id": "user-1",
            "category": "others",
            "budget_type": "Weekly",
            "amount": 1500.0,
            "start_date": "2025-02-01",
            "alert_threshold": 75,
            "custom_category_name": "Pets",
            "created_at": "2025-02-01T00:00:00",
            "updated_at": "2025-02-01T00:00:00",
            "spent": 300.0
        }"#;

        let budget: Budget = serde_json::from_str(json).unwrap();
        assert_eq!(budget.budget_type, BudgetPeriod::Weekly);
        assert_eq!(budget.spent, dec!(300));
        assert_eq!(budget.display_category(), "Pets");
    }

    #[test]
    fn test_filters_need_month_and_year_together() {
        let filters = BudgetFilters {
            month: Some(3),
            ..Default::default()
        };
        assert!(filters.to_query().is_empty());

        let filters = BudgetFilters {
            budget_type: Some(BudgetPeriod::Monthly),
            month: Some(3),
            year: Some(2025),
            ..Default::default()
        };
        assert_eq!(
            filters.to_query(),
            vec![
                ("budget_type".to_string(), "Monthly".to_string()),
                ("month".to_string(), "3".to_string()),
                ("year".to_string(), "2025".to_string()),
            ]
        );
    }

    #[test]
    fn test_period_parses_case_insensitively() {
        assert_eq!("weekly".parse::<BudgetPeriod>().unwrap(), BudgetPeriod::Weekly);
        assert!("daily".parse::<BudgetPeriod>().is_err());
    }
}
