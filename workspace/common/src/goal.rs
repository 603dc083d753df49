use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::id::EntityId;

fn default_goal_category() -> String {
    "other".to_string()
}

/// Savings goal as returned by the backend.
///
/// Whether a goal is active or completed is not stored; see
/// [`crate::goal_progress::partition_goals`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: EntityId,
    pub name: String,
    #[serde(default = "default_goal_category")]
    pub category: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub target_amount: Decimal,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub current_amount: Decimal,
    pub deadline: NaiveDate,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, with = "crate::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Goal {
    pub fn is_funded(&self) -> bool {
        self.current_amount >= self.target_amount
    }

    /// Amount still missing, never negative for overfunded goals.
    pub fn remaining(&self) -> Decimal {
        self.target_amount
            .saturating_sub(self.current_amount)
            .max(Decimal::ZERO)
    }
}

/// Payload of `GET /goals`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalsResponse {
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub available_balance: Decimal,
}

/// Request body for `POST /goals`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateGoalRequest {
    pub name: String,
    pub category: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub target_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub current_amount: Decimal,
    pub deadline: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Request body for `PATCH /goals/{id}`. The backend rejects an empty patch.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UpdateGoalRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub target_amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Request body for `POST /goals/{id}/savings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddSavingsRequest {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Response of `POST /goals/{id}/savings`: the updated goal and a confirmation line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsReceipt {
    #[serde(flatten)]
    pub goal: Goal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_deserializes_goals_response() {
        let json = r#"{
            "goals": [{
                "id": "5c0f5f5e-1111-4a53-9d0c-5d1c1d3c6a10",
                "user_id": "user-1",
                "name": "Trip",
                "category": "travel",
                "target_amount": 5000.0,
                "current_amount": 5000.0,
                "deadline": "2024-01-01",
                "notes": null,
                "created_at": "2023-06-01T08:00:00",
                "updated_at": "2023-12-20T08:00:00+00:00"
            }],
            "available_balance": 100000.0
        }"#;

        let response: GoalsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.available_balance, dec!(100000));
        let goal = &response.goals[0];
        assert_eq!(goal.name, "Trip");
        assert!(goal.is_funded());
        assert_eq!(goal.remaining(), Decimal::ZERO);
        assert!(goal.created_at.is_some());
    }

    #[test]
    fn test_remaining_is_never_negative() {
        let goal = Goal {
            id: EntityId::from("g"),
            name: "Laptop".to_string(),
            category: "gadget".to_string(),
            target_amount: dec!(800),
            current_amount: dec!(950),
            deadline: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            notes: None,
            created_at: None,
            updated_at: None,
        };
        assert_eq!(goal.remaining(), Decimal::ZERO);
    }

    #[test]
    fn test_missing_category_defaults_to_other() {
        let json = r#"{"id": "g1", "name": "Fund", "target_amount": 10, "deadline": "2030-01-01"}"#;
        let goal: Goal = serde_json::from_str(json).unwrap();
        assert_eq!(goal.category, "other");
        assert_eq!(goal.current_amount, Decimal::ZERO);
    }

    #[test]
    fn test_savings_request_sends_numbers() {
        let request = AddSavingsRequest {
            amount: dec!(250.5),
            date: None,
            notes: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({ "amount": 250.5 }));
    }
}
