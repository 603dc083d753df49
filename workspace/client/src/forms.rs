//! Form input as typed by the user, validated before any request is built.
//!
//! A form that fails validation never reaches the API client; the caller
//! gets [`ActionError::Validation`] with a one-line message.

use chrono::{Days, NaiveDate};
use common::{
    AddSavingsRequest, BudgetPeriod, CreateBudgetRequest, CreateGoalRequest,
    CreateTransactionRequest, TransactionSource, TransactionType, UpdateGoalRequest,
};
use rust_decimal::Decimal;
use std::borrow::Cow;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::ActionError;

const DAYS_PER_MONTH: u64 = 30;
const OTHERS_CATEGORY: &str = "others";

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message(Cow::from("is required")));
    }
    Ok(())
}

fn positive_amount(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        return Err(
            ValidationError::new("not_positive").with_message(Cow::from("must be greater than zero")),
        );
    }
    Ok(())
}

fn non_negative_amount(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::new("negative").with_message(Cow::from("cannot be negative")));
    }
    Ok(())
}

fn others_need_a_name(form: &BudgetForm) -> Result<(), ValidationError> {
    let named = form
        .custom_category_name
        .as_deref()
        .is_some_and(|name| !name.trim().is_empty());
    if form.category == OTHERS_CATEGORY && !named {
        return Err(ValidationError::new("custom_name")
            .with_message(Cow::from("Enter a name for the custom category")));
    }
    Ok(())
}

fn humanize(field: &str) -> String {
    let spaced = field.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => spaced,
    }
}

/// First validation failure as a sentence, fields in alphabetical order.
pub fn describe(errors: &ValidationErrors) -> String {
    let mut fields: Vec<(String, String)> = errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, errors)| {
            let error = errors.first()?;
            let message = error
                .message
                .as_ref()
                .map(|message| message.to_string())
                .unwrap_or_else(|| error.code.replace('_', " "));
            Some((field.to_string(), message))
        })
        .collect();
    fields.sort();

    match fields.into_iter().next() {
        Some((field, message)) if field == "__all__" => message,
        Some((field, message)) => format!("{} {}", humanize(&field), message),
        None => "Invalid input".to_string(),
    }
}

fn check(form: &impl Validate) -> Result<(), ActionError> {
    form.validate()
        .map_err(|errors| ActionError::Validation(describe(&errors)))
}

fn clean(text: Option<String>) -> Option<String> {
    text.map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

#[derive(Debug, Clone, PartialEq, Validate)]
pub struct GoalForm {
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[validate(custom(function = "not_blank"))]
    pub category: String,
    #[validate(custom(function = "positive_amount"))]
    pub target_amount: Decimal,
    /// Upfront amount moved into the goal on creation.
    #[validate(custom(function = "non_negative_amount"))]
    pub current_amount: Decimal,
    #[validate(range(min = 1, message = "must be at least 1 month"))]
    pub months: u32,
    pub notes: Option<String>,
}

impl GoalForm {
    /// Validates against the balance free to allocate; the deadline is
    /// `months` 30-day months after `today`.
    pub fn into_request(
        self,
        available_balance: Decimal,
        today: NaiveDate,
    ) -> Result<CreateGoalRequest, ActionError> {
        check(&self)?;

        if self.target_amount > available_balance {
            return Err(ActionError::Validation(format!(
                "Amount exceeds available balance. You can allocate up to {}.",
                available_balance
            )));
        }
        if self.current_amount > available_balance {
            return Err(ActionError::Validation(format!(
                "Upfront amount too high. You can allocate up to {} right now.",
                available_balance
            )));
        }

        let deadline = today
            .checked_add_days(Days::new(u64::from(self.months) * DAYS_PER_MONTH))
            .ok_or_else(|| ActionError::Validation("Time period is too long".to_string()))?;

        Ok(CreateGoalRequest {
            name: self.name.trim().to_string(),
            category: self.category,
            target_amount: self.target_amount,
            current_amount: self.current_amount,
            deadline,
            notes: clean(self.notes),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Validate)]
pub struct SavingsForm {
    #[validate(custom(function = "positive_amount"))]
    pub amount: Decimal,
    pub date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl SavingsForm {
    pub fn into_request(self) -> Result<AddSavingsRequest, ActionError> {
        check(&self)?;
        Ok(AddSavingsRequest {
            amount: self.amount,
            date: self.date,
            notes: clean(self.notes),
        })
    }
}

/// Edit of an existing goal; only the fields that are set are sent.
#[derive(Debug, Clone, PartialEq, Default, Validate)]
pub struct EditGoalForm {
    #[validate(custom(function = "not_blank"))]
    pub name: Option<String>,
    #[validate(custom(function = "positive_amount"))]
    pub target_amount: Option<Decimal>,
    pub deadline: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl EditGoalForm {
    pub fn into_request(self) -> Result<UpdateGoalRequest, ActionError> {
        check(&self)?;
        let request = UpdateGoalRequest {
            name: self.name.map(|name| name.trim().to_string()),
            target_amount: self.target_amount,
            deadline: self.deadline,
            notes: self.notes,
        };
        if request == UpdateGoalRequest::default() {
            return Err(ActionError::Validation("No fields to update".to_string()));
        }
        Ok(request)
    }
}

#[derive(Debug, Clone, PartialEq, Validate)]
pub struct TransactionForm {
    #[validate(custom(function = "positive_amount"))]
    pub amount: Decimal,
    pub txn_type: TransactionType,
    #[validate(custom(function = "not_blank"))]
    pub category: Option<String>,
    #[validate(length(max = 255, message = "must be at most 255 characters"))]
    pub description: Option<String>,
    pub payment_mode: Option<String>,
    pub txn_date: Option<NaiveDate>,
}

impl TransactionForm {
    pub fn into_request(self) -> Result<CreateTransactionRequest, ActionError> {
        check(&self)?;
        Ok(CreateTransactionRequest {
            amount: self.amount,
            txn_type: self.txn_type,
            category: clean(self.category),
            description: clean(self.description),
            payment_mode: clean(self.payment_mode),
            txn_date: self.txn_date,
            source: TransactionSource::Manual,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Validate)]
#[validate(schema(function = "others_need_a_name"))]
pub struct BudgetForm {
    #[validate(custom(function = "not_blank"))]
    pub category: String,
    pub budget_type: BudgetPeriod,
    #[validate(custom(function = "positive_amount"))]
    pub amount: Decimal,
    pub start_date: NaiveDate,
    #[validate(range(min = 1, max = 100, message = "must be between 1 and 100"))]
    pub alert_threshold: u8,
    pub custom_category_name: Option<String>,
}

impl BudgetForm {
    pub fn into_request(self) -> Result<CreateBudgetRequest, ActionError> {
        check(&self)?;
        let custom_category_name = if self.category == OTHERS_CATEGORY {
            clean(self.custom_category_name)
        } else {
            None
        };
        Ok(CreateBudgetRequest {
            category: self.category,
            budget_type: self.budget_type,
            amount: self.amount,
            start_date: self.start_date,
            alert_threshold: self.alert_threshold,
            custom_category_name,
        })
    }
}
