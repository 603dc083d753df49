//! How much of a budget has been used in its current period.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::budget::Budget;
use crate::goal_progress::percent_of;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BudgetAlert {
    Ok,
    /// Spending reached the budget's alert threshold.
    Threshold,
    Exceeded,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetUsage {
    pub budget: Budget,
    /// Spent share of the limit in percent. May exceed 100.
    pub percent: Decimal,
    pub remaining: Decimal,
    pub alert: BudgetAlert,
}

impl BudgetUsage {
    pub fn from_budget(budget: &Budget) -> Self {
        let percent = if budget.amount > Decimal::ZERO {
            percent_of(budget.spent, budget.amount).round_dp(2)
        } else {
            Decimal::ZERO
        };

        let alert = if percent >= Decimal::ONE_HUNDRED {
            BudgetAlert::Exceeded
        } else if percent >= Decimal::from(budget.alert_threshold) {
            BudgetAlert::Threshold
        } else {
            BudgetAlert::Ok
        };

        Self {
            budget: budget.clone(),
            percent,
            remaining: budget.amount.saturating_sub(budget.spent).max(Decimal::ZERO),
            alert,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::BudgetPeriod;
    use crate::id::EntityId;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn budget(amount: Decimal, spent: Decimal, threshold: u8) -> Budget {
        Budget {
            id: EntityId::from(1),
            category: "food".to_string(),
            budget_type: BudgetPeriod::Monthly,
            amount,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            alert_threshold: threshold,
            custom_category_name: None,
            spent,
            created_at: None,
        }
    }

    #[test]
    fn test_alert_levels() {
        let ok = BudgetUsage::from_budget(&budget(dec!(1000), dec!(500), 80));
        assert_eq!(ok.alert, BudgetAlert::Ok);
        assert_eq!(ok.percent, dec!(50));
        assert_eq!(ok.remaining, dec!(500));

        let warn = BudgetUsage::from_budget(&budget(dec!(1000), dec!(800), 80));
        assert_eq!(warn.alert, BudgetAlert::Threshold);

        let over = BudgetUsage::from_budget(&budget(dec!(1000), dec!(1250), 80));
        assert_eq!(over.alert, BudgetAlert::Exceeded);
        assert_eq!(over.percent, dec!(125));
        assert_eq!(over.remaining, Decimal::ZERO);
    }

    #[test]
    fn test_tiny_limit_with_huge_spend_is_exceeded() {
        let big = dec!(10000000000000000000000000000);
        let usage = BudgetUsage::from_budget(&budget(dec!(0.01), big, 80));
        assert_eq!(usage.alert, BudgetAlert::Exceeded);
        assert_eq!(usage.percent, Decimal::MAX);
        assert_eq!(usage.remaining, Decimal::ZERO);
    }

    #[test]
    fn test_zero_limit_does_not_divide() {
        let usage = BudgetUsage::from_budget(&budget(Decimal::ZERO, dec!(40), 80));
        assert_eq!(usage.percent, Decimal::ZERO);
        assert_eq!(usage.alert, BudgetAlert::Ok);
    }
}
