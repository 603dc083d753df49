use anyhow::{Result, bail};
use chrono::{NaiveDate, Utc};
use clap::Subcommand;
use client::forms::BudgetForm;
use common::{BudgetFilters, BudgetPeriod, BudgetUsage, EntityId, UpdateBudgetRequest};
use rust_decimal::Decimal;
use tracing::debug;

use crate::config::AppContext;
use crate::render;

#[derive(Subcommand)]
pub enum BudgetsCommand {
    /// Budgets with spending against their limits
    List {
        #[arg(long)]
        category: Option<String>,
        /// Monthly or Weekly
        #[arg(long)]
        period: Option<BudgetPeriod>,
        /// Month and year are only applied together
        #[arg(long, requires = "year")]
        month: Option<u32>,
        #[arg(long, requires = "month")]
        year: Option<i32>,
    },
    /// Set a spending limit for a category
    Create {
        category: String,
        amount: Decimal,
        #[arg(long, default_value = "monthly")]
        period: BudgetPeriod,
        /// Defaults to today
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Percent of the limit that triggers a warning
        #[arg(long, default_value_t = 80)]
        threshold: u8,
        /// Name for an "others" budget
        #[arg(long)]
        name: Option<String>,
    },
    /// Change a budget
    Update {
        id: String,
        #[arg(long)]
        amount: Option<Decimal>,
        #[arg(long)]
        period: Option<BudgetPeriod>,
        #[arg(long)]
        threshold: Option<u8>,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        name: Option<String>,
    },
    /// Delete a budget
    Delete { id: String },
    /// Categories a budget can be set for
    Categories,
}

pub async fn run(command: BudgetsCommand, context: &AppContext) -> Result<()> {
    let api = &context.api;
    let notifier = &context.notifier;

    match command {
        BudgetsCommand::List {
            category,
            period,
            month,
            year,
        } => {
            let filters = BudgetFilters {
                category,
                budget_type: period,
                month,
                year,
            };
            let budgets = api.get_budgets(&filters).await?;
            let usages: Vec<BudgetUsage> = budgets.iter().map(BudgetUsage::from_budget).collect();
            println!("{}", render::budgets(&usages));
        }
        BudgetsCommand::Create {
            category,
            amount,
            period,
            start,
            threshold,
            name,
        } => {
            let form = BudgetForm {
                category,
                budget_type: period,
                amount,
                start_date: start.unwrap_or_else(|| Utc::now().date_naive()),
                alert_threshold: threshold,
                custom_category_name: name,
            };
            let request = match form.into_request() {
                Ok(request) => request,
                Err(e) => {
                    notifier.show_error(e.to_string());
                    return Err(e.into());
                }
            };
            let budget = api.create_budget(&request).await?;
            notifier.show_success(format!(
                "{} budget of {} set for {}",
                budget.budget_type,
                render::money(budget.amount),
                budget.display_category()
            ));
        }
        BudgetsCommand::Update {
            id,
            amount,
            period,
            threshold,
            start,
            name,
        } => {
            let request = UpdateBudgetRequest {
                amount,
                budget_type: period,
                alert_threshold: threshold,
                start_date: start,
                custom_category_name: name,
            };
            if request.is_empty() {
                bail!("No fields to update");
            }
            if threshold.is_some_and(|t| !(1..=100).contains(&t)) {
                bail!("Alert threshold must be between 1 and 100");
            }
            let budget = api.update_budget(&EntityId::from(id), &request).await?;
            debug!("Updated budget {:?}", budget);
            notifier.show_success(format!("{} budget updated", budget.display_category()));
        }
        BudgetsCommand::Delete { id } => {
            api.delete_budget(&EntityId::from(id)).await?;
            notifier.show_success("Budget deleted".to_string());
        }
        BudgetsCommand::Categories => {
            let categories = api.get_categories().await?;
            let rows = categories
                .into_iter()
                .map(|category| vec![category.icon, category.value, category.label])
                .collect();
            println!("{}", render::pretty_table(&["", "Key", "Label"], rows));
        }
    }
    Ok(())
}
