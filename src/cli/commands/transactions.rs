use anyhow::{Result, bail};
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use client::forms::TransactionForm;
use common::{EntityId, TransactionFilters, TransactionType, UpdateTransactionRequest};
use rust_decimal::Decimal;
use tracing::{debug, trace};

use crate::config::AppContext;
use crate::render;

#[derive(Debug, Args)]
pub struct FilterArgs {
    /// First day included (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,
    /// Last day included (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub payment_mode: Option<String>,
    /// Text search over descriptions
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long)]
    pub limit: Option<u32>,
    #[arg(long)]
    pub offset: Option<u32>,
}

impl From<FilterArgs> for TransactionFilters {
    fn from(args: FilterArgs) -> Self {
        Self {
            start_date: args.from,
            end_date: args.to,
            category: args.category,
            payment_mode: args.payment_mode,
            search: args.search,
            limit: args.limit,
            offset: args.offset,
        }
    }
}

#[derive(Subcommand)]
pub enum TransactionsCommand {
    /// List transactions, newest first as the backend returns them
    List {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Show one transaction
    Show { id: String },
    /// Record income or an expense
    Add {
        amount: Decimal,
        /// income or expense
        #[arg(long = "type", default_value = "expense")]
        txn_type: TransactionType,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        payment_mode: Option<String>,
        /// Defaults to today on the backend
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Change fields of a transaction
    Update {
        id: String,
        #[arg(long)]
        amount: Option<Decimal>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        payment_mode: Option<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Delete a transaction
    Delete { id: String },
    /// Income, expenses and spending by category for a month
    Summary {
        /// 1-12, defaults to the current month
        #[arg(long)]
        month: Option<u32>,
        #[arg(long)]
        year: Option<i32>,
    },
}

pub async fn run(command: TransactionsCommand, context: &AppContext) -> Result<()> {
    let api = &context.api;
    let notifier = &context.notifier;

    match command {
        TransactionsCommand::List { filters } => {
            trace!("Listing transactions");
            let transactions = api.get_transactions(&filters.into()).await?;
            debug!("Fetched {} transactions", transactions.len());
            println!("{}", render::transactions(&transactions));
        }
        TransactionsCommand::Show { id } => {
            let transaction = api.get_transaction(&EntityId::from(id)).await?;
            println!("{}", render::transactions(std::slice::from_ref(&transaction)));
        }
        TransactionsCommand::Add {
            amount,
            txn_type,
            category,
            description,
            payment_mode,
            date,
        } => {
            let form = TransactionForm {
                amount,
                txn_type,
                category,
                description,
                payment_mode,
                txn_date: date,
            };
            let request = match form.into_request() {
                Ok(request) => request,
                Err(e) => {
                    notifier.show_error(e.to_string());
                    return Err(e.into());
                }
            };

            let created = api.create_transaction(&request).await?;
            notifier.show_success(format!(
                "{} of {} recorded",
                created.transaction.txn_type,
                render::money(created.transaction.amount)
            ));
            if let Some(warning) = &created.budget_warning {
                notifier.show_warning(warning.message.clone().unwrap_or_else(|| {
                    format!(
                        "Budget at {}% ({} of {})",
                        warning.percentage.round_dp(1),
                        render::money(warning.new_total),
                        render::money(warning.budget_amount)
                    )
                }));
            }
        }
        TransactionsCommand::Update {
            id,
            amount,
            category,
            description,
            payment_mode,
            date,
        } => {
            let request = UpdateTransactionRequest {
                amount,
                category,
                description,
                payment_mode,
                txn_date: date,
            };
            if request.is_empty() {
                bail!("No fields to update");
            }
            if amount.is_some_and(|amount| amount <= Decimal::ZERO) {
                bail!("Amount must be greater than zero");
            }
            let updated = api.update_transaction(&EntityId::from(id), &request).await?;
            notifier.show_success(format!("Transaction {} updated", updated.id));
        }
        TransactionsCommand::Delete { id } => {
            api.delete_transaction(&EntityId::from(id)).await?;
            notifier.show_success("Transaction deleted".to_string());
        }
        TransactionsCommand::Summary { month, year } => {
            if month.is_some_and(|month| !(1..=12).contains(&month)) {
                bail!("Month must be between 1 and 12");
            }
            let summary = api.get_transaction_summary(month, year).await?;
            print!("{}", render::summary(&summary));
        }
    }
    Ok(())
}
