use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::Subcommand;
use common::TransactionFilters;
use std::fs::File;
use std::path::PathBuf;
use tracing::debug;

use crate::config::AppContext;
use crate::export::{self, ExportKind};

#[derive(Subcommand)]
pub enum ExportCommand {
    /// Transactions as Date,Title,Amount,Category,Type
    Transactions {
        #[arg(long, value_enum, default_value_t = ExportKind::All)]
        kind: ExportKind,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Defaults to wealthwise_<kind>_<date>.csv
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Spending by category for a month as Category,Amount
    Report {
        #[arg(long)]
        month: Option<u32>,
        #[arg(long)]
        year: Option<i32>,
        #[arg(short, long, default_value = "wealthwise-report.csv")]
        out: PathBuf,
    },
}

pub async fn run(command: ExportCommand, context: &AppContext) -> Result<()> {
    match command {
        ExportCommand::Transactions {
            kind,
            from,
            to,
            out,
        } => {
            let filters = TransactionFilters {
                start_date: from,
                end_date: to,
                ..Default::default()
            };
            let transactions = context.api.get_all_transactions(&filters).await?;
            let out = out.unwrap_or_else(|| {
                PathBuf::from(export::default_file_name(kind, Utc::now().date_naive()))
            });
            let file = File::create(&out)
                .with_context(|| format!("Cannot write {}", out.display()))?;
            let written = export::write_transactions(file, &transactions, kind)?;
            debug!("Wrote {} of {} transactions", written, transactions.len());
            context.notifier.show_success(format!(
                "{} transactions exported to {}",
                written,
                out.display()
            ));
        }
        ExportCommand::Report { month, year, out } => {
            let summary = context.api.get_transaction_summary(month, year).await?;
            let file = File::create(&out)
                .with_context(|| format!("Cannot write {}", out.display()))?;
            let written = export::write_category_report(file, &summary)?;
            context.notifier.show_success(format!(
                "{} categories exported to {}",
                written,
                out.display()
            ));
        }
    }
    Ok(())
}
