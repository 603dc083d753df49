use anyhow::Result;
use chrono::NaiveDate;
use clap::ValueEnum;
use common::{Transaction, TransactionSummary, TransactionType};
use serde::Serialize;
use std::fmt;
use std::io::Write;

/// Which transactions go into an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ExportKind {
    #[default]
    All,
    Income,
    Expenses,
}

impl ExportKind {
    fn includes(self, txn: &Transaction) -> bool {
        match self {
            Self::All => true,
            Self::Income => txn.txn_type == TransactionType::Income,
            Self::Expenses => txn.txn_type == TransactionType::Expense,
        }
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Income => f.write_str("income"),
            Self::Expenses => f.write_str("expenses"),
        }
    }
}

#[derive(Debug, Serialize)]
struct TransactionRecord {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Amount")]
    amount: String,
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "Type")]
    txn_type: String,
}

#[derive(Debug, Serialize)]
struct CategoryRecord<'a> {
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "Amount")]
    amount: &'a str,
}

/// "food_and_dining" -> "Food and dining".
fn category_label(key: &str) -> String {
    let spaced = key.trim().replace(['_', '-'], " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => "Uncategorized".to_string(),
    }
}

/// Single-line title: description with whitespace collapsed, else the category.
fn title(txn: &Transaction) -> String {
    let description = txn
        .description
        .as_deref()
        .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
        .unwrap_or_default();
    if !description.is_empty() {
        return description;
    }
    category_label(txn.category.as_deref().unwrap_or_default())
}

pub fn default_file_name(kind: ExportKind, today: NaiveDate) -> String {
    format!("wealthwise_{}_{}.csv", kind, today)
}

/// Writes `Date,Title,Amount,Category,Type` rows, expenses negative.
/// Returns the number of rows written.
pub fn write_transactions<W: Write>(
    writer: W,
    transactions: &[Transaction],
    kind: ExportKind,
) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut written = 0;

    for txn in transactions.iter().filter(|txn| kind.includes(txn)) {
        wtr.serialize(TransactionRecord {
            date: txn.txn_date.map(|d| d.to_string()).unwrap_or_default(),
            title: title(txn),
            amount: format!("{:.2}", txn.signed_amount().round_dp(2)),
            category: category_label(txn.category.as_deref().unwrap_or_default()),
            txn_type: txn.txn_type.to_string(),
        })?;
        written += 1;
    }

    // Header even for an empty export
    if written == 0 {
        wtr.write_record(["Date", "Title", "Amount", "Category", "Type"])?;
    }
    wtr.flush()?;
    Ok(written)
}

/// Category breakdown of one month as `Category,Amount`, largest first.
pub fn write_category_report<W: Write>(writer: W, summary: &TransactionSummary) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut categories: Vec<_> = summary.expenses_by_category.iter().collect();
    categories.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    for (category, amount) in &categories {
        let amount = format!("{:.2}", amount.round_dp(2));
        wtr.serialize(CategoryRecord {
            category: category_label(category),
            amount: &amount,
        })?;
    }
    if categories.is_empty() {
        wtr.write_record(["Category", "Amount"])?;
    }
    wtr.flush()?;
    Ok(categories.len())
}
