use client::{DashboardSnapshot, GoalsSnapshot, Notifier, Toast, ToastKind};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use common::{BudgetAlert, BudgetUsage, GoalProgress, Profile, Transaction, TransactionSummary};
use rust_decimal::Decimal;

/// Prints toasts to stderr so tables on stdout stay clean.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

fn toast_tag(kind: ToastKind) -> &'static str {
    match kind {
        ToastKind::Info => "info",
        ToastKind::Success => "ok",
        ToastKind::Warning => "warning",
        ToastKind::Error => "error",
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: String, kind: ToastKind) {
        eprintln!("[{}] {}", toast_tag(kind), message);
    }
}

/// Toasts still visible in watch mode, one per line.
pub fn toasts(toasts: &[Toast]) -> String {
    toasts
        .iter()
        .map(|toast| format!("[{}] {}\n", toast_tag(toast.kind), toast.message))
        .collect()
}

pub fn money(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(headers.iter().map(|h| Cell::new(*h)));
    for row in rows {
        table.add_row(row.into_iter().map(Cell::new));
    }
    table
}

fn goal_row(progress: &GoalProgress) -> Vec<String> {
    let goal = &progress.goal;
    let months = if progress.overdue {
        "overdue".to_string()
    } else {
        progress.months_remaining.to_string()
    };
    vec![
        goal.id.to_string(),
        goal.name.clone(),
        goal.category.clone(),
        format!("{} / {}", money(goal.current_amount), money(goal.target_amount)),
        format!("{}%", progress.progress_percent),
        goal.deadline.to_string(),
        months,
        money(progress.monthly_needed),
        progress.status.label().to_string(),
    ]
}

pub fn goals(snapshot: &GoalsSnapshot) -> String {
    const HEADERS: [&str; 9] = [
        "ID", "Name", "Category", "Saved", "Progress", "Deadline", "Months left", "Monthly",
        "Status",
    ];
    let partition = &snapshot.partition;
    let mut out = String::new();

    out.push_str(&format!("Active goals ({})\n", partition.active.len()));
    if partition.active.is_empty() {
        out.push_str("No active goals.\n");
    } else {
        let rows = partition.active.iter().map(goal_row).collect();
        out.push_str(&format!("{}\n", pretty_table(&HEADERS, rows)));
    }

    out.push_str(&format!("\nCompleted goals ({})\n", partition.completed.len()));
    if !partition.completed.is_empty() {
        let rows = partition.completed.iter().map(goal_row).collect();
        out.push_str(&format!("{}\n", pretty_table(&HEADERS, rows)));
    }

    let totals = &snapshot.totals;
    out.push_str(&format!(
        "\nSaved {} of {} ({}%). Reserved for goals: {}. Available: {}.\n",
        money(totals.saved),
        money(totals.target),
        totals.percent(),
        money(totals.reserved),
        money(snapshot.available_balance),
    ));
    out
}

pub fn transactions(transactions: &[Transaction]) -> Table {
    let rows = transactions
        .iter()
        .map(|txn| {
            vec![
                txn.id.to_string(),
                txn.txn_date.map(|d| d.to_string()).unwrap_or_default(),
                txn.txn_type.to_string(),
                money(txn.amount),
                txn.category.clone().unwrap_or_default(),
                txn.description.clone().unwrap_or_default(),
                txn.payment_mode.clone().unwrap_or_default(),
                txn.source.to_string(),
            ]
        })
        .collect();
    pretty_table(
        &["ID", "Date", "Type", "Amount", "Category", "Description", "Payment", "Source"],
        rows,
    )
}

pub fn summary(summary: &TransactionSummary) -> String {
    let mut out = format!(
        "{:02}/{}: income {}, expenses {}, net {} (savings rate {}%)\n",
        summary.month,
        summary.year,
        money(summary.total_income),
        money(summary.total_expense),
        money(summary.net()),
        summary.savings_rate(),
    );
    if !summary.expenses_by_category.is_empty() {
        let rows = summary
            .expenses_by_category
            .iter()
            .map(|(category, amount)| vec![category.clone(), money(*amount)])
            .collect();
        out.push_str(&format!("{}\n", pretty_table(&["Category", "Spent"], rows)));
    }
    out
}

pub fn budgets(usages: &[BudgetUsage]) -> Table {
    let rows = usages
        .iter()
        .map(|usage| {
            let budget = &usage.budget;
            let alert = match usage.alert {
                BudgetAlert::Ok => "",
                BudgetAlert::Threshold => "near limit",
                BudgetAlert::Exceeded => "exceeded",
            };
            vec![
                budget.id.to_string(),
                budget.display_category().to_string(),
                budget.budget_type.to_string(),
                money(budget.spent),
                money(budget.amount),
                format!("{}%", usage.percent),
                money(usage.remaining),
                alert.to_string(),
            ]
        })
        .collect();
    pretty_table(
        &["ID", "Category", "Period", "Spent", "Limit", "Used", "Left", "Alert"],
        rows,
    )
}

pub fn dashboard(snapshot: &DashboardSnapshot) -> String {
    let mut out = summary(&snapshot.summary);
    out.push('\n');
    out.push_str(&goals(&snapshot.goals));
    if !snapshot.budgets.is_empty() {
        out.push_str(&format!("\nBudgets\n{}\n", budgets(&snapshot.budgets)));
    }
    for usage in snapshot.budget_alerts() {
        out.push_str(&format!(
            "! {} budget at {}% of its limit\n",
            usage.budget.display_category(),
            usage.percent
        ));
    }
    out
}

pub fn profile(profile: &Profile) -> String {
    format!(
        "{}\nEmail: {}\nAvatar: {}\nTheme: {}\n",
        profile.display_name(),
        profile.email.as_deref().unwrap_or("-"),
        profile.avatar_url.as_deref().unwrap_or("-"),
        profile.theme,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use common::{EntityId, Goal, GoalsResponse};
    use rust_decimal_macros::dec;

    fn goal(id: &str, target: Decimal, current: Decimal, deadline: NaiveDate) -> Goal {
        Goal {
            id: EntityId::from(id),
            name: id.to_string(),
            category: "travel".to_string(),
            target_amount: target,
            current_amount: current,
            deadline,
            notes: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_goals_render_both_buckets_and_totals() {
        let response = GoalsResponse {
            goals: vec![
                goal("Trip", dec!(5000), dec!(5000), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
                goal("Car", dec!(20000), dec!(5000), NaiveDate::from_ymd_opt(2025, 12, 1).unwrap()),
            ],
            available_balance: dec!(12000),
        };
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let text = goals(&GoalsSnapshot::derive(&response, now));

        assert!(text.contains("Active goals (1)"));
        assert!(text.contains("Completed goals (1)"));
        assert!(text.contains("Trip"));
        assert!(text.contains("Completed"));
        assert!(text.contains("Reserved for goals: 15000.00"));
    }

    #[test]
    fn test_toasts_render_tagged_lines() {
        let shown = vec![
            Toast {
                id: 0,
                message: "Cannot connect to server".to_string(),
                kind: ToastKind::Error,
            },
            Toast {
                id: 1,
                message: "Goal created".to_string(),
                kind: ToastKind::Success,
            },
        ];
        assert_eq!(
            toasts(&shown),
            "[error] Cannot connect to server\n[ok] Goal created\n"
        );
        assert!(toasts(&[]).is_empty());
    }

    #[test]
    fn test_money_has_two_places() {
        assert_eq!(money(dec!(12)), "12.00");
        assert_eq!(money(dec!(2666.666)), "2666.67");
    }
}
