use async_trait::async_trait;
use common::{BudgetAlert, BudgetUsage, TransactionSummary};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;

use super::goals::GoalsSnapshot;
use super::{Loader, Reconciler, ViewContext, ViewState};
use crate::api_client::FinanceApi;
use crate::clock::Clock;
use crate::error::ApiError;
use crate::refresh::RefreshScope;

/// Everything the dashboard home shows, from one round of reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub summary: TransactionSummary,
    pub goals: GoalsSnapshot,
    pub budgets: Vec<BudgetUsage>,
}

impl DashboardSnapshot {
    /// Budgets at or past their alert threshold.
    pub fn budget_alerts(&self) -> impl Iterator<Item = &BudgetUsage> {
        self.budgets
            .iter()
            .filter(|usage| usage.alert != BudgetAlert::Ok)
    }
}

pub struct DashboardLoader {
    api: Arc<dyn FinanceApi>,
    clock: Arc<dyn Clock>,
}

impl DashboardLoader {
    pub fn new(api: Arc<dyn FinanceApi>, clock: Arc<dyn Clock>) -> Self {
        Self { api, clock }
    }
}

#[async_trait]
impl Loader for DashboardLoader {
    type Output = DashboardSnapshot;

    fn name(&self) -> &'static str {
        "dashboard"
    }

    fn scope(&self) -> RefreshScope {
        RefreshScope::All
    }

    async fn load(&self) -> Result<DashboardSnapshot, ApiError> {
        let (summary, goals, budgets) = tokio::try_join!(
            self.api.transaction_summary(),
            self.api.get_goals(),
            self.api.list_budgets(),
        )?;

        Ok(DashboardSnapshot {
            summary,
            goals: GoalsSnapshot::derive(&goals, self.clock.now()),
            budgets: budgets.iter().map(BudgetUsage::from_budget).collect(),
        })
    }
}

/// Dashboard home. Read-only; reloads on any refresh signal.
pub struct DashboardView {
    reconciler: Reconciler<DashboardLoader>,
}

impl DashboardView {
    pub fn mount(api: Arc<dyn FinanceApi>, context: &ViewContext) -> Self {
        let loader = DashboardLoader::new(api, Arc::clone(&context.clock));
        Self {
            reconciler: Reconciler::mount(loader, context),
        }
    }

    pub fn state(&self) -> ViewState<DashboardSnapshot> {
        self.reconciler.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState<DashboardSnapshot>> {
        self.reconciler.subscribe()
    }

    pub async fn refresh(&self) -> Result<(), ApiError> {
        self.reconciler.refresh().await
    }

    pub fn unmount(&self) {
        self.reconciler.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::SavingsForm;
    use crate::reconciler::GoalsView;
    use crate::refresh::RefreshBus;
    use crate::test_utils::{FakeFinanceApi, goal};
    use crate::toast::{ToastKind, ToastQueue};
    use chrono::NaiveDate;
    use common::EntityId;
    use rust_decimal_macros::dec;
    use std::time::Duration;

    fn settle() -> impl std::future::Future<Output = ()> {
        async {
            for _ in 0..10 {
                tokio::task::yield_now().await;
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_dashboard_combines_reads() {
        let api = Arc::new(FakeFinanceApi::with_goals(
            vec![goal("a", dec!(1000), dec!(250), NaiveDate::from_ymd_opt(2030, 1, 1).unwrap())],
            dec!(4000),
        ));
        let toasts = Arc::new(ToastQueue::new(Duration::from_secs(60)));
        let context = ViewContext::new(toasts, RefreshBus::new());
        let dashboard = DashboardView::mount(api.clone(), &context);

        let mut rx = dashboard.subscribe();
        let state = rx.wait_for(|state| state.is_ready()).await.unwrap().clone();
        let snapshot = state.data.unwrap();
        assert_eq!(snapshot.summary.net(), dec!(18000));
        assert_eq!(snapshot.goals.totals.saved, dec!(250));
        assert_eq!(snapshot.budget_alerts().count(), 1);
        assert_eq!(
            (api.summary_fetches(), api.goal_fetches(), api.budget_fetches()),
            (1, 1, 1)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_goal_mutation_refreshes_dashboard() {
        let api = Arc::new(FakeFinanceApi::with_goals(
            vec![goal("a", dec!(1000), dec!(250), NaiveDate::from_ymd_opt(2030, 1, 1).unwrap())],
            dec!(4000),
        ));
        let toasts = Arc::new(ToastQueue::new(Duration::from_secs(60)));
        let context = ViewContext::new(toasts.clone(), RefreshBus::new());
        let dashboard = DashboardView::mount(api.clone(), &context);
        let goals = GoalsView::mount(api.clone(), &context);

        dashboard.subscribe().wait_for(|s| s.is_ready()).await.unwrap();
        goals.subscribe().wait_for(|s| s.is_ready()).await.unwrap();
        assert_eq!(dashboard.state().loads, 1);

        goals
            .add_savings(
                &EntityId::from("a"),
                SavingsForm {
                    amount: dec!(250),
                    date: None,
                    notes: None,
                },
            )
            .await
            .unwrap();
        settle().await;

        let state = dashboard.state();
        assert_eq!(state.loads, 2);
        assert_eq!(state.data.unwrap().goals.totals.saved, dec!(500));
        assert_eq!(toasts.count(ToastKind::Error), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_failed_read_fails_the_round_but_keeps_data() {
        let api = Arc::new(FakeFinanceApi::with_goals(Vec::new(), dec!(0)));
        let toasts = Arc::new(ToastQueue::new(Duration::from_secs(60)));
        let context = ViewContext::new(toasts.clone(), RefreshBus::new());
        let dashboard = DashboardView::mount(api.clone(), &context);
        dashboard.subscribe().wait_for(|s| s.is_ready()).await.unwrap();

        api.set_failing(true);
        assert!(dashboard.refresh().await.is_err());
        let state = dashboard.state();
        assert!(state.data.is_some());
        assert_eq!(state.failures, 1);
        assert_eq!(toasts.count(ToastKind::Error), 1);
    }
}
