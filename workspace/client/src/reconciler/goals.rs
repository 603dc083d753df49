use async_trait::async_trait;
use common::goal_progress::partition_goals;
use common::{EntityId, Goal, GoalPartition, GoalTotals, GoalsResponse, SavingsReceipt};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

use super::{Loader, Reconciler, ViewContext, ViewState};
use crate::api_client::FinanceApi;
use crate::clock::Clock;
use crate::error::{ActionError, ApiError};
use crate::forms::{EditGoalForm, GoalForm, SavingsForm};
use crate::refresh::{RefreshBus, RefreshScope, RefreshSignal};
use crate::toast::Notifier;

/// Goals as the Goals view renders them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalsSnapshot {
    pub partition: GoalPartition,
    pub available_balance: Decimal,
    pub totals: GoalTotals,
}

impl GoalsSnapshot {
    /// Re-derives everything from one server read and the current time.
    pub fn derive(response: &GoalsResponse, now: chrono::DateTime<chrono::Utc>) -> Self {
        let partition = partition_goals(&response.goals, now);
        let totals = partition.totals();
        Self {
            partition,
            available_balance: response.available_balance,
            totals,
        }
    }

    pub fn find(&self, id: &EntityId) -> Option<&Goal> {
        self.partition
            .active
            .iter()
            .chain(self.partition.completed.iter())
            .map(|progress| &progress.goal)
            .find(|goal| &goal.id == id)
    }
}

pub struct GoalsLoader {
    api: Arc<dyn FinanceApi>,
    clock: Arc<dyn Clock>,
}

impl GoalsLoader {
    pub fn new(api: Arc<dyn FinanceApi>, clock: Arc<dyn Clock>) -> Self {
        Self { api, clock }
    }
}

#[async_trait]
impl Loader for GoalsLoader {
    type Output = GoalsSnapshot;

    fn name(&self) -> &'static str {
        "goals"
    }

    fn scope(&self) -> RefreshScope {
        RefreshScope::Goals
    }

    async fn load(&self) -> Result<GoalsSnapshot, ApiError> {
        let response = self.api.get_goals().await?;
        Ok(GoalsSnapshot::derive(&response, self.clock.now()))
    }
}

/// Goals page: polled goal list plus the four goal mutations.
///
/// Every mutation validates, calls the API, reloads this view from the
/// server and then tells sibling views to reload too.
pub struct GoalsView {
    reconciler: Reconciler<GoalsLoader>,
    api: Arc<dyn FinanceApi>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    bus: RefreshBus,
}

impl GoalsView {
    pub fn mount(api: Arc<dyn FinanceApi>, context: &ViewContext) -> Self {
        let loader = GoalsLoader::new(Arc::clone(&api), Arc::clone(&context.clock));
        Self {
            reconciler: Reconciler::mount(loader, context),
            api,
            notifier: Arc::clone(&context.notifier),
            clock: Arc::clone(&context.clock),
            bus: context.bus.clone(),
        }
    }

    pub fn state(&self) -> ViewState<GoalsSnapshot> {
        self.reconciler.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState<GoalsSnapshot>> {
        self.reconciler.subscribe()
    }

    pub async fn refresh(&self) -> Result<(), ApiError> {
        self.reconciler.refresh().await
    }

    pub fn unmount(&self) {
        self.reconciler.unmount();
    }

    async fn available_balance(&self) -> Result<Decimal, ApiError> {
        match self.reconciler.data() {
            Some(snapshot) => Ok(snapshot.available_balance),
            None => Ok(self.api.get_goals().await?.available_balance),
        }
    }

    fn fail(&self, error: impl Into<ActionError>) -> ActionError {
        let error = error.into();
        self.notifier.show_error(error.to_string());
        error
    }

    async fn after_mutation(&self, message: String) {
        self.notifier.show_success(message);
        // A failed reload is already toasted and the next tick retries.
        let _ = self.reconciler.refresh().await;
        let listeners = self
            .bus
            .publish(RefreshSignal::from_view(self.reconciler.id(), RefreshScope::Goals));
        debug!("Goal change announced to {} views", listeners);
    }

    pub async fn create_goal(&self, form: GoalForm) -> Result<Goal, ActionError> {
        let available = self.available_balance().await.map_err(|e| self.fail(e))?;
        let today = self.clock.now().date_naive();
        let request = form
            .into_request(available, today)
            .map_err(|e| self.fail(e))?;

        let goal = self
            .api
            .create_goal(&request)
            .await
            .map_err(|e| self.fail(e))?;
        info!("Created goal {} ({})", goal.name, goal.id);

        self.after_mutation(format!("\"{}\" set for {}", goal.name, goal.target_amount))
            .await;
        Ok(goal)
    }

    pub async fn add_savings(
        &self,
        id: &EntityId,
        form: SavingsForm,
    ) -> Result<SavingsReceipt, ActionError> {
        let request = form.into_request().map_err(|e| self.fail(e))?;
        let receipt = self
            .api
            .add_savings(id, &request)
            .await
            .map_err(|e| self.fail(e))?;

        let message = receipt
            .message
            .clone()
            .unwrap_or_else(|| format!("{} added to {}", request.amount, receipt.goal.name));
        self.after_mutation(message).await;
        Ok(receipt)
    }

    pub async fn edit_goal(&self, id: &EntityId, form: EditGoalForm) -> Result<Goal, ActionError> {
        let request = form.into_request().map_err(|e| self.fail(e))?;
        let goal = self
            .api
            .update_goal(id, &request)
            .await
            .map_err(|e| self.fail(e))?;

        self.after_mutation("Goal updated".to_string()).await;
        Ok(goal)
    }

    pub async fn delete_goal(&self, id: &EntityId) -> Result<(), ActionError> {
        self.api.delete_goal(id).await.map_err(|e| self.fail(e))?;

        self.after_mutation("Goal deleted".to_string()).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_client::ApiClient;
    use crate::clock::FixedClock;
    use crate::session::NoSession;
    use crate::test_utils::{FakeFinanceApi, MockBackend, goal};
    use crate::toast::{ToastKind, ToastQueue};
    use axum::Json;
    use axum::routing::get;
    use chrono::{NaiveDate, TimeZone, Utc};
    use common::PaceStatus;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use std::time::Duration;

    fn context(toasts: Arc<ToastQueue>) -> ViewContext {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        ViewContext::new(toasts, RefreshBus::new())
            .with_clock(Arc::new(clock))
            .with_poll_interval(Duration::from_millis(5000))
    }

    fn toasts() -> Arc<ToastQueue> {
        Arc::new(ToastQueue::new(Duration::from_secs(60)))
    }

    async fn ready(view: &GoalsView) -> GoalsSnapshot {
        let mut rx = view.subscribe();
        let state = rx.wait_for(|state| state.is_ready()).await.unwrap();
        state.data.clone().unwrap()
    }

    #[tokio::test]
    async fn test_completed_trip_over_http() {
        let backend = MockBackend::serve(axum::Router::new().route(
            "/goals",
            get(|| async {
                Json(json!({
                    "goals": [
                        {"id": "trip", "name": "Trip", "category": "travel",
                         "target_amount": 5000, "current_amount": 5000,
                         "deadline": "2024-01-01", "notes": null},
                        {"id": "car", "name": "Car", "category": "vehicle",
                         "target_amount": 20000, "current_amount": 5000,
                         "deadline": "2025-12-01"}
                    ],
                    "available_balance": 12000
                }))
            }),
        ))
        .await;
        let api = Arc::new(ApiClient::new(backend.base_url(), Arc::new(NoSession)));
        let view = GoalsView::mount(api, &context(toasts()));

        let snapshot = ready(&view).await;
        assert_eq!(snapshot.available_balance, dec!(12000));
        assert_eq!(snapshot.partition.completed.len(), 1);
        let trip = &snapshot.partition.completed[0];
        assert_eq!(trip.goal.name, "Trip");
        assert_eq!(trip.status, PaceStatus::Completed);
        assert_eq!(trip.months_remaining, 0);
        assert_eq!(snapshot.partition.active[0].goal.name, "Car");
        assert_eq!(snapshot.totals.reserved, dec!(15000));
        view.unmount();
    }

    #[tokio::test(start_paused = true)]
    async fn test_refetch_is_idempotent() {
        let api = Arc::new(FakeFinanceApi::with_goals(
            vec![
                goal("a", dec!(1000), dec!(200), NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()),
                goal("b", dec!(500), dec!(500), NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()),
            ],
            dec!(8000),
        ));
        let view = GoalsView::mount(api.clone(), &context(toasts()));
        let first = ready(&view).await;

        view.refresh().await.unwrap();
        view.refresh().await.unwrap();
        let again = view.state().data.unwrap();
        assert_eq!(first, again);
        assert_eq!(api.goal_fetches(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_add_savings_refetches_and_signals_siblings() {
        let api = Arc::new(FakeFinanceApi::with_goals(
            vec![goal("fund", dec!(1000), dec!(900), NaiveDate::from_ymd_opt(2025, 6, 1).unwrap())],
            dec!(8000),
        ));
        let toasts = toasts();
        let context = context(toasts.clone());
        let view = GoalsView::mount(api.clone(), &context);
        let before = ready(&view).await;
        assert_eq!(before.partition.active.len(), 1);

        let mut sibling = context.bus.subscribe();
        let form = SavingsForm {
            amount: dec!(100),
            date: None,
            notes: None,
        };
        view.add_savings(&EntityId::from("fund"), form).await.unwrap();

        // Reloaded before returning: the goal moved to completed.
        let after = view.state().data.unwrap();
        assert!(after.partition.active.is_empty());
        assert_eq!(after.partition.completed[0].goal.current_amount, dec!(1000));
        assert_eq!(api.goal_fetches(), 2);

        let signal = sibling.try_recv().unwrap();
        assert_eq!(signal.scope, RefreshScope::Goals);
        assert_eq!(toasts.count(ToastKind::Success), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_form_never_reaches_api() {
        let api = Arc::new(FakeFinanceApi::with_goals(Vec::new(), dec!(8000)));
        let toasts = toasts();
        let view = GoalsView::mount(api.clone(), &context(toasts.clone()));
        ready(&view).await;

        let form = GoalForm {
            name: "  ".to_string(),
            category: "travel".to_string(),
            target_amount: dec!(100),
            current_amount: Decimal::ZERO,
            months: 3,
            notes: None,
        };
        let error = view.create_goal(form).await.unwrap_err();
        assert_eq!(error, ActionError::Validation("Name is required".to_string()));
        assert_eq!(api.mutations(), 0);
        assert_eq!(api.goal_fetches(), 1);
        assert_eq!(toasts.count(ToastKind::Error), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_and_delete_goal() {
        let api = Arc::new(FakeFinanceApi::with_goals(Vec::new(), dec!(8000)));
        let view = GoalsView::mount(api.clone(), &context(toasts()));
        ready(&view).await;

        let created = view
            .create_goal(GoalForm {
                name: "Laptop".to_string(),
                category: "gadget".to_string(),
                target_amount: dec!(1200),
                current_amount: dec!(200),
                months: 4,
                notes: None,
            })
            .await
            .unwrap();
        assert_eq!(created.deadline, NaiveDate::from_ymd_opt(2025, 5, 1).unwrap());
        let snapshot = view.state().data.unwrap();
        assert!(snapshot.find(&created.id).is_some());

        view.delete_goal(&created.id).await.unwrap();
        let snapshot = view.state().data.unwrap();
        assert!(snapshot.partition.is_empty());
        assert_eq!(api.mutations(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_mutation_is_toasted_and_returned() {
        let api = Arc::new(FakeFinanceApi::with_goals(Vec::new(), dec!(8000)));
        let toasts = toasts();
        let view = GoalsView::mount(api.clone(), &context(toasts.clone()));
        ready(&view).await;

        let error = view
            .edit_goal(
                &EntityId::from("missing"),
                EditGoalForm {
                    notes: Some("note".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(error.to_string(), "Goal not found");
        assert_eq!(toasts.count(ToastKind::Error), 1);
        assert_eq!(toasts.count(ToastKind::Success), 0);
    }
}
