use async_trait::async_trait;
use axum::Router;
use chrono::NaiveDate;
use common::{
    AddSavingsRequest, Budget, BudgetPeriod, CreateGoalRequest, EntityId, Goal, GoalsResponse,
    SavingsReceipt, TransactionSummary, UpdateGoalRequest,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Mutex;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::api_client::FinanceApi;
use crate::error::ApiError;

/// Axum router served on an ephemeral local port for the test's lifetime.
pub struct MockBackend {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl MockBackend {
    pub async fn serve(router: Router) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        Self { addr, handle }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Base URL of a local port nothing listens on.
pub async fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

pub fn goal(id: &str, target: Decimal, current: Decimal, deadline: NaiveDate) -> Goal {
    Goal {
        id: EntityId::from(id),
        name: id.to_string(),
        category: "other".to_string(),
        target_amount: target,
        current_amount: current,
        deadline,
        notes: None,
        created_at: None,
        updated_at: None,
    }
}

fn budget(id: i64, category: &str, amount: Decimal, spent: Decimal) -> Budget {
    Budget {
        id: EntityId::from(id),
        category: category.to_string(),
        budget_type: BudgetPeriod::Monthly,
        amount,
        start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        alert_threshold: 80,
        custom_category_name: None,
        spent,
        created_at: None,
    }
}

fn not_found() -> ApiError {
    ApiError::Rejected {
        status: 404,
        message: "Goal not found".to_string(),
    }
}

#[derive(Debug, Default)]
struct FakeState {
    goals: Vec<Goal>,
    available_balance: Decimal,
    next_id: u64,
    goal_fetches: usize,
    summary_fetches: usize,
    budget_fetches: usize,
    mutations: usize,
    failing: bool,
}

/// In-memory backend for view tests. Savings move money out of the
/// available balance the way the server does.
#[derive(Debug, Default)]
pub struct FakeFinanceApi {
    state: Mutex<FakeState>,
}

impl FakeFinanceApi {
    pub fn with_goals(goals: Vec<Goal>, available_balance: Decimal) -> Self {
        Self {
            state: Mutex::new(FakeState {
                goals,
                available_balance,
                ..Default::default()
            }),
        }
    }

    /// Makes every following call fail as if the server were down.
    pub fn set_failing(&self, failing: bool) {
        self.state.lock().unwrap().failing = failing;
    }

    pub fn goal_fetches(&self) -> usize {
        self.state.lock().unwrap().goal_fetches
    }

    pub fn summary_fetches(&self) -> usize {
        self.state.lock().unwrap().summary_fetches
    }

    pub fn budget_fetches(&self) -> usize {
        self.state.lock().unwrap().budget_fetches
    }

    pub fn mutations(&self) -> usize {
        self.state.lock().unwrap().mutations
    }

    fn with_state<T>(
        &self,
        f: impl FnOnce(&mut FakeState) -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        let mut state = self.state.lock().unwrap();
        if state.failing {
            return Err(ApiError::Unreachable {
                reason: "connection refused".to_string(),
            });
        }
        f(&mut state)
    }
}

#[async_trait]
impl FinanceApi for FakeFinanceApi {
    async fn get_goals(&self) -> Result<GoalsResponse, ApiError> {
        self.with_state(|state| {
            state.goal_fetches += 1;
            Ok(GoalsResponse {
                goals: state.goals.clone(),
                available_balance: state.available_balance,
            })
        })
    }

    async fn create_goal(&self, request: &CreateGoalRequest) -> Result<Goal, ApiError> {
        self.with_state(|state| {
            state.mutations += 1;
            state.next_id += 1;
            let goal = Goal {
                id: EntityId::new(format!("goal-{}", state.next_id)),
                name: request.name.clone(),
                category: request.category.clone(),
                target_amount: request.target_amount,
                current_amount: request.current_amount,
                deadline: request.deadline,
                notes: request.notes.clone(),
                created_at: None,
                updated_at: None,
            };
            state.available_balance -= request.current_amount;
            state.goals.push(goal.clone());
            Ok(goal)
        })
    }

    async fn update_goal(
        &self,
        id: &EntityId,
        request: &UpdateGoalRequest,
    ) -> Result<Goal, ApiError> {
        self.with_state(|state| {
            let goal = state
                .goals
                .iter_mut()
                .find(|goal| &goal.id == id)
                .ok_or_else(not_found)?;
            if let Some(name) = &request.name {
                goal.name = name.clone();
            }
            if let Some(target) = request.target_amount {
                goal.target_amount = target;
            }
            if let Some(deadline) = request.deadline {
                goal.deadline = deadline;
            }
            if request.notes.is_some() {
                goal.notes = request.notes.clone();
            }
            let goal = goal.clone();
            state.mutations += 1;
            Ok(goal)
        })
    }

    async fn delete_goal(&self, id: &EntityId) -> Result<(), ApiError> {
        self.with_state(|state| {
            let index = state
                .goals
                .iter()
                .position(|goal| &goal.id == id)
                .ok_or_else(not_found)?;
            let goal = state.goals.remove(index);
            state.available_balance += goal.current_amount;
            state.mutations += 1;
            Ok(())
        })
    }

    async fn add_savings(
        &self,
        id: &EntityId,
        request: &AddSavingsRequest,
    ) -> Result<SavingsReceipt, ApiError> {
        self.with_state(|state| {
            let goal = state
                .goals
                .iter_mut()
                .find(|goal| &goal.id == id)
                .ok_or_else(not_found)?;
            goal.current_amount += request.amount;
            let goal = goal.clone();
            state.available_balance -= request.amount;
            state.mutations += 1;
            Ok(SavingsReceipt {
                message: Some(format!("Added {} to {}", request.amount, goal.name)),
                goal,
            })
        })
    }

    async fn transaction_summary(&self) -> Result<TransactionSummary, ApiError> {
        self.with_state(|state| {
            state.summary_fetches += 1;
            Ok(TransactionSummary {
                month: 1,
                year: 2025,
                total_income: dec!(50000),
                total_expense: dec!(32000),
                expenses_by_category: BTreeMap::from([
                    ("food".to_string(), dec!(12000)),
                    ("rent".to_string(), dec!(20000)),
                ]),
            })
        })
    }

    async fn list_budgets(&self) -> Result<Vec<Budget>, ApiError> {
        self.with_state(|state| {
            state.budget_fetches += 1;
            Ok(vec![
                budget(1, "food", dec!(15000), dec!(12500)),
                budget(2, "rent", dec!(25000), dec!(10000)),
            ])
        })
    }
}
