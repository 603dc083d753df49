use async_trait::async_trait;
use common::{
    AddSavingsRequest, Budget, BudgetFilters, CreateGoalRequest, EntityId, Goal, GoalsResponse,
    SavingsReceipt, TransactionSummary, UpdateGoalRequest,
};

use super::ApiClient;
use crate::error::ApiError;

/// The backend calls the Goals and Dashboard views depend on.
#[async_trait]
pub trait FinanceApi: Send + Sync {
    async fn get_goals(&self) -> Result<GoalsResponse, ApiError>;

    async fn create_goal(&self, request: &CreateGoalRequest) -> Result<Goal, ApiError>;

    async fn update_goal(
        &self,
        id: &EntityId,
        request: &UpdateGoalRequest,
    ) -> Result<Goal, ApiError>;

    async fn delete_goal(&self, id: &EntityId) -> Result<(), ApiError>;

    async fn add_savings(
        &self,
        id: &EntityId,
        request: &AddSavingsRequest,
    ) -> Result<SavingsReceipt, ApiError>;

    async fn transaction_summary(&self) -> Result<TransactionSummary, ApiError>;

    async fn list_budgets(&self) -> Result<Vec<Budget>, ApiError>;
}

#[async_trait]
impl FinanceApi for ApiClient {
    async fn get_goals(&self) -> Result<GoalsResponse, ApiError> {
        ApiClient::get_goals(self).await
    }

    async fn create_goal(&self, request: &CreateGoalRequest) -> Result<Goal, ApiError> {
        ApiClient::create_goal(self, request).await
    }

    async fn update_goal(
        &self,
        id: &EntityId,
        request: &UpdateGoalRequest,
    ) -> Result<Goal, ApiError> {
        ApiClient::update_goal(self, id, request).await
    }

    async fn delete_goal(&self, id: &EntityId) -> Result<(), ApiError> {
        ApiClient::delete_goal(self, id).await
    }

    async fn add_savings(
        &self,
        id: &EntityId,
        request: &AddSavingsRequest,
    ) -> Result<SavingsReceipt, ApiError> {
        ApiClient::add_savings(self, id, request).await
    }

    async fn transaction_summary(&self) -> Result<TransactionSummary, ApiError> {
        self.get_transaction_summary(None, None).await
    }

    async fn list_budgets(&self) -> Result<Vec<Budget>, ApiError> {
        self.get_budgets(&BudgetFilters::default()).await
    }
}
