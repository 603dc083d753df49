use common::{
    AddSavingsRequest, CreateGoalRequest, EntityId, Goal, GoalsResponse, SavingsReceipt,
    UpdateGoalRequest,
};
use serde_json::Value;
use tracing::{debug, error, info, trace};

use super::ApiClient;
use crate::error::ApiError;

impl ApiClient {
    /// All goals plus the balance still free to allocate.
    pub async fn get_goals(&self) -> Result<GoalsResponse, ApiError> {
        trace!("Fetching all goals");
        let result: Result<GoalsResponse, _> = self.get("/goals", Vec::new()).await;
        match &result {
            Ok(response) => info!(
                "Fetched {} goals, available balance {}",
                response.goals.len(),
                response.available_balance
            ),
            Err(e) => error!("Failed to fetch goals: {}", e),
        }
        result
    }

    pub async fn get_goal(&self, id: &EntityId) -> Result<Goal, ApiError> {
        trace!("Fetching goal with ID: {}", id);
        self.get(&format!("/goals/{}", id), Vec::new()).await
    }

    pub async fn create_goal(&self, request: &CreateGoalRequest) -> Result<Goal, ApiError> {
        debug!("Creating goal: {}", request.name);
        let result: Result<Goal, _> = self.post("/goals", request).await;
        match &result {
            Ok(goal) => info!("Successfully created goal: {} (ID: {})", goal.name, goal.id),
            Err(e) => error!("Failed to create goal '{}': {}", request.name, e),
        }
        result
    }

    pub async fn update_goal(
        &self,
        id: &EntityId,
        request: &UpdateGoalRequest,
    ) -> Result<Goal, ApiError> {
        debug!("Updating goal {}", id);
        self.patch(&format!("/goals/{}", id), request).await
    }

    pub async fn delete_goal(&self, id: &EntityId) -> Result<(), ApiError> {
        debug!("Deleting goal {}", id);
        let _: Value = self.delete(&format!("/goals/{}", id)).await?;
        info!("Deleted goal {}", id);
        Ok(())
    }

    pub async fn add_savings(
        &self,
        id: &EntityId,
        request: &AddSavingsRequest,
    ) -> Result<SavingsReceipt, ApiError> {
        debug!("Adding {} to goal {}", request.amount, id);
        let result: Result<SavingsReceipt, _> =
            self.post(&format!("/goals/{}/savings", id), request).await;
        match &result {
            Ok(receipt) => info!(
                "Goal {} now at {} of {}",
                id, receipt.goal.current_amount, receipt.goal.target_amount
            ),
            Err(e) => error!("Failed to add savings to goal {}: {}", id, e),
        }
        result
    }
}
