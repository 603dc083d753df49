use common::{Budget, BudgetFilters, CategoryCatalog, CreateBudgetRequest, EntityId, UpdateBudgetRequest};
use serde_json::Value;
use tracing::{debug, error, info, trace};

use super::ApiClient;
use crate::error::ApiError;

impl ApiClient {
    /// Budgets with the amount spent in their current period.
    pub async fn get_budgets(&self, filters: &BudgetFilters) -> Result<Vec<Budget>, ApiError> {
        trace!("Fetching budgets with {:?}", filters);
        let result: Result<Vec<Budget>, _> = self.get("/budgets/", filters.to_query()).await;
        match &result {
            Ok(budgets) => info!("Fetched {} budgets", budgets.len()),
            Err(e) => error!("Failed to fetch budgets: {}", e),
        }
        result
    }

    pub async fn get_budget(&self, id: &EntityId) -> Result<Budget, ApiError> {
        trace!("Fetching budget with ID: {}", id);
        self.get(&format!("/budgets/{}", id), Vec::new()).await
    }

    pub async fn create_budget(&self, request: &CreateBudgetRequest) -> Result<Budget, ApiError> {
        debug!("Creating {} budget for {}", request.budget_type, request.category);
        let result: Result<Budget, _> = self.post("/budgets/", request).await;
        match &result {
            Ok(budget) => info!("Created budget {} for {}", budget.id, budget.display_category()),
            Err(e) => error!("Failed to create budget for '{}': {}", request.category, e),
        }
        result
    }

    pub async fn update_budget(
        &self,
        id: &EntityId,
        request: &UpdateBudgetRequest,
    ) -> Result<Budget, ApiError> {
        debug!("Updating budget {}", id);
        self.put(&format!("/budgets/{}", id), request).await
    }

    pub async fn delete_budget(&self, id: &EntityId) -> Result<(), ApiError> {
        debug!("Deleting budget {}", id);
        let _: Value = self.delete(&format!("/budgets/{}", id)).await?;
        info!("Deleted budget {}", id);
        Ok(())
    }

    pub async fn get_budget_categories(&self) -> Result<CategoryCatalog, ApiError> {
        trace!("Fetching budget categories");
        self.get("/budgets/categories", Vec::new()).await
    }
}
