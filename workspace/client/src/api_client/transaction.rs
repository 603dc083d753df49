use common::{
    CreateTransactionRequest, EntityId, Transaction, TransactionCreated, TransactionFilters,
    TransactionSummary, UpdateTransactionRequest,
};
use serde_json::Value;
use tracing::{debug, error, info, trace};

use super::ApiClient;
use crate::error::ApiError;

/// Largest page the backend serves from `GET /transactions`.
pub const TRANSACTION_PAGE_SIZE: u32 = 200;

impl ApiClient {
    /// List transactions matching `filters`, newest first.
    pub async fn get_transactions(
        &self,
        filters: &TransactionFilters,
    ) -> Result<Vec<Transaction>, ApiError> {
        trace!("Fetching transactions with {:?}", filters);
        let result: Result<Vec<Transaction>, _> =
            self.get("/transactions", filters.to_query()).await;
        match &result {
            Ok(transactions) => info!("Fetched {} transactions", transactions.len()),
            Err(e) => error!("Failed to fetch transactions: {}", e),
        }
        result
    }

    /// Every transaction matching `filters`, fetched page by page until the
    /// backend returns a short page. `limit` and `offset` in `filters` are ignored.
    pub async fn get_all_transactions(
        &self,
        filters: &TransactionFilters,
    ) -> Result<Vec<Transaction>, ApiError> {
        let mut all = Vec::new();
        let mut offset = 0u32;
        loop {
            let page_filters = TransactionFilters {
                limit: Some(TRANSACTION_PAGE_SIZE),
                offset: Some(offset),
                ..filters.clone()
            };
            trace!("Fetching transaction page at offset {}", offset);
            let page: Vec<Transaction> = self.get("/transactions", page_filters.to_query()).await?;
            let fetched = page.len();
            all.extend(page);

            if fetched < TRANSACTION_PAGE_SIZE as usize {
                break;
            }
            offset = match offset.checked_add(TRANSACTION_PAGE_SIZE) {
                Some(next) => next,
                None => break,
            };
        }
        info!("Fetched all {} transactions", all.len());
        Ok(all)
    }

    pub async fn get_transaction(&self, id: &EntityId) -> Result<Transaction, ApiError> {
        trace!("Fetching transaction with ID: {}", id);
        self.get(&format!("/transactions/{}", id), Vec::new()).await
    }

    /// Record a transaction. Expenses may come back with a budget warning.
    pub async fn create_transaction(
        &self,
        request: &CreateTransactionRequest,
    ) -> Result<TransactionCreated, ApiError> {
        debug!("Creating {} of {}", request.txn_type, request.amount);
        let result: Result<TransactionCreated, _> = self.post("/transactions", request).await;
        match &result {
            Ok(created) => info!(
                "Created transaction {} (budget warning: {})",
                created.transaction.id,
                created.budget_warning.is_some()
            ),
            Err(e) => error!("Failed to create transaction: {}", e),
        }
        result
    }

    pub async fn update_transaction(
        &self,
        id: &EntityId,
        request: &UpdateTransactionRequest,
    ) -> Result<Transaction, ApiError> {
        debug!("Updating transaction {}", id);
        self.put(&format!("/transactions/{}", id), request).await
    }

    pub async fn delete_transaction(&self, id: &EntityId) -> Result<(), ApiError> {
        debug!("Deleting transaction {}", id);
        let _: Value = self.delete(&format!("/transactions/{}", id)).await?;
        info!("Deleted transaction {}", id);
        Ok(())
    }

    /// Monthly totals. Without `month`/`year` the backend uses the current month.
    pub async fn get_transaction_summary(
        &self,
        month: Option<u32>,
        year: Option<i32>,
    ) -> Result<TransactionSummary, ApiError> {
        let mut query = Vec::new();
        if let Some(month) = month {
            query.push(("month".to_string(), month.to_string()));
        }
        if let Some(year) = year {
            query.push(("year".to_string(), year.to_string()));
        }
        trace!("Fetching transaction summary {:?}", query);
        self.get("/transactions/summary", query).await
    }
}
