use common::Category;
use tracing::{info, trace};

use super::ApiClient;
use crate::error::ApiError;

impl ApiClient {
    /// Flat list of every selectable category, "others" subcategories included.
    pub async fn get_categories(&self) -> Result<Vec<Category>, ApiError> {
        trace!("Fetching category list");
        let catalog = self.get_budget_categories().await?;
        let categories: Vec<Category> = catalog
            .all
            .into_iter()
            .flat_map(|category| {
                let mut flat = vec![category.clone()];
                flat.extend(category.subcategories);
                flat
            })
            .collect();
        info!("Fetched {} categories", categories.len());
        Ok(categories)
    }
}
