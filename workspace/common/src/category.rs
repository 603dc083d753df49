use serde::{Deserialize, Serialize};

/// Selectable category: backend key, human label and an emoji icon.
/// Only the "others" group carries subcategories (user-named budgets).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub value: String,
    pub label: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcategories: Vec<Category>,
}

/// Payload of `GET /budgets/categories`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCatalog {
    #[serde(default)]
    pub predefined: Vec<Category>,
    #[serde(default)]
    pub custom: Vec<Category>,
    #[serde(default)]
    pub others: Option<Category>,
    #[serde(default)]
    pub all: Vec<Category>,
}

impl CategoryCatalog {
    /// Looks a key up among top-level entries and the "others" subcategories.
    pub fn find(&self, value: &str) -> Option<&Category> {
        self.all
            .iter()
            .chain(self.predefined.iter())
            .chain(self.custom.iter())
            .flat_map(|category| std::iter::once(category).chain(category.subcategories.iter()))
            .find(|category| category.value == value)
    }

    /// Human label for a key, falling back to the key itself.
    pub fn label_for<'a>(&'a self, value: &'a str) -> &'a str {
        self.find(value).map(|category| category.label.as_str()).unwrap_or(value)
    }
}
