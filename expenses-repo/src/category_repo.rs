use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[async_trait]
pub trait CategoryRepo: Sync + Send {
    async fn create_category(
        &self,
        user_id: i32,
        new_category: NewCategory,
    ) -> Result<Category, CategoryRepoError>;

    /// All of the user's categories, ordered by name ascending.
    async fn get_categories(&self, user_id: i32) -> Result<Vec<Category>, CategoryRepoError>;

    async fn get_category(
        &self,
        user_id: i32,
        category_id: i32,
    ) -> Result<Category, CategoryRepoError>;

    /// Applies only the supplied fields. A name change re-checks the
    /// per-user uniqueness constraint, excluding the record itself.
    async fn update_category(
        &self,
        user_id: i32,
        category_id: i32,
        update: CategoryUpdate,
    ) -> Result<Category, CategoryRepoError>;

    /// Refuses to delete a category that is still referenced by expenses.
    /// The reference count is global, not scoped to the owner, matching
    /// the behavior this service replaces.
    async fn delete_category(&self, user_id: i32, category_id: i32)
        -> Result<(), CategoryRepoError>;
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub is_default: bool,
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub name: String,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub is_default: bool,
}

#[derive(Serialize, Deserialize, Clone, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub is_default: Option<bool>,
}

#[derive(Error, Debug)]
pub enum CategoryRepoError {
    #[error("Category with id {0} not found")]
    CategoryNotFound(i32),
    #[error("Category named {0} already exists")]
    NameAlreadyExists(String),
    #[error("Category is referenced by {0} expenses")]
    CategoryInUse(i64),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
