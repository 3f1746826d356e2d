use anyhow::Context;
use async_trait::async_trait;
use sqlx::{query, query_as, query_scalar};
use tracing::instrument;

use super::SqlxRepo;
use crate::category_repo::CategoryRepoError::{
    CategoryInUse, CategoryNotFound, NameAlreadyExists,
};
use crate::category_repo::{
    Category, CategoryRepo, CategoryRepoError, CategoryUpdate, NewCategory,
};

const CATEGORY_COLUMNS: &str = "id, name, color, icon, is_default, user_id, created_at";

#[async_trait]
impl CategoryRepo for SqlxRepo {
    #[instrument(skip(self, new_category))]
    async fn create_category(
        &self,
        user_id: i32,
        new_category: NewCategory,
    ) -> Result<Category, CategoryRepoError> {
        // The unique index on (user_id, name) makes check-and-insert atomic.
        let category: Option<Category> = query_as(&format!(
            "INSERT INTO categories (name, color, icon, is_default, user_id) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT DO NOTHING RETURNING {}",
            CATEGORY_COLUMNS
        ))
        .bind(&new_category.name)
        .bind(&new_category.color)
        .bind(&new_category.icon)
        .bind(new_category.is_default)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Unable to create category for user {}", user_id))?;

        category.ok_or(NameAlreadyExists(new_category.name))
    }

    #[instrument(skip(self))]
    async fn get_categories(&self, user_id: i32) -> Result<Vec<Category>, CategoryRepoError> {
        let categories = query_as(&format!(
            "SELECT {} FROM categories WHERE user_id = $1 ORDER BY name ASC",
            CATEGORY_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Unable to get categories for user {}", user_id))?;
        Ok(categories)
    }

    #[instrument(skip(self))]
    async fn get_category(
        &self,
        user_id: i32,
        category_id: i32,
    ) -> Result<Category, CategoryRepoError> {
        let category: Option<Category> = query_as(&format!(
            "SELECT {} FROM categories WHERE id = $1 AND user_id = $2",
            CATEGORY_COLUMNS
        ))
        .bind(category_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Unable to get category {}", category_id))?;
        category.ok_or(CategoryNotFound(category_id))
    }

    #[instrument(skip(self, update))]
    async fn update_category(
        &self,
        user_id: i32,
        category_id: i32,
        update: CategoryUpdate,
    ) -> Result<Category, CategoryRepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Unable to begin transaction")?;

        let current: Option<Category> = query_as(&format!(
            "SELECT {} FROM categories WHERE id = $1 AND user_id = $2 FOR UPDATE",
            CATEGORY_COLUMNS
        ))
        .bind(category_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .with_context(|| format!("Unable to get category {}", category_id))?;
        let current = current.ok_or(CategoryNotFound(category_id))?;

        if let Some(name) = &update.name {
            if name != &current.name {
                let clash: Option<i32> = query_scalar(
                    "SELECT id FROM categories WHERE user_id = $1 AND name = $2 AND id <> $3",
                )
                .bind(user_id)
                .bind(name)
                .bind(category_id)
                .fetch_optional(&mut *tx)
                .await
                .context("Unable to check category name")?;
                if clash.is_some() {
                    return Err(NameAlreadyExists(name.clone()));
                }
            }
        }

        let category: Category = query_as(&format!(
            "UPDATE categories SET name = COALESCE($1, name), color = COALESCE($2, color), \
             icon = COALESCE($3, icon), is_default = COALESCE($4, is_default) \
             WHERE id = $5 RETURNING {}",
            CATEGORY_COLUMNS
        ))
        .bind(&update.name)
        .bind(&update.color)
        .bind(&update.icon)
        .bind(update.is_default)
        .bind(category_id)
        .fetch_one(&mut *tx)
        .await
        .with_context(|| format!("Unable to update category {}", category_id))?;

        tx.commit().await.context("Unable to commit transaction")?;
        Ok(category)
    }

    #[instrument(skip(self))]
    async fn delete_category(
        &self,
        user_id: i32,
        category_id: i32,
    ) -> Result<(), CategoryRepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Unable to begin transaction")?;

        let existing: Option<i32> =
            query_scalar("SELECT id FROM categories WHERE id = $1 AND user_id = $2 FOR UPDATE")
                .bind(category_id)
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await
                .with_context(|| format!("Unable to get category {}", category_id))?;
        if existing.is_none() {
            return Err(CategoryNotFound(category_id));
        }

        // Reference count is deliberately global, see trait docs.
        let expense_count: i64 =
            query_scalar("SELECT COUNT(*) FROM expenses WHERE category_id = $1")
                .bind(category_id)
                .fetch_one(&mut *tx)
                .await
                .with_context(|| format!("Unable to count expenses for category {}", category_id))?;
        if expense_count > 0 {
            return Err(CategoryInUse(expense_count));
        }

        query("DELETE FROM categories WHERE id = $1")
            .bind(category_id)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Unable to delete category {}", category_id))?;

        tx.commit().await.context("Unable to commit transaction")?;
        Ok(())
    }
}
