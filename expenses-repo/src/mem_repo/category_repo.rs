use async_trait::async_trait;
use chrono::Utc;

use super::MemRepo;
use crate::category_repo::CategoryRepoError::{
    CategoryInUse, CategoryNotFound, NameAlreadyExists,
};
use crate::category_repo::{
    Category, CategoryRepo, CategoryRepoError, CategoryUpdate, NewCategory,
};

#[async_trait]
impl CategoryRepo for MemRepo {
    async fn create_category(
        &self,
        user_id: i32,
        new_category: NewCategory,
    ) -> Result<Category, CategoryRepoError> {
        let mut write_guard = self.write_lock()?;

        let name_taken = write_guard
            .categories
            .values()
            .any(|c| c.user_id == user_id && c.name == new_category.name);
        if name_taken {
            return Err(NameAlreadyExists(new_category.name));
        }

        let id = write_guard.next_category_id;
        write_guard.next_category_id += 1;

        let category = Category {
            id,
            name: new_category.name,
            color: new_category.color,
            icon: new_category.icon,
            is_default: new_category.is_default,
            user_id,
            created_at: Utc::now(),
        };
        write_guard.categories.insert(id, category.clone());

        Ok(category)
    }

    async fn get_categories(&self, user_id: i32) -> Result<Vec<Category>, CategoryRepoError> {
        let read_guard = self.read_lock()?;

        let mut categories: Vec<Category> = read_guard
            .categories
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(categories)
    }

    async fn get_category(
        &self,
        user_id: i32,
        category_id: i32,
    ) -> Result<Category, CategoryRepoError> {
        let read_guard = self.read_lock()?;

        read_guard
            .categories
            .get(&category_id)
            .filter(|c| c.user_id == user_id)
            .cloned()
            .ok_or(CategoryNotFound(category_id))
    }

    async fn update_category(
        &self,
        user_id: i32,
        category_id: i32,
        update: CategoryUpdate,
    ) -> Result<Category, CategoryRepoError> {
        let mut write_guard = self.write_lock()?;

        let current = write_guard
            .categories
            .get(&category_id)
            .filter(|c| c.user_id == user_id)
            .ok_or(CategoryNotFound(category_id))?;

        if let Some(name) = &update.name {
            if name != &current.name {
                let name_taken = write_guard
                    .categories
                    .values()
                    .any(|c| c.user_id == user_id && c.id != category_id && &c.name == name);
                if name_taken {
                    return Err(NameAlreadyExists(name.clone()));
                }
            }
        }

        let category = write_guard
            .categories
            .get_mut(&category_id)
            .expect("category was just looked up");
        if let Some(name) = update.name {
            category.name = name;
        }
        if let Some(color) = update.color {
            category.color = Some(color);
        }
        if let Some(icon) = update.icon {
            category.icon = Some(icon);
        }
        if let Some(is_default) = update.is_default {
            category.is_default = is_default;
        }

        Ok(category.clone())
    }

    async fn delete_category(
        &self,
        user_id: i32,
        category_id: i32,
    ) -> Result<(), CategoryRepoError> {
        let mut write_guard = self.write_lock()?;

        let owned = write_guard
            .categories
            .get(&category_id)
            .is_some_and(|c| c.user_id == user_id);
        if !owned {
            return Err(CategoryNotFound(category_id));
        }

        // Reference count is deliberately global, see trait docs.
        let expense_count = write_guard
            .expenses
            .values()
            .filter(|e| e.category_id == Some(category_id))
            .count() as i64;
        if expense_count > 0 {
            return Err(CategoryInUse(expense_count));
        }

        write_guard.categories.remove(&category_id);
        Ok(())
    }
}
