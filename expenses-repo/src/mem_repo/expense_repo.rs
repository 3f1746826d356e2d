use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;

use super::{ExpenseEntry, MemRepo, Store};
use crate::expense_repo::ExpenseRepoError::ExpenseNotFound;
use crate::expense_repo::{
    Expense, ExpensePage, ExpenseRepo, ExpenseRepoError, ExpenseUpdate, Filter, LastExpense,
    NewExpense, PageOptions, Summary,
};

impl Store {
    fn materialize(&self, entry: &ExpenseEntry) -> Expense {
        let category = entry
            .category_id
            .and_then(|id| self.categories.get(&id).cloned());
        let mut tags: Vec<_> = entry
            .tag_ids
            .iter()
            .filter_map(|id| self.tags.get(id).cloned())
            .collect();
        tags.sort_by_key(|t| t.id);

        Expense {
            id: entry.id,
            amount: entry.amount,
            description: entry.description.clone(),
            date: entry.date,
            user_id: entry.user_id,
            category,
            tags,
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        }
    }

    /// Referenced rows must exist, as the foreign keys would enforce.
    /// Ownership of the referenced rows is not checked.
    fn check_references(
        &self,
        category_id: Option<i32>,
        tag_ids: &[i32],
    ) -> Result<(), ExpenseRepoError> {
        if let Some(category_id) = category_id {
            if !self.categories.contains_key(&category_id) {
                return Err(anyhow::anyhow!("Category {} does not exist", category_id).into());
            }
        }
        for tag_id in tag_ids {
            if !self.tags.contains_key(tag_id) {
                return Err(anyhow::anyhow!("Tag {} does not exist", tag_id).into());
            }
        }
        Ok(())
    }
}

impl Filter {
    fn matches(&self, entry: &ExpenseEntry) -> bool {
        if let Some(from) = self.from {
            if entry.date < from {
                return false;
            }
        }
        if let Some(until) = self.until {
            if entry.date > until {
                return false;
            }
        }
        if let Some(category_id) = self.category_id {
            if entry.category_id != Some(category_id) {
                return false;
            }
        }
        if let Some(min_amount) = self.min_amount {
            if entry.amount < min_amount {
                return false;
            }
        }
        if let Some(max_amount) = self.max_amount {
            if entry.amount > max_amount {
                return false;
            }
        }
        if let Some(description) = &self.description {
            let needle = description.to_lowercase();
            let matched = entry
                .description
                .as_ref()
                .is_some_and(|d| d.to_lowercase().contains(&needle));
            if !matched {
                return false;
            }
        }
        true
    }
}

#[async_trait]
impl ExpenseRepo for MemRepo {
    async fn create_expense(
        &self,
        user_id: i32,
        new_expense: NewExpense,
    ) -> Result<Expense, ExpenseRepoError> {
        let mut write_guard = self.write_lock()?;

        write_guard.check_references(new_expense.category_id, &new_expense.tag_ids)?;

        let id = write_guard.next_expense_id;
        write_guard.next_expense_id += 1;

        let now = Utc::now();
        let entry = ExpenseEntry {
            id,
            amount: new_expense.amount,
            description: new_expense.description,
            date: new_expense.date,
            user_id,
            category_id: new_expense.category_id,
            tag_ids: new_expense.tag_ids,
            created_at: now,
            updated_at: now,
        };
        let expense = write_guard.materialize(&entry);
        write_guard.expenses.insert(id, entry);

        Ok(expense)
    }

    async fn get_expense(
        &self,
        user_id: i32,
        expense_id: i32,
    ) -> Result<Expense, ExpenseRepoError> {
        let read_guard = self.read_lock()?;

        read_guard
            .expenses
            .get(&expense_id)
            .filter(|e| e.user_id == user_id)
            .map(|e| read_guard.materialize(e))
            .ok_or(ExpenseNotFound(expense_id))
    }

    async fn get_expenses(
        &self,
        user_id: i32,
        filter: Filter,
        page_options: PageOptions,
    ) -> Result<ExpensePage, ExpenseRepoError> {
        let read_guard = self.read_lock()?;

        let mut entries: Vec<&ExpenseEntry> = read_guard
            .expenses
            .values()
            .filter(|e| e.user_id == user_id && filter.matches(e))
            .collect();
        entries.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));

        let total = entries.len() as i64;
        let expenses = entries
            .into_iter()
            .skip(page_options.offset as usize)
            .take(page_options.limit as usize)
            .map(|e| read_guard.materialize(e))
            .collect();

        Ok(ExpensePage { expenses, total })
    }

    async fn update_expense(
        &self,
        user_id: i32,
        expense_id: i32,
        update: ExpenseUpdate,
    ) -> Result<Expense, ExpenseRepoError> {
        let mut write_guard = self.write_lock()?;

        let owned = write_guard
            .expenses
            .get(&expense_id)
            .is_some_and(|e| e.user_id == user_id);
        if !owned {
            return Err(ExpenseNotFound(expense_id));
        }

        write_guard.check_references(
            update.category_id,
            update.tag_ids.as_deref().unwrap_or_default(),
        )?;

        let now = Utc::now();
        let entry = write_guard
            .expenses
            .get_mut(&expense_id)
            .expect("expense was just looked up");
        if let Some(amount) = update.amount {
            entry.amount = amount;
        }
        if let Some(description) = update.description {
            entry.description = Some(description);
        }
        if let Some(date) = update.date {
            entry.date = date;
        }
        if let Some(category_id) = update.category_id {
            entry.category_id = Some(category_id);
        }
        if let Some(tag_ids) = update.tag_ids {
            // full replacement of the association set
            entry.tag_ids = tag_ids;
        }
        entry.updated_at = now;

        let entry = write_guard
            .expenses
            .get(&expense_id)
            .expect("expense was just updated");
        Ok(write_guard.materialize(entry))
    }

    async fn delete_expense(&self, user_id: i32, expense_id: i32) -> Result<(), ExpenseRepoError> {
        let mut write_guard = self.write_lock()?;

        let owned = write_guard
            .expenses
            .get(&expense_id)
            .is_some_and(|e| e.user_id == user_id);
        if !owned {
            return Err(ExpenseNotFound(expense_id));
        }

        write_guard.expenses.remove(&expense_id);
        Ok(())
    }

    async fn get_summary(&self, user_id: i32) -> Result<Summary, ExpenseRepoError> {
        let read_guard = self.read_lock()?;

        let total_expenses = read_guard
            .expenses
            .values()
            .filter(|e| e.user_id == user_id)
            .map(|e| e.amount)
            .sum::<Decimal>();
        let category_count = read_guard
            .categories
            .values()
            .filter(|c| c.user_id == user_id)
            .count() as i64;
        let last_expense = read_guard
            .expenses
            .values()
            .filter(|e| e.user_id == user_id)
            .max_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)))
            .map(|e| LastExpense {
                amount: e.amount,
                description: e.description.clone(),
                date: e.date,
            });

        Ok(Summary {
            total_expenses,
            category_count,
            last_expense,
        })
    }

    async fn get_total(&self, user_id: i32) -> Result<Decimal, ExpenseRepoError> {
        let summary = self.get_summary(user_id).await?;
        Ok(summary.total_expenses)
    }
}
