use std::collections::HashMap;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{query, query_as, query_scalar, Postgres, QueryBuilder};
use tracing::instrument;

use super::SqlxRepo;
use crate::category_repo::Category;
use crate::expense_repo::ExpenseRepoError::ExpenseNotFound;
use crate::expense_repo::{
    Expense, ExpensePage, ExpenseRepo, ExpenseRepoError, ExpenseUpdate, Filter, LastExpense,
    NewExpense, PageOptions, Summary,
};
use crate::tag_repo::Tag;

const EXPENSE_COLUMNS: &str =
    "id, amount, description, date, user_id, category_id, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct ExpenseRow {
    id: i32,
    amount: Decimal,
    description: Option<String>,
    date: DateTime<Utc>,
    user_id: i32,
    category_id: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct ExpenseTagRow {
    expense_id: i32,
    id: i32,
    name: String,
    created_at: DateTime<Utc>,
}

fn push_filter(query_builder: &mut QueryBuilder<Postgres>, user_id: i32, filter: &Filter) {
    query_builder.push(" WHERE user_id = ").push_bind(user_id);
    if let Some(from) = filter.from {
        query_builder.push(" AND date >= ").push_bind(from);
    }
    if let Some(until) = filter.until {
        query_builder.push(" AND date <= ").push_bind(until);
    }
    if let Some(category_id) = filter.category_id {
        query_builder
            .push(" AND category_id = ")
            .push_bind(category_id);
    }
    if let Some(min_amount) = filter.min_amount {
        query_builder.push(" AND amount >= ").push_bind(min_amount);
    }
    if let Some(max_amount) = filter.max_amount {
        query_builder.push(" AND amount <= ").push_bind(max_amount);
    }
    if let Some(description) = &filter.description {
        let escaped = description
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        query_builder
            .push(" AND description ILIKE ")
            .push_bind(format!("%{}%", escaped));
    }
}

impl SqlxRepo {
    /// Joins categories and tags onto raw expense rows. The category is
    /// looked up by id alone; rows created through the unscoped connect
    /// gap resolve like any other.
    async fn load_relations(
        &self,
        rows: Vec<ExpenseRow>,
    ) -> Result<Vec<Expense>, ExpenseRepoError> {
        let expense_ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
        let category_ids: Vec<i32> = rows.iter().filter_map(|r| r.category_id).collect();

        let categories: Vec<Category> = if category_ids.is_empty() {
            Vec::new()
        } else {
            query_as(
                "SELECT id, name, color, icon, is_default, user_id, created_at \
                 FROM categories WHERE id = ANY($1)",
            )
            .bind(&category_ids)
            .fetch_all(&self.pool)
            .await
            .context("Unable to load expense categories")?
        };
        let categories: HashMap<i32, Category> =
            categories.into_iter().map(|c| (c.id, c)).collect();

        let tag_rows: Vec<ExpenseTagRow> = if expense_ids.is_empty() {
            Vec::new()
        } else {
            query_as(
                "SELECT et.expense_id, t.id, t.name, t.created_at \
                 FROM expense_tags et JOIN tags t ON t.id = et.tag_id \
                 WHERE et.expense_id = ANY($1) ORDER BY t.id",
            )
            .bind(&expense_ids)
            .fetch_all(&self.pool)
            .await
            .context("Unable to load expense tags")?
        };
        let mut tags_by_expense: HashMap<i32, Vec<Tag>> = HashMap::new();
        for row in tag_rows {
            tags_by_expense.entry(row.expense_id).or_default().push(Tag {
                id: row.id,
                name: row.name,
                created_at: row.created_at,
            });
        }

        let expenses = rows
            .into_iter()
            .map(|row| Expense {
                id: row.id,
                amount: row.amount,
                description: row.description,
                date: row.date,
                user_id: row.user_id,
                category: row.category_id.and_then(|id| categories.get(&id).cloned()),
                tags: tags_by_expense.remove(&row.id).unwrap_or_default(),
                created_at: row.created_at,
                updated_at: row.updated_at,
            })
            .collect();
        Ok(expenses)
    }

    async fn sum_expenses(&self, user_id: i32) -> Result<Decimal, ExpenseRepoError> {
        let total: Option<Decimal> =
            query_scalar("SELECT SUM(amount) FROM expenses WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await
                .with_context(|| format!("Unable to total expenses for user {}", user_id))?;
        Ok(total.unwrap_or(Decimal::ZERO))
    }
}

#[async_trait]
impl ExpenseRepo for SqlxRepo {
    #[instrument(skip(self, new_expense))]
    async fn create_expense(
        &self,
        user_id: i32,
        new_expense: NewExpense,
    ) -> Result<Expense, ExpenseRepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Unable to begin transaction")?;

        let expense_id: i32 = query_scalar(
            "INSERT INTO expenses (amount, description, date, user_id, category_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(new_expense.amount)
        .bind(&new_expense.description)
        .bind(new_expense.date)
        .bind(user_id)
        .bind(new_expense.category_id)
        .fetch_one(&mut *tx)
        .await
        .context("Unable to insert expense")?;

        if !new_expense.tag_ids.is_empty() {
            query(
                "INSERT INTO expense_tags (expense_id, tag_id) \
                 SELECT $1, tag_id FROM UNNEST($2::int4[]) AS t (tag_id)",
            )
            .bind(expense_id)
            .bind(&new_expense.tag_ids)
            .execute(&mut *tx)
            .await
            .context("Unable to insert tag associations")?;
        }

        tx.commit().await.context("Unable to commit transaction")?;

        self.get_expense(user_id, expense_id).await
    }

    #[instrument(skip(self))]
    async fn get_expense(
        &self,
        user_id: i32,
        expense_id: i32,
    ) -> Result<Expense, ExpenseRepoError> {
        let row: Option<ExpenseRow> = query_as(&format!(
            "SELECT {} FROM expenses WHERE id = $1 AND user_id = $2",
            EXPENSE_COLUMNS
        ))
        .bind(expense_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Unable to get expense {}", expense_id))?;
        let row = row.ok_or(ExpenseNotFound(expense_id))?;

        let mut expenses = self.load_relations(vec![row]).await?;
        Ok(expenses.remove(0))
    }

    #[instrument(skip(self))]
    async fn get_expenses(
        &self,
        user_id: i32,
        filter: Filter,
        page_options: PageOptions,
    ) -> Result<ExpensePage, ExpenseRepoError> {
        let mut list_query = QueryBuilder::new(format!(
            "SELECT {} FROM expenses",
            EXPENSE_COLUMNS
        ));
        push_filter(&mut list_query, user_id, &filter);
        list_query.push(" ORDER BY date DESC, id DESC");
        list_query
            .push(" OFFSET ")
            .push_bind(page_options.offset)
            .push(" LIMIT ")
            .push_bind(page_options.limit);

        let mut count_query = QueryBuilder::new("SELECT COUNT(*) FROM expenses");
        push_filter(&mut count_query, user_id, &filter);

        // The page and its total are independent reads, issued concurrently.
        let pool = &self.pool;
        let (rows, total) = futures::try_join!(
            async move {
                list_query
                    .build_query_as::<ExpenseRow>()
                    .fetch_all(pool)
                    .await
            },
            async move { count_query.build_query_scalar::<i64>().fetch_one(pool).await },
        )
        .with_context(|| format!("Unable to get expenses for user {}", user_id))?;

        let expenses = self.load_relations(rows).await?;
        Ok(ExpensePage { expenses, total })
    }

    #[instrument(skip(self, update))]
    async fn update_expense(
        &self,
        user_id: i32,
        expense_id: i32,
        update: ExpenseUpdate,
    ) -> Result<Expense, ExpenseRepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Unable to begin transaction")?;

        let existing: Option<i32> =
            query_scalar("SELECT id FROM expenses WHERE id = $1 AND user_id = $2 FOR UPDATE")
                .bind(expense_id)
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await
                .with_context(|| format!("Unable to get expense {}", expense_id))?;
        if existing.is_none() {
            return Err(ExpenseNotFound(expense_id));
        }

        if let Some(tag_ids) = &update.tag_ids {
            // full replacement of the association set
            query("DELETE FROM expense_tags WHERE expense_id = $1")
                .bind(expense_id)
                .execute(&mut *tx)
                .await
                .context("Unable to clear tag associations")?;
            if !tag_ids.is_empty() {
                query(
                    "INSERT INTO expense_tags (expense_id, tag_id) \
                     SELECT $1, tag_id FROM UNNEST($2::int4[]) AS t (tag_id)",
                )
                .bind(expense_id)
                .bind(tag_ids)
                .execute(&mut *tx)
                .await
                .context("Unable to insert tag associations")?;
            }
        }

        query(
            "UPDATE expenses SET amount = COALESCE($1, amount), \
             description = COALESCE($2, description), date = COALESCE($3, date), \
             category_id = COALESCE($4, category_id), updated_at = now() WHERE id = $5",
        )
        .bind(update.amount)
        .bind(&update.description)
        .bind(update.date)
        .bind(update.category_id)
        .bind(expense_id)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("Unable to update expense {}", expense_id))?;

        tx.commit().await.context("Unable to commit transaction")?;

        self.get_expense(user_id, expense_id).await
    }

    #[instrument(skip(self))]
    async fn delete_expense(&self, user_id: i32, expense_id: i32) -> Result<(), ExpenseRepoError> {
        let result = query("DELETE FROM expenses WHERE id = $1 AND user_id = $2")
            .bind(expense_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Unable to delete expense {}", expense_id))?;
        if result.rows_affected() == 0 {
            Err(ExpenseNotFound(expense_id))
        } else {
            Ok(())
        }
    }

    #[instrument(skip(self))]
    async fn get_summary(&self, user_id: i32) -> Result<Summary, ExpenseRepoError> {
        let total_expenses = self.sum_expenses(user_id).await?;

        let category_count: i64 =
            query_scalar("SELECT COUNT(*) FROM categories WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await
                .with_context(|| format!("Unable to count categories for user {}", user_id))?;

        let last_expense: Option<LastExpense> = query_as(
            "SELECT amount, description, date FROM expenses WHERE user_id = $1 \
             ORDER BY date DESC, id DESC LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Unable to get last expense for user {}", user_id))?;

        Ok(Summary {
            total_expenses,
            category_count,
            last_expense,
        })
    }

    #[instrument(skip(self))]
    async fn get_total(&self, user_id: i32) -> Result<Decimal, ExpenseRepoError> {
        self.sum_expenses(user_id).await
    }
}
