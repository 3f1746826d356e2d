use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::category_repo::Category;
use crate::tag_repo::Tag;

#[derive(Debug)]
pub struct PageOptions {
    pub offset: i64,
    pub limit: i64,
}

#[async_trait]
pub trait ExpenseRepo: Sync + Send {
    async fn create_expense(
        &self,
        user_id: i32,
        new_expense: NewExpense,
    ) -> Result<Expense, ExpenseRepoError>;

    async fn get_expense(&self, user_id: i32, expense_id: i32)
        -> Result<Expense, ExpenseRepoError>;

    /// Filtered page of the user's expenses, ordered by date descending,
    /// together with the total count over the same filter.
    async fn get_expenses(
        &self,
        user_id: i32,
        filter: Filter,
        page_options: PageOptions,
    ) -> Result<ExpensePage, ExpenseRepoError>;

    /// Applies only the supplied fields. A supplied tag set fully
    /// replaces the existing associations.
    async fn update_expense(
        &self,
        user_id: i32,
        expense_id: i32,
        update: ExpenseUpdate,
    ) -> Result<Expense, ExpenseRepoError>;

    async fn delete_expense(&self, user_id: i32, expense_id: i32)
        -> Result<(), ExpenseRepoError>;

    async fn get_summary(&self, user_id: i32) -> Result<Summary, ExpenseRepoError>;

    async fn get_total(&self, user_id: i32) -> Result<Decimal, ExpenseRepoError>;
}

#[derive(Error, Debug)]
pub enum ExpenseRepoError {
    #[error("Expense with id {0} not found")]
    ExpenseNotFound(i32),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: i32,
    pub amount: Decimal,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    pub user_id: i32,
    pub category: Option<Category>,
    pub tags: Vec<Tag>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct NewExpense {
    pub amount: Decimal,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    pub category_id: Option<i32>,
    pub tag_ids: Vec<i32>,
}

#[derive(Serialize, Deserialize, Clone, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseUpdate {
    pub amount: Option<Decimal>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub category_id: Option<i32>,
    pub tag_ids: Option<Vec<i32>>,
}

#[derive(Clone, Default, Debug)]
pub struct Filter {
    pub from: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub category_id: Option<i32>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
    pub description: Option<String>,
}

impl Filter {
    pub const NONE: Filter = Filter {
        from: None,
        until: None,
        category_id: None,
        min_amount: None,
        max_amount: None,
        description: None,
    };
}

pub struct ExpensePage {
    pub expenses: Vec<Expense>,
    pub total: i64,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_expenses: Decimal,
    pub category_count: i64,
    pub last_expense: Option<LastExpense>,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LastExpense {
    pub amount: Decimal,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
}
