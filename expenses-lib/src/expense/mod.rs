mod handlers;

use actix_web::{web, Scope};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::HandlerError;
use crate::validation::ValidationIssues;
use expenses_repo::expense_repo::{Expense, ExpenseUpdate, Filter, NewExpense};

pub fn expense_service() -> Scope {
    // summary and total before the id routes so the literal segments match
    web::scope("/expenses")
        .service(handlers::get_summary)
        .service(handlers::get_total)
        .service(handlers::create_expense)
        .service(handlers::get_all_expenses)
        .service(handlers::get_expense)
        .service(handlers::update_expense)
        .service(handlers::delete_expense)
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpense {
    pub amount: Decimal,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub category_id: Option<i32>,
    pub tag_ids: Option<Vec<i32>>,
}

impl CreateExpense {
    fn validate(&self) -> Result<(), HandlerError> {
        let mut issues = ValidationIssues::new();
        if self.amount <= Decimal::ZERO {
            issues.add("amount", "must be greater than 0");
        }
        issues.into_result()
    }

    fn into_new_expense(self) -> NewExpense {
        NewExpense {
            amount: self.amount,
            description: self.description,
            date: self.date.unwrap_or_else(Utc::now),
            category_id: self.category_id,
            tag_ids: self.tag_ids.unwrap_or_default(),
        }
    }
}

fn validate_update(update: &ExpenseUpdate) -> Result<(), HandlerError> {
    let mut issues = ValidationIssues::new();
    if let Some(amount) = update.amount {
        if amount <= Decimal::ZERO {
            issues.add("amount", "must be greater than 0");
        }
    }
    issues.into_result()
}

#[derive(Serialize, Deserialize, Clone, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub category_id: Option<i32>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
    pub description: Option<String>,
}

impl ListQuery {
    fn validate(&self) -> Result<(), HandlerError> {
        let mut issues = ValidationIssues::new();
        if self.page.is_some_and(|page| page < 1) {
            issues.add("page", "must be greater than or equal to 1");
        }
        if self.per_page.is_some_and(|per_page| per_page < 1) {
            issues.add("perPage", "must be greater than or equal to 1");
        }
        issues.into_result()
    }

    fn page(&self) -> i64 {
        self.page.unwrap_or(1)
    }

    fn per_page(&self) -> i64 {
        self.per_page.unwrap_or(10)
    }

    fn into_filter(self) -> Filter {
        // the date range applies only when both bounds are given
        let (from, until) = match (self.start_date, self.end_date) {
            (Some(start_date), Some(end_date)) => (Some(start_date), Some(end_date)),
            _ => (None, None),
        };
        Filter {
            from,
            until,
            category_id: self.category_id,
            min_amount: self.min_amount,
            max_amount: self.max_amount,
            description: self.description,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub page_count: i64,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct ExpenseListResponse {
    pub data: Vec<Expense>,
    pub meta: PageMeta,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct TotalResponse {
    pub total: Decimal,
}
