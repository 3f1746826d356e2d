use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::category_repo::{Category, CategoryRepo};
use crate::expense_repo::ExpenseRepo;
use crate::tag_repo::{Tag, TagRepo};
use crate::user_repo::{User, UserRepo};

mod category_repo;
mod expense_repo;
mod tag_repo;
mod user_repo;

/// Expense row as stored; category and tags are joined in on read.
struct ExpenseEntry {
    id: i32,
    amount: Decimal,
    description: Option<String>,
    date: DateTime<Utc>,
    user_id: i32,
    category_id: Option<i32>,
    tag_ids: Vec<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

struct Store {
    users: HashMap<i32, User>,
    categories: HashMap<i32, Category>,
    expenses: HashMap<i32, ExpenseEntry>,
    tags: HashMap<i32, Tag>,
    next_user_id: i32,
    next_category_id: i32,
    next_expense_id: i32,
    next_tag_id: i32,
}

/// In-memory implementation of all repo traits over a single store. One
/// store because the category deletion guard and expense composition
/// read across resources.
pub struct MemRepo {
    state: RwLock<Store>,
}

impl MemRepo {
    pub fn new() -> MemRepo {
        let state = Store {
            users: HashMap::new(),
            categories: HashMap::new(),
            expenses: HashMap::new(),
            tags: HashMap::new(),
            next_user_id: 1,
            next_category_id: 1,
            next_expense_id: 1,
            next_tag_id: 1,
        };
        MemRepo {
            state: RwLock::new(state),
        }
    }

    fn read_lock(&self) -> Result<RwLockReadGuard<Store>, anyhow::Error> {
        self.state
            .read()
            .map_err(|_| anyhow!("Unable to acquire lock"))
    }

    fn write_lock(&self) -> Result<RwLockWriteGuard<Store>, anyhow::Error> {
        self.state
            .write()
            .map_err(|_| anyhow!("Unable to acquire lock"))
    }
}

impl Default for MemRepo {
    fn default() -> Self {
        MemRepo::new()
    }
}

pub fn create_repos() -> (
    Arc<dyn UserRepo>,
    Arc<dyn CategoryRepo>,
    Arc<dyn ExpenseRepo>,
    Arc<dyn TagRepo>,
) {
    let repo = Arc::new(MemRepo::new());
    (repo.clone(), repo.clone(), repo.clone(), repo)
}
