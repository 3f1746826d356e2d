mod category_repo;
mod expense_repo;
mod tag_repo;
mod user_repo;

use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};

use crate::category_repo::CategoryRepo;
use crate::expense_repo::ExpenseRepo;
use crate::tag_repo::TagRepo;
use crate::user_repo::UserRepo;

/// PostgreSQL implementation of all repo traits over one connection pool.
pub struct SqlxRepo {
    pool: Pool<Postgres>,
}

impl SqlxRepo {
    pub fn new(pool: Pool<Postgres>) -> SqlxRepo {
        SqlxRepo { pool }
    }
}

pub async fn create_repos(
    database_url: &str,
    max_pool_size: u32,
) -> Result<
    (
        Arc<dyn UserRepo>,
        Arc<dyn CategoryRepo>,
        Arc<dyn ExpenseRepo>,
        Arc<dyn TagRepo>,
    ),
    anyhow::Error,
> {
    let pool = PgPoolOptions::new()
        .max_connections(max_pool_size)
        .connect(database_url)
        .await
        .context("Unable to connect to database")?;

    sqlx::migrate!()
        .run(&pool)
        .await
        .context("Unable to run migrations")?;

    let repo = Arc::new(SqlxRepo::new(pool));
    Ok((repo.clone(), repo.clone(), repo.clone(), repo))
}
