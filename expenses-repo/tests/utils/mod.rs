use std::sync::Arc;

use expenses_repo::category_repo::CategoryRepo;
use expenses_repo::expense_repo::ExpenseRepo;
use expenses_repo::tag_repo::TagRepo;
use expenses_repo::user_repo::{NewUser, UserRepo};
use tracing::info;
use uuid::Uuid;

pub mod generator;

pub fn build_repos() -> (
    Arc<dyn UserRepo>,
    Arc<dyn CategoryRepo>,
    Arc<dyn ExpenseRepo>,
    Arc<dyn TagRepo>,
) {
    expenses_repo::mem_repo::create_repos()
}

pub struct TestUser {
    pub id: i32,
}

impl TestUser {
    pub async fn new(user_repo: &Arc<dyn UserRepo>) -> TestUser {
        let email = format!("test-user-{}@example.com", Uuid::new_v4());
        let user = user_repo
            .create_user(NewUser {
                name: "Test User".to_string(),
                email,
                password_hash: "not a real hash".to_string(),
            })
            .await
            .unwrap();
        info!(user_id = user.id, "Created user");
        TestUser { id: user.id }
    }
}
