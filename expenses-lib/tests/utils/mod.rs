use std::sync::Arc;

use rstest::*;
use tracing::info;
use tracing::Level;
use uuid::Uuid;

use expenses_repo::category_repo::CategoryRepo;
use expenses_repo::expense_repo::ExpenseRepo;
use expenses_repo::tag_repo::TagRepo;
use expenses_repo::user_repo::{NewUser, UserRepo};

pub mod mock;

pub type Repos = (
    Arc<dyn UserRepo>,
    Arc<dyn CategoryRepo>,
    Arc<dyn ExpenseRepo>,
    Arc<dyn TagRepo>,
);

macro_rules! build_app {
    ($repos:ident, $user_id:expr) => {{
        let (user_repo, category_repo, expense_repo, tag_repo) = $repos;
        let app = App::new()
            .app_data(Data::new(user_repo))
            .app_data(Data::new(category_repo))
            .app_data(Data::new(expense_repo))
            .app_data(Data::new(tag_repo))
            .wrap(expenses_lib::tracing::create_middleware())
            .service(
                actix_web::web::scope("/api")
                    .service(
                        expenses_lib::user::user_service()
                            .wrap(MockAuthentication { user_id: $user_id }),
                    )
                    .service(
                        expenses_lib::category::category_service()
                            .wrap(MockAuthentication { user_id: $user_id }),
                    )
                    .service(
                        expenses_lib::expense::expense_service()
                            .wrap(MockAuthentication { user_id: $user_id }),
                    )
                    .service(
                        expenses_lib::tag::tag_service()
                            .wrap(MockAuthentication { user_id: $user_id }),
                    ),
            );
        tracing::info!("Built app");
        app
    }};
}

macro_rules! create_category {
    (&$service:ident, $payload:expr) => {{
        let request = TestRequest::post()
            .uri("/api/categories")
            .set_json(&$payload)
            .to_request();
        let response = test::call_service(&$service, request).await;
        assert!(
            response.status().is_success(),
            "Got {} response when creating category",
            response.status()
        );
        test::read_body_json(response).await
    }};
}

macro_rules! create_expense {
    (&$service:ident, $payload:expr) => {{
        let request = TestRequest::post()
            .uri("/api/expenses")
            .set_json(&$payload)
            .to_request();
        let response = test::call_service(&$service, request).await;
        assert!(
            response.status().is_success(),
            "Got {} response when creating expense",
            response.status()
        );
        test::read_body_json(response).await
    }};
}

macro_rules! create_tag {
    (&$service:ident, $name:expr) => {{
        let request = TestRequest::post()
            .uri("/api/tags")
            .set_json(serde_json::json!({ "name": $name }))
            .to_request();
        let response = test::call_service(&$service, request).await;
        assert!(
            response.status().is_success(),
            "Got {} response when creating tag",
            response.status()
        );
        test::read_body_json(response).await
    }};
}

pub struct TestUser {
    pub id: i32,
    pub email: String,
}

impl TestUser {
    pub const PASSWORD: &'static str = "secret1";

    pub async fn new(user_repo: &Arc<dyn UserRepo>) -> TestUser {
        let email = format!("test-user-{}@example.com", Uuid::new_v4());
        let user = user_repo
            .create_user(NewUser {
                name: "Test User".to_string(),
                email: email.clone(),
                password_hash: expenses_lib::auth::password::encode_password(
                    Self::PASSWORD.to_string(),
                )
                .unwrap(),
            })
            .await
            .unwrap();
        info!(user_id = user.id, "Created user");
        TestUser { id: user.id, email }
    }
}

#[fixture]
#[once]
pub fn tracing_setup() -> () {
    tracing_subscriber::fmt()
        .pretty()
        .with_max_level(Level::DEBUG)
        .init();
    info!("tracing initialized");
}

#[fixture]
pub fn repos(_tracing_setup: &()) -> Repos {
    expenses_repo::mem_repo::create_repos()
}
