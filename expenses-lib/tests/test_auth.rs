use actix_web::http::StatusCode;
use actix_web::test;
use actix_web::test::TestRequest;
use actix_web::web::Data;
use actix_web::{http, web, App};
use actix_web_httpauth::middleware::HttpAuthentication;
use rstest::{fixture, rstest};
use rust_decimal::Decimal;
use serde_json::json;

use expenses_lib::auth::handlers::TokenResponse;
use expenses_lib::auth::jwt::JwtAuth;
use expenses_lib::user::UserResponse;
use expenses_repo::expense_repo::Summary;
use utils::repos;
use utils::Repos;
use utils::TestUser;

#[macro_use]
mod utils;

macro_rules! build_auth_app {
    ($repos:ident, $jwt_auth:expr) => {{
        let (user_repo, category_repo, expense_repo, tag_repo) = $repos;
        let bearer_auth_middleware =
            HttpAuthentication::bearer(expenses_lib::auth::credentials_validator);
        App::new()
            .app_data($jwt_auth)
            .app_data(Data::new(user_repo))
            .app_data(Data::new(category_repo))
            .app_data(Data::new(expense_repo))
            .app_data(Data::new(tag_repo))
            .wrap(expenses_lib::tracing::create_middleware())
            .service(
                web::scope("/api")
                    .service(
                        expenses_lib::user::user_service().wrap(bearer_auth_middleware.clone()),
                    )
                    .service(
                        expenses_lib::category::category_service()
                            .wrap(bearer_auth_middleware.clone()),
                    )
                    .service(
                        expenses_lib::expense::expense_service()
                            .wrap(bearer_auth_middleware.clone()),
                    )
                    .service(expenses_lib::tag::tag_service().wrap(bearer_auth_middleware.clone()))
                    .service(expenses_lib::auth::auth_service()),
            )
            .service(expenses_lib::health::health_check)
    }};
}

fn bearer(token: &str) -> (http::header::HeaderName, String) {
    (
        http::header::AUTHORIZATION,
        String::from("Bearer ") + token,
    )
}

#[fixture]
fn jwt_auth() -> JwtAuth {
    let secret: [u8; 32] = rand::random();
    JwtAuth::from_secret(secret.to_vec())
}

#[rstest]
#[actix_rt::test]
async fn test_register_response_has_no_password(repos: Repos, jwt_auth: JwtAuth) {
    let app = build_auth_app!(repos, jwt_auth);
    let service = test::init_service(app).await;

    let request = TestRequest::post()
        .uri("/api/users")
        .set_json(json!({ "name": "Ana", "email": "ana@x.com", "password": "secret1" }))
        .to_request();
    let response = test::call_service(&service, request).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(body["name"], "Ana");
    assert_eq!(body["email"], "ana@x.com");
    assert!(body.get("password").is_none());
    assert!(body.get("passwordHash").is_none());
}

#[rstest]
#[actix_rt::test]
async fn test_register_validation(repos: Repos, jwt_auth: JwtAuth) {
    let app = build_auth_app!(repos, jwt_auth);
    let service = test::init_service(app).await;

    let request = TestRequest::post()
        .uri("/api/users")
        .set_json(json!({ "name": "An", "email": "not-an-email", "password": "short" }))
        .to_request();
    let response = test::call_service(&service, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(body["message"], "Validation error.");
    assert!(body["issues"].get("name").is_some());
    assert!(body["issues"].get("email").is_some());
    assert!(body["issues"].get("password").is_some());
}

#[rstest]
#[actix_rt::test]
async fn test_register_duplicate_email(repos: Repos, jwt_auth: JwtAuth) {
    let app = build_auth_app!(repos, jwt_auth);
    let service = test::init_service(app).await;

    for expected_status in [StatusCode::CREATED, StatusCode::CONFLICT] {
        let request = TestRequest::post()
            .uri("/api/users")
            .set_json(json!({ "name": "Ana", "email": "ana@x.com", "password": "secret1" }))
            .to_request();
        let response = test::call_service(&service, request).await;
        assert_eq!(response.status(), expected_status);
    }
}

// Unknown email and wrong password must be indistinguishable to the
// caller.
#[rstest]
#[actix_rt::test]
async fn test_invalid_credentials_are_uniform(repos: Repos, jwt_auth: JwtAuth) {
    let user = TestUser::new(&repos.0).await;
    let app = build_auth_app!(repos, jwt_auth);
    let service = test::init_service(app).await;

    let wrong_password = TestRequest::post()
        .uri("/api/sessions")
        .set_json(json!({ "email": user.email, "password": "wrong-password" }))
        .to_request();
    let response = test::call_service(&service, wrong_password).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let wrong_password_body: serde_json::Value = test::read_body_json(response).await;

    let unknown_email = TestRequest::post()
        .uri("/api/sessions")
        .set_json(json!({ "email": "nobody@x.com", "password": "secret1" }))
        .to_request();
    let response = test::call_service(&service, unknown_email).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let unknown_email_body: serde_json::Value = test::read_body_json(response).await;

    assert_eq!(wrong_password_body, unknown_email_body);
    assert_eq!(wrong_password_body["message"], "Invalid credentials.");
}

#[rstest]
#[actix_rt::test]
async fn test_profile_requires_token(repos: Repos, jwt_auth: JwtAuth) {
    let user = TestUser::new(&repos.0).await;
    let token = jwt_auth.create_token(user.id);
    let app = build_auth_app!(repos, jwt_auth);
    let service = test::init_service(app).await;

    let request = TestRequest::get().uri("/api/profile").to_request();
    let response = test::call_service(&service, request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let request = TestRequest::get()
        .uri("/api/profile")
        .insert_header(bearer(&token))
        .to_request();
    let response = test::call_service(&service, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let profile: UserResponse = test::read_body_json(response).await;
    assert_eq!(profile.id, user.id);
    assert_eq!(profile.email, user.email);
}

#[rstest]
#[actix_rt::test]
async fn test_health_needs_no_token(repos: Repos, jwt_auth: JwtAuth) {
    let app = build_auth_app!(repos, jwt_auth);
    let service = test::init_service(app).await;

    let request = TestRequest::get().uri("/health").to_request();
    let response = test::call_service(&service, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(body, json!({ "status": "ok" }));
}

// register -> login -> create category -> duplicate rejected -> create
// expense -> summary
#[rstest]
#[actix_rt::test]
async fn test_full_scenario(repos: Repos, jwt_auth: JwtAuth) {
    let app = build_auth_app!(repos, jwt_auth);
    let service = test::init_service(app).await;

    let request = TestRequest::post()
        .uri("/api/users")
        .set_json(json!({ "name": "Ana", "email": "ana@x.com", "password": "secret1" }))
        .to_request();
    let response = test::call_service(&service, request).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let request = TestRequest::post()
        .uri("/api/sessions")
        .set_json(json!({ "email": "ana@x.com", "password": "secret1" }))
        .to_request();
    let response = test::call_service(&service, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let token: TokenResponse = test::read_body_json(response).await;
    let token = token.token;

    let request = TestRequest::post()
        .uri("/api/categories")
        .insert_header(bearer(&token))
        .set_json(json!({ "name": "Food" }))
        .to_request();
    let response = test::call_service(&service, request).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let category: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(category["id"], 1);

    let request = TestRequest::post()
        .uri("/api/categories")
        .insert_header(bearer(&token))
        .set_json(json!({ "name": "Food" }))
        .to_request();
    let response = test::call_service(&service, request).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let request = TestRequest::post()
        .uri("/api/expenses")
        .insert_header(bearer(&token))
        .set_json(json!({ "amount": 50.5, "categoryId": 1 }))
        .to_request();
    let response = test::call_service(&service, request).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let request = TestRequest::get()
        .uri("/api/expenses/summary")
        .insert_header(bearer(&token))
        .to_request();
    let response = test::call_service(&service, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let summary: Summary = test::read_body_json(response).await;
    assert_eq!(summary.total_expenses, Decimal::new(505, 1));
    assert_eq!(summary.category_count, 1);
    assert_eq!(summary.last_expense.unwrap().amount, Decimal::new(505, 1));
}
