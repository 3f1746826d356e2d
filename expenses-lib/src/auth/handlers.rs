use std::str::FromStr;
use std::sync::Arc;

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use email_address::EmailAddress;
use serde::{Deserialize, Serialize};

use crate::auth::jwt::JwtAuth;
use crate::auth::password;
use crate::error::HandlerError;
use crate::user::UserResponse;
use crate::validation::ValidationIssues;
use expenses_repo::user_repo::{NewUser, UserRepo};

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    fn validate(&self) -> Result<(), HandlerError> {
        let mut issues = ValidationIssues::new();
        if self.name.chars().count() < 3 {
            issues.add("name", "must be at least 3 characters long");
        }
        if EmailAddress::from_str(&self.email).is_err() {
            issues.add("email", "must be a valid email address");
        }
        if self.password.chars().count() < 6 {
            issues.add("password", "must be at least 6 characters long");
        }
        issues.into_result()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct TokenResponse {
    pub token: String,
}

#[post("/users")]
pub async fn register(
    user_repo: web::Data<Arc<dyn UserRepo>>,
    new_user: web::Json<RegisterRequest>,
) -> Result<impl Responder, HandlerError> {
    let new_user = new_user.into_inner();
    new_user.validate()?;

    let password_hash = password::encode_password(new_user.password)?;
    let user = user_repo
        .create_user(NewUser {
            name: new_user.name,
            email: new_user.email,
            password_hash,
        })
        .await?;

    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// Unknown email and wrong password collapse into the same response so
/// the endpoint cannot be used to probe for registered addresses.
#[post("/sessions")]
pub async fn login(
    user_repo: web::Data<Arc<dyn UserRepo>>,
    credentials: web::Json<LoginRequest>,
    req: HttpRequest,
) -> Result<impl Responder, HandlerError> {
    let credentials = credentials.into_inner();

    let user = user_repo
        .get_user_by_email(&credentials.email)
        .await?
        .ok_or(HandlerError::InvalidCredentials)?;

    let matched = password::verify_password(credentials.password, user.password_hash)?;
    if matched {
        let jwt_auth = req.app_data::<JwtAuth>().unwrap();
        Ok(HttpResponse::Ok().json(TokenResponse {
            token: jwt_auth.create_token(user.id),
        }))
    } else {
        Err(HandlerError::InvalidCredentials)
    }
}
