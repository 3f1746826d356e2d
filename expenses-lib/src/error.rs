use actix_web::body::BoxBody;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::validation::ValidationIssues;
use expenses_repo::category_repo::CategoryRepoError;
use expenses_repo::expense_repo::ExpenseRepoError;
use expenses_repo::tag_repo::TagRepoError;
use expenses_repo::user_repo::UserRepoError;

#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("Validation error.")]
    Validation(ValidationIssues),
    #[error("Invalid credentials.")]
    InvalidCredentials,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error("Cannot delete category that is being used by expenses")]
    CategoryInUse(i64),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<UserRepoError> for HandlerError {
    fn from(e: UserRepoError) -> Self {
        match e {
            UserRepoError::UserNotFound(_) => HandlerError::NotFound("User"),
            UserRepoError::EmailAlreadyExists(_) => {
                HandlerError::Conflict("Email already exists".to_string())
            }
            UserRepoError::Other(e) => HandlerError::Internal(e),
        }
    }
}

impl From<CategoryRepoError> for HandlerError {
    fn from(e: CategoryRepoError) -> Self {
        match e {
            CategoryRepoError::CategoryNotFound(_) => HandlerError::NotFound("Category"),
            CategoryRepoError::NameAlreadyExists(_) => {
                HandlerError::Conflict("Category with this name already exists".to_string())
            }
            CategoryRepoError::CategoryInUse(count) => HandlerError::CategoryInUse(count),
            CategoryRepoError::Other(e) => HandlerError::Internal(e),
        }
    }
}

impl From<ExpenseRepoError> for HandlerError {
    fn from(e: ExpenseRepoError) -> Self {
        match e {
            ExpenseRepoError::ExpenseNotFound(_) => HandlerError::NotFound("Expense"),
            ExpenseRepoError::Other(e) => HandlerError::Internal(e),
        }
    }
}

impl From<TagRepoError> for HandlerError {
    fn from(e: TagRepoError) -> Self {
        match e {
            TagRepoError::NameAlreadyExists(_) => {
                HandlerError::Conflict("Tag with this name already exists".to_string())
            }
            TagRepoError::Other(e) => HandlerError::Internal(e),
        }
    }
}

impl From<argon2::Error> for HandlerError {
    fn from(e: argon2::Error) -> Self {
        HandlerError::Internal(anyhow::Error::new(e))
    }
}

impl ResponseError for HandlerError {
    fn error_response(&self) -> HttpResponse<BoxBody> {
        match self {
            HandlerError::Validation(issues) => HttpResponse::BadRequest().json(json!({
                "message": "Validation error.",
                "issues": issues,
            })),
            HandlerError::InvalidCredentials => HttpResponse::BadRequest().json(json!({
                "message": "Invalid credentials.",
            })),
            HandlerError::NotFound(resource) => HttpResponse::NotFound().json(json!({
                "message": format!("{} not found", resource),
            })),
            HandlerError::Conflict(message) => HttpResponse::Conflict().json(json!({
                "message": message,
            })),
            HandlerError::CategoryInUse(count) => HttpResponse::BadRequest().json(json!({
                "message": "Cannot delete category that is being used by expenses",
                "expensesCount": count,
            })),
            HandlerError::Internal(e) => {
                // detail stays in the logs, the response is generic
                error!(error = %e, "Unexpected error while handling request");
                HttpResponse::InternalServerError().json(json!({
                    "message": "Internal server error",
                }))
            }
        }
    }
}
