use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[async_trait]
pub trait UserRepo: Sync + Send {
    async fn create_user(&self, new_user: NewUser) -> Result<User, UserRepoError>;

    async fn get_user(&self, user_id: i32) -> Result<User, UserRepoError>;

    /// Lookup used by login. Returns `None` for an unknown email so the
    /// caller can collapse it with a failed password check.
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, UserRepoError>;
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Error, Debug)]
pub enum UserRepoError {
    #[error("User {0} not found")]
    UserNotFound(i32),
    #[error("Email already exists")]
    EmailAlreadyExists(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
