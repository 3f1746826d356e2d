use anyhow::Context;
use async_trait::async_trait;
use sqlx::{query_as, query_scalar};
use tracing::instrument;

use super::SqlxRepo;
use crate::user_repo::{NewUser, User, UserRepo, UserRepoError};

#[async_trait]
impl UserRepo for SqlxRepo {
    #[instrument(skip(self, new_user))]
    async fn create_user(&self, new_user: NewUser) -> Result<User, UserRepoError> {
        // The unique index on email makes check-and-insert atomic.
        let id: Option<i32> = query_scalar(
            "INSERT INTO users (name, email, password_hash) VALUES ($1, $2, $3) \
             ON CONFLICT DO NOTHING RETURNING id",
        )
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Unable to create user {}", new_user.email))?;

        match id {
            Some(id) => self.get_user(id).await,
            None => Err(UserRepoError::EmailAlreadyExists(new_user.email)),
        }
    }

    #[instrument(skip(self))]
    async fn get_user(&self, user_id: i32) -> Result<User, UserRepoError> {
        let user: Option<User> = query_as(
            "SELECT id, name, email, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Unable to get user {}", user_id))?;
        user.ok_or(UserRepoError::UserNotFound(user_id))
    }

    #[instrument(skip(self))]
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, UserRepoError> {
        let user: Option<User> = query_as(
            "SELECT id, name, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Unable to get user with email {}", email))?;
        Ok(user)
    }
}
