use anyhow::Context;
use async_trait::async_trait;
use sqlx::query_as;
use tracing::instrument;

use super::SqlxRepo;
use crate::tag_repo::TagRepoError::NameAlreadyExists;
use crate::tag_repo::{Tag, TagRepo, TagRepoError};

#[async_trait]
impl TagRepo for SqlxRepo {
    #[instrument(skip(self))]
    async fn create_tag(&self, name: String) -> Result<Tag, TagRepoError> {
        let tag: Option<Tag> = query_as(
            "INSERT INTO tags (name) VALUES ($1) \
             ON CONFLICT DO NOTHING RETURNING id, name, created_at",
        )
        .bind(&name)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Unable to create tag {}", name))?;

        tag.ok_or(NameAlreadyExists(name))
    }

    #[instrument(skip(self))]
    async fn get_tags(&self) -> Result<Vec<Tag>, TagRepoError> {
        let tags = query_as("SELECT id, name, created_at FROM tags ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .context("Unable to get tags")?;
        Ok(tags)
    }
}
