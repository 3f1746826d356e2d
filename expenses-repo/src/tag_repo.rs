use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[async_trait]
pub trait TagRepo: Sync + Send {
    async fn create_tag(&self, name: String) -> Result<Tag, TagRepoError>;

    /// All tags, ordered by name ascending.
    async fn get_tags(&self) -> Result<Vec<Tag>, TagRepoError>;
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Error, Debug)]
pub enum TagRepoError {
    #[error("Tag named {0} already exists")]
    NameAlreadyExists(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
