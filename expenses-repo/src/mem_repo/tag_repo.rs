use async_trait::async_trait;
use chrono::Utc;

use super::MemRepo;
use crate::tag_repo::TagRepoError::NameAlreadyExists;
use crate::tag_repo::{Tag, TagRepo, TagRepoError};

#[async_trait]
impl TagRepo for MemRepo {
    async fn create_tag(&self, name: String) -> Result<Tag, TagRepoError> {
        let mut write_guard = self.write_lock()?;

        if write_guard.tags.values().any(|t| t.name == name) {
            return Err(NameAlreadyExists(name));
        }

        let id = write_guard.next_tag_id;
        write_guard.next_tag_id += 1;

        let tag = Tag {
            id,
            name,
            created_at: Utc::now(),
        };
        write_guard.tags.insert(id, tag.clone());

        Ok(tag)
    }

    async fn get_tags(&self) -> Result<Vec<Tag>, TagRepoError> {
        let read_guard = self.read_lock()?;

        let mut tags: Vec<Tag> = read_guard.tags.values().cloned().collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(tags)
    }
}
