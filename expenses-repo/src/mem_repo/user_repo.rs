use async_trait::async_trait;
use chrono::Utc;

use super::MemRepo;
use crate::user_repo::UserRepoError::{EmailAlreadyExists, UserNotFound};
use crate::user_repo::{NewUser, User, UserRepo, UserRepoError};

#[async_trait]
impl UserRepo for MemRepo {
    async fn create_user(&self, new_user: NewUser) -> Result<User, UserRepoError> {
        let mut write_guard = self.write_lock()?;

        if write_guard.users.values().any(|u| u.email == new_user.email) {
            return Err(EmailAlreadyExists(new_user.email));
        }

        let id = write_guard.next_user_id;
        write_guard.next_user_id += 1;

        let user = User {
            id,
            name: new_user.name,
            email: new_user.email,
            password_hash: new_user.password_hash,
            created_at: Utc::now(),
        };
        write_guard.users.insert(id, user.clone());

        Ok(user)
    }

    async fn get_user(&self, user_id: i32) -> Result<User, UserRepoError> {
        let read_guard = self.read_lock()?;

        read_guard
            .users
            .get(&user_id)
            .cloned()
            .ok_or(UserNotFound(user_id))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, UserRepoError> {
        let read_guard = self.read_lock()?;

        Ok(read_guard
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }
}
