mod handlers;

use actix_web::{web, Scope};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use expenses_repo::user_repo::User;

pub type UserId = i32;

/// User as exposed by the API. The password hash never leaves the
/// repo layer.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            name: user.name,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

pub fn user_service() -> Scope {
    web::scope("/profile").service(handlers::profile)
}
