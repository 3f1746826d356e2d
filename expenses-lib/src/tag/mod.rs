mod handlers;

use actix_web::{web, Scope};
use serde::{Deserialize, Serialize};

use crate::error::HandlerError;
use crate::validation::ValidationIssues;

pub fn tag_service() -> Scope {
    web::scope("/tags")
        .service(handlers::create_tag)
        .service(handlers::get_all_tags)
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CreateTag {
    pub name: String,
}

impl CreateTag {
    fn validate(&self) -> Result<(), HandlerError> {
        let mut issues = ValidationIssues::new();
        if self.name.chars().count() < 2 {
            issues.add("name", "must be at least 2 characters long");
        }
        issues.into_result()
    }
}
