mod handlers;

use actix_web::{web, Scope};
use serde::{Deserialize, Serialize};

use crate::error::HandlerError;
use crate::validation::ValidationIssues;
use expenses_repo::category_repo::{CategoryUpdate, NewCategory};

pub fn category_service() -> Scope {
    web::scope("/categories")
        .service(handlers::create_category)
        .service(handlers::get_all_categories)
        .service(handlers::get_category)
        .service(handlers::update_category)
        .service(handlers::delete_category)
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategory {
    pub name: String,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub is_default: Option<bool>,
}

impl CreateCategory {
    fn validate(&self) -> Result<(), HandlerError> {
        let mut issues = ValidationIssues::new();
        if self.name.chars().count() < 2 {
            issues.add("name", "must be at least 2 characters long");
        }
        issues.into_result()
    }

    fn into_new_category(self) -> NewCategory {
        NewCategory {
            name: self.name,
            color: self.color,
            icon: self.icon,
            is_default: self.is_default.unwrap_or(false),
        }
    }
}

fn validate_update(update: &CategoryUpdate) -> Result<(), HandlerError> {
    let mut issues = ValidationIssues::new();
    if let Some(name) = &update.name {
        if name.chars().count() < 2 {
            issues.add("name", "must be at least 2 characters long");
        }
    }
    issues.into_result()
}
