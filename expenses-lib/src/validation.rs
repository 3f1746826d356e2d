use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::HandlerError;

/// Field violations collected while checking a request payload. The
/// whole request is rejected when any field has an issue; handlers never
/// apply a payload partially.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct ValidationIssues(BTreeMap<String, Vec<String>>);

impl ValidationIssues {
    pub fn new() -> ValidationIssues {
        ValidationIssues::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_owned())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_result(self) -> Result<(), HandlerError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(HandlerError::Validation(self))
        }
    }
}
