#[macro_use]
extern crate actix_web;

pub mod auth;
pub mod category;
pub mod config;
mod error;
pub mod expense;
pub mod health;
pub mod tag;
pub mod tracing;
pub mod user;
pub mod validation;
