pub mod config;
pub mod domain;
pub mod forms;
pub mod models;
pub mod repository;
pub mod routes;
pub mod schema;
pub mod services;

/// Role granting tag and ingredient administration and access to every recipe.
pub const SERVICE_ACCESS_ROLE: &str = "admin";
