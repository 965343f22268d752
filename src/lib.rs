pub mod config;
pub mod cookies;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod validation;

pub use routes::{ApiDoc, AppState, app};
