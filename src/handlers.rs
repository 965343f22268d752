pub mod auth_handlers;
pub mod category_handlers;
pub mod concept_handlers;
pub mod payment_handlers;
pub mod state_handlers;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}
