pub mod auth_middleware;

pub use auth_middleware::{AccessGuard, AuthenticatedUser, auth_middleware};
