//! Data Transfer Objects for API requests and responses.
//!
//! DTOs are organized by domain:
//! - `user` - body accepted by the user resource
//! - `health` - health check responses

mod health;
mod user;

pub use health::{ComponentHealth, HealthResponse, HealthStatus};
pub use user::UserPayload;
