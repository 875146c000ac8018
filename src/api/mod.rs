//! API module: the user resource, its axum adapter, middleware and DTOs.

pub mod doc;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod resource;
pub mod routes;
