//! Axum adapter for the `/_api/user` resource.
//!
//! Every verb on the root and on any sub-path is forwarded to
//! [`UserResource`](crate::api::resource::UserResource), which owns routing
//! by method and suffix length.

use axum::{
    body::Bytes,
    extract::State,
    http::{Method, Uri},
    response::Response,
    routing::any,
    Router,
};

use crate::api::resource::{ErrorNum, ResourceRequest, USER_ROOT};
use crate::state::AppState;

/// Creates the user resource routes.
///
/// Routes:
/// - ANY /_api/user            - list, create
/// - ANY /_api/user/{*suffix}  - fetch, credential check, replace, update, remove
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route(USER_ROOT, any(user_resource))
        .route(&format!("{USER_ROOT}/{{*suffix}}"), any(user_resource))
}

async fn user_resource(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let resource = &state.user_resource;
    match ResourceRequest::from_path(method, uri.path(), USER_ROOT, body) {
        Ok(request) => resource.handle(request).await,
        Err(error) => {
            tracing::debug!(path = %uri.path(), "Rejected undecodable user path");
            resource
                .responder()
                .bad(ErrorNum::HttpBadParameter, &error.to_string())
        }
    }
}
