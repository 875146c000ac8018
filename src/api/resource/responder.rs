//! Response builders used by the user resource.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};

use crate::error::ErrorNum;
use crate::services::UserError;

/// Turns resource outcomes into HTTP responses.
///
/// Injected into [`super::UserResource`] so the envelope format can be
/// swapped without touching dispatch.
pub trait Responder: Send + Sync {
    fn ok(&self, status: StatusCode, body: Value) -> Response;

    fn bad(&self, error_num: ErrorNum, message: &str) -> Response;

    fn not_found(&self, error_num: ErrorNum) -> Response;

    fn unsupported(&self) -> Response;

    /// Response for a collaborator failure the resource does not interpret.
    fn exception(&self, error: &UserError) -> Response;
}

/// Default JSON envelope.
///
/// Success bodies carry `error: false` and `code`; failures carry
/// `error: true`, `code`, `errorNum` and `errorMessage`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonResponder;

impl JsonResponder {
    fn error(status: StatusCode, error_num: ErrorNum, message: &str) -> Response {
        let body = json!({
            "error": true,
            "code": status.as_u16(),
            "errorNum": error_num.code(),
            "errorMessage": message,
        });
        (status, Json(body)).into_response()
    }
}

impl Responder for JsonResponder {
    fn ok(&self, status: StatusCode, body: Value) -> Response {
        let mut envelope = match body {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("result".to_string(), other);
                map
            }
        };
        envelope.insert("error".to_string(), Value::Bool(false));
        envelope.insert("code".to_string(), Value::from(status.as_u16()));

        (status, Json(Value::Object(envelope))).into_response()
    }

    fn bad(&self, error_num: ErrorNum, message: &str) -> Response {
        Self::error(StatusCode::BAD_REQUEST, error_num, message)
    }

    fn not_found(&self, error_num: ErrorNum) -> Response {
        Self::error(StatusCode::NOT_FOUND, error_num, error_num.message())
    }

    fn unsupported(&self) -> Response {
        let error_num = ErrorNum::HttpMethodNotAllowed;
        Self::error(StatusCode::METHOD_NOT_ALLOWED, error_num, error_num.message())
    }

    fn exception(&self, error: &UserError) -> Response {
        let error_num = error.error_num();
        let message = if error.is_internal() {
            error_num.message().to_string()
        } else {
            error.to_string()
        };
        Self::error(StatusCode::INTERNAL_SERVER_ERROR, error_num, &message)
    }
}
