use utoipa::OpenApi;

pub const USER_TAG: &str = "User";
pub const HEALTH_TAG: &str = "Health";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Warden",
        description = "User account resource served under /_api/user",
    ),
    paths(
        crate::api::handlers::health::health_check,
        crate::api::handlers::health::readiness_check,
        crate::api::handlers::health::liveness_check,
    ),
    components(
        schemas(
            crate::api::dto::UserPayload,
            crate::models::UserDocument,
            crate::api::dto::HealthResponse,
        )
    ),
    tags(
        (name = USER_TAG, description = "User management endpoints"),
        (name = HEALTH_TAG, description = "Health check endpoints"),
    )
)]
pub struct ApiDoc;
