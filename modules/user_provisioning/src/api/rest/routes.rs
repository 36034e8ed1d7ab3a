use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use utoipa::OpenApi;

use crate::api::rest::{dto, handlers};
use crate::domain::service::Service;

/// OpenAPI fragment for the user provisioning routes
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::next_username,
        handlers::create_operational_user,
        handlers::bulk_upload
    ),
    components(schemas(
        dto::NextUsernameDto,
        dto::CreateOperationalUserReq,
        dto::CreatedUserDto,
        dto::BulkReportDto,
        dto::BulkRowDto,
        dto::BulkRowStatusDto,
        dto::BulkUploadForm,
        modkit::Problem,
        modkit::FieldViolation
    )),
    tags((name = "users", description = "Operational user provisioning"))
)]
pub struct UserProvisioningApiDoc;

pub fn register_routes(service: Arc<Service>) -> Router {
    Router::new()
        .route("/api/users/next-username", get(handlers::next_username))
        .route(
            "/api/users/operational",
            post(handlers::create_operational_user),
        )
        .route("/api/users/operational/bulk", post(handlers::bulk_upload))
        .layer(Extension(service))
}

pub fn openapi() -> utoipa::openapi::OpenApi {
    UserProvisioningApiDoc::openapi()
}
