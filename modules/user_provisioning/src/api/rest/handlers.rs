use std::sync::Arc;

use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::{JsonRejection, QueryRejection},
        Multipart, Query,
    },
    http::{HeaderMap, StatusCode, Uri},
    response::Json,
    Extension,
};
use modkit::{Problem, ProblemResponse};
use tracing::{error, info, warn};

use crate::api::rest::dto::{
    BulkReportDto, BulkUploadForm, CreateOperationalUserReq, CreatedUserDto, NextUsernameDto,
    NextUsernameQuery,
};
use crate::api::rest::error::{
    bulk_file_error, extract_trace_id, internal, malformed_request, map_domain_error,
};
use crate::domain::error::DomainError;
use crate::domain::form::{AccountForm, NameForm};
use crate::domain::service::Service;
use crate::infra::spreadsheet::decode_workbook;

const UPLOAD_FIELD: &str = "file";

/// Preview the login a person would receive
#[utoipa::path(
    get,
    path = "/api/users/next-username",
    operation_id = "user_provisioning.next_username",
    tag = "users",
    params(NextUsernameQuery),
    responses(
        (status = 200, description = "First free login", body = NextUsernameDto),
        (status = 400, description = "Invalid name", body = Problem, content_type = "application/problem+json"),
        (status = 500, description = "No free login left", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn next_username(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    headers: HeaderMap,
    query: Result<Query<NextUsernameQuery>, QueryRejection>,
) -> Result<Json<NextUsernameDto>, ProblemResponse> {
    let trace_id = extract_trace_id(&headers);
    let Query(query) = query
        .map_err(|e| malformed_request(e.body_text(), uri.path(), trace_id.clone()))?;

    let name = NameForm::from(query)
        .into_person_name()
        .map_err(|e| reject(&e, &uri, trace_id.clone()))?;

    match svc.resolve_login(&name).await {
        Ok(identity) => Ok(Json(identity.into())),
        Err(e) => Err(reject(&e, &uri, trace_id)),
    }
}

/// Provision a single operational account
#[utoipa::path(
    post,
    path = "/api/users/operational",
    operation_id = "user_provisioning.create_operational_user",
    tag = "users",
    request_body = CreateOperationalUserReq,
    responses(
        (status = 201, description = "Account created", body = CreatedUserDto),
        (status = 400, description = "Invalid input", body = Problem, content_type = "application/problem+json"),
        (status = 409, description = "Login already exists", body = Problem, content_type = "application/problem+json"),
        (status = 500, description = "Directory or login space failure", body = Problem, content_type = "application/problem+json"),
        (status = 502, description = "Directory unavailable", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn create_operational_user(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    headers: HeaderMap,
    body: Result<Json<CreateOperationalUserReq>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedUserDto>), ProblemResponse> {
    let trace_id = extract_trace_id(&headers);
    let Json(req) =
        body.map_err(|e| malformed_request(e.body_text(), uri.path(), trace_id.clone()))?;

    let account = AccountForm::from(req)
        .into_new_account()
        .map_err(|e| reject(&e, &uri, trace_id.clone()))?;

    match svc.provision(account).await {
        Ok(created) => Ok((StatusCode::CREATED, Json(created.into()))),
        Err(e) => Err(reject(&e, &uri, trace_id)),
    }
}

/// Provision every row of an uploaded workbook
#[utoipa::path(
    post,
    path = "/api/users/operational/bulk",
    operation_id = "user_provisioning.bulk_upload",
    tag = "users",
    request_body(content = BulkUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Per-row results", body = BulkReportDto),
        (status = 400, description = "Unreadable upload", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn bulk_upload(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<BulkReportDto>, ProblemResponse> {
    let trace_id = extract_trace_id(&headers);
    let instance = uri.path();

    let mut multipart =
        multipart.map_err(|e| bulk_file_error(e.body_text(), instance, trace_id.clone()))?;
    let bytes = read_upload(&mut multipart)
        .await
        .map_err(|detail| bulk_file_error(detail, instance, trace_id.clone()))?;
    info!(bytes = bytes.len(), "Received bulk upload");

    let rows = tokio::task::spawn_blocking(move || decode_workbook(bytes))
        .await
        .map_err(|e| {
            error!("Workbook decoding task failed: {}", e);
            internal("Failed to decode workbook", instance, trace_id.clone())
        })?
        .map_err(|e| {
            warn!("Rejected bulk upload: {}", e);
            bulk_file_error(e.to_string(), instance, trace_id.clone())
        })?;

    let report = svc.provision_batch(rows).await;
    Ok(Json(report.into()))
}

async fn read_upload(multipart: &mut Multipart) -> Result<Vec<u8>, String> {
    while let Some(field) = multipart.next_field().await.map_err(|e| e.body_text())? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let bytes = field.bytes().await.map_err(|e| e.body_text())?;
        if bytes.is_empty() {
            return Err("Uploaded file is empty".to_string());
        }
        return Ok(bytes.to_vec());
    }
    Err(format!("Missing multipart field '{UPLOAD_FIELD}'"))
}

fn reject(e: &DomainError, uri: &Uri, trace_id: Option<String>) -> ProblemResponse {
    let problem = map_domain_error(e, uri.path(), trace_id);
    if problem.status().is_server_error() {
        error!("Request to {} failed: {}", uri.path(), e);
    } else {
        info!("Request to {} rejected: {}", uri.path(), e);
    }
    problem
}
