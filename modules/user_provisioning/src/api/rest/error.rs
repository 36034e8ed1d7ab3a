//! RFC 9457 mapping for everything the REST handlers can fail with.

use axum::http::{HeaderMap, StatusCode};
use modkit::{FieldViolation, Problem, ProblemResponse};

use crate::domain::error::DomainError;

const ERROR_TYPE_BASE: &str = "https://errors.example.com";

/// Build a problem with code-derived type URI, instance and optional trace id.
pub fn from_parts(
    status: StatusCode,
    code: &str,
    title: &str,
    detail: impl Into<String>,
    instance: &str,
    trace_id: Option<String>,
) -> Problem {
    let problem = Problem::new(status, title, detail)
        .with_type(format!("{ERROR_TYPE_BASE}/{code}"))
        .with_code(code)
        .with_instance(instance);
    match trace_id {
        Some(tid) => problem.with_trace_id(tid),
        None => problem,
    }
}

/// Map domain errors to problem responses
pub fn map_domain_error(
    error: &DomainError,
    instance: &str,
    trace_id: Option<String>,
) -> ProblemResponse {
    let problem = match error {
        DomainError::Validation { field, message } => from_parts(
            StatusCode::BAD_REQUEST,
            "USERS_VALIDATION",
            "Validation Failed",
            format!("{} {}", field_name(field), message),
            instance,
            trace_id,
        )
        .with_errors(vec![FieldViolation {
            detail: message.clone(),
            pointer: json_pointer(field),
        }]),
        DomainError::InvalidName { .. } => from_parts(
            StatusCode::BAD_REQUEST,
            "USERS_INVALID_NAME",
            "Invalid Name",
            error.to_string(),
            instance,
            trace_id,
        ),
        DomainError::AlreadyExists { .. } => from_parts(
            StatusCode::CONFLICT,
            "USERS_ALREADY_EXISTS",
            "Login Already Exists",
            error.to_string(),
            instance,
            trace_id,
        ),
        DomainError::ExhaustedSuffixSpace { .. } => from_parts(
            StatusCode::INTERNAL_SERVER_ERROR,
            "USERS_LOGIN_SPACE_EXHAUSTED",
            "Login Space Exhausted",
            error.to_string(),
            instance,
            trace_id,
        ),
        DomainError::ServiceAuth { .. } => from_parts(
            StatusCode::INTERNAL_SERVER_ERROR,
            "DIRECTORY_AUTH",
            "Directory Authentication Failed",
            "The directory service refused the configured credentials",
            instance,
            trace_id,
        ),
        DomainError::CreationFailed {
            rejected_input: true,
            ..
        } => from_parts(
            StatusCode::BAD_REQUEST,
            "DIRECTORY_REJECTED",
            "Rejected By Directory",
            error.to_string(),
            instance,
            trace_id,
        ),
        DomainError::CreationFailed { .. } => from_parts(
            StatusCode::BAD_GATEWAY,
            "DIRECTORY_FAILURE",
            "Directory Failure",
            error.to_string(),
            instance,
            trace_id,
        ),
    };
    problem.into()
}

/// Upload could not be turned into rows.
pub fn bulk_file_error(
    detail: impl Into<String>,
    instance: &str,
    trace_id: Option<String>,
) -> ProblemResponse {
    from_parts(
        StatusCode::BAD_REQUEST,
        "USERS_BULK_INVALID_FILE",
        "Invalid Bulk File",
        detail,
        instance,
        trace_id,
    )
    .into()
}

/// Request body or query that failed to deserialize.
pub fn malformed_request(
    detail: impl Into<String>,
    instance: &str,
    trace_id: Option<String>,
) -> ProblemResponse {
    from_parts(
        StatusCode::BAD_REQUEST,
        "USERS_VALIDATION",
        "Validation Failed",
        detail,
        instance,
        trace_id,
    )
    .into()
}

/// Unexpected failure outside the domain (e.g. a panicked blocking task).
pub fn internal(detail: impl Into<String>, instance: &str, trace_id: Option<String>) -> ProblemResponse {
    from_parts(
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "Internal Server Error",
        detail,
        instance,
        trace_id,
    )
    .into()
}

/// Request id or trace context of the incoming request, if any.
pub fn extract_trace_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .or_else(|| {
            modkit::http::trace_context::extract_trace_parent(headers).and_then(|tp| {
                modkit::http::trace_context::parse_trace_id(&tp).map(str::to_owned)
            })
        })
}

/// Wire name of a form field: last path segment, camelCase.
fn field_name(path: &str) -> String {
    let last = path.rsplit('.').next().unwrap_or(path);
    let mut out = String::with_capacity(last.len());
    let mut upper = false;
    for c in last.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn json_pointer(path: &str) -> String {
    format!("/{}", field_name(path))
}
