//! W3C Trace Context propagation for outgoing requests.
//!
//! Only the `traceparent` header is handled. The parent id is taken from the
//! current tracing span when one is active; the trace id is random per call.

use http::{HeaderMap, HeaderName, HeaderValue};
use tracing::Span;

/// W3C Trace Context header name
pub const TRACEPARENT: &str = "traceparent";

/// Build a `traceparent` value for a request issued under `span`.
pub fn traceparent_for(span: &Span) -> String {
    let parent_id = span
        .id()
        .map(|id| id.into_u64())
        .unwrap_or_else(rand::random::<u64>);
    let trace_id = rand::random::<u128>();
    format!("00-{trace_id:032x}-{parent_id:016x}-01")
}

/// Insert a `traceparent` header, replacing any existing one.
pub fn inject_trace_context(headers: &mut HeaderMap, span: &Span) {
    if let Ok(value) = HeaderValue::from_str(&traceparent_for(span)) {
        headers.insert(HeaderName::from_static(TRACEPARENT), value);
    }
}

/// Raw `traceparent` value from incoming headers.
pub fn extract_trace_parent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(TRACEPARENT)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

/// Trace id part of a version-00 `traceparent`.
pub fn parse_trace_id(traceparent: &str) -> Option<&str> {
    let mut parts = traceparent.split('-');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some("00"), Some(trace_id), Some(_), Some(_)) if trace_id.len() == 32 => Some(trace_id),
        _ => None,
    }
}
