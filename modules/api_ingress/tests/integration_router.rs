//! Router assembly: health, OpenAPI merge, body limit and CORS.

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower::util::ServiceExt;
use utoipa::{OpenApi, ToSchema};

use api_ingress::{ApiIngress, ApiIngressConfig};

#[derive(Serialize, Deserialize, ToSchema)]
struct Ping {
    message: String,
}

#[utoipa::path(get, path = "/ping", responses((status = 200, body = Ping)))]
async fn ping() -> Json<Ping> {
    Json(Ping {
        message: "pong".into(),
    })
}

async fn sink(body: String) -> String {
    body.len().to_string()
}

#[derive(OpenApi)]
#[openapi(paths(ping), components(schemas(Ping)))]
struct PingDoc;

fn ingress(config: ApiIngressConfig) -> ApiIngress {
    let ingress = ApiIngress::new(config);
    ingress.register(
        Router::new()
            .route("/ping", get(ping))
            .route("/sink", post(sink)),
        PingDoc::openapi(),
    );
    ingress
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn health_endpoint_reports_healthy() {
    let router = ingress(ApiIngressConfig::default()).build_router().unwrap();
    let response = router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn openapi_document_contains_module_paths() {
    let router = ingress(ApiIngressConfig::default()).build_router().unwrap();
    let response = router
        .oneshot(
            Request::builder()
                .uri("/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["info"]["title"], "Provisioning API");
    assert!(json["paths"]["/ping"]["get"].is_object());
    assert!(json["components"]["schemas"]["Ping"].is_object());
}

#[tokio::test]
async fn docs_can_be_disabled() {
    let router = ingress(ApiIngressConfig {
        enable_docs: false,
        ..Default::default()
    })
    .build_router()
    .unwrap();

    let response = router
        .oneshot(
            Request::builder()
                .uri("/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn oversized_bodies_are_rejected() {
    let router = ingress(ApiIngressConfig {
        body_limit_bytes: 16,
        ..Default::default()
    })
    .build_router()
    .unwrap();

    let ok = router
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/sink")
                .body(Body::from("small"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(ok.status(), StatusCode::OK);

    let too_big = router
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/sink")
                .header("content-length", "64")
                .body(Body::from("x".repeat(64)))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(too_big.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn cors_headers_only_when_enabled() {
    let request = || {
        Request::builder()
            .uri("/ping")
            .header("origin", "http://portal.local")
            .body(Body::empty())
            .unwrap()
    };

    let plain = ingress(ApiIngressConfig::default()).build_router().unwrap();
    let response = plain.oneshot(request()).await.unwrap();
    assert!(response
        .headers()
        .get("access-control-allow-origin")
        .is_none());

    let cors = ingress(ApiIngressConfig {
        cors_enabled: true,
        ..Default::default()
    })
    .build_router()
    .unwrap();
    let response = cors.oneshot(request()).await.unwrap();
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}
