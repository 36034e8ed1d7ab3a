//! HTTP host: collects module routers and OpenAPI fragments, wraps them in
//! the shared middleware stack and serves them until cancelled.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use arc_swap::ArcSwap;
use axum::{
    extract::DefaultBodyLimit,
    http::header,
    middleware::from_fn,
    response::IntoResponse,
    routing::get,
    Router,
};
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

mod config;
mod openapi;
pub mod request_id;
mod web;

pub use config::ApiIngressConfig;

/// Module name used for the `modules.api_ingress` config section.
pub const MODULE_NAME: &str = "api_ingress";

pub struct ApiIngress {
    // Read-mostly; swapped only when the binary overrides the bind address
    config: ArcSwap<ApiIngressConfig>,
    routes: Mutex<Vec<Router>>,
    docs: Mutex<Vec<utoipa::openapi::OpenApi>>,
}

impl Default for ApiIngress {
    fn default() -> Self {
        Self::new(ApiIngressConfig::default())
    }
}

impl ApiIngress {
    pub fn new(config: ApiIngressConfig) -> Self {
        Self {
            config: ArcSwap::from_pointee(config),
            routes: Mutex::new(Vec::new()),
            docs: Mutex::new(Vec::new()),
        }
    }

    pub fn config(&self) -> Arc<ApiIngressConfig> {
        self.config.load_full()
    }

    /// Use `addr` unless the config already names a bind address.
    pub fn default_bind_addr(&self, addr: impl Into<String>) {
        let current = self.config();
        if current.bind_addr.trim().is_empty() {
            let mut cfg = (*current).clone();
            cfg.bind_addr = addr.into();
            self.config.store(Arc::new(cfg));
        }
    }

    /// Add a module's routes together with the OpenAPI fragment describing them.
    pub fn register(&self, router: Router, doc: utoipa::openapi::OpenApi) {
        tracing::debug!(paths = doc.paths.paths.len(), "Registering module routes");
        self.routes.lock().push(router);
        self.docs.lock().push(doc);
    }

    /// Merged OpenAPI document for everything registered so far.
    pub fn openapi(&self) -> utoipa::openapi::OpenApi {
        let fragments = self.docs.lock().clone();
        openapi::merge_documents(
            openapi::base_document("Provisioning API", env!("CARGO_PKG_VERSION")),
            fragments,
        )
    }

    /// Build the HTTP router from registered routes and the middleware stack.
    pub fn build_router(&self) -> Result<Router> {
        let config = self.config();
        let mut router = Router::new().route("/health", get(web::health_check));

        for module_router in self.routes.lock().iter() {
            router = router.merge(module_router.clone());
        }

        if config.enable_docs {
            let doc = Arc::new(
                serde_json::to_value(self.openapi()).context("Failed to serialize OpenAPI")?,
            );
            router = router
                .route(
                    "/openapi.json",
                    get(move || {
                        let doc = doc.clone();
                        async move {
                            ([(header::CACHE_CONTROL, "no-store")], axum::Json((*doc).clone()))
                                .into_response()
                        }
                    }),
                )
                .route("/docs", get(web::serve_docs));
        }

        router = router.fallback(web::not_found);

        // Layers wrap everything added before them: the last one is outermost.
        router = router
            .layer(RequestBodyLimitLayer::new(config.body_limit_bytes))
            .layer(DefaultBodyLimit::max(config.body_limit_bytes));
        if config.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }

        let x_request_id = request_id::header();
        router = router
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.request_timeout_sec,
            )))
            .layer(from_fn(request_id::push_req_id_to_extensions))
            .layer(request_id::create_trace_layer())
            .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
            .layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId));

        Ok(router)
    }

    /// Bind the configured address and serve until `cancel` fires.
    pub async fn serve(&self, cancel: CancellationToken) -> Result<()> {
        let cfg = self.config();
        let addr: SocketAddr = cfg
            .bind_addr
            .parse()
            .with_context(|| format!("Invalid bind address '{}'", cfg.bind_addr))?;

        let router = self.build_router()?;
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;
        tracing::info!("HTTP server bound on {}", addr);

        serve_on(listener, router, cancel).await
    }
}

/// Serve `router` on an already-bound listener with graceful shutdown.
pub async fn serve_on(
    listener: tokio::net::TcpListener,
    router: Router,
    cancel: CancellationToken,
) -> Result<()> {
    let shutdown = async move {
        cancel.cancelled().await;
        tracing::info!("HTTP server shutting down gracefully (cancellation)");
    };

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")
}
