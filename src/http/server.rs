//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, concurrency limit)
//! - Serve the static UI for paths no handler claims
//! - Bind server to listener and drain on shutdown

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::{limit::GlobalConcurrencyLimitLayer, ServiceBuilder};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::error::ProxyError;
use crate::http::proxy::{proxy_handler, redirect_handler};
use crate::http::request::{request_id, MakeRequestUuidV4, X_REQUEST_ID};
use crate::lifecycle::shutdown::wait_for;
use crate::rewrite::RewriteOptions;
use crate::upstream::Fetcher;

/// Path of the liveness endpoint.
pub const HEALTH_PATH: &str = "/health";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub fetcher: Fetcher,
    pub prefix: Arc<str>,
    pub rewrite_options: RewriteOptions,
    /// Deadline for the upstream to deliver a response the proxy can start sending.
    pub request_timeout: Duration,
}

/// HTTP server for the rewriting proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, ProxyError> {
        let state = AppState {
            fetcher: Fetcher::new(&config.upstream)?,
            prefix: Arc::from(config.proxy.prefix.as_str()),
            rewrite_options: RewriteOptions {
                banner: config.proxy.banner,
            },
            request_timeout: Duration::from_secs(config.timeouts.request_secs),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route(&config.proxy.prefix, get(proxy_handler))
            .route(&config.proxy.redirect_path, get(redirect_handler))
            .route(HEALTH_PATH, get(health_handler))
            .with_state(state);

        if config.static_files.enabled {
            let root = Path::new(&config.static_files.root);
            if !root.is_dir() {
                tracing::warn!(root = %root.display(), "Static root not found; UI paths will 404");
            }
            router = router.fallback_service(ServeDir::new(root));
        } else {
            router = router.fallback(not_found_handler);
        }

        router.layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuidV4))
                .layer(
                    TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                        tracing::info_span!(
                            "request",
                            method = %request.method(),
                            path = %request.uri().path(),
                            request_id = %request_id(request.headers()),
                        )
                    }),
                )
                .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
                .layer(GlobalConcurrencyLimitLayer::new(config.listener.max_connections)),
        )
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            prefix = %self.config.proxy.prefix,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(wait_for(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn not_found_handler() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not found")
}
