//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the inspection endpoints and the asset handler
//! - Wire up middleware (host check, tracing, timeout, request ID, headers)
//! - Bind server to listener
//! - Serve files that exist on disk; classify every other path and serve the
//!   rewritten asset or the shell document

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{header, Method, Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin::setup_admin_router;
use crate::config::{AssetsConfig, DevServerConfig};
use crate::http::request::{decode_path, MakeRequestUuidV4, RequestIdExt};
use crate::http::response::{not_found, resolve_file, serve_file};
use crate::observability::metrics;
use crate::routing::{Resolver, RuleSetError};
use crate::security::headers::apply_response_headers;
use crate::security::host_check::{host_check_middleware, HostPolicy};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<Resolver>,
    pub assets: Arc<AssetsConfig>,
    pub environment: Option<Arc<str>>,
}

/// HTTP server for the SPA dev server.
pub struct HttpServer {
    router: Router,
    config: DevServerConfig,
    resolver: Arc<Resolver>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Fails if any rewrite rule does not compile.
    pub fn new(config: DevServerConfig) -> Result<Self, RuleSetError> {
        let resolver = Arc::new(Resolver::from_config(&config)?);

        let state = AppState {
            resolver: resolver.clone(),
            assets: Arc::new(config.assets.clone()),
            environment: config.environment.as_deref().map(Arc::from),
        };

        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            config,
            resolver,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &DevServerConfig, state: AppState) -> Router {
        let mut app = Router::new();
        if config.admin.enabled {
            app = app.merge(setup_admin_router(&config.admin.prefix));
        }

        let host_policy = Arc::new(HostPolicy::from_config(&config.host_check));

        let app = app
            .fallback(serve_handler)
            .with_state(state)
            .layer(middleware::from_fn_with_state(host_policy, host_check_middleware))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4));

        apply_response_headers(app, &config.headers)
    }

    /// Run the server, accepting connections on the given listener until shutdown.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            public_path = %self.resolver.base_path().as_public_path(),
            directory = %self.config.assets.directory.display(),
            rules = self.resolver.rules().len(),
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The fully layered router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &DevServerConfig {
        &self.config
    }

    pub fn resolver(&self) -> &Arc<Resolver> {
        &self.resolver
    }
}

/// Asset handler.
/// Serves an existing file directly; otherwise classifies the path and serves
/// the rewritten asset or the shell document.
async fn serve_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request.request_id().to_string();
    let method = request.method().clone();

    if method != Method::GET && method != Method::HEAD {
        metrics::record_request(method.as_str(), 405, "rejected", start_time);
        return (
            StatusCode::METHOD_NOT_ALLOWED,
            [(header::ALLOW, "GET, HEAD")],
            "Method not allowed",
        )
            .into_response();
    }

    let Some(path) = decode_path(request.uri().path()) else {
        tracing::warn!(
            request_id = %request_id,
            raw_path = %request.uri().path(),
            "Request path is not valid UTF-8"
        );
        metrics::record_request(method.as_str(), 400, "rejected", start_time);
        return (StatusCode::BAD_REQUEST, "Malformed request path").into_response();
    };

    // Files that exist on disk are served as-is; rules only apply to the rest
    let local = state.resolver.base_path().strip(&path);
    let index_file = &state.assets.index_file;
    if let Some(file) = resolve_file(&state.assets.directory, local, index_file) {
        tracing::debug!(
            request_id = %request_id,
            path = %path,
            file = %file.display(),
            "Serving existing file"
        );
        let response = serve_file(&file, request).await;
        let status = response.status().as_u16();
        metrics::record_request(method.as_str(), status, "static", start_time);
        return response;
    }

    let decision = state.resolver.classify(&path);
    let outcome = decision.resolution.outcome();
    let target = decision.resolution.target();
    metrics::record_resolution(outcome, decision.rule);

    tracing::debug!(
        request_id = %request_id,
        path = %path,
        outcome,
        target = %target,
        rule = decision.rule.unwrap_or("-"),
        "Resolved request path"
    );

    let Some(file) = resolve_file(&state.assets.directory, target, index_file) else {
        metrics::record_request(method.as_str(), 404, outcome, start_time);
        if decision.resolution.is_fallback() {
            tracing::warn!(
                request_id = %request_id,
                target = %target,
                directory = %state.assets.directory.display(),
                "Application shell not found"
            );
            return not_found("Application shell not found");
        }
        tracing::debug!(request_id = %request_id, target = %target, "Asset not found");
        return not_found("Not found");
    };

    let response = serve_file(&file, request).await;
    metrics::record_request(method.as_str(), response.status().as_u16(), outcome, start_time);
    response
}
