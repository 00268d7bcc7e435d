//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, limits, request ID, metrics)
//! - Own the root request context and cancel it on shutdown
//! - Drain connections within the configured grace period

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    http::Request,
    middleware,
    routing::get,
    Router,
};
use futures_util::future::Either;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::context::{race, Context};
use crate::http::request::{RequestUuid, X_REQUEST_ID};
use crate::http::{headers, hello};
use crate::observability::metrics;
use crate::pages::{self, PageStore, Templates};

/// Error type for server setup and serving.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to compile page templates: {0}")]
    Templates(#[from] minijinja::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Parent of every request context; cancelled on shutdown.
    pub root: Context,
    pub config: Arc<ServerConfig>,
    pub store: Arc<dyn PageStore>,
    pub templates: Arc<Templates>,
}

/// HTTP server.
pub struct HttpServer {
    router: Router,
    config: Arc<ServerConfig>,
    root: Context,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and page store.
    pub fn new(config: ServerConfig, store: Arc<dyn PageStore>) -> Result<Self, ServerError> {
        let config = Arc::new(config);
        let root = Context::background();

        let state = AppState {
            root: root.clone(),
            config: config.clone(),
            store,
            templates: Arc::new(Templates::load()?),
        };

        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            config,
            root,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route("/hello", get(hello::hello))
            .route("/headers", get(headers::headers));

        if config.pages.enabled {
            router = router.merge(pages::routes());
        }

        router
            .with_state(state)
            .layer(middleware::from_fn(metrics::track_requests))
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TraceLayer::new_for_http().make_span_with(request_span))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, RequestUuid))
    }

    /// Run the server until `shutdown` fires, then drain.
    ///
    /// On shutdown the root context is cancelled so in-flight requests finish
    /// with "context canceled". After the grace period `run` returns without
    /// waiting for connections that are still open; their tasks keep running
    /// until the runtime shuts down.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let root = self.root.clone();
        let grace = self.config.timeouts.shutdown_grace();

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        let serve = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown requested, cancelling in-flight requests");
                root.cancel();
            })
            .into_future();

        let drain_deadline = {
            let root = self.root.clone();
            async move {
                root.done().await;
                tokio::time::sleep(grace).await;
            }
        };

        match race(serve, drain_deadline).await {
            Either::Left(result) => result?,
            Either::Right(()) => tracing::warn!(
                grace_secs = grace.as_secs(),
                "Drain grace period elapsed, returning with connections still open"
            ),
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The router, for driving the server without a listener.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// The context every request context derives from.
    pub fn root_context(&self) -> &Context {
        &self.root
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

fn request_span(request: &Request<Body>) -> tracing::Span {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
    )
}
