//! HTTP server setup and the proxy handler.
//!
//! # Responsibilities
//! - Create the Axum Router; every path and method goes to one handler
//! - Build the pipeline components from the validated config, once
//! - Run each request through clean → resolve → sanitize → (log) →
//!   dispatch → relay
//! - Convert every request-level failure into a plain-text 500
//! - Graceful shutdown on signal or coordinator trigger

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::ProxyConfig;
use crate::error::Result;
use crate::http::dispatch::Dispatcher;
use crate::http::request::{BodyStrategy, IncomingRequest};
use crate::http::response::relay_response;
use crate::lifecycle::signals::wait_for_signal;
use crate::observability::{metrics, LogSink, RequestLogger, TracingSink};
use crate::routing::{TargetResolver, UrlCleaner};
use crate::security::HeaderSanitizer;

/// Application state injected into handlers. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub cleaner: Arc<UrlCleaner>,
    pub resolver: Arc<TargetResolver>,
    pub sanitizer: Arc<HeaderSanitizer>,
    pub logger: Arc<RequestLogger>,
    pub dispatcher: Dispatcher,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn from_config(config: &ProxyConfig, sink: Arc<dyn LogSink>) -> std::result::Result<Self, reqwest::Error> {
        Ok(Self {
            cleaner: Arc::new(UrlCleaner::new(&config.rewrite.proxy_host)),
            resolver: Arc::new(TargetResolver::new(config.rewrite.default_backend.clone())),
            sanitizer: Arc::new(HeaderSanitizer::from_config(&config.headers)),
            logger: Arc::new(RequestLogger::from_config(&config.request_log, sink)),
            dispatcher: Dispatcher::new(&config.client)?,
            max_body_bytes: config.request_log.max_body_bytes,
        })
    }
}

/// HTTP server for the forwarding proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a server that writes request logs to the console.
    pub fn new(config: ProxyConfig) -> std::result::Result<Self, reqwest::Error> {
        Self::with_sink(config, Arc::new(TracingSink))
    }

    /// Create a server that writes request logs to `sink`.
    pub fn with_sink(config: ProxyConfig, sink: Arc<dyn LogSink>) -> std::result::Result<Self, reqwest::Error> {
        let state = AppState::from_config(&config, sink)?;
        let router = Self::build_router(state);
        Ok(Self { router, config })
    }

    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// The fully layered router, for driving the proxy without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until a shutdown signal arrives on `shutdown` or from
    /// the OS.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> std::result::Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown.recv() => {}
                    _ = wait_for_signal() => {}
                }
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Main proxy handler.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();

    let incoming = IncomingRequest::from_request(request, &state.cleaner);
    let url = incoming.url.clone();
    let logged = state.logger.should_log(&url);

    let response = match forward(&state, incoming).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(method = %method, url = %url, error = %e, "Proxy Error");
            e.into_response()
        }
    };

    metrics::record_request(method.as_str(), response.status().as_u16(), logged, start_time);
    response
}

async fn forward(state: &AppState, incoming: IncomingRequest) -> Result<Response> {
    let (target, rule) = state.resolver.resolve_with_rule(&incoming.url)?;
    let strategy = BodyStrategy::select(&state.logger, &incoming.url, state.max_body_bytes);

    tracing::debug!(
        method = %incoming.method,
        url = %incoming.url,
        target = %target,
        rule = ?rule,
        strategy = ?strategy,
        "Proxying request"
    );

    let plan = strategy
        .build_plan(
            incoming,
            target,
            &state.cleaner,
            &state.sanitizer,
            &state.logger,
        )
        .await?;

    let upstream = state.dispatcher.dispatch(plan).await?;
    Ok(relay_response(upstream, &state.sanitizer))
}
