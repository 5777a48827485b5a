//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with a catch-all dispatch handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Cap requests in flight across the whole router, not per route
//! - Bind server to listener
//! - Hand every request to the prefix dispatcher

use std::time::Duration;

use axum::{
    body::Body,
    extract::{self, State},
    http::Request,
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower::limit::{ConcurrencyLimit, ConcurrencyLimitLayer};
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::Instrument;

use crate::config::GatewayConfig;
use crate::http::request::{request_id, RequestIdLayer};
use crate::lifecycle::shutdown::wait_for_trigger;
use crate::routing::{BindingTable, Dispatcher};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Dispatcher,
}

/// HTTP server fronting the mounted handler groups.
pub struct HttpServer {
    router: Router,
    dispatcher: Dispatcher,
    max_in_flight: usize,
}

impl HttpServer {
    /// Create a new HTTP server serving `table`.
    pub fn new(table: BindingTable, config: &GatewayConfig) -> Self {
        let dispatcher = Dispatcher::new(table);

        for binding in dispatcher.table().bindings() {
            tracing::info!(
                mount = %binding.name(),
                prefix = %binding.prefix(),
                "Mount active"
            );
        }

        let state = AppState {
            dispatcher: dispatcher.clone(),
        };
        let router = Self::build_router(config, state);
        Self {
            router,
            dispatcher,
            max_in_flight: config.listener.max_in_flight,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(dispatch_handler))
            .route("/", any(dispatch_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// The composed router, for embedding or in-process testing.
    ///
    /// Carries no concurrency limit; see [`HttpServer::service`].
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// The router behind one semaphore of `max_in_flight` permits.
    ///
    /// `Router::layer` would give every route its own semaphore, so the
    /// limit wraps the finished router instead. Clones share the permits.
    pub fn service(&self) -> ConcurrencyLimit<Router> {
        ServiceBuilder::new()
            .layer(ConcurrencyLimitLayer::new(self.max_in_flight))
            .service(self.router.clone())
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: watch::Receiver<bool>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            mounts = self.dispatcher.table().len(),
            max_in_flight = self.max_in_flight,
            "HTTP server starting"
        );

        let service = axum::ServiceExt::<extract::Request>::into_make_service(self.service());
        axum::serve(listener, service)
            .with_graceful_shutdown(async move {
                wait_for_trigger(shutdown).await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Catch-all handler. Delegates to the prefix dispatcher.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let span = tracing::debug_span!(
        "dispatch",
        request_id = request_id(&request).unwrap_or("unknown"),
    );
    state.dispatcher.dispatch(request).instrument(span).await
}
