//! HTTP server assembly.
//!
//! # Responsibilities
//! - Build the axum Router and wrap the gate pipeline around it
//! - Wire ambient middleware (request ID, tracing, request timeout)
//! - Bind the listener and serve with graceful shutdown
//! - Own the registry sweeper's lifecycle

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::GateConfig;
use crate::http::handlers;
use crate::identity::store::{PermissionStore, TokenStore};
use crate::lifecycle::Shutdown;
use crate::limiter::{ClientRegistry, LimitPolicy};
use crate::pipeline;

/// Shared state injected into every pipeline stage.
///
/// Owned state, no package-level singletons: tests build as many
/// independent gates as they like, each with isolated buckets.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GateConfig>,
    pub registry: Arc<ClientRegistry>,
    pub tokens: Arc<dyn TokenStore>,
    pub permissions: Arc<dyn PermissionStore>,
}

impl AppState {
    pub fn new(
        config: GateConfig,
        tokens: Arc<dyn TokenStore>,
        permissions: Arc<dyn PermissionStore>,
    ) -> Self {
        let registry = Arc::new(ClientRegistry::new(LimitPolicy {
            requests_per_second: config.rate_limit.requests_per_second,
            burst: config.rate_limit.burst,
        }));

        Self {
            config: Arc::new(config),
            registry,
            tokens,
            permissions,
        }
    }
}

/// The assembled gate: pipeline stages wrapped around a terminal router.
pub struct GateServer {
    router: Router,
    state: AppState,
}

impl GateServer {
    /// Assemble the default API surface behind the pipeline.
    pub fn new(
        config: GateConfig,
        tokens: Arc<dyn TokenStore>,
        permissions: Arc<dyn PermissionStore>,
    ) -> Self {
        let state = AppState::new(config, tokens, permissions);
        let routes = business_routes(&state);
        Self::with_routes(state, routes)
    }

    /// Assemble the pipeline around a caller-supplied terminal router.
    pub fn with_routes(state: AppState, routes: Router) -> Self {
        let router = apply_pipeline(routes, &state);
        Self { router, state }
    }

    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// The fully-layered router, for driving the gate in-process.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Run the server until Ctrl+C, accepting connections on the given
    /// listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        self.run_until(listener, shutdown_signal()).await
    }

    /// Run the server until the given future resolves, then drain
    /// in-flight connections and stop the sweeper.
    pub async fn run_until(
        self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Gate listening");

        let stop = Shutdown::new();
        let sweeper = if self.state.config.rate_limit.enabled {
            Some(self.state.registry.spawn_sweeper(
                self.state.config.eviction.sweep_interval(),
                self.state.config.eviction.idle_threshold(),
                &stop,
            ))
        } else {
            None
        };

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await;

        stop.trigger();
        if let Some(handle) = sweeper {
            let _ = handle.await;
        }

        tracing::info!("Gate stopped");
        result
    }
}

/// The demo business surface. GET /v1/healthcheck stays anonymous;
/// the movie stubs each require one capability.
fn business_routes(state: &AppState) -> Router {
    let read = Router::new()
        .route("/v1/movies", get(handlers::list_movies))
        .route_layer(middleware::from_fn_with_state(
            (state.clone(), "movies:read"),
            pipeline::auth::require_permission,
        ));

    let write = Router::new()
        .route("/v1/movies", post(handlers::create_movie))
        .route_layer(middleware::from_fn_with_state(
            (state.clone(), "movies:write"),
            pipeline::auth::require_permission,
        ));

    Router::new()
        .route("/v1/healthcheck", get(handlers::healthcheck))
        .merge(read)
        .merge(write)
}

/// Wrap the gate stages and ambient layers around a terminal router.
///
/// `Router::layer` nests later layers outside earlier ones, so reading
/// bottom-up gives the request path: panic guard, request ID, trace,
/// timeout, rate limit, authenticate, then the routes (with their own
/// per-route authorizers).
#[allow(deprecated)]
fn apply_pipeline(routes: Router, state: &AppState) -> Router {
    routes
        .layer(middleware::from_fn_with_state(
            state.clone(),
            pipeline::auth::authenticate,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            pipeline::rate_limit::rate_limit,
        ))
        .layer(TimeoutLayer::new(state.config.timeouts.request()))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(middleware::from_fn(pipeline::recover::recover_panic))
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}
