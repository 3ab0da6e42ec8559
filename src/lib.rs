//! Request-gating pipeline fronting an HTTP API.
//!
//! Every inbound request passes through an ordered chain of cross-cutting
//! stages before its handler runs: panic containment, per-client rate
//! limiting, bearer-token authentication, and per-route permission checks.
//! Persistence is an external collaborator behind the store traits in
//! [`identity::store`].

// Core subsystems
pub mod config;
pub mod http;
pub mod pipeline;

// Gate state
pub mod identity;
pub mod limiter;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::GateConfig;
pub use http::server::GateServer;
pub use lifecycle::Shutdown;
