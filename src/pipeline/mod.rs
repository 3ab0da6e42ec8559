//! The request-gating middleware chain.
//!
//! # Data Flow
//! ```text
//! Incoming request (outermost first):
//!     → recover.rs (panic containment around everything below)
//!     → rate_limit.rs (per-client admission before any expensive work)
//!     → auth.rs authenticate (credential → Principal)
//!     → auth.rs require_permission (per protected route)
//!     → terminal handler
//! ```
//!
//! # Design Decisions
//! - Rate limiting runs before authentication so abusive clients never
//!   trigger external token lookups
//! - Authorization is a route-specific layer; routes without one still
//!   authenticate, so anonymous access stays possible where intended
//! - Every rejection short-circuits the chain; no stage swallows errors

pub mod auth;
pub mod rate_limit;
pub mod recover;
