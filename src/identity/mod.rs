//! Caller identity: principals, bearer credentials, and the external
//! store seams that resolve them.
//!
//! # Data Flow
//! ```text
//! Authorization header
//!     → token.rs (scheme + surface shape checks)
//!     → store.rs TokenStore (plaintext → User, authentication scope)
//!     → principal.rs Principal attached to the request
//!
//! Authorization stage:
//!     Principal → store.rs PermissionStore → PermissionSet → allow/deny
//! ```
//!
//! # Design Decisions
//! - Credentials are never persisted by this crate
//! - Permissions are fetched per request, never cached across requests,
//!   so revocation takes effect immediately

pub mod principal;
pub mod store;
pub mod token;

pub use principal::{PermissionSet, Principal, User};
pub use store::{InMemoryStore, PermissionStore, StoreError, TokenStore};
pub use token::TokenScope;
