//! Lifecycle management.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Load config → Validate → Build stores/registry → Bind → Serve
//!
//! Shutdown:
//!     Ctrl+C → serve loop drains → Shutdown::trigger()
//!         → registry sweeper stops → process exits
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
