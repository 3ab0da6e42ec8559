//! Per-client admission control.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → pipeline/rate_limit.rs derives the client key
//!     → registry.rs resolves the client's bucket (creating it if new)
//!     → bucket.rs refills and takes one token, or rejects
//!
//! Background:
//!     → registry sweeper drops buckets idle past the eviction threshold
//! ```
//!
//! # Design Decisions
//! - One coarse mutex over the whole table; per-entry work under the
//!   lock is O(1) and the table stays small relative to request rate
//! - Time comes from an injectable clock so refill and eviction can be
//!   tested without sleeping

pub mod bucket;
pub mod clock;
pub mod registry;

pub use clock::{Clock, SystemClock};
pub use registry::{ClientRegistry, LimitPolicy};
