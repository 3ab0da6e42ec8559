//! HTTP surface: server assembly, rejection responses, and the demo
//! handlers that sit behind the gate.

pub mod error;
pub mod handlers;
pub mod server;

pub use error::GateError;
pub use server::{AppState, GateServer};
