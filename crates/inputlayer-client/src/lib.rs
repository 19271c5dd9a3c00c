//! WebSocket client for the InputLayer knowledge-graph engine.
//!
//! The client speaks the JSON wire protocol over a persistent WebSocket:
//! authenticate once, then execute textual programs one at a time.
//! Streamed results are reassembled into complete tabular results.
//!
//! [`blocking::BlockingConnection`] implements the core
//! [`Execute`](inputlayer_core::executor::Execute) contract for
//! synchronous callers such as the migration CLI.

pub mod blocking;
pub mod connection;
pub mod error;
pub mod protocol;

pub use blocking::BlockingConnection;
pub use connection::{Connection, SessionInfo};
pub use error::{ClientError, Result};
