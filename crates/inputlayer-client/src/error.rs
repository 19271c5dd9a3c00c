//! Error types for the client.

use inputlayer_core::error::CompileError;

/// Errors raised by the WebSocket client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level WebSocket failure.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// The server closed the connection.
    #[error("Connection closed by server")]
    ConnectionClosed,

    /// A message failed to (de)serialize.
    #[error("Protocol serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// The server sent a message the protocol does not allow here.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Authentication was rejected.
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    /// The engine rejected a program.
    #[error("Server error: {0}")]
    Server(String),

    /// A result cell could not be converted to a runtime value.
    #[error(transparent)]
    Value(#[from] CompileError),
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
