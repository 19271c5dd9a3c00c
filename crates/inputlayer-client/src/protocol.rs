//! WebSocket wire protocol: typed client and server messages.
//!
//! Every frame is a JSON object tagged by a `type` field.

use serde::{Deserialize, Serialize};

/// Messages sent from the client to the server.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Username/password login.
    Login {
        /// Account username.
        username: String,
        /// Account password.
        password: String,
    },

    /// API-key authentication.
    Authenticate {
        /// The API key.
        api_key: String,
    },

    /// Execute one textual Datalog program.
    Execute {
        /// The program text.
        program: String,
    },

    /// Liveness probe.
    Ping,
}

/// A complete tabular result.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResultPayload {
    /// Column names.
    pub columns: Vec<String>,
    /// Result rows as raw JSON cells.
    pub rows: Vec<Vec<serde_json::Value>>,
    /// Number of rows in this message.
    pub row_count: u64,
    /// Total matching rows server-side.
    pub total_count: u64,
    /// Whether the result was truncated.
    pub truncated: bool,
    /// Server-side execution time.
    pub execution_time_ms: u64,
    /// Per-row provenance labels, when requested.
    #[serde(default)]
    pub row_provenance: Option<Vec<String>>,
    /// Free-form result metadata.
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    /// Set when the command switched the bound knowledge graph.
    #[serde(default)]
    pub switched_kg: Option<String>,
}

/// Header of a streamed result.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResultStartPayload {
    /// Column names.
    pub columns: Vec<String>,
    /// Total matching rows server-side.
    pub total_count: u64,
    /// Whether the result will be truncated.
    pub truncated: bool,
    /// Server-side execution time.
    pub execution_time_ms: u64,
    /// Free-form result metadata.
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    /// Set when the command switched the bound knowledge graph.
    #[serde(default)]
    pub switched_kg: Option<String>,
}

/// One chunk of a streamed result.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResultChunkPayload {
    /// Rows in this chunk.
    pub rows: Vec<Vec<serde_json::Value>>,
    /// Zero-based chunk index.
    pub chunk_index: u64,
    /// Per-row provenance labels, when requested.
    #[serde(default)]
    pub row_provenance: Option<Vec<String>>,
}

/// Trailer of a streamed result.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResultEndPayload {
    /// Total rows delivered.
    pub row_count: u64,
    /// Total chunks delivered.
    pub chunk_count: u64,
}

/// An asynchronous server notification.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Notification {
    /// Monotonic notification sequence number.
    pub seq: u64,
    /// Server timestamp in Unix milliseconds.
    pub timestamp_ms: i64,
    /// Originating session, when scoped.
    #[serde(default)]
    pub session_id: Option<String>,
    /// Affected knowledge graph.
    #[serde(default)]
    pub knowledge_graph: Option<String>,
    /// Affected relation (persistent updates).
    #[serde(default)]
    pub relation: Option<String>,
    /// Operation kind (persistent updates).
    #[serde(default)]
    pub operation: Option<String>,
    /// Affected tuple count (persistent updates).
    #[serde(default)]
    pub count: Option<u64>,
    /// Affected rule (rule changes).
    #[serde(default)]
    pub rule_name: Option<String>,
    /// Affected entity (schema changes).
    #[serde(default)]
    pub entity: Option<String>,
}

/// Messages sent from the server to the client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Authentication succeeded.
    Authenticated {
        /// Session identifier.
        session_id: String,
        /// The knowledge graph the session is bound to.
        knowledge_graph: String,
        /// Server version.
        version: String,
        /// Granted role.
        role: String,
    },

    /// Authentication failed.
    AuthError {
        /// Failure reason.
        message: String,
    },

    /// A complete result.
    Result(ResultPayload),

    /// A command failed.
    Error {
        /// Failure reason.
        message: String,
        /// Structured validation failures, when present.
        #[serde(default)]
        validation_errors: Option<serde_json::Value>,
    },

    /// Start of a streamed result.
    ResultStart(ResultStartPayload),

    /// One chunk of a streamed result.
    ResultChunk(ResultChunkPayload),

    /// End of a streamed result.
    ResultEnd(ResultEndPayload),

    /// Liveness reply.
    Pong,

    /// Facts changed in a persistent relation.
    PersistentUpdate(Notification),

    /// A rule was created, replaced, or dropped.
    RuleChange(Notification),

    /// A knowledge graph was created or dropped.
    KgChange(Notification),

    /// A relation or index definition changed.
    SchemaChange(Notification),
}

impl ServerMessage {
    /// True for asynchronous notifications that can interleave with a
    /// command's result stream.
    #[must_use]
    pub const fn is_notification(&self) -> bool {
        matches!(
            self,
            Self::PersistentUpdate(_)
                | Self::RuleChange(_)
                | Self::KgChange(_)
                | Self::SchemaChange(_)
        )
    }
}
