//! Async WebSocket connection to an InputLayer server.
//!
//! One connection serves one session: authenticate once, then issue
//! programs one at a time. Streamed results are reassembled into a single
//! [`CommandResult`]; notifications arriving between result frames are
//! skipped (this client does not dispatch them).

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use inputlayer_core::executor::{value_from_json, CommandResult};
use inputlayer_core::meta;
use inputlayer_core::types::Value;

use crate::error::{ClientError, Result};
use crate::protocol::{ClientMessage, ServerMessage};

/// Session details returned by a successful authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    /// Session identifier.
    pub session_id: String,
    /// The knowledge graph the session starts bound to.
    pub knowledge_graph: String,
    /// Server version.
    pub version: String,
    /// Granted role.
    pub role: String,
}

/// An authenticated-capable WebSocket connection.
pub struct Connection {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl Connection {
    /// Opens a WebSocket connection to `url`
    /// (e.g. `ws://localhost:8080/ws`).
    ///
    /// # Errors
    ///
    /// Returns a transport error when the connection cannot be
    /// established.
    pub async fn connect(url: &str) -> Result<Self> {
        info!(url, "Connecting to InputLayer server");
        let (ws, _response) = connect_async(url).await?;
        Ok(Self { ws })
    }

    /// Authenticates with username and password.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AuthFailed`] when the server rejects the
    /// credentials.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<SessionInfo> {
        self.send(&ClientMessage::Login {
            username: username.to_string(),
            password: password.to_string(),
        })
        .await?;
        self.await_authenticated().await
    }

    /// Authenticates with an API key.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AuthFailed`] when the server rejects the
    /// key.
    pub async fn authenticate(&mut self, api_key: &str) -> Result<SessionInfo> {
        self.send(&ClientMessage::Authenticate {
            api_key: api_key.to_string(),
        })
        .await?;
        self.await_authenticated().await
    }

    /// Binds this session to a knowledge graph.
    ///
    /// # Errors
    ///
    /// Propagates execution failures from the server.
    pub async fn use_kg(&mut self, name: &str) -> Result<CommandResult> {
        self.execute(&meta::kg_use(name)).await
    }

    /// Executes one textual program and returns one tabular result.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Server`] when the engine rejects the
    /// program, and transport/protocol errors otherwise.
    pub async fn execute(&mut self, program: &str) -> Result<CommandResult> {
        debug!(program, "Executing program");
        self.send(&ClientMessage::Execute {
            program: program.to_string(),
        })
        .await?;

        loop {
            match self.recv().await? {
                ServerMessage::Result(payload) => {
                    let rows = convert_rows(&payload.rows)?;
                    return Ok(CommandResult {
                        columns: payload.columns,
                        rows,
                    });
                }
                ServerMessage::ResultStart(start) => {
                    return self.collect_stream(start.columns).await;
                }
                ServerMessage::Error { message, .. } => {
                    return Err(ClientError::Server(message));
                }
                ServerMessage::Pong => {}
                msg if msg.is_notification() => {
                    debug!(?msg, "Skipping notification during execute");
                }
                other => {
                    return Err(ClientError::Protocol(format!(
                        "unexpected message during execute: {other:?}"
                    )));
                }
            }
        }
    }

    /// Probes connection liveness.
    ///
    /// # Errors
    ///
    /// Returns a protocol error when the server answers with anything
    /// but `pong`.
    pub async fn ping(&mut self) -> Result<()> {
        self.send(&ClientMessage::Ping).await?;
        loop {
            match self.recv().await? {
                ServerMessage::Pong => return Ok(()),
                msg if msg.is_notification() => {}
                other => {
                    return Err(ClientError::Protocol(format!(
                        "unexpected message during ping: {other:?}"
                    )));
                }
            }
        }
    }

    /// Closes the connection.
    ///
    /// # Errors
    ///
    /// Propagates transport failures from the close handshake.
    pub async fn close(&mut self) -> Result<()> {
        self.ws.close(None).await?;
        Ok(())
    }

    async fn collect_stream(&mut self, columns: Vec<String>) -> Result<CommandResult> {
        let mut rows: Vec<Vec<Value>> = Vec::new();
        loop {
            match self.recv().await? {
                ServerMessage::ResultChunk(chunk) => {
                    rows.extend(convert_rows(&chunk.rows)?);
                }
                ServerMessage::ResultEnd(end) => {
                    if end.row_count as usize != rows.len() {
                        warn!(
                            expected = end.row_count,
                            received = rows.len(),
                            "Streamed result row count mismatch"
                        );
                    }
                    return Ok(CommandResult { columns, rows });
                }
                ServerMessage::Error { message, .. } => {
                    return Err(ClientError::Server(message));
                }
                msg if msg.is_notification() => {
                    debug!(?msg, "Skipping notification during stream");
                }
                other => {
                    return Err(ClientError::Protocol(format!(
                        "unexpected message during result stream: {other:?}"
                    )));
                }
            }
        }
    }

    async fn await_authenticated(&mut self) -> Result<SessionInfo> {
        loop {
            match self.recv().await? {
                ServerMessage::Authenticated {
                    session_id,
                    knowledge_graph,
                    version,
                    role,
                } => {
                    info!(session_id, knowledge_graph, "Authenticated");
                    return Ok(SessionInfo {
                        session_id,
                        knowledge_graph,
                        version,
                        role,
                    });
                }
                ServerMessage::AuthError { message } => {
                    return Err(ClientError::AuthFailed(message));
                }
                msg if msg.is_notification() => {}
                other => {
                    return Err(ClientError::Protocol(format!(
                        "unexpected message during authentication: {other:?}"
                    )));
                }
            }
        }
    }

    async fn send(&mut self, msg: &ClientMessage) -> Result<()> {
        let text = serde_json::to_string(msg)?;
        self.ws.send(Message::Text(text)).await?;
        Ok(())
    }

    async fn recv(&mut self) -> Result<ServerMessage> {
        loop {
            let frame = self
                .ws
                .next()
                .await
                .ok_or(ClientError::ConnectionClosed)??;
            match frame {
                Message::Text(text) => {
                    return Ok(serde_json::from_str(&text)?);
                }
                Message::Binary(bytes) => {
                    return Ok(serde_json::from_slice(&bytes)?);
                }
                Message::Close(_) => return Err(ClientError::ConnectionClosed),
                // Transport pings are answered by the stream itself.
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
            }
        }
    }
}

fn convert_rows(raw: &[Vec<serde_json::Value>]) -> Result<Vec<Vec<Value>>> {
    raw.iter()
        .map(|row| {
            row.iter()
                .map(|cell| value_from_json(cell).map_err(ClientError::from))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::convert_rows;
    use inputlayer_core::types::Value;
    use serde_json::json;

    #[test]
    fn test_convert_rows() {
        let raw = vec![
            vec![json!(1), json!("Alice"), json!(true)],
            vec![json!(2), json!("Bob"), json!(false)],
        ];
        let rows = convert_rows(&raw).unwrap();
        assert_eq!(
            rows[0],
            vec![Value::Int(1), Value::Str("Alice".into()), Value::Bool(true)]
        );
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_convert_rows_rejects_objects() {
        let raw = vec![vec![json!({"nested": 1})]];
        assert!(convert_rows(&raw).is_err());
    }
}
