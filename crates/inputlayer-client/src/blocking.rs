//! Blocking wrapper over the async connection.
//!
//! The migration engine is synchronous; this wrapper owns a
//! current-thread Tokio runtime and blocks on the async connection,
//! implementing the core [`Execute`] contract.

use inputlayer_core::executor::{CommandResult, Execute, ExecuteError};
use tokio::runtime::{Builder, Runtime};

use crate::connection::{Connection, SessionInfo};
use crate::error::Result;

/// A synchronous connection to an InputLayer server.
pub struct BlockingConnection {
    runtime: Runtime,
    conn: Connection,
}

impl BlockingConnection {
    /// Opens a connection to `url`.
    ///
    /// # Errors
    ///
    /// Returns a transport error when the connection cannot be
    /// established.
    ///
    /// # Panics
    ///
    /// Panics if the Tokio runtime cannot be created.
    pub fn connect(url: &str) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("failed to build Tokio runtime");
        let conn = runtime.block_on(Connection::connect(url))?;
        Ok(Self { runtime, conn })
    }

    /// Authenticates with username and password.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AuthFailed`](crate::error::ClientError::AuthFailed)
    /// when the server rejects the credentials.
    pub fn login(&mut self, username: &str, password: &str) -> Result<SessionInfo> {
        self.runtime.block_on(self.conn.login(username, password))
    }

    /// Authenticates with an API key.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AuthFailed`](crate::error::ClientError::AuthFailed)
    /// when the server rejects the key.
    pub fn authenticate(&mut self, api_key: &str) -> Result<SessionInfo> {
        self.runtime.block_on(self.conn.authenticate(api_key))
    }

    /// Binds this session to a knowledge graph.
    ///
    /// # Errors
    ///
    /// Propagates execution failures from the server.
    pub fn use_kg(&mut self, name: &str) -> Result<CommandResult> {
        self.runtime.block_on(self.conn.use_kg(name))
    }

    /// Executes one textual program.
    ///
    /// # Errors
    ///
    /// Propagates execution and transport failures.
    pub fn execute(&mut self, program: &str) -> Result<CommandResult> {
        self.runtime.block_on(self.conn.execute(program))
    }

    /// Closes the connection.
    ///
    /// # Errors
    ///
    /// Propagates transport failures from the close handshake.
    pub fn close(&mut self) -> Result<()> {
        self.runtime.block_on(self.conn.close())
    }
}

impl Execute for BlockingConnection {
    fn execute(&mut self, program: &str) -> std::result::Result<CommandResult, ExecuteError> {
        BlockingConnection::execute(self, program).map_err(|e| ExecuteError(e.to_string()))
    }
}
