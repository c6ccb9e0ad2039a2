//! MCP server loop for the lamp.
//!
//! Reads one message per line, hands it to the [`SessionEngine`] and writes
//! the response back. The loop ends on end of input or on a shutdown
//! signal; the live session is then closed, which switches the lamp off.

use std::io;

use tokio::io::{AsyncBufRead, AsyncWrite};

use crate::mcp::session::SessionEngine;
use crate::mcp::transport::StdioTransport;

/// Server state in the run loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Serving requests.
    Running,
    /// Shutdown in progress.
    ShuttingDown,
}

/// The MCP server for the lamp.
pub struct McpServer<R = tokio::io::BufReader<tokio::io::Stdin>, W = tokio::io::Stdout> {
    /// Current server state.
    state: ServerState,
    /// The transport layer.
    transport: StdioTransport<R, W>,
    /// Protocol state and the lamp.
    engine: SessionEngine,
}

impl McpServer {
    /// Creates a server on stdin/stdout.
    #[must_use]
    pub fn new(engine: SessionEngine) -> Self {
        Self::with_transport(engine, StdioTransport::new())
    }
}

impl<R, W> McpServer<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a server on the given transport.
    pub const fn with_transport(engine: SessionEngine, transport: StdioTransport<R, W>) -> Self {
        Self {
            state: ServerState::Running,
            transport,
            engine,
        }
    }

    /// Returns the current server state.
    #[must_use]
    pub const fn state(&self) -> ServerState {
        self.state
    }

    /// Returns the session engine.
    #[must_use]
    pub const fn engine(&self) -> &SessionEngine {
        &self.engine
    }

    /// Consumes the server and returns the transport.
    pub fn into_transport(self) -> StdioTransport<R, W> {
        self.transport
    }

    /// Serves requests until end of input, without signal handling.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails. The session is closed
    /// either way.
    pub async fn serve(&mut self) -> io::Result<()> {
        let result = loop {
            let line_result = self.transport.read_line().await;
            match self.handle_transport_result(line_result).await {
                Ok(true) => break Ok(()),
                Ok(false) => {}
                Err(e) => break Err(e),
            }
        };
        self.shutdown();
        result
    }

    /// Handles the result from transport read.
    ///
    /// Returns `true` if the server should shut down.
    async fn handle_transport_result(
        &mut self,
        line_result: io::Result<Option<String>>,
    ) -> io::Result<bool> {
        let Some(line) = line_result? else {
            tracing::info!("Input closed");
            self.state = ServerState::ShuttingDown;
            return Ok(true);
        };

        if line.trim().is_empty() {
            return Ok(false);
        }

        let response = self.engine.handle(&line);
        self.transport.write_line(&response).await?;

        Ok(false)
    }

    /// Closes the live session, switching the lamp off.
    fn shutdown(&mut self) {
        self.state = ServerState::ShuttingDown;
        if self.engine.close_current() {
            tracing::info!("Closed active session on shutdown");
        }
    }
}

impl McpServer {
    /// Runs the MCP server main loop with graceful shutdown handling.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails.
    pub async fn run(&mut self) -> io::Result<()> {
        let result = self.run_with_shutdown().await;
        self.shutdown();
        result
    }

    /// Runs the main loop and handles shutdown.
    #[cfg(unix)]
    async fn run_with_shutdown(&mut self) -> io::Result<()> {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt()).map_err(io::Error::other)?;
        let mut sigterm = signal(SignalKind::terminate()).map_err(io::Error::other)?;

        loop {
            tokio::select! {
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT, initiating graceful shutdown");
                    return Ok(());
                }

                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM, initiating graceful shutdown");
                    return Ok(());
                }

                line_result = self.transport.read_line() => {
                    if self.handle_transport_result(line_result).await? {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Runs the main loop and handles shutdown.
    #[cfg(windows)]
    async fn run_with_shutdown(&mut self) -> io::Result<()> {
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = &mut ctrl_c => {
                    tracing::info!("Received Ctrl+C, initiating graceful shutdown");
                    return Ok(());
                }

                line_result = self.transport.read_line() => {
                    if self.handle_transport_result(line_result).await? {
                        return Ok(());
                    }
                }
            }
        }
    }
}
