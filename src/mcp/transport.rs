//! stdio transport for the MCP server.
//!
//! - Messages are UTF-8 encoded JSON, one per line
//! - Messages must not contain embedded newlines
//! - stdin: receives messages from client
//! - stdout: sends messages to client
//! - stderr: may be used for logging (not MCP messages)

use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// A line-delimited MCP transport.
///
/// Generic over the reader and writer so tests can drive it with in-memory
/// buffers; [`StdioTransport::new`] binds it to the process's stdin/stdout.
pub struct StdioTransport<R = BufReader<tokio::io::Stdin>, W = tokio::io::Stdout> {
    /// Buffered reader for incoming messages.
    reader: R,
    /// Sink for outgoing messages.
    writer: W,
}

impl StdioTransport {
    /// Creates a transport on stdin/stdout.
    #[must_use]
    pub fn new() -> Self {
        Self::with_io(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, W> StdioTransport<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a transport over an arbitrary reader/writer pair.
    pub const fn with_io(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Reads the next message line.
    ///
    /// Returns `None` if the input is closed (EOF). Bytes that are not valid
    /// UTF-8 are replaced with U+FFFD, so a corrupt line still reaches the
    /// engine and is answered as malformed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails.
    pub async fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut buf = Vec::new();
        let bytes_read = self.reader.read_until(b'\n', &mut buf).await?;

        if bytes_read == 0 {
            return Ok(None);
        }

        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }

        Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
    }

    /// Writes one serialised message with newline termination.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub async fn write_line(&mut self, json: &str) -> io::Result<()> {
        debug_assert!(
            !json.contains('\n'),
            "JSON message must not contain embedded newlines"
        );

        self.writer.write_all(json.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;

        Ok(())
    }

    /// Consumes the transport and returns the writer.
    pub fn into_writer(self) -> W {
        self.writer
    }
}
