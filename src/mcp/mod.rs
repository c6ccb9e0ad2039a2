//! Model Context Protocol (MCP) server implementation.
//!
//! This module exposes the lamp as MCP tools and resources. The server
//! communicates over stdio using line-delimited JSON messages.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         MCP Server                          │
//! │                                                             │
//! │   ┌─────────────┐    ┌─────────────┐    ┌─────────────┐    │
//! │   │  Transport  │───▶│   Session   │───▶│ Tools and   │    │
//! │   │   (stdio)   │    │   Engine    │    │ Resources   │    │
//! │   └─────────────┘    └─────────────┘    └─────────────┘    │
//! │                             │                  │            │
//! │                             ▼                  ▼            │
//! │                      ┌─────────────────────────────┐       │
//! │                      │     Lamp (GPIO output)      │       │
//! │                      └─────────────────────────────┘       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Protocol Version
//!
//! This implementation reports MCP protocol version 2024-11-05.

pub mod protocol;
pub mod resources;
pub mod server;
pub mod session;
pub mod tools;
pub mod transport;

pub use protocol::{ErrorCode, McpError, Response, MCP_PROTOCOL_VERSION};
pub use server::McpServer;
pub use session::SessionEngine;
pub use transport::StdioTransport;
