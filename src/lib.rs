//! lamp-mcp: MCP server for switching a GPIO-driven lamp
//!
//! This library exposes a single lamp (typically behind a relay on a GPIO
//! line) to AI assistants as MCP tools and a status resource.
//!
//! # Architecture
//!
//! - **Session engine**: tracks the single protocol session, validates and
//!   routes each request, builds the response envelope
//! - **Lamp facade**: remembers the last commanded state of the output and
//!   issues exactly one hardware write per command
//!
//! # Modules
//!
//! - [`config`] — Configuration loading and validation
//! - [`error`] — Error types
//! - [`lamp`] — Lamp facade and GPIO output drivers
//! - [`mcp`] — MCP protocol implementation

pub mod config;
pub mod error;
pub mod lamp;
pub mod mcp;
