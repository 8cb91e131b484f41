//! MCP server configuration and runtime.

pub mod config;
pub mod runtime;
