//! arlmcp-core: ARL asset-reconnaissance backend exposed as MCP tools

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod aggregate;
pub mod client;
pub mod config;
pub mod error;
pub mod mcp;
pub mod modules;
pub mod pagination;
pub mod status;
pub mod text;

pub use error::{Error, Result};
