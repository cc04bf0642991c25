//! Error types for arlmcp-core

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias using arlmcp Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for arlmcp
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Configuration error: {0}")]
    #[diagnostic(code(arlmcp::config))]
    Config(String),

    /// Timeout or connection failure before an HTTP status was obtained.
    #[error("Transport error: {0}")]
    #[diagnostic(code(arlmcp::transport))]
    Transport(String),

    /// The backend answered, but not with a 2xx status (or reported a
    /// non-200 application code on a list endpoint).
    #[error("HTTP {status}: {body}")]
    #[diagnostic(code(arlmcp::http))]
    Http { status: u16, body: String },

    /// The backend answered 2xx but the body was not the expected JSON.
    #[error("Malformed response: {0}")]
    #[diagnostic(code(arlmcp::decode))]
    Decode(String),

    #[error("Pagination budget exhausted after {pages} pages on {path}")]
    #[diagnostic(code(arlmcp::pagination))]
    PageBudget { path: String, pages: usize },

    #[error("Tool error: {0}")]
    #[diagnostic(code(arlmcp::tool))]
    Tool(String),

    #[error("IO error: {0}")]
    #[diagnostic(code(arlmcp::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(arlmcp::serde))]
    Serde(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    #[diagnostic(code(arlmcp::toml))]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Terminal state label used by the tool surface.
    ///
    /// HTTP-level failures surface as `error`, everything the caller might
    /// want to retry (timeouts, connection refusals, malformed bodies)
    /// surfaces as `exception`, matching the backend adapter contract.
    pub fn tool_state(&self) -> &'static str {
        match self {
            Error::Http { .. } => "error",
            _ => "exception",
        }
    }
}
