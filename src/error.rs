//! Error types for the Gemini bridge

use thiserror::Error;

/// Failures raised by one external Gemini CLI invocation.
///
/// Every variant is surfaced to the caller that triggered it as ordinary
/// tool content (`isError: true`), never as a JSON-RPC error envelope.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The Gemini CLI binary could not be found on this system
    #[error("Gemini CLI not found. Please install it with 'npm install -g @google/gemini-cli'.")]
    ToolUnavailable,

    /// The child process could not be launched for a reason other than a
    /// missing binary
    #[error("failed to launch Gemini CLI: {0}")]
    Spawn(std::io::Error),

    /// The process exited non-zero without producing any stdout
    #[error("{0}")]
    ProcessFailure(String),

    /// No JSON object could be located in the captured output
    #[error("no JSON response found in Gemini output")]
    ExtractionFailure,

    /// A JSON object was located but failed to parse
    #[error("parse error: {source}\nraw output was: {raw}")]
    ParseFailure {
        /// The underlying JSON parse error
        source: serde_json::Error,
        /// The full captured stdout, kept for diagnosability
        raw: String,
    },
}

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;
