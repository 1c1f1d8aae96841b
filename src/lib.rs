//! Gemini Bridge - MCP stdio server wrapping the Gemini CLI
//!
//! This crate exposes a Model Context Protocol (MCP) server over newline-
//! delimited JSON-RPC 2.0 on stdio. Incoming `tools/call` requests are
//! turned into Gemini CLI invocations; the CLI's JSON output is harvested
//! from its terminal noise and mapped back into tool results, with the
//! session id surfaced so callers can continue a session via the
//! `gemini-reply` tool.
//!
//! The bridge holds no session state: session continuity lives entirely in
//! the wrapped CLI and is referenced by opaque `threadId` strings that
//! callers retain and pass back.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod framing;
pub mod gemini;
pub mod protocol;
pub mod server;
pub mod tools;

pub use config::{BridgeConfig, DEFAULT_COMMAND, DEFAULT_MODEL};
pub use error::{BridgeError, Result};
pub use framing::FrameReader;
pub use gemini::{GeminiCli, ProcessResult};
pub use protocol::{Request, ResponseWriter};
pub use server::{BridgeServer, PROTOCOL_VERSION};
