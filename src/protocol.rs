//! JSON-RPC 2.0 message types and the response writer
//!
//! The wire format is newline-delimited JSON-RPC over stdio. Inbound lines
//! decode into [`Request`]; outbound envelopes are serialized by a
//! [`ResponseWriter`] handle that feeds a single writer task, so responses
//! from concurrently running handlers never interleave mid-line.

use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

/// JSON-RPC error code for an unknown method or tool.
pub const METHOD_NOT_FOUND: i64 = -32601;

/// JSON-RPC error code for params that do not match the expected shape.
pub const INVALID_PARAMS: i64 = -32602;

/// One decoded JSON-RPC request or notification.
///
/// The `id` is an opaque correlation token; the bridge never inspects it
/// beyond checking presence. `params` is kept raw and decoded by whichever
/// handler the method selects.
#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    /// Correlation id, absent (or null) for notifications
    #[serde(default)]
    pub id: Option<Value>,
    /// Method name, selects the handler
    pub method: String,
    /// Untyped payload, handler-specific
    #[serde(default)]
    pub params: Value,
}

impl Request {
    /// Id to respond under, or `None` if this message must stay silent.
    ///
    /// An explicit `"id": null` counts as a notification.
    pub fn response_id(&self) -> Option<&Value> {
        self.id.as_ref().filter(|id| !id.is_null())
    }
}

/// Cloneable handle for emitting JSON-RPC responses.
///
/// Exactly one of `result`/`error` is emitted per request carrying an id;
/// handlers for notifications simply never call either.
#[derive(Debug, Clone)]
pub struct ResponseWriter {
    tx: mpsc::UnboundedSender<String>,
}

impl ResponseWriter {
    /// Emit a result envelope.
    pub fn result(&self, id: &Value, result: Value) {
        self.send(json!({ "jsonrpc": "2.0", "id": id, "result": result }));
    }

    /// Emit an error envelope.
    pub fn error(&self, id: &Value, code: i64, message: impl Into<String>) {
        self.send(json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": { "code": code, "message": message.into() }
        }));
    }

    fn send(&self, envelope: Value) {
        // The receiver only drops once the serve loop is shutting down;
        // a response with nowhere to go is discarded.
        let _ = self.tx.send(envelope.to_string());
    }
}

/// Create a writer handle and the receiving end for the writer task.
pub fn response_channel() -> (ResponseWriter, mpsc::UnboundedReceiver<String>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ResponseWriter { tx }, rx)
}

/// Drain serialized responses onto the output stream, one per line.
///
/// Runs until every [`ResponseWriter`] clone has been dropped, flushing
/// after each line so clients see responses as they complete.
pub async fn write_responses<W>(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut output: W,
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(line) = rx.recv().await {
        output.write_all(line.as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.flush().await?;
    }
    Ok(())
}
