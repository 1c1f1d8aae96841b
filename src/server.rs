//! Dispatcher and serve loop
//!
//! Frames are read and dispatched strictly in arrival order. Synchronous
//! handlers (`initialize`, `tools/list`) answer inline; `tools/call` spawns
//! a task per invocation so several external processes can run at once,
//! which means tool-call responses may complete out of arrival order.

use std::path::PathBuf;

use serde_json::{json, Value};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::config::BridgeConfig;
use crate::framing::FrameReader;
use crate::gemini::GeminiCli;
use crate::protocol::{self, Request, ResponseWriter, INVALID_PARAMS, METHOD_NOT_FOUND};
use crate::tools::{self, ToolCallParams};

/// MCP protocol revision this server speaks.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// The bridge server: a static handler table plus the frame loop.
#[derive(Debug, Clone)]
pub struct BridgeServer {
    config: BridgeConfig,
    cli: GeminiCli,
}

impl BridgeServer {
    /// Create a server for the given configuration.
    pub fn new(config: BridgeConfig) -> Self {
        let cli = GeminiCli::new(config.command.clone());
        Self { config, cli }
    }

    /// Run the JSON-RPC loop until `input` reaches EOF.
    ///
    /// On EOF the loop stops reading, waits for in-flight tool calls to
    /// write their responses, and flushes the writer before returning.
    pub async fn serve<R, W>(&self, mut input: R, output: W) -> anyhow::Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (writer, rx) = protocol::response_channel();
        let writer_task = tokio::spawn(protocol::write_responses(rx, output));

        let mut frames = FrameReader::new();
        let mut calls: JoinSet<()> = JoinSet::new();
        let mut chunk = [0u8; 4096];

        loop {
            let read = input.read(&mut chunk).await?;
            if read == 0 {
                break;
            }
            for request in frames.push(&chunk[..read]) {
                self.dispatch(request, &writer, &mut calls);
            }
            // reap completed calls without blocking the frame loop
            while calls.try_join_next().is_some() {}
        }

        debug!("input closed, draining in-flight tool calls");
        while calls.join_next().await.is_some() {}

        drop(writer);
        writer_task.await??;
        Ok(())
    }

    /// Route one decoded request to its handler.
    fn dispatch(&self, request: Request, writer: &ResponseWriter, calls: &mut JoinSet<()>) {
        let id = request.response_id().cloned();
        match request.method.as_str() {
            "initialize" => {
                if let Some(id) = id {
                    writer.result(&id, self.initialize_result());
                }
            }
            "tools/list" => {
                if let Some(id) = id {
                    writer.result(&id, tools::catalog(&self.config.default_model));
                }
            }
            "tools/call" => {
                let Some(id) = id else {
                    debug!("ignoring tools/call notification without id");
                    return;
                };
                self.dispatch_tool_call(id, request.params, writer, calls);
            }
            "notifications/initialized" => {}
            other => {
                if let Some(id) = id {
                    writer.error(&id, METHOD_NOT_FOUND, format!("Method not found: {other}"));
                } else {
                    debug!(method = other, "ignoring unknown notification");
                }
            }
        }
    }

    /// Resolve the tool and spawn its external invocation.
    ///
    /// Protocol-level failures (bad params shape, unknown tool) are decided
    /// here, before anything is spawned; everything that can go wrong after
    /// this point is surfaced as tool content.
    fn dispatch_tool_call(
        &self,
        id: Value,
        params: Value,
        writer: &ResponseWriter,
        calls: &mut JoinSet<()>,
    ) {
        let params: ToolCallParams = match serde_json::from_value(params) {
            Ok(params) => params,
            Err(err) => {
                writer.error(&id, INVALID_PARAMS, format!("Invalid params: {err}"));
                return;
            }
        };

        let Some(args) = tools::build_invocation(&params, &self.config.default_model) else {
            writer.error(&id, METHOD_NOT_FOUND, format!("Tool not found: {}", params.name));
            return;
        };

        let cli = self.cli.clone();
        let writer = writer.clone();
        let cwd: Option<PathBuf> = params.arguments.cwd;
        calls.spawn(async move {
            match cli.run(&args, cwd.as_deref()).await {
                Ok(result) => {
                    // threadId rides at the top level so orchestration logic
                    // can pick it up without parsing the content body
                    writer.result(
                        &id,
                        json!({
                            "content": [{ "type": "text", "text": result.response_text }],
                            "threadId": result.session_id
                        }),
                    );
                }
                Err(err) => {
                    warn!("tool call failed: {err}");
                    writer.result(
                        &id,
                        json!({
                            "content": [{ "type": "text", "text": format!("Error: {err}") }],
                            "isError": true
                        }),
                    );
                }
            }
        });
    }

    fn initialize_result(&self) -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION")
            }
        })
    }
}
