//! Tool catalog and external invocation building
//!
//! Two tools are exposed: `gemini` starts a new Gemini session and
//! `gemini-reply` continues an existing one. The schemas here are the
//! contract clients validate against; the bridge itself does no schema
//! validation and forwards whatever arguments decode.

use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{json, Value};

/// Sandbox level requested for the external invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SandboxMode {
    /// No writes, the default
    #[default]
    ReadOnly,
    /// Allow writes inside the workspace (`-s` flag)
    WorkspaceWrite,
}

/// Decoded `params` of a `tools/call` request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolCallParams {
    /// Which tool to run; anything but the two known names is rejected
    #[serde(default)]
    pub name: String,
    /// Named arguments, see [`ToolArguments`]
    #[serde(default)]
    pub arguments: ToolArguments,
}

/// Arguments shared by both tools.
///
/// `prompt` is required by the advertised schema but decoded leniently; a
/// missing prompt reaches the CLI as an empty one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolArguments {
    /// The delegation prompt
    pub prompt: Option<String>,
    /// Expert system instructions, prepended to the prompt on new sessions
    #[serde(rename = "developer-instructions")]
    pub developer_instructions: Option<String>,
    /// Sandbox level, defaults to read-only
    #[serde(default)]
    pub sandbox: SandboxMode,
    /// Working directory for the external process
    pub cwd: Option<PathBuf>,
    /// Model override for new sessions
    pub model: Option<String>,
    /// Session to resume, only meaningful for `gemini-reply`
    #[serde(rename = "threadId")]
    pub thread_id: Option<String>,
}

/// The `tools/list` result.
///
/// `default_model` is surfaced in the `gemini` schema so the catalog always
/// matches what the invocation builder will actually pass.
pub fn catalog(default_model: &str) -> Value {
    json!({
        "tools": [
            {
                "name": "gemini",
                "description": "Start a new Gemini expert session",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "prompt": { "type": "string", "description": "The delegation prompt" },
                        "developer-instructions": { "type": "string", "description": "Expert system instructions" },
                        "sandbox": { "type": "string", "enum": ["read-only", "workspace-write"], "default": "read-only" },
                        "cwd": { "type": "string", "description": "Current working directory" },
                        "model": { "type": "string", "default": default_model }
                    },
                    "required": ["prompt"]
                }
            },
            {
                "name": "gemini-reply",
                "description": "Continue an existing Gemini session",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "threadId": { "type": "string", "description": "Session ID", "default": "latest" },
                        "prompt": { "type": "string", "description": "Follow-up prompt" },
                        "sandbox": { "type": "string", "enum": ["read-only", "workspace-write"], "default": "read-only" },
                        "cwd": { "type": "string" }
                    },
                    "required": ["prompt"]
                }
            }
        ]
    })
}

/// Build the argument list for one external invocation.
///
/// Returns `None` when `name` matches neither tool; that is the one
/// `tools/call` failure reported as a protocol error rather than as tool
/// content.
pub fn build_invocation(params: &ToolCallParams, default_model: &str) -> Option<Vec<String>> {
    let args = &params.arguments;
    let prompt = args.prompt.clone().unwrap_or_default();
    let mut invocation = Vec::new();

    match params.name.as_str() {
        "gemini" => {
            invocation.push("-m".to_owned());
            invocation.push(
                args.model
                    .clone()
                    .unwrap_or_else(|| default_model.to_owned()),
            );
            if args.sandbox == SandboxMode::WorkspaceWrite {
                invocation.push("-s".to_owned());
            }
            let prompt = match &args.developer_instructions {
                Some(instructions) => format!("{instructions}\n\n{prompt}"),
                None => prompt,
            };
            invocation.push("-p".to_owned());
            invocation.push(prompt);
        }
        "gemini-reply" => {
            invocation.push("--resume".to_owned());
            invocation.push(args.thread_id.clone().unwrap_or_else(|| "latest".to_owned()));
            if args.sandbox == SandboxMode::WorkspaceWrite {
                invocation.push("-s".to_owned());
            }
            invocation.push("-p".to_owned());
            invocation.push(prompt);
        }
        _ => return None,
    }

    Some(invocation)
}
