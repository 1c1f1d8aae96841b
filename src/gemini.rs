//! Process bridge to the Gemini CLI
//!
//! Every tool call becomes one fresh child process: spawn the CLI with
//! `-o json` forced on, capture stdout and stderr in full, then dig the
//! JSON object out of whatever the terminal noise around it looks like.
//! No pooling, no reuse, no timeout; the process runs until it exits.

use std::path::Path;
use std::process::Stdio;

use serde_json::Value;
use tokio::process::Command;
use tracing::debug;

use crate::error::{BridgeError, Result};

/// Response text used when the CLI's JSON carries no usable `response`.
pub const NO_OUTPUT_PLACEHOLDER: &str = "(No output)";

/// Session id used when the CLI's JSON carries no usable `session_id`.
pub const UNKNOWN_SESSION_PLACEHOLDER: &str = "unknown";

/// Outcome of one external invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessResult {
    /// The model's answer text
    pub response_text: String,
    /// Session id the caller must retain to continue this session
    pub session_id: String,
}

/// Handle on the external Gemini CLI.
///
/// Stateless between invocations; it only remembers which command to run.
#[derive(Debug, Clone)]
pub struct GeminiCli {
    command: String,
}

impl GeminiCli {
    /// Create a handle invoking `command`.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// Startup reachability check: run `<command> --version`, discarding all
    /// output. Failure here is fatal to the bridge, not to a request.
    pub async fn probe(&self) -> Result<()> {
        let status = Command::new(&self.command)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(map_launch_error)?;

        if status.success() {
            Ok(())
        } else {
            Err(BridgeError::ProcessFailure(format!(
                "{} --version failed with {status}",
                self.command
            )))
        }
    }

    /// Run one invocation and extract its [`ProcessResult`].
    ///
    /// `args` is the per-call argument list from
    /// [`build_invocation`](crate::tools::build_invocation); `-o json` is
    /// appended here so the CLI always emits machine-readable output.
    pub async fn run(&self, args: &[String], cwd: Option<&Path>) -> Result<ProcessResult> {
        let mut command = Command::new(&self.command);
        command
            .args(args)
            .arg("-o")
            .arg("json")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = cwd {
            command.current_dir(dir);
        }

        debug!(command = %self.command, ?args, "spawning Gemini CLI");
        let output = command.output().await.map_err(map_launch_error)?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !output.status.success() && stdout.is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = stderr.trim();
            let message = if detail.is_empty() {
                match output.status.code() {
                    Some(code) => format!("Gemini exited with code {code}"),
                    None => "Gemini was terminated by a signal".to_owned(),
                }
            } else {
                detail.to_owned()
            };
            return Err(BridgeError::ProcessFailure(message));
        }

        // A non-zero exit that still produced stdout is not a failure by
        // itself; the CLI emits diagnostic exit codes alongside valid JSON.
        parse_output(&stdout)
    }
}

fn map_launch_error(err: std::io::Error) -> BridgeError {
    if err.kind() == std::io::ErrorKind::NotFound {
        BridgeError::ToolUnavailable
    } else {
        BridgeError::Spawn(err)
    }
}

/// Extract and decode the JSON object embedded in the captured stdout.
///
/// Greedy match from the first `{` to the last `}`, tolerating leading and
/// trailing terminal noise.
fn parse_output(stdout: &str) -> Result<ProcessResult> {
    let object = extract_object(stdout).ok_or(BridgeError::ExtractionFailure)?;
    let data: Value = serde_json::from_str(object).map_err(|source| BridgeError::ParseFailure {
        source,
        raw: stdout.to_owned(),
    })?;

    Ok(ProcessResult {
        response_text: field_or(&data, "response", NO_OUTPUT_PLACEHOLDER),
        session_id: field_or(&data, "session_id", UNKNOWN_SESSION_PLACEHOLDER),
    })
}

fn extract_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    text.get(start..=end)
}

/// Project a string field, falling back to `placeholder` when it is absent,
/// non-string, or empty (the wrapped CLI emits `""` for empty answers).
fn field_or(data: &Value, key: &str, placeholder: &str) -> String {
    data.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map_or_else(|| placeholder.to_owned(), str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_object_from_noisy_output() {
        let captured = "INFO: starting\n{\"response\":\"hi\",\"session_id\":\"abc\"}\ndone";
        let result = parse_output(captured).unwrap();
        assert_eq!(result.response_text, "hi");
        assert_eq!(result.session_id, "abc");
    }

    #[test]
    fn greedy_match_spans_nested_objects() {
        let captured = "{\"response\":\"ok\",\"stats\":{\"tokens\":12},\"session_id\":\"s1\"}";
        let result = parse_output(captured).unwrap();
        assert_eq!(result.response_text, "ok");
        assert_eq!(result.session_id, "s1");
    }

    #[test]
    fn missing_fields_fall_back_to_placeholders() {
        let result = parse_output("{\"foo\":1}").unwrap();
        assert_eq!(result.response_text, NO_OUTPUT_PLACEHOLDER);
        assert_eq!(result.session_id, UNKNOWN_SESSION_PLACEHOLDER);
    }

    #[test]
    fn empty_string_fields_fall_back_too() {
        let result = parse_output("{\"response\":\"\",\"session_id\":\"\"}").unwrap();
        assert_eq!(result.response_text, NO_OUTPUT_PLACEHOLDER);
        assert_eq!(result.session_id, UNKNOWN_SESSION_PLACEHOLDER);
    }

    #[test]
    fn output_without_braces_is_an_extraction_failure() {
        let err = parse_output("no json here, sorry").unwrap_err();
        assert!(matches!(err, BridgeError::ExtractionFailure));
    }

    #[test]
    fn invalid_json_between_braces_is_a_parse_failure() {
        let err = parse_output("log {not json} trailer").unwrap_err();
        match err {
            BridgeError::ParseFailure { raw, .. } => {
                assert!(raw.contains("log {not json} trailer"));
            }
            other => panic!("expected ParseFailure, got {other:?}"),
        }
    }

    #[test]
    fn close_brace_before_open_brace_is_extraction_failure() {
        let err = parse_output("} noise {").unwrap_err();
        assert!(matches!(err, BridgeError::ExtractionFailure));
    }
}
