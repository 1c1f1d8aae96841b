//! Bridge configuration

/// Model used when a `tools/call` does not specify one.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Command name used when no override is configured.
pub const DEFAULT_COMMAND: &str = "gemini";

/// Configuration for one bridge instance.
///
/// The bridge holds no session state; this is the only long-lived data it
/// carries, and it never changes after startup.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// External command to invoke for tool calls (and the startup probe)
    pub command: String,
    /// Model passed to new-session invocations that omit `model`
    pub default_model: String,
}

impl BridgeConfig {
    /// Create a configuration with explicit command and default model.
    pub fn new(command: impl Into<String>, default_model: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            default_model: default_model.into(),
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::new(DEFAULT_COMMAND, DEFAULT_MODEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_wrapped_cli() {
        let config = BridgeConfig::default();
        assert_eq!(config.command, "gemini");
        assert_eq!(config.default_model, "gemini-2.0-flash");
    }
}
