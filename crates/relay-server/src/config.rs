//! Startup configuration read from the environment.

use std::path::PathBuf;

use relay_core::{AgentOptions, PermissionMode};

/// Port used when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 3000;

/// Configuration problems that prevent the server from starting.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConfigError {
    /// The API credential is absent or empty.
    #[error("Missing ANTHROPIC_API_KEY")]
    MissingApiKey,

    /// An optional override has a value we cannot use.
    #[error("Invalid {var}='{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(var: &'static str, value: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            var,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Everything the server needs to start, fixed for the process lifetime.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub api_key: String,
    /// Messages API host override (`ANTHROPIC_BASE_URL`).
    pub api_base: Option<String>,
    /// Root directory for the agent's file tools.
    pub cwd: PathBuf,
    pub options: AgentOptions,
}

impl ServerConfig {
    /// Reads the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = var("ANTHROPIC_API_KEY").ok_or(ConfigError::MissingApiKey)?;

        let port = match var("PORT") {
            Some(v) => v
                .trim()
                .parse::<u16>()
                .map_err(|e| ConfigError::invalid("PORT", &v, e.to_string()))?,
            None => DEFAULT_PORT,
        };

        let mut options = AgentOptions::default();

        if let Some(model) = var("AGENT_MODEL") {
            options.model = model;
        }
        if let Some(prompt) = var("AGENT_SYSTEM_PROMPT") {
            options.system_prompt = prompt;
        }
        if let Some(v) = var("AGENT_PERMISSION_MODE") {
            options.permission_mode = v.trim().parse::<PermissionMode>().map_err(|_| {
                ConfigError::invalid(
                    "AGENT_PERMISSION_MODE",
                    &v,
                    "expected one of default, acceptEdits, bypassPermissions, plan",
                )
            })?;
        }
        if let Some(v) = var("AGENT_MAX_TURNS") {
            options.max_turns = match v.trim().parse::<u32>() {
                Ok(0) => {
                    return Err(ConfigError::invalid("AGENT_MAX_TURNS", &v, "must be at least 1"))
                }
                Ok(n) => n,
                Err(e) => return Err(ConfigError::invalid("AGENT_MAX_TURNS", &v, e.to_string())),
            };
        }

        let cwd = match var("AGENT_CWD") {
            Some(dir) => PathBuf::from(dir),
            None => std::env::current_dir()
                .map_err(|e| ConfigError::invalid("AGENT_CWD", "", e.to_string()))?,
        };

        Ok(Self {
            port,
            api_key,
            api_base: var("ANTHROPIC_BASE_URL"),
            cwd,
            options,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("ANTHROPIC_API_KEY", "sk-test")]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.api_base, None);
        assert_eq!(config.options, AgentOptions::default());
        assert_eq!(config.options.model, "claude-sonnet-4-5");
        assert_eq!(config.options.max_turns, 10);
        assert_eq!(config.options.permission_mode, PermissionMode::AcceptEdits);
    }

    #[test]
    fn test_missing_or_empty_key() {
        assert_eq!(load(&[]).unwrap_err(), ConfigError::MissingApiKey);
        assert_eq!(
            load(&[("ANTHROPIC_API_KEY", ""), ("PORT", "8080")]).unwrap_err(),
            ConfigError::MissingApiKey
        );
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("PORT", "8080"),
            ("ANTHROPIC_BASE_URL", "http://localhost:9999"),
            ("AGENT_MODEL", "claude-haiku-4-5"),
            ("AGENT_PERMISSION_MODE", "plan"),
            ("AGENT_MAX_TURNS", "3"),
            ("AGENT_CWD", "/srv/project"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.api_base.as_deref(), Some("http://localhost:9999"));
        assert_eq!(config.options.model, "claude-haiku-4-5");
        assert_eq!(config.options.permission_mode, PermissionMode::Plan);
        assert_eq!(config.options.max_turns, 3);
        assert_eq!(config.cwd, PathBuf::from("/srv/project"));
    }

    #[test]
    fn test_invalid_values() {
        let err = load(&[("ANTHROPIC_API_KEY", "k"), ("PORT", "abc")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "PORT", .. }));

        let err = load(&[("ANTHROPIC_API_KEY", "k"), ("AGENT_MAX_TURNS", "0")]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid AGENT_MAX_TURNS='0': must be at least 1");

        let err =
            load(&[("ANTHROPIC_API_KEY", "k"), ("AGENT_PERMISSION_MODE", "yolo")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "AGENT_PERMISSION_MODE", .. }));
    }
}
