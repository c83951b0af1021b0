use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;

use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// Config (root)
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("environment variable '{0}' is not set")]
    MissingEnvVar(String),

    #[error("unclosed variable reference '${{' (missing '}}')")]
    UnclosedVarReference,
}

impl Config {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(ConfigError::Io(e)),
        };
        let expanded = expand_env_vars(&contents)?;
        Ok(serde_yaml::from_str(&expanded)?)
    }
}

/// Resolve a path relative to the config file directory.
///
/// If the path is absolute, it is returned as-is.
/// If the path is relative, it is joined with the config file's parent directory.
///
/// This ensures consistent behavior regardless of the current working directory.
pub fn resolve_path(config_path: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }

    let config_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    config_dir.join(path)
}

// ============================================================================
// Default Paths
// ============================================================================

/// Default data directory (relative to config file).
pub const DEFAULT_DATA_DIR: &str = ".foundernet";
/// User records directory (relative to data dir).
pub const USERS_DIR: &str = "users";
/// Event records directory (relative to data dir).
pub const EVENTS_DIR: &str = "events";
/// Conversation documents directory (relative to data dir).
pub const MESSAGES_DIR: &str = "messages";

// ============================================================================
// Private Helpers (Serde Defaults)
// ============================================================================

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    300
}

// ============================================================================
// Environment Variable Expansion
// ============================================================================

/// Expand environment variables in a string.
///
/// Supports the following syntax (shell-compatible):
/// - `${VAR}` - Required variable, errors if not set
/// - `${VAR:-default}` - Optional variable with default value
/// - `$$` - Escaped `$` (only needed before `{` to prevent expansion)
///
/// # Limitations
///
/// - No nested/recursive expansion: `${VAR:-${DEFAULT}}` is not supported
/// - Unclosed `${` (missing `}`) returns an error
fn expand_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' {
            match chars.peek() {
                // Escaped $ -> literal $
                Some('$') => {
                    chars.next();
                    result.push('$');
                }
                // Start of variable reference
                Some('{') => {
                    chars.next(); // consume '{'
                    let expanded = parse_var_reference(&mut chars)?;
                    result.push_str(&expanded);
                }
                // Not a variable reference, keep literal $
                _ => {
                    result.push('$');
                }
            }
        } else {
            result.push(c);
        }
    }

    Ok(result)
}

/// Parse a variable reference after seeing `${`.
///
/// Handles:
/// - `VAR}` - Required variable
/// - `VAR:-default}` - Variable with default
///
/// Returns error if closing `}` is missing.
fn parse_var_reference(
    chars: &mut std::iter::Peekable<std::str::Chars>,
) -> Result<String, ConfigError> {
    let mut var_name = String::new();
    let mut default_value: Option<String> = None;
    let mut in_default = false;
    let mut found_closing_brace = false;

    while let Some(&c) = chars.peek() {
        match c {
            '}' => {
                chars.next(); // consume '}'
                found_closing_brace = true;
                break;
            }
            ':' if !in_default => {
                chars.next(); // consume ':'
                // Check for '-' (default value syntax)
                if chars.peek() == Some(&'-') {
                    chars.next(); // consume '-'
                    in_default = true;
                    default_value = Some(String::new());
                } else {
                    // ':' without '-' is part of var name (unusual but valid)
                    var_name.push(':');
                }
            }
            _ => {
                chars.next();
                if in_default {
                    default_value.as_mut().unwrap().push(c);
                } else {
                    var_name.push(c);
                }
            }
        }
    }

    if !found_closing_brace {
        return Err(ConfigError::UnclosedVarReference);
    }

    match std::env::var(&var_name) {
        Ok(value) => Ok(value),
        Err(_) => match default_value {
            Some(default) => Ok(default),
            None => Err(ConfigError::MissingEnvVar(var_name)),
        },
    }
}

// ============================================================================
// ServerConfig
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
