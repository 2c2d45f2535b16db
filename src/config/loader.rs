//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::ServerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("environment variable {name} has invalid value `{value}`")]
    Environment { name: &'static str, value: String },

    #[error("redirect `{path}` references unset environment variable `{name}`")]
    UnsetRedirectVariable { path: String, name: String },

    #[error("embedded content requested but no bundle was provided")]
    MissingBundle,

    #[error("directory `{0}` is not present in the embedded bundle")]
    MissingBundleDirectory(String),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load, override and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content, |name| std::env::var(name).ok())
}

/// Parse a TOML document, apply environment overrides from `lookup`, and validate.
pub fn parse_config<F>(content: &str, lookup: F) -> Result<ServerConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config: ServerConfig = toml::from_str(content)?;
    apply_env_overrides(&mut config, lookup)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply the supported environment variable overrides.
pub fn apply_env_overrides<F>(config: &mut ServerConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup("HTTP_USE_EMBEDDED") {
        config.http.content.use_embedded = parse_bool(&value).ok_or(ConfigError::Environment {
            name: "HTTP_USE_EMBEDDED",
            value,
        })?;
    }
    if let Some(value) = lookup("HTTP_PORT") {
        config.http.port = value.trim().parse().map_err(|_| ConfigError::Environment {
            name: "HTTP_PORT",
            value: value.clone(),
        })?;
    }
    if let Some(value) = lookup("HTTP_CONTEXT") {
        config.http.context = value;
    }
    if let Some(value) = lookup("HTTP_PASSWORD_FILE") {
        config.http.password.file = value;
    }
    if let Some(value) = lookup("GOOGLE_ANALYTICS_ID") {
        config.google.analytics.id = value;
    }
    Ok(())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
