//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Redirect codes must be redirection statuses
//! - Error page keys must be HTTP status codes
//! - The mount context must be an absolute path
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use axum::http::StatusCode;
use thiserror::Error;

use crate::config::schema::ServerConfig;

/// Redirect status used when a redirect omits `code`.
pub const DEFAULT_REDIRECT_CODE: u16 = 301;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("redirect `{path}` has code {code}, expected 300-399")]
    RedirectCode { path: String, code: u16 },

    #[error("redirect `{path}` has an empty or malformed location")]
    RedirectLocation { path: String },

    #[error("unexpected error code `{0}` in error pages definition")]
    ErrorPageKey(String),

    #[error("error page for `{0}` has an empty name")]
    ErrorPageName(String),

    #[error("context `{0}` must start with `/`")]
    Context(String),
}

/// Parse an error page key such as `"404"`.
pub fn parse_status_key(key: &str) -> Option<StatusCode> {
    key.trim()
        .parse::<u16>()
        .ok()
        .and_then(|code| StatusCode::from_u16(code).ok())
}

/// Resolve a configured redirect code, applying the default.
pub fn redirect_status(code: Option<u16>) -> Option<StatusCode> {
    let code = code.unwrap_or(DEFAULT_REDIRECT_CODE);
    StatusCode::from_u16(code)
        .ok()
        .filter(|status| status.is_redirection())
}

/// Validate a loaded configuration.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let http = &config.http;

    if !http.context.starts_with('/') {
        errors.push(ValidationError::Context(http.context.clone()));
    }

    for (path, redirect) in &http.redirects {
        if redirect_status(redirect.code).is_none() {
            errors.push(ValidationError::RedirectCode {
                path: path.clone(),
                code: redirect.code.unwrap_or(DEFAULT_REDIRECT_CODE),
            });
        }
        if redirect.location.trim().is_empty() {
            errors.push(ValidationError::RedirectLocation { path: path.clone() });
        }
    }

    for (key, name) in &http.error_pages {
        if parse_status_key(key).is_none() {
            errors.push(ValidationError::ErrorPageKey(key.clone()));
        }
        if name.trim().is_empty() {
            errors.push(ValidationError::ErrorPageName(key.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
