//! Per-status error pages.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     built-in table (400, 401, 403, 404, 405, 500 → bundled pages)
//!     → http.errorPages overrides (flip is_default, derive is_template)
//!     → ErrorPageTable (immutable)
//!
//! Request failure:
//!     ProcessingError
//!     → resolver.rs
//!         is_template → render from the template root
//!         is_default  → bundled page
//!         otherwise   → static root
//! ```

pub mod resolver;

use std::collections::{BTreeMap, HashMap};

use axum::http::StatusCode;
use include_dir::{include_dir, Dir};
use minijinja::Value;

use crate::config::validation::parse_status_key;
use crate::config::{ConfigError, ValidationError};

pub use resolver::ErrorPageResolver;

/// Pages shipped with the server, named by status code.
pub static DEFAULT_ERROR_PAGES: Dir<'static> = include_dir!("$CARGO_MANIFEST_DIR/error_pages");

/// Status codes that always have a page.
pub const BUILT_IN_CODES: [StatusCode; 6] = [
    StatusCode::BAD_REQUEST,
    StatusCode::UNAUTHORIZED,
    StatusCode::FORBIDDEN,
    StatusCode::NOT_FOUND,
    StatusCode::METHOD_NOT_ALLOWED,
    StatusCode::INTERNAL_SERVER_ERROR,
];

/// Where the page for one status code comes from.
#[derive(Debug, Clone)]
pub struct ErrorPageDefinition {
    /// File or template name.
    pub name: String,
    /// Not overridden by configuration; read from the bundled pages.
    pub is_default: bool,
    /// Rendered from the template root instead of read verbatim.
    pub is_template: bool,
    /// Template context used when the failure carries none.
    pub data: Value,
}

impl ErrorPageDefinition {
    /// The bundled page for `code`.
    pub fn bundled(code: StatusCode) -> Self {
        Self {
            name: format!("{}.html", code.as_u16()),
            is_default: true,
            is_template: false,
            data: Value::UNDEFINED,
        }
    }

    /// An operator-supplied page.
    pub fn configured(name: impl Into<String>, template_suffix: &str) -> Self {
        let name = name.into();
        let is_template = !template_suffix.is_empty() && name.ends_with(template_suffix);
        Self {
            name,
            is_default: false,
            is_template,
            data: Value::UNDEFINED,
        }
    }
}

/// Status code → error page mapping.
#[derive(Debug, Clone)]
pub struct ErrorPageTable {
    pages: HashMap<StatusCode, ErrorPageDefinition>,
}

impl ErrorPageTable {
    /// Table holding only the built-in pages.
    pub fn new() -> Self {
        let pages = BUILT_IN_CODES
            .iter()
            .map(|&code| (code, ErrorPageDefinition::bundled(code)))
            .collect();
        Self { pages }
    }

    /// Built-in pages plus the `http.errorPages` overrides.
    pub fn from_config(
        overrides: &BTreeMap<String, String>,
        template_suffix: &str,
    ) -> Result<Self, ConfigError> {
        let mut table = Self::new();
        for (key, name) in overrides {
            let code = parse_status_key(key).ok_or_else(|| {
                ConfigError::Validation(vec![ValidationError::ErrorPageKey(key.clone())])
            })?;
            table.insert(code, ErrorPageDefinition::configured(name.clone(), template_suffix));
        }
        Ok(table)
    }

    /// Add or replace the page for `code`.
    pub fn insert(&mut self, code: StatusCode, page: ErrorPageDefinition) {
        self.pages.insert(code, page);
    }

    pub fn get(&self, code: StatusCode) -> Option<&ErrorPageDefinition> {
        self.pages.get(&code)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl Default for ErrorPageTable {
    fn default() -> Self {
        Self::new()
    }
}
