//! Template rendering shared by page controllers and error pages.
//!
//! # Responsibilities
//! - Compile a named template together with the shared includes
//! - Expose the template helper functions (`isset`, `is_active`)
//! - Turn compile/execution failures into a 500 `ProcessingError`
//!
//! # Design Decisions
//! - Templates are read from the asset root on every render, so filesystem
//!   roots pick up edits without a restart
//! - Output is always HTML-escaped regardless of the template file suffix
//! - Failures are logged here and never panic the caller

pub mod functions;

use std::io;

use axum::http::StatusCode;
use minijinja::{AutoEscape, Environment, Value};
use thiserror::Error;

use crate::assets::AssetSource;
use crate::controller::{ControllerResult, ProcessingError, Reply};

/// Failure while compiling or executing a template.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cannot read template {name}: {source}")]
    Asset {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("cannot create template {name}: {source}")]
    Compile {
        name: String,
        #[source]
        source: minijinja::Error,
    },

    #[error("cannot render template {name}: {source}")]
    Execute {
        name: String,
        #[source]
        source: minijinja::Error,
    },
}

/// Compile `template` plus `includes` from `templates` and render it with `context`.
pub fn render_template(
    templates: &dyn AssetSource,
    template: &str,
    includes: &[String],
    context: &Value,
) -> Result<String, RenderError> {
    let mut sources: Vec<(&str, String)> = Vec::with_capacity(includes.len() + 1);
    for name in std::iter::once(template).chain(includes.iter().map(String::as_str)) {
        if sources.iter().any(|(seen, _)| *seen == name) {
            continue;
        }
        let source = templates
            .read_to_string(name)
            .map_err(|err| RenderError::Asset {
                name: name.to_string(),
                source: err,
            })?;
        sources.push((name, source));
    }

    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| AutoEscape::Html);
    functions::register(&mut env);

    for (name, source) in &sources {
        env.add_template(name, source.as_str())
            .map_err(|err| RenderError::Compile {
                name: name.to_string(),
                source: err,
            })?;
    }

    let compiled = env.get_template(template).map_err(|err| RenderError::Compile {
        name: template.to_string(),
        source: err,
    })?;

    compiled.render(context).map_err(|err| RenderError::Execute {
        name: template.to_string(),
        source: err,
    })
}

/// Render a page: `200 text/html` on success, a 500 `ProcessingError` on failure.
pub fn render(
    templates: &dyn AssetSource,
    template: &str,
    includes: &[String],
    context: &Value,
    debug: bool,
) -> ControllerResult {
    if debug {
        tracing::info!(template = %template, includes = ?includes, "using template");
    }

    match render_template(templates, template, includes, context) {
        Ok(body) => Ok(Reply::html(body)),
        Err(e) => {
            tracing::error!(template = %template, error = %e, "template rendering failed");
            Err(ProcessingError::new(StatusCode::INTERNAL_SERVER_ERROR))
        }
    }
}
