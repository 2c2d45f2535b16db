//! Error page resolution.

use std::io;
use std::sync::Arc;

use axum::body::Bytes;
use axum::http::StatusCode;
use thiserror::Error;

use crate::assets::{AssetSource, EmbeddedAssets};
use crate::controller::ProcessingError;
use crate::error_pages::{ErrorPageTable, DEFAULT_ERROR_PAGES};
use crate::render::{render_template, RenderError};

/// Failure to produce an error page body.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("cannot read error page {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: io::Error,
    },
}

/// Produces error page bodies from the error page table.
#[derive(Debug, Clone)]
pub struct ErrorPageResolver {
    table: ErrorPageTable,
    templates: Arc<dyn AssetSource>,
    static_assets: Arc<dyn AssetSource>,
    defaults: Arc<dyn AssetSource>,
    includes: Arc<[String]>,
}

impl ErrorPageResolver {
    pub fn new(
        table: ErrorPageTable,
        templates: Arc<dyn AssetSource>,
        static_assets: Arc<dyn AssetSource>,
        includes: Arc<[String]>,
    ) -> Self {
        Self {
            table,
            templates,
            static_assets,
            defaults: Arc::new(EmbeddedAssets::new(&DEFAULT_ERROR_PAGES)),
            includes,
        }
    }

    pub fn table(&self) -> &ErrorPageTable {
        &self.table
    }

    /// Body for a status code without failure context.
    pub fn resolve_status(&self, code: StatusCode) -> Result<Option<Bytes>, ResolveError> {
        self.resolve(&ProcessingError::new(code))
    }

    /// Body for `error`, or `None` when no page is configured for its status.
    ///
    /// Failures are logged and returned; resolution never recurses into
    /// another error page.
    pub fn resolve(&self, error: &ProcessingError) -> Result<Option<Bytes>, ResolveError> {
        let Some(page) = self.table.get(error.response_code) else {
            return Ok(None);
        };

        if page.is_template {
            let context = if error.data.is_undefined() {
                &page.data
            } else {
                &error.data
            };
            return render_template(self.templates.as_ref(), &page.name, &self.includes, context)
                .map(|html| Some(Bytes::from(html)))
                .map_err(|e| {
                    tracing::error!(
                        template = %page.name,
                        status = error.response_code.as_u16(),
                        error = %e,
                        "cannot render error page"
                    );
                    ResolveError::Render(e)
                });
        }

        let source = if page.is_default {
            &self.defaults
        } else {
            &self.static_assets
        };
        source
            .read(&page.name)
            .map(|bytes| Some(Bytes::from(bytes.into_owned())))
            .map_err(|e| {
                tracing::error!(
                    page = %page.name,
                    status = error.response_code.as_u16(),
                    error = %e,
                    "cannot read error page"
                );
                ResolveError::Read {
                    name: page.name.clone(),
                    source: e,
                }
            })
    }
}
