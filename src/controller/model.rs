//! The built-in controller: render one template for one route.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use minijinja::Value;
use serde::Serialize;

use crate::assets::AssetSource;
use crate::controller::{Controller, ControllerResult};
use crate::render;

/// Context every page template receives.
#[derive(Debug, Clone, Serialize)]
pub struct PageModel {
    /// Route key the page is served under.
    pub path: String,
    pub template: String,
    pub google_analytics_id: String,
}

/// Renders a fixed template with a `PageModel` context.
#[derive(Debug, Clone)]
pub struct ModelController {
    model: PageModel,
    templates: Arc<dyn AssetSource>,
    includes: Arc<[String]>,
    response_code: Option<StatusCode>,
    content_type: Option<String>,
    debug: bool,
}

impl ModelController {
    pub fn new(
        model: PageModel,
        templates: Arc<dyn AssetSource>,
        includes: Arc<[String]>,
        debug: bool,
    ) -> Self {
        Self {
            model,
            templates,
            includes,
            response_code: None,
            content_type: None,
            debug,
        }
    }

    /// Respond with `code` instead of 200.
    pub fn with_response_code(mut self, code: StatusCode) -> Self {
        self.response_code = Some(code);
        self
    }

    /// Respond with `content_type` instead of `text/html`.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

#[async_trait]
impl Controller for ModelController {
    async fn handle(&self, _request: Request<Body>) -> ControllerResult {
        let context = Value::from_serialize(&self.model);
        let mut reply = render::render(
            self.templates.as_ref(),
            &self.model.template,
            &self.includes,
            &context,
            self.debug,
        )?;

        if let Some(code) = self.response_code {
            reply = reply.with_status(code);
        }
        if let Some(content_type) = &self.content_type {
            reply = reply.with_content_type(content_type.clone());
        }
        Ok(reply)
    }
}
