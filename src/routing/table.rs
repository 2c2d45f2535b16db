//! Route table construction.

use std::collections::HashMap;
use std::sync::Arc;

use crate::assets::AssetSource;
use crate::config::ServerConfig;
use crate::controller::{Controller, ModelController, PageModel};
use crate::routing::normalize_key;

/// Route key → controller.
pub type RouteMap = HashMap<String, Arc<dyn Controller>>;

/// Build one `ModelController` per configured controller, then run `customize` once.
///
/// Keys are normalized after customization so none begins with `/`.
pub fn build_routes<F>(
    config: &ServerConfig,
    templates: &Arc<dyn AssetSource>,
    customize: F,
) -> RouteMap
where
    F: FnOnce(&mut RouteMap),
{
    let http = &config.http;
    let includes: Arc<[String]> = http.includes.clone().into();

    let mut routes = RouteMap::with_capacity(http.controllers.len());
    for (path, template) in &http.controllers {
        let key = normalize_key(path).to_string();
        let model = PageModel {
            path: key.clone(),
            template: template.clone(),
            google_analytics_id: config.google.analytics.id.clone(),
        };
        let controller = ModelController::new(
            model,
            Arc::clone(templates),
            Arc::clone(&includes),
            config.debug,
        );
        routes.insert(key, Arc::new(controller));
    }

    customize(&mut routes);

    routes
        .into_iter()
        .map(|(key, controller)| (normalize_key(&key).to_string(), controller))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::DirectoryAssets;
    use crate::controller::{ControllerResult, Reply};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;

    struct Echo;

    #[async_trait]
    impl Controller for Echo {
        async fn handle(&self, _request: Request<Body>) -> ControllerResult {
            Ok(Reply::html("echo"))
        }
    }

    fn config() -> ServerConfig {
        let mut config = ServerConfig::default();
        config.http.controllers.insert("about".into(), "about.jinja".into());
        config.http.controllers.insert("/contact".into(), "contact.jinja".into());
        config.http.controllers.insert("".into(), "index.jinja".into());
        config
    }

    fn templates() -> Arc<dyn AssetSource> {
        Arc::new(DirectoryAssets::new("tests/fixtures/templates"))
    }

    #[test]
    fn test_builds_model_controllers() {
        let routes = build_routes(&config(), &templates(), |_| {});
        assert_eq!(routes.len(), 3);
        assert!(routes.contains_key("about"));
        assert!(routes.contains_key("contact"));
        assert!(routes.contains_key(""));
    }

    #[test]
    fn test_customize_runs_once_and_can_edit() {
        let mut calls = 0;
        let routes = build_routes(&config(), &templates(), |routes| {
            calls += 1;
            routes.remove("contact");
            routes.insert("/form".into(), Arc::new(Echo));
            routes.insert("about".into(), Arc::new(Echo));
        });

        assert_eq!(calls, 1);
        assert!(!routes.contains_key("contact"));
        assert!(routes.contains_key("form"));
        assert!(routes.keys().all(|key| !key.starts_with('/')));
    }
}
