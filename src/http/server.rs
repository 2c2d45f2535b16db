//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router: probes, metrics endpoint, dispatcher fallback
//! - Wire up middleware (request span and correlation id, access log)
//! - Guard the metrics endpoint with basic authentication
//! - Serve on a listener until the shutdown signal fires
//!
//! # Design Decisions
//! - Every path not claimed by a probe or `/metrics` falls through to the dispatcher
//! - Layers are added innermost first; the tracing layer wraps the access log

use std::io;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::extract::State;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::get;
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::config::ServerConfig;
use crate::http::middleware::{access_log, trace_requests};
use crate::http::service::{dispatch, Service};
use crate::security::{basic_auth, Credentials};

/// HTTP server for the dispatch service.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

impl HttpServer {
    /// Build the server; the password file is read here.
    pub fn new(config: ServerConfig, service: Service, metrics: PrometheusHandle) -> Self {
        let credentials = Credentials::load_or_empty(Path::new(&config.http.password.file));
        let router = Self::build_router(Arc::new(service), Arc::new(credentials), metrics);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    pub fn build_router(
        service: Arc<Service>,
        credentials: Arc<Credentials>,
        metrics: PrometheusHandle,
    ) -> Router {
        let metrics_route = Router::new()
            .route("/metrics", get(render_metrics))
            .route_layer(from_fn_with_state(credentials, basic_auth))
            .with_state(metrics);

        Router::new()
            .route("/healthz", get(healthz))
            .route("/ready", get(ready))
            .merge(metrics_route)
            .fallback(dispatch)
            .with_state(service)
            .layer(from_fn(access_log))
            .layer(from_fn(trace_requests))
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, context = %self.config.http.context, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn healthz() -> &'static str {
    "ok"
}

async fn ready() -> &'static str {
    "ready"
}

async fn render_metrics(State(handle): State<PrometheusHandle>) -> String {
    handle.render()
}
