//! Startup orchestration.
//!
//! # Responsibilities
//! - Install the metrics recorder
//! - Build the dispatch service from validated configuration
//! - Bind the listener and serve until a shutdown signal arrives
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The listener is bound last, so traffic only arrives once the tables are built

use std::io;
use std::net::{Ipv4Addr, SocketAddr};

use include_dir::Dir;
use metrics_exporter_prometheus::BuildError;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{ConfigError, ServerConfig};
use crate::http::{HttpServer, Service};
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::wait_for_shutdown_signal;
use crate::observability::metrics::init_metrics;
use crate::routing::RouteMap;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot install metrics recorder: {0}")]
    Metrics(#[from] BuildError),

    #[error("cannot bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] io::Error),
}

/// Address the server listens on: all interfaces, configured port.
pub fn listen_addr(config: &ServerConfig) -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.http.port))
}

/// Build, bind and serve until SIGINT/SIGTERM.
///
/// `customize` runs once over the route table before the server starts.
pub async fn run<F>(
    config: ServerConfig,
    bundle: &'static Dir<'static>,
    customize: F,
) -> Result<(), StartupError>
where
    F: FnOnce(&mut RouteMap) + 'static,
{
    let metrics = init_metrics()?;
    let service = Service::builder(&config)
        .bundle(bundle)
        .customize(customize)
        .build()?;

    let addr = listen_addr(&config);
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| StartupError::Bind { addr, source })?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let signal = wait_for_shutdown_signal().await;
        tracing::info!(signal, "stopping");
        shutdown.trigger();
    });

    HttpServer::new(config, service, metrics)
        .run(listener, server_shutdown)
        .await
        .map_err(StartupError::Serve)
}
