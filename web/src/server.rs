//! HTTP server lifecycle: an explicit `start` returning a handle with an
//! explicit `stop`, no ambient singletons.

use std::io;
use std::net::SocketAddr;

use axum::http::HeaderValue;
use log::*;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::router::define_routes;
use crate::AppState;

/// A running server. Dropping the handle does not stop the server; call
/// [`ServerHandle::stop`] for an orderly shutdown.
pub struct ServerHandle {
    shutdown: watch::Sender<bool>,
    join: JoinHandle<io::Result<()>>,
    local_addr: SocketAddr,
    app_state: AppState,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops the server: cancels every live changes stream through the
    /// registry, then completes the graceful shutdown of the listener and
    /// awaits the serve task.
    pub async fn stop(self) -> io::Result<()> {
        info!(
            "Stopping server; cancelling {} active stream(s)",
            self.app_state.stream_registry.active_count()
        );
        self.app_state.stream_registry.shutdown_all();
        let _ = self.shutdown.send(true);

        match self.join.await {
            Ok(result) => result,
            Err(e) => Err(io::Error::new(io::ErrorKind::Other, e)),
        }
    }
}

/// Binds the configured interface and port and serves the API until
/// [`ServerHandle::stop`] is called.
pub async fn start(app_state: AppState) -> io::Result<ServerHandle> {
    let addr = format!(
        "{}:{}",
        app_state.config.interface, app_state.config.port
    );
    let listener = TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    let router = define_routes(app_state.clone()).layer(cors_layer(&app_state));

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let join = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.changed().await;
            })
            .await
    });

    info!("Server listening on http://{local_addr}");

    Ok(ServerHandle {
        shutdown: shutdown_tx,
        join,
        local_addr,
        app_state,
    })
}

fn cors_layer(app_state: &AppState) -> CorsLayer {
    let origins: Vec<HeaderValue> = app_state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
