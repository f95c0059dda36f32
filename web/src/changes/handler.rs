use std::convert::Infallible;
use std::time::Duration;

use async_stream::stream;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use log::*;
use sse::{Channel, UpdateSource, UpdateSourceConfig, RESPONSE_HEADERS};
use tokio::sync::mpsc;

use crate::error::Result;
use crate::params::recipe::RecipePath;
use crate::AppState;

/// Changes handler that establishes a long-lived connection streaming
/// periodic update events for one recipe. Every client gets its own
/// independent producer loop; there is no fan-out between connections.
pub(crate) async fn recipe_changes(
    Path(params): Path<RecipePath>,
    State(app_state): State<AppState>,
) -> Result<Response> {
    debug!(
        "Establishing changes stream for recipe '{}'",
        params.recipe
    );

    // The channel owns the sending half for the connection's lifetime; the
    // receiving half becomes the response body.
    let (tx, mut rx) = mpsc::unbounded_channel::<Bytes>();
    let channel = Channel::open(tx, app_state.config.changes_retry_millis)?;

    let registry = app_state.stream_registry.clone();
    let (connection_id, cancel) = registry.register(&params.recipe);

    let config = UpdateSourceConfig {
        interval: Duration::from_millis(app_state.config.changes_interval_millis),
        ..UpdateSourceConfig::default()
    };

    let source = UpdateSource::new(channel, config);
    tokio::spawn(async move {
        source.run(cancel).await;
        registry.unregister(&connection_id);
    });

    // Chunks arrive from the channel pre-formatted; pass them through. The
    // stream ends when the driver closes the channel.
    let body = stream! {
        while let Some(chunk) = rx.recv().await {
            yield Ok::<_, Infallible>(chunk);
        }
    };

    Ok((RESPONSE_HEADERS, Body::from_stream(body)).into_response())
}
