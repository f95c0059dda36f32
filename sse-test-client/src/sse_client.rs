use anyhow::Result;
use eventsource_client::{self as es, Client};
use futures_util::stream::StreamExt;
use log::*;
use serde_json::Value;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub struct Event {
    pub event_type: String,
    pub data: Value,
    pub timestamp: Instant,
}

/// One open changes-feed connection. Events are parsed on a background task
/// and handed over through a channel so scenarios can wait with a timeout.
pub struct Connection {
    pub recipe: String,
    event_rx: mpsc::UnboundedReceiver<Event>,
    _handle: tokio::task::JoinHandle<()>,
}

impl Connection {
    pub async fn establish(base_url: &str, recipe: &str) -> Result<Self> {
        let url = format!("{}/recipes/{}/changes", base_url, recipe);
        let (tx, rx) = mpsc::unbounded_channel();

        let client = es::ClientBuilder::for_url(&url)?.build();

        let label = recipe.to_string();
        let handle = tokio::spawn(async move {
            let mut stream = client.stream();

            loop {
                match stream.next().await {
                    Some(Ok(es::SSE::Event(event))) => {
                        if let Ok(data) = serde_json::from_str(&event.data) {
                            let sse_event = Event {
                                event_type: event.event_type,
                                data,
                                timestamp: Instant::now(),
                            };

                            if tx.send(sse_event).is_err() {
                                debug!("Event receiver dropped for recipe '{}'", label);
                                break;
                            }
                        }
                    }
                    Some(Ok(es::SSE::Comment(comment))) => {
                        debug!("Stream comment: {}", comment);
                    }
                    Some(Err(e)) => {
                        warn!("Stream error for recipe '{}': {}", label, e);
                    }
                    None => {
                        debug!("Stream ended for recipe '{}'", label);
                        break;
                    }
                }
            }
        });

        Ok(Self {
            recipe: recipe.to_string(),
            event_rx: rx,
            _handle: handle,
        })
    }

    /// Waits for the next event of the given type, discarding others.
    pub async fn wait_for_event(&mut self, event_type: &str, timeout: Duration) -> Result<Event> {
        let deadline = Instant::now() + timeout;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                anyhow::bail!("Timeout waiting for event: {}", event_type);
            }

            match tokio::time::timeout(remaining, self.event_rx.recv()).await {
                Ok(Some(event)) if event.event_type == event_type => {
                    return Ok(event);
                }
                Ok(Some(event)) => {
                    debug!("Ignoring event '{}' on '{}'", event.event_type, self.recipe);
                }
                Ok(None) => {
                    anyhow::bail!("Stream closed while waiting for event: {}", event_type);
                }
                Err(_) => {
                    anyhow::bail!("Timeout waiting for event: {}", event_type);
                }
            }
        }
    }
}
