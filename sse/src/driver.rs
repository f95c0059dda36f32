//! Per-connection update driver.
//!
//! An [`UpdateSource`] is bound 1:1 to a [`Channel`] and decides when to
//! call `write`: a repeating timer pushes one `update` event per period
//! until the stream is cancelled or the client disconnects. The driver is
//! the only writer on its channel, so ticks are serialized and events reach
//! the wire strictly in emission order.

use std::time::Duration;

use log::*;
use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::channel::Channel;
use crate::error::Error;
use crate::message::{Event, EventType};

/// How the driver assigns the `id:` field of emitted updates.
#[derive(Debug, Clone)]
pub enum IdPolicy {
    /// Stamp every update with the same literal id. The default of `"1"`
    /// reproduces the observed wire output of the original scratch server.
    Fixed(String),
    /// Number updates 1, 2, 3, ... per connection.
    Sequential,
}

impl Default for IdPolicy {
    fn default() -> Self {
        IdPolicy::Fixed("1".to_string())
    }
}

#[derive(Debug, Clone)]
pub struct UpdateSourceConfig {
    /// Period between update events.
    pub interval: Duration,
    pub id_policy: IdPolicy,
}

impl Default for UpdateSourceConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(2000),
            id_policy: IdPolicy::default(),
        }
    }
}

/// Timer-driven producer loop for one changes stream.
pub struct UpdateSource {
    channel: Channel,
    config: UpdateSourceConfig,
    sequence: u64,
}

impl UpdateSource {
    pub fn new(channel: Channel, config: UpdateSourceConfig) -> Self {
        Self {
            channel,
            config,
            sequence: 0,
        }
    }

    /// Runs until the stream is cancelled, the client disconnects, or a
    /// write fails. Consumes the driver; the channel is closed on every exit
    /// path and the disconnect is logged exactly once. A failed write is
    /// terminal for the connection: updates are push-only, one shot per
    /// tick, never retried.
    pub async fn run(mut self, mut cancel: watch::Receiver<bool>) {
        // The first update fires one full period after the stream opens;
        // nothing is emitted at time zero.
        let mut ticker = time::interval_at(
            Instant::now() + self.config.interval,
            self.config.interval,
        );
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                // A dropped sender counts as cancelled, same as an explicit
                // shutdown signal.
                _ = cancel.changed() => {
                    debug!("Changes stream cancelled");
                    break;
                }
                _ = self.channel.disconnected() => {
                    debug!("Transport signalled client disconnect");
                    break;
                }
                _ = ticker.tick() => {
                    if !self.emit_update() {
                        break;
                    }
                }
            }
        }

        self.channel.close();
        info!("Client disconnected");
    }

    /// Emits one update event. Returns `false` when the connection is done.
    fn emit_update(&mut self) -> bool {
        let event = Event::update_now();
        let event_id = self.next_event_id();

        match self.channel.write(event.event_type(), &event, &event_id) {
            Ok(()) => true,
            Err(Error::ChannelClosed) => {
                // Expected race: the client disconnected between the tick
                // and the write. Not an error.
                debug!("Update write raced a disconnect; stopping");
                false
            }
            Err(e) => {
                error!("Failed to write update event: {e}");
                false
            }
        }
    }

    fn next_event_id(&mut self) -> String {
        match &self.config.id_policy {
            IdPolicy::Fixed(id) => id.clone(),
            IdPolicy::Sequential => {
                self.sequence += 1;
                self.sequence.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use tokio::sync::mpsc::error::TryRecvError;
    use tokio::sync::mpsc::{self, UnboundedReceiver};
    use tokio::task::JoinHandle;

    fn start_source(
        retry: i64,
        config: UpdateSourceConfig,
    ) -> (
        UnboundedReceiver<Bytes>,
        watch::Sender<bool>,
        JoinHandle<()>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let channel = Channel::open(tx, retry).unwrap();
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let handle = tokio::spawn(UpdateSource::new(channel, config).run(cancel_rx));
        (rx, cancel_tx, handle)
    }

    async fn recv_text(rx: &mut UnboundedReceiver<Bytes>) -> String {
        let chunk = rx.recv().await.expect("stream ended early");
        String::from_utf8(chunk.to_vec()).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn emits_updates_on_the_tick_cadence() {
        let (mut rx, _cancel_tx, handle) =
            start_source(2000, UpdateSourceConfig::default());

        let preamble = recv_text(&mut rx).await;
        assert!(preamble.starts_with(": This is a comment"));

        // Paused time auto-advances to each tick deadline.
        for _ in 0..3 {
            let record = recv_text(&mut rx).await;
            assert!(record.starts_with("event: update\ndata: {\"time\":\""), "{record}");
            assert!(record.contains("\nid: 1\n"), "{record}");
            assert!(record.ends_with("retry: 2000\n\n"), "{record}");
        }

        drop(rx);
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_before_first_tick_emits_no_events() {
        let (mut rx, cancel_tx, handle) =
            start_source(2000, UpdateSourceConfig::default());

        // Let the driver reach its select loop, then cancel before the
        // first period elapses.
        tokio::task::yield_now().await;
        cancel_tx.send(true).unwrap();
        handle.await.unwrap();

        let preamble = rx.try_recv().unwrap();
        assert!(preamble.starts_with(b": "));
        // The channel was closed with zero events written...
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Disconnected)));

        // ...and no tick fires even after a full period passes.
        time::advance(Duration::from_millis(2500)).await;
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Disconnected)));
    }

    #[tokio::test(start_paused = true)]
    async fn client_disconnect_stops_the_driver() {
        let (rx, _cancel_tx, handle) =
            start_source(2000, UpdateSourceConfig::default());

        tokio::task::yield_now().await;
        drop(rx);

        // The driver observes the dropped transport and exits on its own,
        // without waiting for a tick to fail.
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn sequential_policy_numbers_events_from_one() {
        let config = UpdateSourceConfig {
            id_policy: IdPolicy::Sequential,
            ..UpdateSourceConfig::default()
        };
        let (mut rx, _cancel_tx, handle) = start_source(0, config);

        let _preamble = recv_text(&mut rx).await;
        let first = recv_text(&mut rx).await;
        let second = recv_text(&mut rx).await;
        assert!(first.contains("\nid: 1\n"), "{first}");
        assert!(second.contains("\nid: 2\n"), "{second}");

        drop(rx);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn a_failed_write_is_treated_as_disconnect() {
        let (tx, rx) = mpsc::unbounded_channel();
        let channel = Channel::open(tx, 2000).unwrap();
        let mut source = UpdateSource::new(channel, UpdateSourceConfig::default());

        // The client raced a disconnect: the tick's write fails and the
        // driver treats that as terminal rather than raising.
        drop(rx);
        assert!(!source.emit_update());
        assert!(source.channel.is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn custom_interval_is_respected() {
        let config = UpdateSourceConfig {
            interval: Duration::from_millis(50),
            ..UpdateSourceConfig::default()
        };
        let (mut rx, _cancel_tx, handle) = start_source(0, config);

        let _preamble = recv_text(&mut rx).await;
        let started = Instant::now();
        let _first = recv_text(&mut rx).await;
        assert_eq!(started.elapsed(), Duration::from_millis(50));

        drop(rx);
        handle.await.unwrap();
    }
}
