//! Server-Sent Events (SSE) infrastructure for the wiki changes feed.
//!
//! This crate turns an ordinary HTTP response into a long-lived,
//! incrementally-written event stream and manages that stream's lifecycle:
//! setup, periodic emission, and client-initiated teardown.
//!
//! # Architecture
//!
//! - **One channel per connection**: a [`Channel`] exclusively owns the byte
//!   sink feeding one HTTP response body; no other writer may touch it.
//! - **One driver per channel**: an [`UpdateSource`] decides when to write;
//!   a repeating timer pushes one `update` event per period until the
//!   connection ends. There is no fan-out and no pub/sub; every connection
//!   gets its own independent producer loop.
//! - **Cancellation over locking**: the driver reacts to exactly two
//!   external events, the timer tick and the cancellation/disconnect signal.
//!   Nothing is shared across connections, so no locks are needed.
//! - **Registry for shutdown only**: the [`ConnectionRegistry`] tracks live
//!   streams so the server handle can cancel them all when it stops.
//!
//! # Stream flow
//!
//! 1. The router accepts `GET /recipes/{recipe}/changes` and opens a
//!    response body backed by an unbounded byte channel.
//! 2. The handler constructs a [`Channel`] over the sending half, which
//!    validates the retry interval and emits the identifying comment lines.
//! 3. The handler registers the connection and spawns an [`UpdateSource`]
//!    on its own task.
//! 4. The driver emits one `update` record every period; when the client
//!    disconnects (the transport drops the receiving half) or the registry
//!    cancels the stream, it stops the timer, closes the channel, and logs
//!    the disconnect exactly once.
//!
//! # Modules
//!
//! - `channel`: the wire-level channel (`open`/`write`/`close`) and the
//!   response headers a stream must carry
//! - `driver`: the per-connection update loop and its id policy
//! - `connection`: the shutdown registry with type-safe `ConnectionId`
//! - `message`: typed events and the `EventType` trait
//! - `error`: the `InvalidConfiguration` / `InvalidEvent` / `ChannelClosed`
//!   taxonomy

pub mod channel;
pub mod connection;
pub mod driver;
pub mod error;
pub mod message;

pub use channel::{Channel, RESPONSE_HEADERS};
pub use connection::{ConnectionId, ConnectionRegistry};
pub use driver::{IdPolicy, UpdateSource, UpdateSourceConfig};
pub use error::{Error, Result};
