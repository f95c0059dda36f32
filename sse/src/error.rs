//! Error types for the SSE streaming layer.

use std::error::Error as StdError;
use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the SSE channel and its per-connection driver.
///
/// The three kinds have different blast radii: `InvalidConfiguration` is
/// fatal to stream setup and is surfaced before any bytes reach the wire,
/// `InvalidEvent` is local to a single `write` call and leaves the channel
/// open, and `ChannelClosed` marks the channel's terminal state. None of
/// them are retried automatically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The channel was constructed with invalid settings (e.g. a negative
    /// retry interval).
    InvalidConfiguration(String),

    /// A `write` call carried a malformed event: an embedded newline in the
    /// name or id, or a payload that failed to serialize to JSON.
    InvalidEvent(String),

    /// A write was attempted after the channel reached its terminal state,
    /// either through an explicit `close` or because the client went away.
    /// Callers treat this as the expected disconnect race, not a failure.
    ChannelClosed,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidConfiguration(msg) => {
                write!(f, "Invalid channel configuration: {msg}")
            }
            Error::InvalidEvent(msg) => write!(f, "Invalid event: {msg}"),
            Error::ChannelClosed => write!(f, "Channel is closed"),
        }
    }
}

impl StdError for Error {}
