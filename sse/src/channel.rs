//! The SSE channel: turns one writable byte sink into a typed event emitter.
//!
//! A channel owns exactly one sink for the lifetime of one HTTP response.
//! It formats records per the SSE wire grammar, exposes `write` and `close`,
//! and is agnostic to what drives it: the web layer hands it the sink, the
//! driver decides when to emit.

use bytes::Bytes;
use log::*;
use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;

use crate::error::{Error, Result};

/// Response headers a changes stream must carry. Applied exactly once by the
/// web handler when it builds the streaming response.
pub const RESPONSE_HEADERS: [(&str, &str); 4] = [
    ("Content-Type", "text/event-stream"),
    ("Cache-Control", "no-cache"),
    ("Connection", "keep-alive"),
    ("X-Accel-Buffering", "no"),
];

/// Comment lines identifying the stream to clients which load the endpoint
/// directly in a browser. Written once, before any event.
const PREAMBLE: &str = ": This is a comment. It is only visible to clients which load this page directly.\n: https://html.spec.whatwg.org/multipage/server-sent-events.html#server-sent-events\n";

/// A Server-Sent-Events channel over a byte sink.
///
/// State machine: `Open -> (write)* -> Closed`; no transition leaves
/// `Closed`. The channel is single-writer: one `UpdateSource` drives it, and
/// nothing else may touch the sink.
#[derive(Debug)]
pub struct Channel {
    /// `None` once the channel is closed.
    sink: Option<UnboundedSender<Bytes>>,
    retry_milliseconds: i64,
}

impl Channel {
    /// Opens a channel over `sink` and writes the identifying comment lines.
    ///
    /// `retry_milliseconds` is fixed for the connection's lifetime: zero
    /// omits the `retry:` directive from every record, a negative value is
    /// rejected with [`Error::InvalidConfiguration`] before any bytes are
    /// written.
    pub fn open(sink: UnboundedSender<Bytes>, retry_milliseconds: i64) -> Result<Self> {
        if retry_milliseconds < 0 {
            return Err(Error::InvalidConfiguration(format!(
                "retry_milliseconds must be a non-negative number, got {retry_milliseconds}"
            )));
        }

        let mut channel = Self {
            sink: Some(sink),
            retry_milliseconds,
        };
        channel.send(Bytes::from_static(PREAMBLE.as_bytes()))?;
        Ok(channel)
    }

    /// Writes one event record to the sink.
    ///
    /// The record consists of, in order: an `event:` line (only if
    /// `event_name` is non-empty), a `data:` line (always present, the
    /// payload serialized to single-line JSON), an `id:` line (only if
    /// `event_id` is non-empty), and a `retry:` line (only if the configured
    /// retry is non-zero), terminated by a blank line. The whole record
    /// reaches the sink as a single chunk or not at all: validation and
    /// serialization failures return [`Error::InvalidEvent`] with zero bytes
    /// written.
    pub fn write<T>(&mut self, event_name: &str, event_data: &T, event_id: &str) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        if self.is_closed() {
            return Err(Error::ChannelClosed);
        }
        if event_name.contains('\n') {
            return Err(Error::InvalidEvent(
                "event name cannot contain newlines".to_string(),
            ));
        }
        if event_id.contains('\n') {
            return Err(Error::InvalidEvent(
                "event id cannot contain newlines".to_string(),
            ));
        }

        let data = serde_json::to_string(event_data).map_err(|e| {
            Error::InvalidEvent(format!("event data is not serializable to JSON: {e}"))
        })?;

        let mut record = String::new();
        if !event_name.is_empty() {
            record.push_str("event: ");
            record.push_str(event_name);
            record.push('\n');
        }
        record.push_str("data: ");
        record.push_str(&data);
        record.push('\n');
        if !event_id.is_empty() {
            record.push_str("id: ");
            record.push_str(event_id);
            record.push('\n');
        }
        if self.retry_milliseconds != 0 {
            record.push_str("retry: ");
            record.push_str(&self.retry_milliseconds.to_string());
            record.push('\n');
        }
        record.push('\n');

        self.send(Bytes::from(record))
    }

    /// Ends the underlying sink, signalling end-of-response to the
    /// transport. Safe to call more than once; later calls are no-ops, since
    /// the driver's disconnect path can race normal shutdown.
    pub fn close(&mut self) {
        if self.sink.take().is_some() {
            debug!("SSE channel closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sink.is_none()
    }

    pub fn retry_milliseconds(&self) -> i64 {
        self.retry_milliseconds
    }

    /// Resolves once the transport has dropped the receiving half of the
    /// sink (the client disconnected), or immediately if the channel is
    /// already closed. The returned future holds no borrow of the channel,
    /// so the driver can select over it while retaining write access.
    pub fn disconnected(&self) -> impl std::future::Future<Output = ()> + 'static {
        let sink = self.sink.clone();
        async move {
            match sink {
                Some(sink) => sink.closed().await,
                None => {}
            }
        }
    }

    fn send(&mut self, bytes: Bytes) -> Result<()> {
        let sink = self.sink.as_ref().ok_or(Error::ChannelClosed)?;
        if sink.send(bytes).is_err() {
            // The receiving half is gone: the client disconnected between
            // the tick and the write. Terminal from here on.
            self.sink = None;
            return Err(Error::ChannelClosed);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::sync::mpsc::error::TryRecvError;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    fn drain(rx: &mut UnboundedReceiver<Bytes>) -> String {
        let mut out = String::new();
        while let Ok(chunk) = rx.try_recv() {
            out.push_str(std::str::from_utf8(&chunk).unwrap());
        }
        out
    }

    fn open_draining_preamble(retry: i64) -> (Channel, UnboundedReceiver<Bytes>) {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let channel = Channel::open(tx, retry).unwrap();
        drain(&mut rx);
        (channel, rx)
    }

    #[test]
    fn open_writes_the_preamble_exactly_once() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut channel = Channel::open(tx, 2000).unwrap();

        let preamble = drain(&mut rx);
        assert_eq!(
            preamble,
            ": This is a comment. It is only visible to clients which load this page directly.\n\
             : https://html.spec.whatwg.org/multipage/server-sent-events.html#server-sent-events\n"
        );

        // Subsequent writes never repeat the preamble.
        channel.write("update", &json!({"time": "T1"}), "1").unwrap();
        channel.write("update", &json!({"time": "T2"}), "1").unwrap();
        assert!(!drain(&mut rx).contains(": This is a comment"));
    }

    #[test]
    fn write_emits_the_full_record_in_field_order() {
        let (mut channel, mut rx) = open_draining_preamble(2000);
        channel.write("update", &json!({"time": "T1"}), "1").unwrap();
        assert_eq!(
            drain(&mut rx),
            "event: update\ndata: {\"time\":\"T1\"}\nid: 1\nretry: 2000\n\n"
        );
    }

    #[test]
    fn empty_fields_and_zero_retry_are_omitted() {
        let (mut channel, mut rx) = open_draining_preamble(0);
        channel.write("", &json!({"x": 1}), "").unwrap();
        assert_eq!(drain(&mut rx), "data: {\"x\":1}\n\n");
    }

    #[test]
    fn data_line_is_always_present_even_for_null() {
        let (mut channel, mut rx) = open_draining_preamble(0);
        channel.write("", &serde_json::Value::Null, "").unwrap();
        assert_eq!(drain(&mut rx), "data: null\n\n");
    }

    #[test]
    fn newline_in_event_name_is_rejected_without_writing() {
        let (mut channel, mut rx) = open_draining_preamble(2000);
        let err = channel
            .write("up\ndate", &json!({"x": 1}), "1")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidEvent(_)));
        assert_eq!(drain(&mut rx), "");
        // The channel stays open; a corrected write goes through.
        channel.write("update", &json!({"x": 1}), "1").unwrap();
        assert!(drain(&mut rx).starts_with("event: update\n"));
    }

    #[test]
    fn newline_in_event_id_is_rejected_without_writing() {
        let (mut channel, mut rx) = open_draining_preamble(2000);
        let err = channel.write("update", &json!({"x": 1}), "1\n2").unwrap_err();
        assert!(matches!(err, Error::InvalidEvent(_)));
        assert_eq!(drain(&mut rx), "");
    }

    #[test]
    fn unserializable_data_is_rejected_without_writing() {
        struct Cyclic;
        impl Serialize for Cyclic {
            fn serialize<S: serde::Serializer>(
                &self,
                _serializer: S,
            ) -> std::result::Result<S::Ok, S::Error> {
                Err(serde::ser::Error::custom("cannot be represented as JSON"))
            }
        }

        let (mut channel, mut rx) = open_draining_preamble(2000);
        let err = channel.write("update", &Cyclic, "1").unwrap_err();
        assert!(matches!(err, Error::InvalidEvent(_)));
        assert_eq!(drain(&mut rx), "");
    }

    #[test]
    fn negative_retry_fails_construction_with_zero_bytes() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let err = Channel::open(tx, -1).unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Disconnected)));
    }

    #[test]
    fn write_after_close_fails_with_channel_closed() {
        let (mut channel, mut rx) = open_draining_preamble(2000);
        channel.close();
        let err = channel.write("update", &json!({"x": 1}), "1").unwrap_err();
        assert_eq!(err, Error::ChannelClosed);
        // The sender was dropped on close, so the stream has ended with no
        // further bytes.
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Disconnected)));
    }

    #[test]
    fn close_is_idempotent() {
        let (mut channel, _rx) = open_draining_preamble(2000);
        channel.close();
        channel.close();
        assert!(channel.is_closed());
    }

    #[test]
    fn dropped_receiver_turns_writes_into_channel_closed() {
        let (mut channel, rx) = open_draining_preamble(2000);
        drop(rx);
        let err = channel.write("update", &json!({"x": 1}), "1").unwrap_err();
        assert_eq!(err, Error::ChannelClosed);
        assert!(channel.is_closed());
    }
}
