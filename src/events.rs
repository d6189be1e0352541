//! Server-Sent Events support for `GET /api/v1/events`.
//!
//! Each SSE record carries one JSON document in its `data:` lines. Records
//! that fail to decode are dropped without ending the stream.

use std::fmt;
use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::stream::{self, BoxStream};
use futures::{Stream, StreamExt};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::watch;

use crate::ClientError;

/// Request path of the event stream endpoint.
pub const EVENTS_PATH: &str = "/api/v1/events";

const DATA_FIELD: &str = "data:";

/// Callback invoked with the raw record text when a record is not valid JSON.
pub type MalformedEventHook = Arc<dyn Fn(&str, &serde_json::Error) + Send + Sync>;

/// One decoded event.
///
/// The payload is whatever JSON the server sent. By convention it is an object
/// with a `type` discriminator, but this is not enforced.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Event(Value);

impl Event {
    /// Value of the top-level `type` field, if it is a string.
    pub fn event_type(&self) -> Option<&str> {
        self.0.get("type").and_then(Value::as_str)
    }

    pub fn payload(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Event> for Value {
    fn from(event: Event) -> Self {
        event.0
    }
}

/// Line-oriented SSE record decoder.
///
/// Consecutive `data:` payloads are concatenated with no separator. A blank
/// line ends the record: the buffer is decoded as JSON, and reset whether or
/// not decoding succeeded.
#[derive(Default)]
pub struct SseDecoder {
    buffer: String,
    on_malformed: Option<MalformedEventHook>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a decoder that reports dropped records to `hook`.
    #[must_use]
    pub fn with_malformed_hook(mut self, hook: MalformedEventHook) -> Self {
        self.on_malformed = Some(hook);
        self
    }

    /// Feeds one protocol line (without its `\n`) and returns a completed event, if any.
    pub fn feed_line(&mut self, line: &str) -> Option<Event> {
        let line = line.strip_suffix('\r').unwrap_or(line);

        if line.is_empty() {
            return self.finish_record();
        }

        if let Some(rest) = line.strip_prefix(DATA_FIELD) {
            self.buffer.push_str(rest.strip_prefix(' ').unwrap_or(rest));
        }
        // `event:`, `id:`, `retry:` and comments carry nothing we use.
        None
    }

    /// True when no partial record is buffered.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    fn finish_record(&mut self) -> Option<Event> {
        if self.buffer.is_empty() {
            return None;
        }

        let record = std::mem::take(&mut self.buffer);
        match serde_json::from_str(&record) {
            Ok(value) => Some(Event(value)),
            Err(err) => {
                tracing::trace!(error = %err, "dropping malformed event record");
                if let Some(hook) = &self.on_malformed {
                    hook(&record, &err);
                }
                None
            }
        }
    }
}

impl fmt::Debug for SseDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SseDecoder")
            .field("buffer", &self.buffer)
            .field("on_malformed", &self.on_malformed.is_some())
            .finish()
    }
}

/// Splits a byte stream into `\n`-terminated lines.
///
/// Bytes are buffered until a full line is present so multi-byte UTF-8
/// sequences split across chunks decode correctly.
#[derive(Debug, Default)]
struct LineSplitter {
    pending: Vec<u8>,
}

impl LineSplitter {
    fn push(&mut self, chunk: &[u8]) {
        self.pending.extend_from_slice(chunk);
    }

    fn next_line(&mut self) -> Option<String> {
        let end = self.pending.iter().position(|byte| *byte == b'\n')?;
        let line: Vec<u8> = self.pending.drain(..=end).collect();
        Some(String::from_utf8_lossy(&line[..end]).into_owned())
    }
}

/// Builds the `filter` query value: event types joined by commas.
///
/// Returns `None` for an empty filter, in which case the parameter is omitted.
pub(crate) fn filter_query<S: AsRef<str>>(filter: &[S]) -> Option<String> {
    if filter.is_empty() {
        return None;
    }
    Some(
        filter
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(","),
    )
}

// Only an explicit `close()` ends a stream. A dropped sender means no
// further signal can arrive, not that the stream was closed.
fn shutdown_requested(shutdown: &watch::Receiver<bool>) -> bool {
    *shutdown.borrow()
}

enum Wake<T> {
    Closed,
    SignalGone,
    Chunk(Option<T>),
}

struct ChunkState<S> {
    chunks: Pin<Box<S>>,
    lines: LineSplitter,
    decoder: SseDecoder,
    shutdown: watch::Receiver<bool>,
    signal_live: bool,
    done: bool,
}

/// Async stream of [`Event`]s from one open connection.
///
/// Events are parsed only as fast as they are polled. Dropping the stream, or
/// calling `close()` on the client that opened it, tears down the connection.
/// Dropping the client alone does not end the stream. A transport
/// failure is yielded once as an `Err` and ends the stream.
pub struct EventStream {
    inner: BoxStream<'static, Result<Event, ClientError>>,
}

impl EventStream {
    pub(crate) fn from_chunks<S, B, E>(
        chunks: S,
        decoder: SseDecoder,
        shutdown: watch::Receiver<bool>,
    ) -> Self
    where
        S: Stream<Item = Result<B, E>> + Send + 'static,
        B: AsRef<[u8]> + Send + 'static,
        E: Into<ClientError> + Send + 'static,
    {
        let state = ChunkState {
            chunks: Box::pin(chunks),
            lines: LineSplitter::default(),
            decoder,
            shutdown,
            signal_live: true,
            done: false,
        };

        let inner = stream::unfold(state, |mut state| async move {
            if state.done {
                return None;
            }

            loop {
                if shutdown_requested(&state.shutdown) {
                    tracing::debug!("event stream closed by client");
                    return None;
                }

                while let Some(line) = state.lines.next_line() {
                    if let Some(event) = state.decoder.feed_line(&line) {
                        return Some((Ok(event), state));
                    }
                }

                let wake = if state.signal_live {
                    tokio::select! {
                        biased;
                        changed = state.shutdown.wait_for(|closed| *closed) => match changed {
                            Ok(_) => Wake::Closed,
                            Err(_) => Wake::SignalGone,
                        },
                        chunk = state.chunks.next() => Wake::Chunk(chunk),
                    }
                } else {
                    Wake::Chunk(state.chunks.next().await)
                };

                match wake {
                    Wake::Closed => {
                        tracing::debug!("event stream closed by client");
                        return None;
                    }
                    Wake::SignalGone => state.signal_live = false,
                    Wake::Chunk(Some(Ok(chunk))) => state.lines.push(chunk.as_ref()),
                    Wake::Chunk(Some(Err(err))) => {
                        state.done = true;
                        return Some((Err(err.into()), state));
                    }
                    Wake::Chunk(None) => {
                        tracing::debug!(
                            partial_record = !state.decoder.is_empty(),
                            "event stream ended by server"
                        );
                        return None;
                    }
                }
            }
        });

        Self {
            inner: inner.boxed(),
        }
    }

    /// Closes the connection. Equivalent to dropping the stream.
    pub fn close(self) {
        drop(self);
    }
}

impl Stream for EventStream {
    type Item = Result<Event, ClientError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream").finish_non_exhaustive()
    }
}

/// Blocking iterator of [`Event`]s from one open connection.
///
/// This is the synchronous counterpart of [`EventStream`]. Each call to
/// `next` reads from the connection until a full record arrives.
///
/// The client's `close()` is checked between lines, so an iterator blocked
/// on an idle connection returns only once the next line or the stream
/// timeout arrives. Set [`crate::ClientConfig::with_stream_timeout`] to bound
/// that wait.
pub struct BlockingEventStream {
    reader: Box<dyn BufRead + Send>,
    decoder: SseDecoder,
    shutdown: watch::Receiver<bool>,
    done: bool,
}

impl BlockingEventStream {
    pub(crate) fn from_reader<R>(
        reader: R,
        decoder: SseDecoder,
        shutdown: watch::Receiver<bool>,
    ) -> Self
    where
        R: Read + Send + 'static,
    {
        Self {
            reader: Box::new(BufReader::new(reader)),
            decoder,
            shutdown,
            done: false,
        }
    }

    /// Closes the connection. Equivalent to dropping the iterator.
    pub fn close(self) {
        drop(self);
    }
}

impl Iterator for BlockingEventStream {
    type Item = Result<Event, ClientError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut line = Vec::new();

        while !self.done {
            if shutdown_requested(&self.shutdown) {
                tracing::debug!("event stream closed by client");
                self.done = true;
                break;
            }

            line.clear();
            match self.reader.read_until(b'\n', &mut line) {
                Ok(0) => {
                    tracing::debug!(
                        partial_record = !self.decoder.is_empty(),
                        "event stream ended by server"
                    );
                    self.done = true;
                }
                Ok(_) => {
                    if line.last() == Some(&b'\n') {
                        line.pop();
                    }
                    let text = String::from_utf8_lossy(&line);
                    if let Some(event) = self.decoder.feed_line(&text) {
                        return Some(Ok(event));
                    }
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(err) => {
                    self.done = true;
                    return Some(Err(err.into()));
                }
            }
        }

        None
    }
}

impl fmt::Debug for BlockingEventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockingEventStream")
            .field("decoder", &self.decoder)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}
