//! Streaming result serializer
//!
//! Output is `{"<field>":[<entity>,<entity>,...]}`, produced one fragment at a
//! time so at most one row is held in memory. Two drivers share the encoder:
//! [`serialize`] writes into an `AsyncWrite` sink, [`body_stream`] yields
//! chunks for an HTTP response body. Both bound every write by the write
//! deadline and release the cursor's transaction on every exit path, after
//! the closing bracket on success.

use crate::executor::LookupCursor;
use crate::projection::EntityProjection;
use bytes::Bytes;
use futures::Stream;
use rglookup_core::{Error, Result};
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::error::SendTimeoutError;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tracing::{debug, warn};

/// Encodes the response envelope piece by piece.
#[derive(Debug)]
pub struct JsonArrayEncoder {
    field: String,
    written: usize,
}

impl JsonArrayEncoder {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            written: 0,
        }
    }

    /// `{"<field>":[`
    pub fn open(&self) -> Bytes {
        let name = serde_json::Value::String(self.field.clone());
        Bytes::from(format!("{{{}:[", name))
    }

    /// One array element, comma-prefixed after the first.
    pub fn element(&mut self, projection: &EntityProjection) -> Result<Bytes> {
        let mut buf = Vec::with_capacity(128);
        if self.written > 0 {
            buf.push(b',');
        }
        serde_json::to_writer(&mut buf, projection)?;
        self.written += 1;
        Ok(Bytes::from(buf))
    }

    /// `]}`
    pub fn close(&self) -> Bytes {
        Bytes::from_static(b"]}")
    }

    pub fn written(&self) -> usize {
        self.written
    }
}

/// Drain `cursor` into `sink` under `field`, flushing after every element.
/// Returns the number of entities written.
pub async fn serialize<W>(
    field: &str,
    mut cursor: LookupCursor,
    sink: &mut W,
    write_timeout: Duration,
) -> Result<usize>
where
    W: AsyncWrite + Unpin,
{
    let outcome = write_rows(field, &mut cursor, sink, write_timeout).await;
    let closed = cursor.close().await;
    let written = outcome?;
    closed?;
    debug!(field, written, "serialized lookup");
    Ok(written)
}

async fn write_rows<W>(
    field: &str,
    cursor: &mut LookupCursor,
    sink: &mut W,
    write_timeout: Duration,
) -> Result<usize>
where
    W: AsyncWrite + Unpin,
{
    let mut encoder = JsonArrayEncoder::new(field);
    write_chunk(sink, &encoder.open(), write_timeout).await?;
    while let Some(projection) = cursor.next().await? {
        let chunk = encoder.element(&projection)?;
        drop(projection);
        write_chunk(sink, &chunk, write_timeout).await?;
    }
    write_chunk(sink, &encoder.close(), write_timeout).await?;
    Ok(encoder.written())
}

async fn write_chunk<W>(sink: &mut W, chunk: &[u8], write_timeout: Duration) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let write = async {
        sink.write_all(chunk).await?;
        sink.flush().await
    };
    match timeout(write_timeout, write).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(Error::StreamWrite(e.to_string())),
        Err(_) => Err(Error::timeout("response write", write_timeout)),
    }
}

/// Chunked body for an HTTP response.
///
/// A spawned task drains the cursor into a one-slot channel, so each chunk
/// waits for the consumer under `write_timeout` just as [`serialize`] waits
/// for its sink. The task closes the cursor before reporting the outcome. A
/// failure after the first chunk ends the stream with an error, which aborts
/// the response; the client sees truncated JSON. If the consumer drops the
/// stream, the task sees the closed channel and releases the transaction.
pub fn body_stream(
    field: impl Into<String>,
    cursor: LookupCursor,
    write_timeout: Duration,
) -> impl Stream<Item = Result<Bytes>> + Send + 'static {
    let (chunks, mut rx) = mpsc::channel(1);
    let (done, outcome) = oneshot::channel();
    tokio::spawn(produce(field.into(), cursor, chunks, done, write_timeout));

    async_stream::stream! {
        while let Some(chunk) = rx.recv().await {
            yield Ok(chunk);
        }
        match outcome.await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => yield Err(e),
            Err(_) => yield Err(Error::StreamWrite("response producer stopped".into())),
        }
    }
}

async fn produce(
    field: String,
    mut cursor: LookupCursor,
    chunks: mpsc::Sender<Bytes>,
    done: oneshot::Sender<Result<usize>>,
    write_timeout: Duration,
) {
    let outcome = send_rows(&field, &mut cursor, &chunks, write_timeout).await;
    let closed = cursor.close().await;

    match &outcome {
        Ok(written) => debug!(field = %field, written, "streamed lookup"),
        Err(e) => warn!(field = %field, "aborting response mid-stream: {}", e),
    }
    if let Err(e) = closed {
        warn!(field = %field, "closing transaction after response failed: {}", e);
    }
    // the receiver is gone when the client disconnected
    let _ = done.send(outcome);
}

async fn send_rows(
    field: &str,
    cursor: &mut LookupCursor,
    chunks: &mpsc::Sender<Bytes>,
    write_timeout: Duration,
) -> Result<usize> {
    let mut encoder = JsonArrayEncoder::new(field);
    send_chunk(chunks, encoder.open(), write_timeout).await?;
    while let Some(projection) = cursor.next().await? {
        let chunk = encoder.element(&projection)?;
        drop(projection);
        send_chunk(chunks, chunk, write_timeout).await?;
    }
    send_chunk(chunks, encoder.close(), write_timeout).await?;
    Ok(encoder.written())
}

async fn send_chunk(chunks: &mpsc::Sender<Bytes>, chunk: Bytes, write_timeout: Duration) -> Result<()> {
    match chunks.send_timeout(chunk, write_timeout).await {
        Ok(()) => Ok(()),
        Err(SendTimeoutError::Timeout(_)) => Err(Error::timeout("response write", write_timeout)),
        Err(SendTimeoutError::Closed(_)) => Err(Error::StreamWrite("response body dropped".into())),
    }
}
