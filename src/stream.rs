//! Streaming export API: emit document bytes as pages complete.
//!
//! ## Why stream?
//!
//! A long post lays out into many pages, and the HTTP handler serving the
//! download wants to start the response immediately — not after the whole
//! document has been assembled in memory. [`export_stream`] returns a byte
//! stream whose first chunks are available while later pages are still
//! being wrapped and measured.
//!
//! ## Plumbing
//!
//! Layout and serialization are CPU-bound, so they run on a blocking thread
//! ([`tokio::task::spawn_blocking`]); bytes cross back into async land
//! through a *bounded* channel. The bound is the backpressure contract: a
//! consumer that reads slowly eventually blocks the emitter, capping peak
//! memory at `chunk_size × chunk_capacity` no matter how large the document
//! is. If the consumer disappears entirely, the next send fails and emission
//! stops — logged, never propagated, because once bytes have flowed there is
//! no status line left to change.

use crate::config::ExportConfig;
use crate::error::ExportError;
use crate::pipeline::emit::PdfWriter;
use crate::pipeline::encode::{encode_cover, EncodedImage};
use crate::pipeline::layout::compose;
use crate::pipeline::resolve::ImageResolver;
use crate::request::DocumentRequest;
use bytes::Bytes;
use std::io::{self, Write};
use std::pin::Pin;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::Stream;
use tracing::{info, warn};

/// A boxed stream of document byte chunks.
pub type DocumentStream = Pin<Box<dyn Stream<Item = Bytes> + Send>>;

/// Export a post as a PDF, streaming bytes as pages are serialized.
///
/// The cover image (if any) is resolved before the stream is returned —
/// it is the only suspension point ahead of composition. A mid-stream sink
/// failure ends the stream early; it is logged but not surfaced, since the
/// consumer that could have been told is the one that went away.
///
/// # Example
/// ```rust,no_run
/// use blogify_pdf::{export_stream, DocumentRequest, ExportConfig};
/// use tokio_stream::StreamExt;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let request = DocumentRequest::new("Hello World", "A short post.");
/// let mut stream = export_stream(&request, &ExportConfig::default()).await?;
/// while let Some(chunk) = stream.next().await {
///     // hand chunk to the HTTP response body
///     drop(chunk);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn export_stream(
    request: &DocumentRequest,
    config: &ExportConfig,
) -> Result<DocumentStream, ExportError> {
    info!("Starting streaming export: '{}'", request.title);
    let image = resolve_cover(request, config).await;

    let (tx, rx) = mpsc::channel::<Bytes>(config.chunk_capacity);
    let request = request.clone();
    let config = config.clone();
    tokio::task::spawn_blocking(move || {
        if let Err(e) = emit_into(&request, image.as_ref(), &config, tx) {
            // The HTTP status is already on the wire; best effort only.
            warn!("Export of '{}' aborted mid-stream: {e}", request.title);
        }
    });

    Ok(Box::pin(ReceiverStream::new(rx)))
}

/// Resolve and decode the cover image, degrading every failure to `None`.
pub(crate) async fn resolve_cover(
    request: &DocumentRequest,
    config: &ExportConfig,
) -> Option<EncodedImage> {
    let resolver = ImageResolver::new(config);
    let raw = resolver
        .resolve(request.cover_image_ref.as_deref())
        .await?;
    match encode_cover(&raw.0) {
        Ok(image) => Some(image),
        Err(e) => {
            warn!("Could not decode cover image: {e}");
            None
        }
    }
}

/// Compose and serialize the whole document into the channel.
///
/// Runs on a blocking thread; `blocking_send` on the bounded channel is
/// where backpressure is applied.
fn emit_into(
    request: &DocumentRequest,
    image: Option<&EncodedImage>,
    config: &ExportConfig,
    tx: mpsc::Sender<Bytes>,
) -> io::Result<()> {
    let sink = ChannelWriter::new(tx, config.chunk_size);
    let mut writer = PdfWriter::new(sink, (config.page_width, config.page_height), image)?;
    for page in compose(request, image.map(|i| i.size()), config) {
        writer.write_page(&page)?;
    }
    let bytes = writer.finish()?;
    info!("Streamed export of '{}': {bytes} bytes", request.title);
    Ok(())
}

/// `io::Write` adapter that sends fixed-size chunks into a bounded channel.
struct ChannelWriter {
    tx: mpsc::Sender<Bytes>,
    buf: Vec<u8>,
    chunk_size: usize,
}

impl ChannelWriter {
    fn new(tx: mpsc::Sender<Bytes>, chunk_size: usize) -> Self {
        Self {
            tx,
            buf: Vec::with_capacity(chunk_size),
            chunk_size,
        }
    }

    fn send(&mut self, chunk: Vec<u8>) -> io::Result<()> {
        self.tx
            .blocking_send(Bytes::from(chunk))
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "consumer disconnected"))
    }
}

impl Write for ChannelWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        while self.buf.len() >= self.chunk_size {
            let rest = self.buf.split_off(self.chunk_size);
            let chunk = std::mem::replace(&mut self.buf, rest);
            self.send(chunk)?;
        }
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.buf.is_empty() {
            let chunk = std::mem::take(&mut self.buf);
            self.send(chunk)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_stream::StreamExt;

    #[tokio::test]
    async fn stream_produces_a_complete_document() {
        let request = DocumentRequest::new("Hello World", "A short post.");
        let config = ExportConfig::default();
        let mut stream = export_stream(&request, &config).await.unwrap();

        let mut bytes = Vec::new();
        while let Some(chunk) = stream.next().await {
            bytes.extend_from_slice(&chunk);
        }
        assert!(bytes.starts_with(b"%PDF-"));
        assert!(bytes.ends_with(b"%%EOF\n"));
    }

    #[tokio::test]
    async fn dropped_consumer_stops_emission_without_panicking() {
        let body = "backpressure test sentence with several words. ".repeat(4000);
        let request = DocumentRequest::new("Big", body);
        let config = ExportConfig::builder()
            .chunk_size(1024)
            .chunk_capacity(1)
            .build()
            .unwrap();

        let mut stream = export_stream(&request, &config).await.unwrap();
        // Read one chunk, then hang up.
        let first = stream.next().await.expect("first chunk");
        assert!(!first.is_empty());
        drop(stream);

        // Give the blocking task a moment to observe the closed channel;
        // nothing to assert beyond "no panic propagates".
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn first_chunk_arrives_before_the_stream_is_drained() {
        let body = "streaming first byte latency check. ".repeat(5000);
        let request = DocumentRequest::new("Big", body);
        let config = ExportConfig::builder()
            .chunk_size(1024)
            .chunk_capacity(2)
            .build()
            .unwrap();

        let mut stream = export_stream(&request, &config).await.unwrap();
        let first = stream.next().await.expect("first chunk");
        assert!(first.starts_with(b"%PDF-"));

        // The document is far larger than one chunk, so the first chunk
        // arriving proves bytes flow before emission completes.
        let mut rest = 0usize;
        while stream.next().await.is_some() {
            rest += 1;
        }
        assert!(rest > 0, "more chunks should follow the first");
    }
}
