//! Eager (full-document) export entry points.
//!
//! ## Why eager vs. streaming?
//!
//! This module provides the simpler API: lay out and serialize everything,
//! then return the finished document. Use [`crate::stream::export_stream`]
//! instead when the consumer is an HTTP response and you want the first
//! bytes on the wire before the last page exists.

use crate::config::ExportConfig;
use crate::error::ExportError;
use crate::output::{ExportOutput, ExportStats};
use crate::pipeline::emit::PdfWriter;
use crate::pipeline::layout::compose;
use crate::request::DocumentRequest;
use crate::stream::resolve_cover;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Export a post as a complete in-memory PDF document.
///
/// The cover image is resolved first; resolution failures degrade to a
/// document without an image and are never surfaced here.
///
/// # Example
/// ```rust,no_run
/// use blogify_pdf::{export, DocumentRequest, ExportConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let request = DocumentRequest::new("Hello World", "A short post.");
/// let output = export(&request, &ExportConfig::default()).await?;
/// assert!(output.bytes.starts_with(b"%PDF-"));
/// # Ok(())
/// # }
/// ```
pub async fn export(
    request: &DocumentRequest,
    config: &ExportConfig,
) -> Result<ExportOutput, ExportError> {
    info!("Starting export: '{}'", request.title);

    // ── Resolve the cover image ──────────────────────────────────────────
    let resolve_start = Instant::now();
    let image = resolve_cover(request, config).await;
    let resolve_duration_ms = resolve_start.elapsed().as_millis() as u64;
    let has_cover_image = image.is_some();

    // ── Compose + serialize on a blocking thread ─────────────────────────
    let request_clone = request.clone();
    let config_clone = config.clone();
    let (bytes, pages, emit_duration_ms) =
        tokio::task::spawn_blocking(move || -> Result<(Vec<u8>, usize, u64), ExportError> {
            let emit_start = Instant::now();
            let mut out = Vec::new();
            let mut writer = PdfWriter::new(
                &mut out,
                (config_clone.page_width, config_clone.page_height),
                image.as_ref(),
            )
            .map_err(emission_failed)?;
            for page in compose(
                &request_clone,
                image.as_ref().map(|i| i.size()),
                &config_clone,
            ) {
                writer.write_page(&page).map_err(emission_failed)?;
            }
            let pages = writer.pages_written();
            writer.finish().map_err(emission_failed)?;
            Ok((out, pages, emit_start.elapsed().as_millis() as u64))
        })
        .await
        .map_err(|e| ExportError::Internal(format!("layout task failed: {e}")))??;

    let stats = ExportStats {
        pages,
        bytes_written: bytes.len(),
        resolve_duration_ms,
        emit_duration_ms,
        has_cover_image,
    };
    info!(
        "Export complete: '{}', {} pages, {} bytes",
        request.title, stats.pages, stats.bytes_written
    );

    Ok(ExportOutput { bytes, stats })
}

/// Export a post and write the PDF directly to a file.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn export_to_file(
    request: &DocumentRequest,
    output_path: impl AsRef<Path>,
    config: &ExportConfig,
) -> Result<ExportStats, ExportError> {
    let output = export(request, config).await?;
    let path = output_path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                ExportError::OutputWriteFailed {
                    path: path.to_path_buf(),
                    source: e,
                }
            })?;
        }
    }

    let tmp_path = path.with_extension("pdf.tmp");
    tokio::fs::write(&tmp_path, &output.bytes)
        .await
        .map_err(|e| ExportError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| ExportError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    Ok(output.stats)
}

fn emission_failed(e: std::io::Error) -> ExportError {
    ExportError::EmissionFailed {
        detail: e.to_string(),
    }
}
