//! Error types for the blogify-pdf library.
//!
//! Only failures that can still change the outcome of an export appear here:
//!
//! * [`ExportError`] — **Fatal**: the export cannot proceed, or its output
//!   cannot be delivered (missing post record, invalid configuration, broken
//!   output sink). Returned as `Err(ExportError)` from the top-level
//!   `export*` functions.
//!
//! Cover-image failures are deliberately *not* part of this taxonomy. A
//! missing or unreachable image degrades to a document without an image
//! block; the resolver logs the cause at `warn!` and returns `None`. Making
//! that path an error would let a dead image host take down every export of
//! a post that references it.
//!
//! Once the first byte has been written to the sink there is no way to
//! change an HTTP status line, so mid-stream failures surface as
//! [`ExportError::EmissionFailed`] from the eager APIs and as a logged,
//! truncated stream from the streaming API.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the blogify-pdf library.
#[derive(Debug, Error)]
pub enum ExportError {
    // ── Lookup errors ─────────────────────────────────────────────────────
    /// The requested post record does not exist.
    ///
    /// Must be reported before any document bytes are written, so the
    /// caller can still answer with a "not found" status.
    #[error("Post not found: '{id}'")]
    PostNotFound { id: String },

    // ── Emission errors ───────────────────────────────────────────────────
    /// The output sink failed while the document was being written.
    ///
    /// Retrying is unsound — the consumer already holds a partial document —
    /// so emission is aborted and no further bytes are attempted.
    #[error("Document emission failed: {detail}")]
    EmissionFailed { detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output PDF file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error during composition.
    #[error("Internal error: {0}")]
    Internal(String),
}
