//! # blogify-pdf
//!
//! Stream stored blog posts as styled, paginated PDF documents.
//!
//! ## Why this crate?
//!
//! "Download as PDF" looks like glue code until the posts get long and the
//! cover images get flaky. Buffering the whole document before the first
//! byte leaves the client staring at a spinner and the server holding
//! megabytes per request; a dead image host must not take the export down
//! with it. This crate does the layout itself — wrapping, justification,
//! pagination, per-page decoration — and serializes pages to the sink as
//! they are produced, degrading gracefully when the cover image cannot be
//! fetched.
//!
//! ## Pipeline Overview
//!
//! ```text
//! DocumentRequest
//!  │
//!  ├─ 1. Resolve  cover image from URL or asset root (failures → no image)
//!  ├─ 2. Encode   decode + re-encode as embeddable JPEG, record size
//!  ├─ 3. Layout   wrap, justify, paginate into positioned blocks (lazy)
//!  └─ 4. Emit     serialize pages to PDF syntax, streamed with backpressure
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use blogify_pdf::{export_stream, content_disposition, DocumentRequest, ExportConfig, MEDIA_TYPE};
//! use tokio_stream::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExportConfig::default();
//!     let request = DocumentRequest::new("Hello World", "A short post.")
//!         .with_author("Alice");
//!
//!     // Headers for the HTTP response:
//!     let _content_type = MEDIA_TYPE;
//!     let _disposition = content_disposition(&request.title);
//!
//!     let mut stream = export_stream(&request, &config).await?;
//!     while let Some(chunk) = stream.next().await {
//!         // write chunk to the response body
//!         drop(chunk);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `post2pdf` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! blogify-pdf = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod export;
pub mod filename;
pub mod output;
pub mod pipeline;
pub mod request;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExportConfig, ExportConfigBuilder};
pub use error::ExportError;
pub use export::{export, export_to_file};
pub use filename::{attachment_filename, content_disposition, sanitize, MEDIA_TYPE};
pub use output::{ExportOutput, ExportStats};
pub use request::DocumentRequest;
pub use stream::{export_stream, DocumentStream};
