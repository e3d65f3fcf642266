//! Configuration types for post-to-PDF export.
//!
//! All export behaviour is controlled through [`ExportConfig`], built via its
//! [`ExportConfigBuilder`]. Everything the pipeline used to pick up from
//! ambient process state in earlier revisions — the asset root, the remote
//! fetch timeout, the stamp attribution — is an explicit field here, so two
//! exports with the same config and the same request produce the same bytes.
//!
//! # Design choice: builder over constructor
//! A ten-field constructor is unreadable and breaks on every new field. The
//! builder lets callers set only what they care about and rely on documented
//! defaults for the rest.

use crate::error::ExportError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A4 page width in PostScript points.
pub const A4_WIDTH: f32 = 595.28;
/// A4 page height in PostScript points.
pub const A4_HEIGHT: f32 = 841.89;

/// Configuration for a document export.
///
/// Built via [`ExportConfig::builder()`] or using
/// [`ExportConfig::default()`].
///
/// # Example
/// ```rust
/// use blogify_pdf::ExportConfig;
///
/// let config = ExportConfig::builder()
///     .asset_root("./public")
///     .download_timeout_secs(5)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Root directory for local cover-image references. Default: `./public`.
    ///
    /// A reference like `/uploads/cover.png` resolves to
    /// `<asset_root>/uploads/cover.png`. Resolution never escapes this
    /// directory; traversal components in the reference are rejected.
    pub asset_root: PathBuf,

    /// Timeout for remote cover-image downloads in seconds. Default: 10.
    ///
    /// Cover images are decoration, not content. A short timeout keeps a slow
    /// image host from stalling the whole export; on expiry the document is
    /// simply produced without the image.
    pub download_timeout_secs: u64,

    /// Page width in points. Default: A4 (595.28).
    pub page_width: f32,

    /// Page height in points. Default: A4 (841.89).
    pub page_height: f32,

    /// Uniform page margin in points. Default: 50.
    ///
    /// Content width is `page_width - 2 * margin`; every block except the
    /// page stamp is placed inside the margins.
    pub margin: f32,

    /// Maximum rendered height of the cover image in points. Default: 250.
    ///
    /// The image is scaled to fit `content width × max_image_height` with
    /// aspect ratio preserved, and is never upscaled beyond its intrinsic
    /// size.
    pub max_image_height: f32,

    /// Product name shown in the per-page stamp. Default: `Blogify`.
    pub product_name: String,

    /// Attribution shown in the per-page stamp. Default: `The Blogify Team`.
    pub attribution: String,

    /// Size of each emitted byte chunk in bytes. Default: 8192.
    pub chunk_size: usize,

    /// Number of chunks that may be in flight between the emitter and a slow
    /// consumer. Default: 8.
    ///
    /// This bound is the backpressure mechanism: once the channel holds
    /// `chunk_capacity` unread chunks the emitter blocks until the consumer
    /// catches up, so peak memory stays at `chunk_size * chunk_capacity`
    /// regardless of document length.
    pub chunk_capacity: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("./public"),
            download_timeout_secs: 10,
            page_width: A4_WIDTH,
            page_height: A4_HEIGHT,
            margin: 50.0,
            max_image_height: 250.0,
            product_name: "Blogify".to_string(),
            attribution: "The Blogify Team".to_string(),
            chunk_size: 8192,
            chunk_capacity: 8,
        }
    }
}

impl ExportConfig {
    /// Create a new builder for `ExportConfig`.
    pub fn builder() -> ExportConfigBuilder {
        ExportConfigBuilder {
            config: Self::default(),
        }
    }

    /// Horizontal extent available for placing blocks, in points.
    pub fn content_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }
}

/// Builder for [`ExportConfig`].
#[derive(Debug)]
pub struct ExportConfigBuilder {
    config: ExportConfig,
}

impl ExportConfigBuilder {
    pub fn asset_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.asset_root = root.into();
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs.max(1);
        self
    }

    pub fn page_size(mut self, width: f32, height: f32) -> Self {
        self.config.page_width = width;
        self.config.page_height = height;
        self
    }

    pub fn margin(mut self, margin: f32) -> Self {
        self.config.margin = margin.max(0.0);
        self
    }

    pub fn max_image_height(mut self, points: f32) -> Self {
        self.config.max_image_height = points.max(1.0);
        self
    }

    pub fn product_name(mut self, name: impl Into<String>) -> Self {
        self.config.product_name = name.into();
        self
    }

    pub fn attribution(mut self, attribution: impl Into<String>) -> Self {
        self.config.attribution = attribution.into();
        self
    }

    pub fn chunk_size(mut self, bytes: usize) -> Self {
        self.config.chunk_size = bytes.max(512);
        self
    }

    pub fn chunk_capacity(mut self, chunks: usize) -> Self {
        self.config.chunk_capacity = chunks.max(1);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExportConfig, ExportError> {
        let c = &self.config;
        if c.page_width <= 0.0 || c.page_height <= 0.0 {
            return Err(ExportError::InvalidConfig(format!(
                "Page size must be positive, got {} × {}",
                c.page_width, c.page_height
            )));
        }
        if c.content_width() <= 0.0 {
            return Err(ExportError::InvalidConfig(format!(
                "Margin {} leaves no content width on a {}pt-wide page",
                c.margin, c.page_width
            )));
        }
        if c.margin * 2.0 >= c.page_height {
            return Err(ExportError::InvalidConfig(format!(
                "Margin {} leaves no content height on a {}pt-tall page",
                c.margin, c.page_height
            )));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_a4_with_50pt_margins() {
        let c = ExportConfig::default();
        assert_eq!(c.page_width, A4_WIDTH);
        assert_eq!(c.page_height, A4_HEIGHT);
        assert_eq!(c.margin, 50.0);
        assert!((c.content_width() - 495.28).abs() < 0.01);
    }

    #[test]
    fn builder_rejects_margin_wider_than_page() {
        let err = ExportConfig::builder()
            .page_size(100.0, 200.0)
            .margin(60.0)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("content width"));
    }

    #[test]
    fn builder_clamps_chunk_capacity_to_one() {
        let c = ExportConfig::builder().chunk_capacity(0).build().unwrap();
        assert_eq!(c.chunk_capacity, 1);
    }
}
