//! Output types returned by the eager export entry points.

use serde::{Deserialize, Serialize};

/// Timing and size statistics for one export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportStats {
    /// Number of pages in the produced document.
    pub pages: usize,
    /// Total bytes written to the sink.
    pub bytes_written: usize,
    /// Wall-clock time spent resolving the cover image, in milliseconds.
    pub resolve_duration_ms: u64,
    /// Wall-clock time spent on layout and serialization, in milliseconds.
    pub emit_duration_ms: u64,
    /// Whether a cover image was resolved and embedded.
    pub has_cover_image: bool,
}

/// The result of an eager export: the complete document plus stats.
///
/// The streaming API ([`crate::export_stream`]) never materializes this —
/// use it when you actually need the whole document in memory, e.g. to
/// attach it to an e-mail or store it in a cache.
#[derive(Debug, Clone)]
pub struct ExportOutput {
    /// The complete PDF document.
    pub bytes: Vec<u8>,
    /// Export statistics.
    pub stats: ExportStats,
}
