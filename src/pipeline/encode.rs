//! Cover-image preparation: raw resolved bytes → embeddable JPEG.
//!
//! Posts reference cover images in whatever format they were uploaded in.
//! Rather than sniffing formats and special-casing pass-through, every
//! resolved image is decoded and re-encoded as baseline JPEG: one code path,
//! and the emitter can always embed the payload as a DCTDecode stream. The
//! decode also yields the intrinsic pixel size the layout step needs for
//! fit-scaling.
//!
//! Quality 85 keeps photographic covers visually clean while staying well
//! below the original upload size for typical camera output.

use image::codecs::jpeg::JpegEncoder;
use tracing::debug;

const JPEG_QUALITY: u8 = 85;

/// A cover image ready for embedding: baseline JPEG plus pixel dimensions.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    /// Baseline JPEG bytes, embedded verbatim as the XObject stream.
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl EncodedImage {
    /// Intrinsic pixel size, as consumed by the layout step.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Decode `bytes` and re-encode as an embeddable JPEG.
///
/// Alpha channels are dropped (JPEG has none; PDF DCTDecode streams are
/// opaque). Errors are returned to the caller, which treats them the same as
/// an unreachable image: log and continue without a cover.
pub fn encode_cover(bytes: &[u8]) -> Result<EncodedImage, image::ImageError> {
    let decoded = image::load_from_memory(bytes)?;
    let rgb = decoded.to_rgb8();
    let (width, height) = rgb.dimensions();

    let mut data = Vec::new();
    JpegEncoder::new_with_quality(&mut data, JPEG_QUALITY).encode_image(&rgb)?;
    debug!(
        "Encoded cover image: {}×{} px, {} bytes",
        width,
        height,
        data.len()
    );

    Ok(EncodedImage {
        data,
        width,
        height,
    })
}
