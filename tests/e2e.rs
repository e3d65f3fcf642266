//! End-to-end integration tests for blogify-pdf.
//!
//! These tests run the full pipeline — resolve, encode, layout, emit —
//! against local fixtures only; remote-image scenarios use unreachable
//! TEST-NET addresses so no network access is required.

use blogify_pdf::{
    attachment_filename, content_disposition, export, export_stream, export_to_file, sanitize,
    DocumentRequest, ExportConfig, MEDIA_TYPE,
};
use chrono::TimeZone;
use std::io::Read;
use tokio_stream::StreamExt;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Assert the byte-level framing of a finished document.
fn assert_pdf_quality(bytes: &[u8], context: &str) {
    assert!(
        bytes.starts_with(b"%PDF-1.4\n"),
        "[{context}] missing PDF header"
    );
    assert!(bytes.ends_with(b"%%EOF\n"), "[{context}] missing EOF marker");

    let text = String::from_utf8_lossy(bytes);
    assert!(text.contains("/Type /Catalog"), "[{context}] no catalog");
    assert!(text.contains("/Type /Pages"), "[{context}] no page tree");
    assert!(text.contains("startxref"), "[{context}] no startxref");

    // A valid document always has at least one page.
    let count = page_count(bytes);
    assert!(count >= 1, "[{context}] page count {count}");
}

/// Extract `/Count N` from the page tree.
///
/// Searched from the end: the page tree is written after the content
/// streams, whose compressed bytes could contain any substring.
fn page_count(bytes: &[u8]) -> usize {
    let text = String::from_utf8_lossy(bytes);
    let at = text.rfind("/Count ").expect("page tree /Count");
    text[at + 7..]
        .split_whitespace()
        .next()
        .unwrap()
        .parse()
        .unwrap()
}

/// Inflate every Flate-compressed stream and concatenate the results.
///
/// Streams that fail to inflate (the DCTDecode image payload) are skipped,
/// so the result is exactly the drawable text operators.
fn content_text(bytes: &[u8]) -> String {
    // The dictionary close before the stream keyword keeps this from
    // matching the "stream" inside "endstream".
    const OPEN: &[u8] = b">>\nstream\n";
    let mut out = String::new();
    let mut rest = bytes;
    while let Some(start) = find(rest, OPEN) {
        let body = &rest[start + OPEN.len()..];
        let end = find(body, b"\nendstream").unwrap_or(body.len());
        let mut decoder = flate2::read::ZlibDecoder::new(&body[..end]);
        let mut raw = Vec::new();
        // Operators are ASCII but string payloads are WinAnsi, so inflate
        // to bytes first and convert lossily.
        if decoder.read_to_end(&mut raw).is_ok() {
            out.push_str(&String::from_utf8_lossy(&raw));
        }
        rest = &body[end..];
    }
    out
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|w| w == needle)
}

/// Write a small PNG fixture under `<root>/uploads/cover.png`.
fn write_cover_fixture(root: &std::path::Path) {
    std::fs::create_dir_all(root.join("uploads")).unwrap();
    let img = image::RgbImage::from_fn(64, 48, |x, _| image::Rgb([(x * 4) as u8, 80, 160]));
    image::DynamicImage::ImageRgb8(img)
        .save(root.join("uploads/cover.png"))
        .unwrap();
}

fn fixture_request() -> DocumentRequest {
    DocumentRequest::new("Hello World", "A short post.")
        .with_author("Alice")
        .with_created_at(chrono::Utc.with_ymd_and_hms(2024, 3, 9, 12, 30, 0).unwrap())
}

// ── Scenarios ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn single_page_round_trip() {
    let output = export(&fixture_request(), &ExportConfig::default())
        .await
        .unwrap();
    assert_pdf_quality(&output.bytes, "round-trip");
    assert_eq!(output.stats.pages, 1);
    assert_eq!(page_count(&output.bytes), 1);

    let text = content_text(&output.bytes);
    assert!(text.contains("(Hello World) Tj"));
    assert!(text.contains("(A short post.) Tj"));
    assert!(text.contains("(Created by: Alice) Tj"));
    assert!(text.contains("(Created at: March 9, 2024 12:30) Tj"));
    assert!(text.contains("Generated by Blogify"));
}

#[tokio::test]
async fn multi_page_export_keeps_one_footer_and_stamps_every_page() {
    let body = "Pagination needs enough words to overflow a page or three. ".repeat(600);
    let request = DocumentRequest::new("A Long Read", body).with_author("Bob");
    let output = export(&request, &ExportConfig::default()).await.unwrap();

    assert_pdf_quality(&output.bytes, "multi-page");
    assert!(output.stats.pages > 1, "got {} pages", output.stats.pages);
    assert_eq!(page_count(&output.bytes), output.stats.pages);

    let text = content_text(&output.bytes);
    assert_eq!(
        text.matches("(Created by: Bob) Tj").count(),
        1,
        "footer must appear exactly once"
    );
    assert_eq!(
        text.matches("Generated by Blogify").count(),
        output.stats.pages,
        "every page carries the stamp"
    );
    // The title appears only on page one.
    assert_eq!(text.matches("(A Long Read) Tj").count(), 1);
}

#[tokio::test]
async fn local_cover_image_is_embedded() {
    let dir = tempfile::tempdir().unwrap();
    write_cover_fixture(dir.path());
    let config = ExportConfig::builder()
        .asset_root(dir.path())
        .build()
        .unwrap();

    let request = fixture_request().with_cover_image("/uploads/cover.png");
    let output = export(&request, &config).await.unwrap();

    assert_pdf_quality(&output.bytes, "cover");
    assert!(output.stats.has_cover_image);
    let text = String::from_utf8_lossy(&output.bytes);
    assert!(text.contains("/Filter /DCTDecode"));
    assert!(content_text(&output.bytes).contains("/Im0 Do"));
}

#[tokio::test]
async fn unreachable_cover_image_degrades_to_no_image() {
    let config = ExportConfig::builder()
        .download_timeout_secs(1)
        .build()
        .unwrap();
    let request = fixture_request().with_cover_image("http://192.0.2.1/cover.png");

    let output = export(&request, &config).await.expect("export must succeed");
    assert_pdf_quality(&output.bytes, "degraded");
    assert!(!output.stats.has_cover_image);
    assert!(!String::from_utf8_lossy(&output.bytes).contains("DCTDecode"));
}

#[tokio::test]
async fn undecodable_cover_image_degrades_to_no_image() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("uploads")).unwrap();
    std::fs::write(dir.path().join("uploads/broken.png"), b"not an image").unwrap();
    let config = ExportConfig::builder()
        .asset_root(dir.path())
        .build()
        .unwrap();

    let request = fixture_request().with_cover_image("/uploads/broken.png");
    let output = export(&request, &config).await.expect("export must succeed");
    assert!(!output.stats.has_cover_image);
}

#[tokio::test]
async fn streaming_export_matches_eager_export() {
    let dir = tempfile::tempdir().unwrap();
    write_cover_fixture(dir.path());
    let config = ExportConfig::builder()
        .asset_root(dir.path())
        .chunk_size(2048)
        .build()
        .unwrap();
    let body = "Streaming parity paragraph.\n".repeat(200);
    let request = DocumentRequest::new("Parity", body).with_cover_image("/uploads/cover.png");

    let eager = export(&request, &config).await.unwrap();

    let mut stream = export_stream(&request, &config).await.unwrap();
    let mut streamed = Vec::new();
    while let Some(chunk) = stream.next().await {
        assert!(chunk.len() <= 2048);
        streamed.extend_from_slice(&chunk);
    }

    assert_eq!(eager.bytes, streamed);
}

#[tokio::test]
async fn export_to_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("post.pdf");
    let stats = export_to_file(&fixture_request(), &path, &ExportConfig::default())
        .await
        .unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes.len(), stats.bytes_written);
    assert_pdf_quality(&bytes, "to-file");
}

#[tokio::test]
async fn empty_body_still_produces_one_full_page() {
    let request = DocumentRequest::new("Just a Title", "");
    let output = export(&request, &ExportConfig::default()).await.unwrap();
    assert_eq!(output.stats.pages, 1);

    let text = content_text(&output.bytes);
    assert!(text.contains("(Just a Title) Tj"));
    assert!(text.contains("(Created by: Unknown) Tj"));
    assert!(text.contains("Generated by Blogify"));
}

// ── Boundary declarations ────────────────────────────────────────────────────

#[test]
fn media_type_and_disposition_for_the_http_boundary() {
    assert_eq!(MEDIA_TYPE, "application/pdf");
    assert_eq!(
        content_disposition("My: Blog/Post"),
        "attachment; filename=\"My BlogPostBlog.pdf\""
    );
    assert_eq!(attachment_filename(""), "blogBlog.pdf");
    assert_eq!(sanitize("a<b>c"), "abc");
}
