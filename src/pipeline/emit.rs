//! Streaming PDF serialization.
//!
//! The emitter writes PDF syntax directly instead of going through a
//! document-assembly crate: assembly libraries finish into an in-memory
//! buffer, and the whole point of this pipeline is that the first page
//! reaches the sink while later pages are still being laid out. The subset
//! of PDF needed here — base-14 Type1 fonts, one optional DCTDecode image,
//! Flate-compressed content streams — is small enough to write by hand.
//!
//! ## File shape
//!
//! ```text
//! %PDF-1.4             <- header, written in new()
//! 6 0 obj ... endobj   <- per page: content stream, then page object
//! 7 0 obj ... endobj      (flushed to the sink as each page completes)
//! ...
//! 3 0 obj ... endobj   <- finish(): fonts, image, page tree, catalog, info
//! xref                 <- byte offsets recorded as objects were written
//! trailer
//! %%EOF
//! ```
//!
//! Object numbers 1–5 (catalog, page tree, three fonts) and the optional
//! image object are allocated up front so page objects can reference them
//! before they are written; PDF permits forward references because the
//! cross-reference table at the end is what resolves them.

use crate::pipeline::encode::EncodedImage;
use crate::pipeline::fonts::Font;
use crate::pipeline::layout::{Color, LaidOutPage, LayoutBlock, Line, TextStyle};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::{self, Write};
use tracing::trace;

const CATALOG_ID: usize = 1;
const PAGES_ID: usize = 2;
// Font objects 3..=5 follow Font::all() order.
const FONT_BASE_ID: usize = 3;
const IMAGE_ID: usize = 6;

/// Incremental PDF writer over any byte sink.
pub struct PdfWriter<'a, W: Write> {
    sink: W,
    written: u64,
    /// Byte offset of each object, indexed by object number.
    offsets: Vec<u64>,
    next_id: usize,
    page_ids: Vec<usize>,
    page_size: (f32, f32),
    image: Option<&'a EncodedImage>,
}

impl<'a, W: Write> PdfWriter<'a, W> {
    /// Start a document: writes the header immediately.
    pub fn new(
        sink: W,
        page_size: (f32, f32),
        image: Option<&'a EncodedImage>,
    ) -> io::Result<Self> {
        let mut writer = Self {
            sink,
            written: 0,
            offsets: Vec::new(),
            next_id: if image.is_some() {
                IMAGE_ID + 1
            } else {
                IMAGE_ID
            },
            page_ids: Vec::new(),
            page_size,
            image,
        };
        // The binary comment line marks the file as non-ASCII for tools
        // that sniff transfer encodings.
        writer.emit(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n")?;
        Ok(writer)
    }

    /// Number of pages written so far.
    pub fn pages_written(&self) -> usize {
        self.page_ids.len()
    }

    /// Total bytes pushed to the sink so far.
    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    /// Serialize one laid-out page and flush it to the sink.
    pub fn write_page(&mut self, page: &LaidOutPage) -> io::Result<()> {
        let mut ops = Vec::new();
        for block in &page.blocks {
            self.render_block(block, &mut ops)?;
        }

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&ops)?;
        let compressed = encoder.finish()?;

        let content_id = self.alloc_id();
        self.begin_obj(content_id)?;
        self.emit_fmt(format_args!(
            "<< /Length {} /Filter /FlateDecode >>\nstream\n",
            compressed.len()
        ))?;
        self.emit(&compressed)?;
        self.emit(b"\nendstream\nendobj\n")?;

        let page_id = self.alloc_id();
        self.begin_obj(page_id)?;
        let (w, h) = self.page_size;
        self.emit_fmt(format_args!(
            "<< /Type /Page /Parent {PAGES_ID} 0 R /MediaBox [0 0 {w:.2} {h:.2}] \
             /Resources << /Font << /F1 3 0 R /F2 4 0 R /F3 5 0 R >>{xobj} >> \
             /Contents {content_id} 0 R >>\nendobj\n",
            xobj = if self.image.is_some() {
                format!(" /XObject << /Im0 {IMAGE_ID} 0 R >>")
            } else {
                String::new()
            },
        ))?;
        self.page_ids.push(page_id);

        trace!(
            "Emitted page {} ({} content bytes compressed to {})",
            page.number,
            ops.len(),
            compressed.len()
        );
        // Push the finished page downstream now; this is what lets the
        // consumer see bytes before the rest of the document is laid out.
        self.sink.flush()
    }

    /// Write the trailing objects and cross-reference table, then flush.
    ///
    /// Returns the total number of bytes written.
    pub fn finish(mut self) -> io::Result<u64> {
        for (i, font) in Font::all().into_iter().enumerate() {
            self.begin_obj(FONT_BASE_ID + i)?;
            self.emit_fmt(format_args!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>\nendobj\n",
                font.base_name()
            ))?;
        }

        if let Some(image) = self.image {
            self.begin_obj(IMAGE_ID)?;
            self.emit_fmt(format_args!(
                "<< /Type /XObject /Subtype /Image /Width {} /Height {} \
                 /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /DCTDecode \
                 /Length {} >>\nstream\n",
                image.width,
                image.height,
                image.data.len()
            ))?;
            self.emit(&image.data)?;
            self.emit(b"\nendstream\nendobj\n")?;
        }

        self.begin_obj(PAGES_ID)?;
        let kids: Vec<String> = self.page_ids.iter().map(|id| format!("{id} 0 R")).collect();
        self.emit_fmt(format_args!(
            "<< /Type /Pages /Count {} /Kids [{}] >>\nendobj\n",
            self.page_ids.len(),
            kids.join(" ")
        ))?;

        self.begin_obj(CATALOG_ID)?;
        self.emit_fmt(format_args!(
            "<< /Type /Catalog /Pages {PAGES_ID} 0 R >>\nendobj\n"
        ))?;

        let info_id = self.alloc_id();
        self.begin_obj(info_id)?;
        self.emit_fmt(format_args!(
            "<< /Producer (blogify-pdf {}) >>\nendobj\n",
            env!("CARGO_PKG_VERSION")
        ))?;

        // ── Cross-reference table ────────────────────────────────────────
        let xref_offset = self.written;
        let size = self.next_id;
        self.emit_fmt(format_args!("xref\n0 {size}\n"))?;
        self.emit(b"0000000000 65535 f \n")?;
        for id in 1..size {
            let offset = self.offsets.get(id).copied().unwrap_or(0);
            self.emit_fmt(format_args!("{offset:010} 00000 n \n"))?;
        }
        self.emit_fmt(format_args!(
            "trailer\n<< /Size {size} /Root {CATALOG_ID} 0 R /Info {info_id} 0 R >>\n\
             startxref\n{xref_offset}\n%%EOF\n"
        ))?;

        self.sink.flush()?;
        Ok(self.written)
    }

    // ── Object plumbing ──────────────────────────────────────────────────

    fn alloc_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn begin_obj(&mut self, id: usize) -> io::Result<()> {
        if self.offsets.len() <= id {
            self.offsets.resize(id + 1, 0);
        }
        self.offsets[id] = self.written;
        self.emit_fmt(format_args!("{id} 0 obj\n"))
    }

    fn emit(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.sink.write_all(bytes)?;
        self.written += bytes.len() as u64;
        Ok(())
    }

    fn emit_fmt(&mut self, args: std::fmt::Arguments<'_>) -> io::Result<()> {
        let s = args.to_string();
        self.emit(s.as_bytes())
    }

    // ── Content-stream operators ─────────────────────────────────────────

    fn render_block(&self, block: &LayoutBlock, ops: &mut Vec<u8>) -> io::Result<()> {
        match block {
            LayoutBlock::Title { lines, style } | LayoutBlock::BodyText { lines, style } => {
                for line in lines {
                    text_op(ops, style, line)?;
                }
            }
            LayoutBlock::Rule {
                x,
                y,
                width,
                thickness,
                color,
            } => {
                let (r, g, b) = norm(*color);
                writeln!(
                    ops,
                    "q {thickness:.2} w {r:.3} {g:.3} {b:.3} RG \
                     {x:.2} {y:.2} m {:.2} {y:.2} l S Q",
                    x + width
                )?;
            }
            LayoutBlock::Image {
                x,
                y,
                width,
                height,
            } => {
                if self.image.is_some() {
                    writeln!(ops, "q {width:.2} 0 0 {height:.2} {x:.2} {y:.2} cm /Im0 Do Q")?;
                }
            }
            LayoutBlock::Footer {
                author,
                author_style,
                date,
                date_style,
            } => {
                text_op(ops, author_style, author)?;
                text_op(ops, date_style, date)?;
            }
            LayoutBlock::PageStamp { line, style } => {
                text_op(ops, style, line)?;
            }
        }
        Ok(())
    }
}

fn norm(c: Color) -> (f32, f32, f32) {
    (
        c.r as f32 / 255.0,
        c.g as f32 / 255.0,
        c.b as f32 / 255.0,
    )
}

fn text_op(ops: &mut Vec<u8>, style: &TextStyle, line: &Line) -> io::Result<()> {
    let (r, g, b) = norm(style.color);
    write!(
        ops,
        "BT /{} {:.2} Tf {r:.3} {g:.3} {b:.3} rg {:.3} Tw {:.2} {:.2} Td (",
        style.font.resource_name(),
        style.size,
        line.word_spacing,
        line.x,
        line.y,
    )?;
    encode_text(&line.text, ops);
    ops.extend_from_slice(b") Tj ET\n");
    Ok(())
}

/// Encode text as an escaped WinAnsi PDF string.
///
/// WinAnsi matches Latin-1 in the 0xA0–0xFF range, so common accented
/// characters pass through; anything else renders as `?`, matching the
/// replacement width the layout step measured with.
fn encode_text(text: &str, out: &mut Vec<u8>) {
    for c in text.chars() {
        let byte = match c {
            ' '..='~' => c as u8,
            '\u{A0}'..='\u{FF}' => c as u8,
            _ => b'?',
        };
        match byte {
            b'(' | b')' | b'\\' => {
                out.push(b'\\');
                out.push(byte);
            }
            _ => out.push(byte),
        }
    }
}
