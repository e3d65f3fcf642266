//! Document composition: post fields in, positioned layout blocks out.
//!
//! This is the pure middle of the pipeline. It knows nothing about PDF
//! syntax, networking, or sinks — it turns a [`DocumentRequest`] plus the
//! already-resolved cover image size into a sequence of [`LaidOutPage`]s,
//! each holding fully positioned [`LayoutBlock`]s in draw order.
//!
//! Pages are produced lazily by [`PageIter`]: body text is wrapped on demand,
//! one page ahead of the emitter, so serialization of page 1 can start before
//! the last paragraph of a long post has been measured. The iterator is
//! finite and non-restartable.
//!
//! Coordinates are PDF user-space points: origin at the bottom-left of the
//! page, y growing upward. Text block coordinates are baselines.

use crate::config::ExportConfig;
use crate::pipeline::fonts::Font;
use crate::request::DocumentRequest;
use chrono::Datelike;

// ── Styling constants ────────────────────────────────────────────────────

/// Fraction of the font size above the baseline (Helvetica ascent).
const ASCENT: f32 = 0.718;
/// Line advance as a multiple of the font size, before any extra gap.
const LINE_HEIGHT_FACTOR: f32 = 1.15;

const TITLE_SIZE: f32 = 22.0;
const BODY_SIZE: f32 = 12.0;
const AUTHOR_SIZE: f32 = 11.0;
const DATE_SIZE: f32 = 10.0;
const STAMP_SIZE: f32 = 9.0;

/// Extra gap between body lines, in points.
const BODY_LINE_GAP: f32 = 4.0;

const TITLE_RULE_GAP_ABOVE: f32 = 14.0;
const TITLE_RULE_GAP_BELOW: f32 = 18.0;
const IMAGE_GAP_BELOW: f32 = 16.0;
const FOOTER_GAP_ABOVE: f32 = 21.0;
const FOOTER_RULE_GAP_BELOW: f32 = 8.0;

const TITLE_RULE_THICKNESS: f32 = 1.0;
const FOOTER_RULE_THICKNESS: f32 = 0.4;

/// How far below the bottom margin the page stamp begins, in points.
const STAMP_DROP: f32 = 10.0;

/// An RGB ink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Title accent (dodger blue).
pub const TITLE_INK: Color = Color::rgb(0x1e, 0x90, 0xff);
/// Rule under the title.
pub const TITLE_RULE_INK: Color = Color::rgb(0x2a, 0x3b, 0x50);
/// Body text.
pub const BODY_INK: Color = Color::rgb(0x22, 0x22, 0x22);
/// Thin rule above the footer.
pub const FOOTER_RULE_INK: Color = Color::rgb(0xe6, 0xee, 0xfc);
/// "Created by" line.
pub const AUTHOR_INK: Color = Color::rgb(0x55, 0x55, 0x55);
/// "Created at" line.
pub const DATE_INK: Color = Color::rgb(0x77, 0x77, 0x77);
/// Page stamp.
pub const STAMP_INK: Color = Color::rgb(0x99, 0x99, 0x99);

/// Font, size, and ink for a run of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font: Font,
    pub size: f32,
    pub color: Color,
}

/// One positioned line of text. `y` is the baseline.
///
/// `word_spacing` carries the justification stretch: extra points added to
/// every space character when the line is drawn. Zero for unjustified lines.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub word_spacing: f32,
}

/// One placeable unit of the output document.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutBlock {
    /// The post title: bold, centered, accent-colored.
    Title { lines: Vec<Line>, style: TextStyle },
    /// A horizontal rule spanning from `x` to `x + width` at height `y`.
    Rule {
        x: f32,
        y: f32,
        width: f32,
        thickness: f32,
        color: Color,
    },
    /// The cover image. `(x, y)` is the bottom-left corner.
    Image {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    /// Justified body text; one block per page the body touches.
    BodyText { lines: Vec<Line>, style: TextStyle },
    /// Author and date lines, right-aligned, never split across pages.
    Footer {
        author: Line,
        author_style: TextStyle,
        date: Line,
        date_style: TextStyle,
    },
    /// Fixed attribution caption near the bottom of every page.
    PageStamp { line: Line, style: TextStyle },
}

/// Discriminant of a [`LayoutBlock`], for order assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Title,
    Rule,
    Image,
    BodyText,
    Footer,
    PageStamp,
}

impl LayoutBlock {
    pub fn kind(&self) -> BlockKind {
        match self {
            LayoutBlock::Title { .. } => BlockKind::Title,
            LayoutBlock::Rule { .. } => BlockKind::Rule,
            LayoutBlock::Image { .. } => BlockKind::Image,
            LayoutBlock::BodyText { .. } => BlockKind::BodyText,
            LayoutBlock::Footer { .. } => BlockKind::Footer,
            LayoutBlock::PageStamp { .. } => BlockKind::PageStamp,
        }
    }
}

/// One finished page, blocks in draw order.
#[derive(Debug, Clone)]
pub struct LaidOutPage {
    /// 1-indexed page number.
    pub number: usize,
    pub blocks: Vec<LayoutBlock>,
}

// ── Composition ──────────────────────────────────────────────────────────

/// Lay out a request into pages.
///
/// `image_size` is the intrinsic pixel size of the resolved cover image, or
/// `None` when the post has no usable image — in that case no image block is
/// produced (no placeholder).
pub fn compose<'a>(
    request: &'a DocumentRequest,
    image_size: Option<(u32, u32)>,
    config: &ExportConfig,
) -> PageIter<'a> {
    let content_w = config.content_width();

    let title_style = TextStyle {
        font: Font::HelveticaBold,
        size: TITLE_SIZE,
        color: TITLE_INK,
    };
    let title_lines = wrap(&request.title, title_style.font, TITLE_SIZE, content_w);

    // Scale the image to fit content width × max height, never upscaling.
    let image = image_size.map(|(px_w, px_h)| {
        let (w, h) = (px_w.max(1) as f32, px_h.max(1) as f32);
        let scale = (content_w / w).min(config.max_image_height / h).min(1.0);
        (w * scale, h * scale)
    });

    let author = request
        .author_name
        .clone()
        .unwrap_or_else(|| "Unknown".to_string());
    let date = request
        .created_at
        .map(|t| t.format("%B %-d, %Y %H:%M").to_string())
        .unwrap_or_default();
    let stamp = format!(
        "Generated by {} © {} — {}",
        config.product_name,
        chrono::Utc::now().year(),
        config.attribution
    );

    PageIter {
        page_w: config.page_width,
        page_h: config.page_height,
        margin: config.margin,
        content_w,
        title: Some((title_lines, title_style)),
        title_rule_pending: true,
        image_pending: image,
        body: BodyLines::new(&request.body, Font::Helvetica, BODY_SIZE, content_w),
        body_lookahead: None,
        body_block_emitted: false,
        footer_author: format!("Created by: {author}"),
        footer_date: format!("Created at: {date}"),
        stamp,
        page_no: 0,
        finished: false,
    }
}

/// Lazy page iterator produced by [`compose`].
pub struct PageIter<'a> {
    page_w: f32,
    page_h: f32,
    margin: f32,
    content_w: f32,

    // Pending content, consumed as pages are produced.
    title: Option<(Vec<WrappedLine>, TextStyle)>,
    title_rule_pending: bool,
    image_pending: Option<(f32, f32)>,
    body: BodyLines<'a>,
    body_lookahead: Option<WrappedLine>,
    body_block_emitted: bool,
    footer_author: String,
    footer_date: String,
    stamp: String,

    page_no: usize,
    finished: bool,
}

impl PageIter<'_> {
    fn bottom_limit(&self) -> f32 {
        self.page_h - self.margin
    }

    /// Vertical advance for one line of `size`-point text.
    fn advance(size: f32, gap: f32) -> f32 {
        size * LINE_HEIGHT_FACTOR + gap
    }

    /// Convert a top-down cursor position to a baseline in PDF coordinates.
    fn baseline(&self, cursor: f32, size: f32) -> f32 {
        self.page_h - (cursor + ASCENT * size)
    }

    fn next_body_line(&mut self) -> Option<WrappedLine> {
        self.body_lookahead.take().or_else(|| self.body.next())
    }

    /// Height of the footer group: thin rule, gap, author line, date line.
    fn footer_height(&self) -> f32 {
        FOOTER_RULE_THICKNESS
            + FOOTER_RULE_GAP_BELOW
            + Self::advance(AUTHOR_SIZE, 0.0)
            + Self::advance(DATE_SIZE, 0.0)
    }

    fn stamp_block(&self) -> LayoutBlock {
        let style = TextStyle {
            font: Font::Helvetica,
            size: STAMP_SIZE,
            color: STAMP_INK,
        };
        let width = style.font.text_width(&self.stamp, style.size);
        let top = self.page_h - self.margin + STAMP_DROP;
        LayoutBlock::PageStamp {
            line: Line {
                text: self.stamp.clone(),
                x: self.margin + (self.content_w - width) / 2.0,
                y: self.baseline(top, STAMP_SIZE),
                word_spacing: 0.0,
            },
            style,
        }
    }
}

impl Iterator for PageIter<'_> {
    type Item = LaidOutPage;

    fn next(&mut self) -> Option<LaidOutPage> {
        if self.finished {
            return None;
        }
        self.page_no += 1;

        let mut blocks = Vec::new();
        let mut cursor = self.margin;
        // A page that has accepted no flow content yet must accept the next
        // unit even if it overflows; otherwise an oversized unit would loop
        // forever producing empty pages.
        let mut placed_any = false;
        let limit = self.bottom_limit();

        // ── Title (first page only) ──────────────────────────────────────
        if let Some((lines, style)) = self.title.take() {
            let adv = Self::advance(TITLE_SIZE, 0.0);
            let mut placed = Vec::new();
            let mut rest = Vec::new();
            for (i, wl) in lines.into_iter().enumerate() {
                let fits = cursor + adv <= limit || (!placed_any && i == 0);
                if fits && rest.is_empty() {
                    placed.push(Line {
                        x: self.margin + (self.content_w - wl.width) / 2.0,
                        y: self.baseline(cursor, TITLE_SIZE),
                        text: wl.text,
                        word_spacing: 0.0,
                    });
                    cursor += adv;
                    placed_any = true;
                } else {
                    rest.push(wl);
                }
            }
            if !placed.is_empty() {
                blocks.push(LayoutBlock::Title {
                    lines: placed,
                    style,
                });
            }
            if !rest.is_empty() {
                self.title = Some((rest, style));
                blocks.push(self.stamp_block());
                return Some(LaidOutPage {
                    number: self.page_no,
                    blocks,
                });
            }
        }

        // ── Rule under the title ─────────────────────────────────────────
        if self.title_rule_pending {
            cursor += TITLE_RULE_GAP_ABOVE;
            blocks.push(LayoutBlock::Rule {
                x: self.margin,
                y: self.page_h - cursor,
                width: self.content_w,
                thickness: TITLE_RULE_THICKNESS,
                color: TITLE_RULE_INK,
            });
            cursor += TITLE_RULE_GAP_BELOW;
            self.title_rule_pending = false;
            placed_any = true;
        }

        // ── Cover image ──────────────────────────────────────────────────
        if let Some((w, h)) = self.image_pending {
            if cursor + h <= limit || !placed_any {
                blocks.push(LayoutBlock::Image {
                    x: self.margin + (self.content_w - w) / 2.0,
                    y: self.page_h - cursor - h,
                    width: w,
                    height: h,
                });
                cursor += h + IMAGE_GAP_BELOW;
                self.image_pending = None;
                placed_any = true;
            }
        }

        // ── Body text ────────────────────────────────────────────────────
        if self.image_pending.is_none() {
            let style = TextStyle {
                font: Font::Helvetica,
                size: BODY_SIZE,
                color: BODY_INK,
            };
            let adv = Self::advance(BODY_SIZE, BODY_LINE_GAP);
            let mut lines = Vec::new();
            while let Some(wl) = self.next_body_line() {
                if cursor + adv > limit && placed_any {
                    self.body_lookahead = Some(wl);
                    break;
                }
                lines.push(Line {
                    x: self.margin,
                    y: self.baseline(cursor, BODY_SIZE),
                    word_spacing: wl.stretch(self.content_w),
                    text: wl.text,
                });
                cursor += adv;
                placed_any = true;
            }
            if !lines.is_empty() || !self.body_block_emitted {
                blocks.push(LayoutBlock::BodyText { lines, style });
                self.body_block_emitted = true;
            }
        }

        // ── Footer group (atomic) ────────────────────────────────────────
        let body_done = self.body_lookahead.is_none() && self.body.is_exhausted();
        if body_done && self.image_pending.is_none() && self.body_block_emitted {
            let group = FOOTER_GAP_ABOVE + self.footer_height();
            if cursor + group <= limit || !placed_any {
                cursor += FOOTER_GAP_ABOVE;
                blocks.push(LayoutBlock::Rule {
                    x: self.margin,
                    y: self.page_h - cursor,
                    width: self.content_w,
                    thickness: FOOTER_RULE_THICKNESS,
                    color: FOOTER_RULE_INK,
                });
                cursor += FOOTER_RULE_THICKNESS + FOOTER_RULE_GAP_BELOW;

                let author_style = TextStyle {
                    font: Font::HelveticaOblique,
                    size: AUTHOR_SIZE,
                    color: AUTHOR_INK,
                };
                let author_w = author_style
                    .font
                    .text_width(&self.footer_author, AUTHOR_SIZE);
                let author = Line {
                    text: self.footer_author.clone(),
                    x: self.margin + self.content_w - author_w,
                    y: self.baseline(cursor, AUTHOR_SIZE),
                    word_spacing: 0.0,
                };
                cursor += Self::advance(AUTHOR_SIZE, 0.0);

                let date_style = TextStyle {
                    font: Font::Helvetica,
                    size: DATE_SIZE,
                    color: DATE_INK,
                };
                let date_w = date_style.font.text_width(&self.footer_date, DATE_SIZE);
                let date = Line {
                    text: self.footer_date.clone(),
                    x: self.margin + self.content_w - date_w,
                    y: self.baseline(cursor, DATE_SIZE),
                    word_spacing: 0.0,
                };

                blocks.push(LayoutBlock::Footer {
                    author,
                    author_style,
                    date,
                    date_style,
                });
                self.finished = true;
            }
        }

        // ── Page stamp, always last ──────────────────────────────────────
        blocks.push(self.stamp_block());

        Some(LaidOutPage {
            number: self.page_no,
            blocks,
        })
    }
}

// ── Line wrapping ────────────────────────────────────────────────────────

/// A wrapped line before vertical placement.
#[derive(Debug, Clone)]
struct WrappedLine {
    text: String,
    width: f32,
    /// True when the line was broken mid-paragraph and should be justified.
    justify: bool,
}

impl WrappedLine {
    /// Extra word spacing needed to stretch this line to `target` points.
    fn stretch(&self, target: f32) -> f32 {
        if !self.justify {
            return 0.0;
        }
        let spaces = self.text.matches(' ').count();
        if spaces == 0 {
            return 0.0;
        }
        ((target - self.width) / spaces as f32).max(0.0)
    }
}

/// Greedy-wrap `text` to `max_width`, breaking oversized words by character.
fn wrap(text: &str, font: Font, size: f32, max_width: f32) -> Vec<WrappedLine> {
    let mut out = Vec::new();
    for paragraph in text.split('\n') {
        wrap_paragraph(paragraph, font, size, max_width, &mut out);
    }
    out
}

fn wrap_paragraph(
    paragraph: &str,
    font: Font,
    size: f32,
    max_width: f32,
    out: &mut Vec<WrappedLine>,
) {
    let space_w = font.text_width(" ", size);
    let mut current = String::new();
    let mut current_w = 0.0f32;

    let mut flush = |current: &mut String, current_w: &mut f32, justify: bool, out: &mut Vec<WrappedLine>| {
        out.push(WrappedLine {
            text: std::mem::take(current),
            width: *current_w,
            justify,
        });
        *current_w = 0.0;
    };

    for word in paragraph.split_whitespace() {
        let mut word = word;
        let mut word_w = font.text_width(word, size);

        // Hard-break words wider than the whole line.
        while word_w > max_width {
            if !current.is_empty() {
                flush(&mut current, &mut current_w, true, out);
            }
            let mut taken = 0.0f32;
            let mut split = word.len();
            for (i, c) in word.char_indices() {
                let cw = font.char_width(c) as f32 * size / 1000.0;
                if taken + cw > max_width && i > 0 {
                    split = i;
                    break;
                }
                taken += cw;
            }
            let (head, tail) = word.split_at(split);
            out.push(WrappedLine {
                text: head.to_string(),
                width: font.text_width(head, size),
                justify: false,
            });
            word = tail;
            word_w = font.text_width(word, size);
            if word.is_empty() {
                break;
            }
        }
        if word.is_empty() {
            continue;
        }

        let needed = if current.is_empty() {
            word_w
        } else {
            current_w + space_w + word_w
        };
        if needed > max_width && !current.is_empty() {
            flush(&mut current, &mut current_w, true, out);
        }
        if !current.is_empty() {
            current.push(' ');
            current_w += space_w;
        }
        current.push_str(word);
        current_w += word_w;
    }

    // The final line of a paragraph is never justified. An empty paragraph
    // still contributes one blank line of vertical space.
    flush(&mut current, &mut current_w, false, out);
}

/// Lazily wrapped body lines: paragraphs are only measured when the page
/// they land on is being laid out.
struct BodyLines<'a> {
    font: Font,
    size: f32,
    max_width: f32,
    paragraphs: Option<std::str::Split<'a, char>>,
    queued: std::collections::VecDeque<WrappedLine>,
}

impl<'a> BodyLines<'a> {
    fn new(body: &'a str, font: Font, size: f32, max_width: f32) -> Self {
        Self {
            font,
            size,
            max_width,
            paragraphs: (!body.is_empty()).then(|| body.split('\n')),
            queued: std::collections::VecDeque::new(),
        }
    }

    fn is_exhausted(&self) -> bool {
        self.queued.is_empty()
            && self
                .paragraphs
                .as_ref()
                .map(|p| p.clone().next().is_none())
                .unwrap_or(true)
    }
}

impl Iterator for BodyLines<'_> {
    type Item = WrappedLine;

    fn next(&mut self) -> Option<WrappedLine> {
        loop {
            if let Some(line) = self.queued.pop_front() {
                return Some(line);
            }
            let paragraph = self.paragraphs.as_mut()?.next()?;
            let mut lines = Vec::new();
            wrap_paragraph(paragraph, self.font, self.size, self.max_width, &mut lines);
            self.queued.extend(lines);
        }
    }
}
