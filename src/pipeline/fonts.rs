//! Metrics for the standard Helvetica family.
//!
//! The document uses only the base-14 PDF fonts, which every conforming
//! reader ships. That removes font files from the output entirely — the
//! emitter writes three small Type1 reference dictionaries — but it means
//! text measurement has to happen here, from the Adobe core AFM widths.
//!
//! Widths are stored in glyph-space units (1/1000 of the font size) for the
//! printable ASCII range. Characters outside that range measure as the width
//! of `o`; the emitter substitutes the same replacement glyph, so measurement
//! and rendering stay consistent.

/// One face of the document's font set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Font {
    /// Body text, date line, page stamp.
    Helvetica,
    /// Title.
    HelveticaBold,
    /// Author line.
    HelveticaOblique,
}

impl Font {
    /// PostScript base font name, as written into the font dictionary.
    pub fn base_name(self) -> &'static str {
        match self {
            Font::Helvetica => "Helvetica",
            Font::HelveticaBold => "Helvetica-Bold",
            Font::HelveticaOblique => "Helvetica-Oblique",
        }
    }

    /// Resource name used in page content streams (`/F1 12 Tf`).
    pub fn resource_name(self) -> &'static str {
        match self {
            Font::Helvetica => "F1",
            Font::HelveticaBold => "F2",
            Font::HelveticaOblique => "F3",
        }
    }

    /// All faces, in resource-name order.
    pub fn all() -> [Font; 3] {
        [Font::Helvetica, Font::HelveticaBold, Font::HelveticaOblique]
    }

    fn widths(self) -> &'static [u16; 95] {
        match self {
            // Oblique shares the upright widths in the Adobe core metrics.
            Font::Helvetica | Font::HelveticaOblique => &HELVETICA_WIDTHS,
            Font::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
        }
    }

    /// Width of one character in glyph-space units (1/1000 em).
    pub fn char_width(self, c: char) -> u16 {
        let table = self.widths();
        match c {
            ' '..='~' => table[c as usize - 0x20],
            // Same fallback the emitter renders for out-of-range characters.
            _ => table['o' as usize - 0x20],
        }
    }

    /// Measured width of `text` at `size` points.
    pub fn text_width(self, text: &str, size: f32) -> f32 {
        let units: u32 = text.chars().map(|c| self.char_width(c) as u32).sum();
        units as f32 * size / 1000.0
    }
}

/// Adobe core AFM widths for Helvetica, characters 0x20–0x7E.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278,
    278, 556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584,
    584, 556, 1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667,
    556, 833, 722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    278, 278, 278, 469, 556, 333, 556, 556, 500, 556, 556, 278, 556, 556, 222,
    222, 500, 222, 833, 556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500,
    500, 500, 334, 260, 334, 584,
];

/// Adobe core AFM widths for Helvetica-Bold, characters 0x20–0x7E.
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278,
    278, 556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584,
    584, 611, 975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611,
    833, 722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333,
    278, 333, 584, 556, 333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278,
    556, 278, 889, 611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556,
    500, 389, 280, 389, 584,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn space_width_is_278_units() {
        assert_eq!(Font::Helvetica.char_width(' '), 278);
        assert_eq!(Font::HelveticaBold.char_width(' '), 278);
    }

    #[test]
    fn oblique_shares_upright_widths() {
        for c in ' '..='~' {
            assert_eq!(
                Font::Helvetica.char_width(c),
                Font::HelveticaOblique.char_width(c)
            );
        }
    }

    #[test]
    fn bold_is_never_narrower_than_regular_for_letters() {
        for c in 'a'..='z' {
            assert!(Font::HelveticaBold.char_width(c) >= Font::Helvetica.char_width(c));
        }
    }

    #[test]
    fn text_width_scales_linearly_with_size() {
        let w12 = Font::Helvetica.text_width("Hello", 12.0);
        let w24 = Font::Helvetica.text_width("Hello", 24.0);
        assert!((w24 - 2.0 * w12).abs() < 1e-4);
    }

    #[test]
    fn non_ascii_measures_as_replacement_glyph() {
        assert_eq!(
            Font::Helvetica.char_width('é'),
            Font::Helvetica.char_width('o')
        );
    }
}
