//! Safe attachment-filename derivation from untrusted post titles.
//!
//! Post titles are free text typed by users. Before one ends up in a
//! `Content-Disposition` header — and from there in a "Save as" dialog — the
//! characters that are illegal on common file systems have to go, and the
//! length has to be bounded. The removal set matches what Windows rejects
//! (`< > : " / \ | ? *`) plus ASCII control characters; everything else,
//! including spaces and Unicode, passes through untouched.

use once_cell::sync::Lazy;
use regex::Regex;

/// Media type declared for the exported document.
pub const MEDIA_TYPE: &str = "application/pdf";

/// Base name used when sanitisation leaves nothing of the title.
const DEFAULT_BASE_NAME: &str = "blog";

/// Maximum length of the sanitized base name, in characters.
const MAX_BASE_LEN: usize = 60;

static ILLEGAL_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[<>:"/\\|?*\x00-\x1F]"#).unwrap());

/// Strip file-system-illegal characters from `text` and cap its length.
///
/// Truncation counts characters, not bytes, so a multi-byte title is never
/// cut mid-codepoint. Empty or entirely-illegal input yields an empty
/// string; use [`attachment_filename`] when you need a guaranteed non-empty
/// name.
pub fn sanitize(text: &str) -> String {
    let stripped = ILLEGAL_CHARS.replace_all(text, "");
    stripped.chars().take(MAX_BASE_LEN).collect()
}

/// Derive the suggested download filename for a post title.
///
/// `"My Post"` becomes `"My PostBlog.pdf"`; a title that sanitizes to
/// nothing becomes `"blogBlog.pdf"`.
pub fn attachment_filename(title: &str) -> String {
    let base = sanitize(title);
    let base = if base.is_empty() {
        DEFAULT_BASE_NAME
    } else {
        &base
    };
    format!("{base}Blog.pdf")
}

/// Build the full `Content-Disposition` header value for a post title.
pub fn content_disposition(title: &str) -> String {
    format!("attachment; filename=\"{}\"", attachment_filename(title))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_the_documented_removal_set() {
        assert_eq!(sanitize("My: Blog/Post"), "My BlogPost");
        assert_eq!(sanitize(r#"a<b>c:d"e/f\g|h?i*j"#), "abcdefghij");
    }

    #[test]
    fn strips_control_characters() {
        assert_eq!(sanitize("a\x00b\x1Fc\nd"), "abcd");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(sanitize(""), "");
        assert_eq!(sanitize("///???***"), "");
    }

    #[test]
    fn truncates_to_sixty_characters_after_stripping() {
        let long = "x".repeat(80);
        assert_eq!(sanitize(&long).chars().count(), 60);

        // Illegal characters do not count against the limit.
        let mixed = format!("{}{}", "/".repeat(30), "y".repeat(70));
        assert_eq!(sanitize(&mixed).chars().count(), 60);
    }

    #[test]
    fn truncation_is_character_based() {
        let title = "é".repeat(70);
        let out = sanitize(&title);
        assert_eq!(out.chars().count(), 60);
        assert!(out.chars().all(|c| c == 'é'));
    }

    #[test]
    fn attachment_filename_appends_suffix() {
        assert_eq!(attachment_filename("Hello World"), "Hello WorldBlog.pdf");
    }

    #[test]
    fn attachment_filename_falls_back_on_empty() {
        assert_eq!(attachment_filename(""), "blogBlog.pdf");
        assert_eq!(attachment_filename("???"), "blogBlog.pdf");
    }

    #[test]
    fn content_disposition_quotes_the_name() {
        assert_eq!(
            content_disposition("Hi"),
            "attachment; filename=\"HiBlog.pdf\""
        );
    }
}
