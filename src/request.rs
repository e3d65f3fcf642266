//! The input record for one export operation.
//!
//! A [`DocumentRequest`] is constructed by the caller's post-lookup layer
//! (database row, JSON document, CLI fixture) and owned by a single export
//! call. Nothing in it is persisted by this crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything the pipeline needs to know about one stored post.
///
/// # Example
/// ```rust
/// use blogify_pdf::DocumentRequest;
///
/// let request = DocumentRequest::new("Hello World", "A short post.")
///     .with_author("Alice");
/// assert_eq!(request.title, "Hello World");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRequest {
    /// Post title, rendered as the document heading.
    pub title: String,

    /// Free-form body text. Paragraphs are separated by newlines.
    pub body: String,

    /// Optional cover image reference: an `http(s)://` URL or a path
    /// relative to the configured asset root.
    ///
    /// The aliases accept post records dumped from the legacy Node backend,
    /// which stored this field in camelCase.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "coverImageRef",
        alias = "coverImageURL"
    )]
    pub cover_image_ref: Option<String>,

    /// Display name of the post author. `None` renders as "Unknown".
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "authorName")]
    pub author_name: Option<String>,

    /// Creation timestamp. `None` renders as an empty date line.
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}

impl DocumentRequest {
    /// Create a request with just a title and body.
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            cover_image_ref: None,
            author_name: None,
            created_at: None,
        }
    }

    /// Attach a cover image reference (URL or asset-root-relative path).
    pub fn with_cover_image(mut self, reference: impl Into<String>) -> Self {
        self.cover_image_ref = Some(reference.into());
        self
    }

    /// Attach the author's display name.
    pub fn with_author(mut self, name: impl Into<String>) -> Self {
        self.author_name = Some(name.into());
        self
    }

    /// Attach the creation timestamp.
    pub fn with_created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_round_trip_preserves_optional_fields() {
        let req = DocumentRequest::new("Title", "Body")
            .with_author("Alice")
            .with_cover_image("/uploads/cover.png");
        let json = serde_json::to_string(&req).unwrap();
        let back: DocumentRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.author_name.as_deref(), Some("Alice"));
        assert_eq!(back.cover_image_ref.as_deref(), Some("/uploads/cover.png"));
        assert!(back.created_at.is_none());
    }

    #[test]
    fn missing_optionals_deserialize_as_none() {
        let back: DocumentRequest =
            serde_json::from_str(r#"{"title":"T","body":"B"}"#).unwrap();
        assert!(back.cover_image_ref.is_none());
        assert!(back.author_name.is_none());
    }

    #[test]
    fn legacy_camel_case_records_parse() {
        let back: DocumentRequest = serde_json::from_str(
            r#"{"title":"T","body":"B","coverImageURL":"/uploads/c.png","authorName":"Bob"}"#,
        )
        .unwrap();
        assert_eq!(back.cover_image_ref.as_deref(), Some("/uploads/c.png"));
        assert_eq!(back.author_name.as_deref(), Some("Bob"));
    }
}
