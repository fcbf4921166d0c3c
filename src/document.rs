//! The structured document tree produced by [`crate::structure`].
//!
//! A [`StructuredDocument`] is built once per conversion, handed to the XML
//! serializer, and then dropped. Only the serialised bytes are persisted.

use serde::{Deserialize, Serialize};

/// Literal used for author / creation date when the PDF does not report one.
pub const UNKNOWN: &str = "Unknown";

/// Metadata reported by the extraction collaborator for one PDF.
///
/// `author` and `creation_date` are optional here; [`DocumentMetadata`]
/// replaces absent values with [`UNKNOWN`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMetadata {
    pub file_name: String,
    pub page_count: usize,
    pub author: Option<String>,
    pub creation_date: Option<String>,
}

impl SourceMetadata {
    pub fn new(file_name: impl Into<String>, page_count: usize) -> Self {
        Self {
            file_name: file_name.into(),
            page_count,
            author: None,
            creation_date: None,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_creation_date(mut self, date: impl Into<String>) -> Self {
        self.creation_date = Some(date.into());
        self
    }
}

/// The `<metadata>` block of a converted document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub file_name: String,
    pub page_count: usize,
    pub author: String,
    pub creation_date: String,
    /// ISO-8601 UTC instant at which the document was structured.
    pub conversion_date: String,
}

/// One unit of document body, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum ContentNode {
    Heading(String),
    Paragraph(String),
}

impl ContentNode {
    pub fn text(&self) -> &str {
        match self {
            ContentNode::Heading(t) | ContentNode::Paragraph(t) => t,
        }
    }

    /// XML element name for this node.
    pub fn tag(&self) -> &'static str {
        match self {
            ContentNode::Heading(_) => "heading",
            ContentNode::Paragraph(_) => "paragraph",
        }
    }

    pub fn is_heading(&self) -> bool {
        matches!(self, ContentNode::Heading(_))
    }
}

/// Metadata plus ordered content nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredDocument {
    pub metadata: DocumentMetadata,
    pub content: Vec<ContentNode>,
}

impl StructuredDocument {
    pub fn headings(&self) -> impl Iterator<Item = &str> {
        self.content
            .iter()
            .filter(|n| n.is_heading())
            .map(ContentNode::text)
    }

    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        self.content
            .iter()
            .filter(|n| !n.is_heading())
            .map(ContentNode::text)
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_node_serialises_tagged() {
        let json = serde_json::to_string(&ContentNode::Heading("Intro".into())).unwrap();
        assert_eq!(json, r#"{"kind":"heading","text":"Intro"}"#);
    }

    #[test]
    fn headings_and_paragraphs_split_by_kind() {
        let doc = StructuredDocument {
            metadata: DocumentMetadata {
                file_name: "a.pdf".into(),
                page_count: 1,
                author: UNKNOWN.into(),
                creation_date: UNKNOWN.into(),
                conversion_date: "2024-01-01T00:00:00.000Z".into(),
            },
            content: vec![
                ContentNode::Heading("One".into()),
                ContentNode::Paragraph("body ".into()),
                ContentNode::Heading("Two".into()),
            ],
        };
        assert_eq!(doc.headings().collect::<Vec<_>>(), vec!["One", "Two"]);
        assert_eq!(doc.paragraphs().collect::<Vec<_>>(), vec!["body "]);
        assert!(!doc.is_empty());
    }
}
