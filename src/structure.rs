//! Text segmentation: turn extracted PDF lines into headings and paragraphs.
//!
//! The classifier is simple. Each trimmed line is one of:
//!
//! | Kind      | Rule                                              |
//! |-----------|---------------------------------------------------|
//! | `Blank`   | empty after trimming; closes the open paragraph   |
//! | `Heading` | ≤ [`HEADING_MAX_WORDS`] words and ≤ [`HEADING_MAX_CHARS`] chars |
//! | `Body`    | anything else; appended to the open paragraph     |
//!
//! There is no layout or font analysis, so a one-line paragraph that happens
//! to be short comes out as a heading, and a long title comes out as body
//! text. That is a known limitation of the heuristic and is kept as-is.
//!
//! The only state is whether a paragraph is currently open. It is an
//! `Option<ParagraphBuilder>` threaded through a fold over the lines.

use crate::document::{ContentNode, DocumentMetadata, SourceMetadata, StructuredDocument, UNKNOWN};
use chrono::{DateTime, SecondsFormat, Utc};

/// A line with more words than this is never a heading.
pub const HEADING_MAX_WORDS: usize = 5;

/// A line longer than this is never a heading.
///
/// Length is measured in UTF-16 code units, so a character outside the
/// Basic Multilingual Plane (most emoji) counts as two. See [`line_length`].
pub const HEADING_MAX_CHARS: usize = 50;

/// Classification of a single input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Heading,
    Body,
}

/// Classify one line. Leading and trailing whitespace is ignored.
pub fn classify(line: &str) -> LineKind {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineKind::Blank;
    }
    let words = trimmed.split_whitespace().count();
    if words <= HEADING_MAX_WORDS && line_length(trimmed) <= HEADING_MAX_CHARS {
        LineKind::Heading
    } else {
        LineKind::Body
    }
}

/// Length of `line` as compared against [`HEADING_MAX_CHARS`]: UTF-16 code units.
pub fn line_length(line: &str) -> usize {
    line.encode_utf16().count()
}

/// Split decoded PDF text into lines on `\n`.
///
/// A trailing `\r` is left in place; it is whitespace and disappears when
/// each line is trimmed.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n').collect()
}

/// Accumulates consecutive body lines into one paragraph.
#[derive(Debug, Default)]
struct ParagraphBuilder {
    text: String,
}

impl ParagraphBuilder {
    fn push_line(mut self, trimmed: &str) -> Self {
        self.text.push_str(trimmed);
        self.text.push(' ');
        self
    }

    fn finish(self) -> ContentNode {
        ContentNode::Paragraph(self.text)
    }
}

/// Fold state: nodes emitted so far plus the paragraph still accruing text.
#[derive(Debug, Default)]
struct Segmenter {
    content: Vec<ContentNode>,
    open: Option<ParagraphBuilder>,
}

impl Segmenter {
    fn close_paragraph(&mut self) {
        if let Some(p) = self.open.take() {
            self.content.push(p.finish());
        }
    }

    fn step(mut self, line: &str) -> Self {
        let trimmed = line.trim();
        match classify(trimmed) {
            LineKind::Blank => self.close_paragraph(),
            LineKind::Heading => {
                self.close_paragraph();
                self.content.push(ContentNode::Heading(trimmed.to_string()));
            }
            LineKind::Body => {
                let open = self.open.take().unwrap_or_default();
                self.open = Some(open.push_line(trimmed));
            }
        }
        self
    }

    fn finish(mut self) -> Vec<ContentNode> {
        self.close_paragraph();
        self.content
    }
}

/// Segment lines into content nodes without building metadata.
pub fn segment<I, S>(lines: I) -> Vec<ContentNode>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .fold(Segmenter::default(), |state, line| state.step(line.as_ref()))
        .finish()
}

/// Format an instant the way the `<conversionDate>` element expects it,
/// e.g. `2024-01-02T03:04:05.678Z`.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Build a [`StructuredDocument`] from extracted lines, stamped with the
/// current time.
pub fn structure<I, S>(lines: I, meta: SourceMetadata) -> StructuredDocument
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    structure_at(lines, meta, Utc::now())
}

/// Same as [`structure`] with an explicit conversion instant.
pub fn structure_at<I, S>(lines: I, meta: SourceMetadata, now: DateTime<Utc>) -> StructuredDocument
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let metadata = DocumentMetadata {
        file_name: meta.file_name,
        page_count: meta.page_count,
        author: meta.author.unwrap_or_else(|| UNKNOWN.to_string()),
        creation_date: meta.creation_date.unwrap_or_else(|| UNKNOWN.to_string()),
        conversion_date: format_timestamp(now),
    };
    StructuredDocument {
        metadata,
        content: segment(lines),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn heading(s: &str) -> ContentNode {
        ContentNode::Heading(s.to_string())
    }

    fn paragraph(s: &str) -> ContentNode {
        ContentNode::Paragraph(s.to_string())
    }

    #[test]
    fn astral_characters_count_twice() {
        let emoji = "😀".repeat(26);
        assert_eq!(emoji.chars().count(), 26);
        assert_eq!(line_length(&emoji), 52);
        assert_eq!(classify(&emoji), LineKind::Body);
        assert_eq!(classify(&"😀".repeat(25)), LineKind::Heading);
    }

    #[test]
    fn classify_thresholds() {
        // 5 words, exactly 50 chars
        let five_words = format!("{} b c d e", "a".repeat(42));
        assert_eq!(five_words.chars().count(), 50);
        assert_eq!(classify(&five_words), LineKind::Heading);

        // 6 short words
        assert_eq!(classify("one two three four five six"), LineKind::Body);

        // 1 word, 51 chars
        assert_eq!(classify(&"x".repeat(51)), LineKind::Body);

        assert_eq!(classify("   \t "), LineKind::Blank);
        assert_eq!(classify(""), LineKind::Blank);
    }

    #[test]
    fn classify_counts_whitespace_runs_once() {
        assert_eq!(classify("a    b\t\tc  d   e"), LineKind::Heading);
    }

    #[test]
    fn classify_counts_chars_not_bytes() {
        // 50 two-byte chars is still ≤ 50 characters
        let s = "é".repeat(50);
        assert_eq!(classify(&s), LineKind::Heading);
    }

    #[test]
    fn heading_closes_open_paragraph() {
        let long = "this line is long enough to be body text for the heuristic";
        let nodes = segment([long, "Short Title", long]);
        assert_eq!(
            nodes,
            vec![
                paragraph(&format!("{long} ")),
                heading("Short Title"),
                paragraph(&format!("{long} ")),
            ]
        );
    }

    #[test]
    fn lines_are_trimmed() {
        let nodes = segment(["   Padded Heading   \r"]);
        assert_eq!(nodes, vec![heading("Padded Heading")]);
    }

    #[test]
    fn trailing_paragraph_is_flushed() {
        let nodes = segment(["a b c d e f g"]);
        assert_eq!(nodes, vec![paragraph("a b c d e f g ")]);
    }

    #[test]
    fn split_lines_keeps_blank_lines() {
        assert_eq!(split_lines("a\n\nb"), vec!["a", "", "b"]);
        assert_eq!(split_lines(""), vec![""]);
    }

    #[test]
    fn metadata_defaults_and_timestamp() {
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let doc = structure_at(Vec::<String>::new(), SourceMetadata::new("a.pdf", 3), now);
        assert_eq!(doc.metadata.author, "Unknown");
        assert_eq!(doc.metadata.creation_date, "Unknown");
        assert_eq!(doc.metadata.page_count, 3);
        assert_eq!(doc.metadata.conversion_date, "2024-01-02T03:04:05.000Z");
        assert!(doc.content.is_empty());
    }

    #[test]
    fn same_input_same_output() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let lines = ["Title", "", "one two three four five six seven"];
        let meta = SourceMetadata::new("x.pdf", 1).with_author("Jane Doe");
        let a = structure_at(lines, meta.clone(), now);
        let b = structure_at(lines, meta, now);
        assert_eq!(a, b);
    }
}
