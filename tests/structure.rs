//! Behavioural tests for the heading/paragraph heuristic and the XML it
//! produces. None of these need pdfium.
//!
//! Run with:
//!   cargo test --test structure

use chrono::{DateTime, TimeZone, Utc};
use edgequake_pdf2xml::structure::{HEADING_MAX_CHARS, HEADING_MAX_WORDS};
use edgequake_pdf2xml::{
    classify, line_length, parse_document, structure, structure_at, to_xml_string, ContentNode, LineKind,
    SourceMetadata, StructuredDocument, XmlOptions,
};

// ── Test helpers ─────────────────────────────────────────────────────────────

fn meta() -> SourceMetadata {
    SourceMetadata::new("a.pdf", 1)
}

fn heading(s: &str) -> ContentNode {
    ContentNode::Heading(s.to_string())
}

fn paragraph(s: &str) -> ContentNode {
    ContentNode::Paragraph(s.to_string())
}

const LONG_1: &str =
    "This is a longer line that should definitely be treated as a paragraph because it exceeds fifty characters easily.";
const CONT: &str = "continuation line also part of paragraph";

// ── Content properties ───────────────────────────────────────────────────────

#[test]
fn test_all_long_lines_make_one_paragraph() {
    let lines = [
        LONG_1,
        "one two three four five six seven words here",
        "a line with plenty of words in it but not too many characters",
    ];
    let doc = structure(lines, meta());

    assert_eq!(doc.content.len(), 1, "expected a single paragraph node");
    assert_eq!(doc.headings().count(), 0);
    let text = doc.content[0].text();
    assert_eq!(text.trim_end(), lines.join(" "));
    assert!(text.ends_with(' '), "paragraph text keeps its trailing space");
}

#[test]
fn test_blank_only_input_has_no_content() {
    for lines in [vec![], vec![""], vec!["", "   ", "\t", "\r"]] {
        let doc = structure(lines.clone(), meta());
        assert!(doc.is_empty(), "blank input {lines:?} produced {:?}", doc.content);
    }
}

#[test]
fn test_word_count_boundary() {
    let five_words_fifty_chars = "abcdefghi abcdefghi abcdefghi abcdefghi abcdefghij";
    assert_eq!(five_words_fifty_chars.chars().count(), HEADING_MAX_CHARS);
    assert_eq!(five_words_fifty_chars.split_whitespace().count(), HEADING_MAX_WORDS);
    assert_eq!(classify(five_words_fifty_chars), LineKind::Heading);

    let six_short_words = "a b c d e f";
    assert!(six_short_words.chars().count() <= HEADING_MAX_CHARS);
    assert_eq!(classify(six_short_words), LineKind::Body);

    let doc = structure([five_words_fifty_chars, six_short_words], meta());
    assert_eq!(
        doc.content,
        vec![heading(five_words_fifty_chars), paragraph("a b c d e f ")]
    );
}

#[test]
fn test_char_count_boundary() {
    let fifty_one = "abcdefghijklmnopqrstuvwxyz abcdefghijklmnopqrstuvwx";
    assert_eq!(fifty_one.chars().count(), HEADING_MAX_CHARS + 1);
    assert_eq!(classify(fifty_one), LineKind::Body);

    // Not bytes: 50 two-byte BMP characters still fit.
    let accented = "é".repeat(HEADING_MAX_CHARS);
    assert!(accented.len() > HEADING_MAX_CHARS);
    assert_eq!(classify(&accented), LineKind::Heading);

    // Emoji are two UTF-16 units each: 26 of them is 52 long.
    let emoji = "🎉".repeat(26);
    assert_eq!(line_length(&emoji), 52);
    assert_eq!(classify(&emoji), LineKind::Body);
}

#[test]
fn test_blank_line_closes_paragraph() {
    let a = "first paragraph line has more than five words in it";
    let b = "second paragraph line also has more than five words";
    let doc = structure([a, "", b], meta());
    assert_eq!(
        doc.content,
        vec![paragraph(&format!("{a} ")), paragraph(&format!("{b} "))]
    );
}

#[test]
fn test_heading_closes_paragraph() {
    let body = "a body line that is clearly longer than five words";
    let doc = structure([body, "Section Two", body], meta());
    assert_eq!(
        doc.content,
        vec![
            paragraph(&format!("{body} ")),
            heading("Section Two"),
            paragraph(&format!("{body} ")),
        ]
    );
}

#[test]
fn test_lines_are_trimmed() {
    let doc = structure(["   Padded Title  \r", "  "], meta());
    assert_eq!(doc.content, vec![heading("Padded Title")]);
}

// ── Metadata ─────────────────────────────────────────────────────────────────

#[test]
fn test_author_defaults_to_unknown() {
    let doc = structure(Vec::<&str>::new(), meta());
    assert_eq!(doc.metadata.author, "Unknown");
    assert_eq!(doc.metadata.creation_date, "Unknown");

    let doc = structure(
        Vec::<&str>::new(),
        meta()
            .with_author("Jane Doe")
            .with_creation_date("D:20240101120000Z"),
    );
    assert_eq!(doc.metadata.author, "Jane Doe");
    assert_eq!(doc.metadata.creation_date, "D:20240101120000Z");
    assert_eq!(doc.metadata.file_name, "a.pdf");
    assert_eq!(doc.metadata.page_count, 1);
}

#[test]
fn test_conversion_date_is_iso8601() {
    let at = Utc.with_ymd_and_hms(2024, 3, 5, 7, 9, 11).unwrap();
    let doc = structure_at(["x"], meta(), at);
    assert_eq!(doc.metadata.conversion_date, "2024-03-05T07:09:11.000Z");

    let now = structure(["x"], meta());
    let parsed = DateTime::parse_from_rfc3339(&now.metadata.conversion_date)
        .expect("conversionDate must be RFC 3339");
    assert!(parsed.with_timezone(&Utc) <= Utc::now());
}

// ── End-to-end scenario ──────────────────────────────────────────────────────

fn scenario() -> StructuredDocument {
    structure(
        ["Title Here", "", LONG_1, CONT, "", "Another Heading"],
        meta(),
    )
}

#[test]
fn test_end_to_end_scenario() {
    let doc = scenario();
    assert_eq!(
        doc.content,
        vec![
            heading("Title Here"),
            paragraph(&format!("{LONG_1} {CONT} ")),
            heading("Another Heading"),
        ]
    );
    assert_eq!(doc.metadata.author, "Unknown");
    assert_eq!(doc.metadata.file_name, "a.pdf");
    assert_eq!(doc.metadata.page_count, 1);
}

// ── XML ──────────────────────────────────────────────────────────────────────

#[test]
fn test_xml_round_trip_preserves_content_and_metadata() {
    let doc = structure(
        ["Title Here", "", LONG_1, CONT, "", "Q&A <notes>"],
        meta().with_author("Jane \"JD\" Doe"),
    );

    for opts in [
        XmlOptions::default(),
        XmlOptions {
            pretty: false,
            indent_width: 0,
        },
    ] {
        let xml = to_xml_string(&doc, opts).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("Q&amp;A &lt;notes&gt;"));

        let back = parse_document(&xml).unwrap();
        assert_eq!(back.content, doc.content);
        assert_eq!(back.metadata.file_name, doc.metadata.file_name);
        assert_eq!(back.metadata.page_count, doc.metadata.page_count);
        assert_eq!(back.metadata.author, doc.metadata.author);
        assert_eq!(back.metadata.creation_date, doc.metadata.creation_date);
        assert!(
            DateTime::parse_from_rfc3339(&back.metadata.conversion_date).is_ok(),
            "conversionDate {:?} is not ISO-8601",
            back.metadata.conversion_date
        );
    }
}

#[test]
fn test_xml_element_order() {
    let xml = to_xml_string(&scenario(), XmlOptions::default()).unwrap();
    let order = [
        "<document>",
        "<metadata>",
        "<fileName>a.pdf</fileName>",
        "<pageCount>1</pageCount>",
        "<author>Unknown</author>",
        "<creationDate>Unknown</creationDate>",
        "<conversionDate>",
        "</metadata>",
        "<content>",
        "<heading>Title Here</heading>",
        "<paragraph>",
        "<heading>Another Heading</heading>",
        "</content>",
        "</document>",
    ];
    let mut from = 0;
    for needle in order {
        let at = xml[from..]
            .find(needle)
            .unwrap_or_else(|| panic!("{needle} missing or out of order in:\n{xml}"));
        from += at + needle.len();
    }
}

#[test]
fn test_empty_document_serialises() {
    let doc = structure([""], meta());
    let xml = to_xml_string(&doc, XmlOptions::default()).unwrap();
    let back = parse_document(&xml).unwrap();
    assert!(back.is_empty());
}
