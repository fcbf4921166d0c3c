//! XML rendering of a [`StructuredDocument`] and the matching reader.
//!
//! The output shape is fixed:
//!
//! ```text
//! <?xml version="1.0" encoding="UTF-8"?>
//! <document>
//!   <metadata>
//!     <fileName>…</fileName>
//!     <pageCount>…</pageCount>
//!     <author>…</author>
//!     <creationDate>…</creationDate>
//!     <conversionDate>…</conversionDate>
//!   </metadata>
//!   <content>
//!     <heading>…</heading>
//!     <paragraph>… </paragraph>
//!   </content>
//! </document>
//! ```
//!
//! Indentation is cosmetic. Text nodes are escaped by quick-xml and never
//! trimmed on the way back in, so a paragraph keeps its trailing space.

use crate::document::{ContentNode, DocumentMetadata, StructuredDocument};
use crate::error::Pdf2XmlError;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::borrow::Cow;
use std::io::Write;

/// Formatting knobs for [`to_xml_string`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XmlOptions {
    /// Emit one element per line, indented. Default: true.
    pub pretty: bool,
    /// Spaces per nesting level when `pretty` is set. Default: 2.
    pub indent_width: usize,
}

impl Default for XmlOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            indent_width: 2,
        }
    }
}

/// Serialise a document to UTF-8 XML bytes.
pub fn to_xml_bytes(doc: &StructuredDocument, opts: XmlOptions) -> Result<Vec<u8>, Pdf2XmlError> {
    let mut writer = if opts.pretty {
        Writer::new_with_indent(Vec::new(), b' ', opts.indent_width)
    } else {
        Writer::new(Vec::new())
    };
    write_document(&mut writer, doc).map_err(|e| Pdf2XmlError::XmlWrite(e.to_string()))?;
    Ok(writer.into_inner())
}

/// Serialise a document to an XML string.
pub fn to_xml_string(doc: &StructuredDocument, opts: XmlOptions) -> Result<String, Pdf2XmlError> {
    let bytes = to_xml_bytes(doc, opts)?;
    String::from_utf8(bytes).map_err(|e| Pdf2XmlError::XmlWrite(e.to_string()))
}

fn write_document<W: Write>(w: &mut Writer<W>, doc: &StructuredDocument) -> quick_xml::Result<()> {
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    w.write_event(Event::Start(BytesStart::new("document")))?;

    let m = &doc.metadata;
    w.write_event(Event::Start(BytesStart::new("metadata")))?;
    write_leaf(w, "fileName", &m.file_name)?;
    write_leaf(w, "pageCount", &m.page_count.to_string())?;
    write_leaf(w, "author", &m.author)?;
    write_leaf(w, "creationDate", &m.creation_date)?;
    write_leaf(w, "conversionDate", &m.conversion_date)?;
    w.write_event(Event::End(BytesEnd::new("metadata")))?;

    if doc.content.is_empty() {
        w.write_event(Event::Empty(BytesStart::new("content")))?;
    } else {
        w.write_event(Event::Start(BytesStart::new("content")))?;
        for node in &doc.content {
            write_leaf(w, node.tag(), node.text())?;
        }
        w.write_event(Event::End(BytesEnd::new("content")))?;
    }

    w.write_event(Event::End(BytesEnd::new("document")))?;
    Ok(())
}

/// Write `<tag>text</tag>`, or `<tag/>` when there is no text.
///
/// An empty element is written self-closed so pretty-printing cannot
/// slip whitespace into it.
fn write_leaf<W: Write>(w: &mut Writer<W>, tag: &str, text: &str) -> quick_xml::Result<()> {
    let text = xml_safe(text);
    if text.is_empty() {
        return w.write_event(Event::Empty(BytesStart::new(tag)));
    }
    w.write_event(Event::Start(BytesStart::new(tag)))?;
    w.write_event(Event::Text(BytesText::new(&text)))?;
    w.write_event(Event::End(BytesEnd::new(tag)))
}

/// Drop characters XML 1.0 cannot represent even when escaped.
fn xml_safe(text: &str) -> Cow<'_, str> {
    fn allowed(c: char) -> bool {
        matches!(c,
            '\u{9}' | '\u{A}' | '\u{D}'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}')
    }
    if text.chars().all(allowed) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().filter(|&c| allowed(c)).collect())
    }
}

// ── Reading ──────────────────────────────────────────────────────────────

/// Where the reader currently is in the fixed document shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Element {
    Document,
    Metadata,
    Content,
    Field(Field),
    Node(NodeKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    FileName,
    PageCount,
    Author,
    CreationDate,
    ConversionDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Heading,
    Paragraph,
}

impl Element {
    /// Resolve a tag name against its parent, rejecting anything out of place.
    fn resolve(parent: Option<Element>, name: &str) -> Result<Self, Pdf2XmlError> {
        let el = match (parent, name) {
            (None, "document") => Element::Document,
            (Some(Element::Document), "metadata") => Element::Metadata,
            (Some(Element::Document), "content") => Element::Content,
            (Some(Element::Metadata), "fileName") => Element::Field(Field::FileName),
            (Some(Element::Metadata), "pageCount") => Element::Field(Field::PageCount),
            (Some(Element::Metadata), "author") => Element::Field(Field::Author),
            (Some(Element::Metadata), "creationDate") => Element::Field(Field::CreationDate),
            (Some(Element::Metadata), "conversionDate") => Element::Field(Field::ConversionDate),
            (Some(Element::Content), "heading") => Element::Node(NodeKind::Heading),
            (Some(Element::Content), "paragraph") => Element::Node(NodeKind::Paragraph),
            (parent, name) => {
                return Err(Pdf2XmlError::MalformedXml(format!(
                    "unexpected <{name}> inside {parent:?}"
                )))
            }
        };
        Ok(el)
    }

    fn is_leaf(self) -> bool {
        matches!(self, Element::Field(_) | Element::Node(_))
    }
}

/// Collects fields while the reader walks the tree.
#[derive(Debug, Default)]
struct DocumentBuilder {
    file_name: Option<String>,
    page_count: Option<String>,
    author: Option<String>,
    creation_date: Option<String>,
    conversion_date: Option<String>,
    content: Vec<ContentNode>,
}

impl DocumentBuilder {
    fn leaf(&mut self, el: Element, text: String) {
        match el {
            Element::Field(Field::FileName) => self.file_name = Some(text),
            Element::Field(Field::PageCount) => self.page_count = Some(text),
            Element::Field(Field::Author) => self.author = Some(text),
            Element::Field(Field::CreationDate) => self.creation_date = Some(text),
            Element::Field(Field::ConversionDate) => self.conversion_date = Some(text),
            Element::Node(NodeKind::Heading) => self.content.push(ContentNode::Heading(text)),
            Element::Node(NodeKind::Paragraph) => self.content.push(ContentNode::Paragraph(text)),
            Element::Document | Element::Metadata | Element::Content => {}
        }
    }

    fn finish(self) -> Result<StructuredDocument, Pdf2XmlError> {
        fn required(v: Option<String>, name: &str) -> Result<String, Pdf2XmlError> {
            v.ok_or_else(|| Pdf2XmlError::MalformedXml(format!("missing <{name}>")))
        }
        let page_count = required(self.page_count, "pageCount")?;
        let page_count = page_count.trim().parse::<usize>().map_err(|e| {
            Pdf2XmlError::MalformedXml(format!("pageCount '{page_count}' is not a count: {e}"))
        })?;
        Ok(StructuredDocument {
            metadata: DocumentMetadata {
                file_name: required(self.file_name, "fileName")?,
                page_count,
                author: required(self.author, "author")?,
                creation_date: required(self.creation_date, "creationDate")?,
                conversion_date: required(self.conversion_date, "conversionDate")?,
            },
            content: self.content,
        })
    }
}

/// Parse XML produced by [`to_xml_string`] back into a document.
pub fn parse_document(xml: &str) -> Result<StructuredDocument, Pdf2XmlError> {
    let mut reader = Reader::from_str(xml);
    let mut builder = DocumentBuilder::default();
    let mut stack: Vec<Element> = Vec::new();
    let mut text: Option<String> = None;
    let mut saw_root = false;

    let malformed = |e: quick_xml::Error| Pdf2XmlError::MalformedXml(e.to_string());

    loop {
        match reader.read_event().map_err(malformed)? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let el = Element::resolve(stack.last().copied(), &name)?;
                if el == Element::Document {
                    if saw_root {
                        return Err(Pdf2XmlError::MalformedXml("second <document> root".into()));
                    }
                    saw_root = true;
                }
                if el.is_leaf() {
                    text = Some(String::new());
                }
                stack.push(el);
            }
            Event::Empty(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let el = Element::resolve(stack.last().copied(), &name)?;
                if el == Element::Document {
                    saw_root = true;
                }
                builder.leaf(el, String::new());
            }
            Event::Text(e) => {
                let t = e.unescape().map_err(malformed)?;
                match text.as_mut() {
                    Some(buf) => buf.push_str(&t),
                    None if t.trim().is_empty() => {}
                    None => {
                        return Err(Pdf2XmlError::MalformedXml(format!(
                            "stray text '{}'",
                            t.trim()
                        )))
                    }
                }
            }
            Event::CData(e) => match text.as_mut() {
                Some(buf) => buf.push_str(&String::from_utf8_lossy(&e)),
                None => return Err(Pdf2XmlError::MalformedXml("stray CDATA".into())),
            },
            Event::End(_) => {
                let el = stack
                    .pop()
                    .ok_or_else(|| Pdf2XmlError::MalformedXml("unbalanced end tag".into()))?;
                if el.is_leaf() {
                    builder.leaf(el, text.take().unwrap_or_default());
                }
            }
            Event::Eof => break,
            Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}
        }
    }

    if !saw_root {
        return Err(Pdf2XmlError::MalformedXml("no <document> root".into()));
    }
    if !stack.is_empty() {
        return Err(Pdf2XmlError::MalformedXml("unexpected end of input".into()));
    }
    builder.finish()
}
