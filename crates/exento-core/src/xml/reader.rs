//! Single-pass element index over an XML document.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::trace;

use crate::error::ExtractionError;

use super::Result;

/// An element captured from the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
}

impl Element {
    /// Qualified name, including the namespace prefix (e.g. `dte:GranTotal`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unescaped value of an attribute, matched by qualified name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// All attributes in document order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Concatenated text and CDATA of the element and all its descendants.
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// A parsed, well-formed XML document.
///
/// Elements are kept in document order so lookups resolve duplicates to
/// the first occurrence.
#[derive(Debug, Clone, Default)]
pub struct XmlDocument {
    elements: Vec<Element>,
}

impl XmlDocument {
    /// Parse a document from text.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let mut reader = Reader::from_str(text);
        reader.config_mut().check_end_names = true;

        let mut elements: Vec<Element> = Vec::new();
        let mut open: Vec<usize> = Vec::new();
        let mut roots = 0usize;

        loop {
            let event = reader.read_event().map_err(|e| {
                malformed(format!("at byte {}: {}", reader.buffer_position(), e))
            })?;

            match event {
                Event::Start(start) => {
                    roots += usize::from(open.is_empty());
                    elements.push(read_element(&start)?);
                    open.push(elements.len() - 1);
                }
                Event::Empty(start) => {
                    roots += usize::from(open.is_empty());
                    elements.push(read_element(&start)?);
                }
                Event::End(_) => {
                    if open.pop().is_none() {
                        return Err(malformed("unexpected closing tag"));
                    }
                }
                Event::Text(raw) => {
                    let content = raw
                        .unescape()
                        .map_err(|e| malformed(format!("invalid text content: {}", e)))?;
                    append_text(&mut elements, &open, &content)?;
                }
                Event::CData(raw) => {
                    let content = utf8(&raw.into_inner())?;
                    append_text(&mut elements, &open, &content)?;
                }
                Event::Eof => break,
                // Declarations, comments, processing instructions, doctype
                _ => {}
            }

            if roots > 1 {
                return Err(malformed("more than one root element"));
            }
        }

        if let Some(&index) = open.last() {
            return Err(malformed(format!(
                "element `{}` is never closed",
                elements[index].name
            )));
        }

        if elements.is_empty() {
            return Err(malformed("no root element"));
        }

        trace!("Indexed {} XML elements", elements.len());

        Ok(Self { elements })
    }

    /// Parse a document from raw bytes, which must be UTF-8.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| malformed(format!("document is not valid UTF-8: {}", e)))?;
        Self::parse(text)
    }

    /// First element with the given qualified name, in document order.
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.elements.iter().find(|element| element.name == name)
    }

    /// Every element with the given qualified name, in document order.
    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements.iter().filter(move |element| element.name == name)
    }

    /// Number of elements in the document.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

fn read_element(start: &BytesStart<'_>) -> Result<Element> {
    let name = utf8(start.name().as_ref())?;

    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| malformed(format!("bad attribute on `{}`: {}", name, e)))?;
        let key = utf8(attr.key.as_ref())?;
        let value = attr
            .unescape_value()
            .map_err(|e| malformed(format!("bad value for `{}` on `{}`: {}", key, name, e)))?;
        attributes.push((key, value.into_owned()));
    }

    Ok(Element {
        name,
        attributes,
        text: String::new(),
    })
}

fn append_text(elements: &mut [Element], open: &[usize], content: &str) -> Result<()> {
    if open.is_empty() {
        if content.trim().is_empty() {
            return Ok(());
        }
        return Err(malformed("text outside the root element"));
    }

    for &index in open {
        elements[index].text.push_str(content);
    }
    Ok(())
}

fn utf8(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| malformed(format!("invalid UTF-8: {}", e)))
}

fn malformed(reason: impl Into<String>) -> ExtractionError {
    ExtractionError::MalformedDocument(reason.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn is_malformed(text: &str) -> bool {
        matches!(
            XmlDocument::parse(text),
            Err(ExtractionError::MalformedDocument(_))
        )
    }

    #[test]
    fn test_parse_attributes_and_text() {
        let doc = XmlDocument::parse(
            r#"<?xml version="1.0" encoding="UTF-8"?>
            <dte:GTDocumento xmlns:dte="http://www.sat.gob.gt/dte/fel/0.2.0">
                <dte:NumeroAutorizacion Serie="A" Numero="001">ABC123</dte:NumeroAutorizacion>
                <dte:Item Descripcion="Caf&#233; &amp; t&#233;"/>
            </dte:GTDocumento>"#,
        )
        .unwrap();

        let auth = doc.find("dte:NumeroAutorizacion").unwrap();
        assert_eq!(auth.text(), "ABC123");
        assert_eq!(auth.attribute("Serie"), Some("A"));
        assert_eq!(auth.attribute("Numero"), Some("001"));
        assert_eq!(auth.attribute("Missing"), None);

        let item = doc.find("dte:Item").unwrap();
        assert_eq!(item.attribute("Descripcion"), Some("Café & té"));
        assert_eq!(item.text(), "");
    }

    #[test]
    fn test_text_includes_descendants_and_cdata() {
        let doc = XmlDocument::parse("<a>one<b>two</b><![CDATA[<three>]]></a>").unwrap();
        assert_eq!(doc.find("a").unwrap().text(), "onetwo<three>");
        assert_eq!(doc.find("b").unwrap().text(), "two");
    }

    #[test]
    fn test_find_returns_first_in_document_order() {
        let doc = XmlDocument::parse(
            r#"<root><x id="1"/><nested><x id="2"/></nested><x id="3"/></root>"#,
        )
        .unwrap();

        assert_eq!(doc.find("x").unwrap().attribute("id"), Some("1"));
        let ids: Vec<_> = doc
            .find_all("x")
            .filter_map(|e| e.attribute("id"))
            .collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(doc.len(), 5);
    }

    #[test]
    fn test_names_are_matched_with_prefix() {
        let doc = XmlDocument::parse(r#"<dte:GranTotal>1.00</dte:GranTotal>"#).unwrap();
        assert!(doc.find("dte:GranTotal").is_some());
        assert!(doc.find("GranTotal").is_none());
    }

    #[test]
    fn test_byte_order_mark_is_ignored() {
        let doc = XmlDocument::from_bytes("\u{feff}<root/>".as_bytes()).unwrap();
        assert!(doc.find("root").is_some());
    }

    #[test]
    fn test_malformed_inputs() {
        assert!(is_malformed(""));
        assert!(is_malformed("   "));
        assert!(is_malformed("not xml at all"));
        assert!(is_malformed("<a><b></a>"));
        assert!(is_malformed("<a><b></b>"));
        assert!(is_malformed("<a/><b/>"));
        assert!(is_malformed("<a>text</a>trailing"));
        assert!(is_malformed(r#"<a x="1" x="2"/>"#));
        assert!(is_malformed("<a>&bogus;</a>"));
    }

    #[test]
    fn test_invalid_utf8_is_malformed() {
        let result = XmlDocument::from_bytes(&[b'<', b'a', b'>', 0xff, b'<', b'/', b'a', b'>']);
        assert!(matches!(result, Err(ExtractionError::MalformedDocument(_))));
    }
}
