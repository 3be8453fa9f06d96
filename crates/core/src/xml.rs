//! Minimal XML document model over `quick-xml`.
//!
//! Indexers return loosely conforming XML, so the tree is built leniently:
//! unclosed elements are closed at end of input and prefixed names
//! (`torznab:attr`, `newznab:attr`) are kept verbatim.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XmlError {
    #[error("XML parse error at byte {position}: {message}")]
    Malformed { position: u64, message: String },

    #[error("document has no root element")]
    Empty,
}

/// One element with its attributes, text content and children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<XmlElement>,
}

impl XmlElement {
    fn from_start(start: &BytesStart<'_>) -> Self {
        let name = String::from_utf8_lossy(start.name().as_ref()).to_string();
        let attributes = start
            .attributes()
            .flatten()
            .map(|attr| {
                let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
                let value = attr
                    .unescape_value()
                    .map(|v| v.to_string())
                    .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).to_string());
                (key, value)
            })
            .collect();

        Self {
            name,
            attributes,
            text: String::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Concatenated text and CDATA directly inside this element.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn children(&self) -> &[XmlElement] {
        &self.children
    }

    /// First direct child with this tag name.
    pub fn child(&self, tag: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == tag)
    }

    /// Text of the first direct child with this tag name, if non-empty.
    pub fn child_text(&self, tag: &str) -> Option<&str> {
        self.child(tag)
            .map(|c| c.text.trim())
            .filter(|t| !t.is_empty())
    }

    /// First descendant (depth-first, document order) with this tag name.
    pub fn find(&self, tag: &str) -> Option<&XmlElement> {
        for child in &self.children {
            if child.name == tag {
                return Some(child);
            }
            if let Some(found) = child.find(tag) {
                return Some(found);
            }
        }
        None
    }

    /// Every descendant with this tag name, in document order.
    pub fn find_all<'a>(&'a self, tag: &str) -> Vec<&'a XmlElement> {
        let mut out = Vec::new();
        self.collect(tag, &mut out);
        out
    }

    fn collect<'a>(&'a self, tag: &str, out: &mut Vec<&'a XmlElement>) {
        for child in &self.children {
            if child.name == tag {
                out.push(child);
            }
            child.collect(tag, out);
        }
    }

    /// Whether any descendant name starts with `prefix`.
    pub fn any_name_starts_with(&self, prefix: &str) -> bool {
        self.children
            .iter()
            .any(|c| c.name.starts_with(prefix) || c.any_name_starts_with(prefix))
    }
}

/// A parsed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    /// Synthetic container whose children are the top-level elements.
    top: XmlElement,
}

impl XmlDocument {
    pub fn parse(text: &str) -> Result<Self, XmlError> {
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(true);

        // stack[0] is the synthetic document container
        let mut stack: Vec<XmlElement> = vec![XmlElement::default()];

        loop {
            let event = reader.read_event().map_err(|e| XmlError::Malformed {
                position: reader.buffer_position() as u64,
                message: e.to_string(),
            })?;

            match event {
                Event::Start(ref e) => stack.push(XmlElement::from_start(e)),
                Event::Empty(ref e) => {
                    let element = XmlElement::from_start(e);
                    push_child(&mut stack, element);
                }
                Event::End(_) => {
                    if stack.len() > 1 {
                        if let Some(element) = stack.pop() {
                            push_child(&mut stack, element);
                        }
                    }
                }
                Event::Text(ref e) => {
                    let text = e
                        .unescape()
                        .map(|t| t.to_string())
                        .unwrap_or_else(|_| String::from_utf8_lossy(e).to_string());
                    append_text(&mut stack, &text);
                }
                Event::CData(e) => {
                    let text = String::from_utf8_lossy(&e.into_inner()).to_string();
                    append_text(&mut stack, &text);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        while stack.len() > 1 {
            if let Some(element) = stack.pop() {
                push_child(&mut stack, element);
            }
        }

        let top = stack.pop().unwrap_or_default();
        if top.children.is_empty() {
            return Err(XmlError::Empty);
        }

        Ok(Self { top })
    }

    /// The first top-level element.
    pub fn root(&self) -> &XmlElement {
        &self.top.children[0]
    }

    pub fn find(&self, tag: &str) -> Option<&XmlElement> {
        self.top.find(tag)
    }

    pub fn find_all(&self, tag: &str) -> Vec<&XmlElement> {
        self.top.find_all(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.find(tag).is_some()
    }

    pub fn any_name_starts_with(&self, prefix: &str) -> bool {
        self.top.any_name_starts_with(prefix)
    }
}

fn push_child(stack: &mut [XmlElement], element: XmlElement) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
    }
}

fn append_text(stack: &mut [XmlElement], text: &str) {
    if let Some(current) = stack.last_mut() {
        current.text.push_str(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:torznab="http://torznab.com/schemas/2015/feed">
  <channel>
    <item>
      <title><![CDATA[Show.S01E01.720p]]></title>
      <torznab:attr name="seeders" value="12"/>
    </item>
    <item>
      <title>Show &amp; Co</title>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_and_find() {
        let doc = XmlDocument::parse(DOC).unwrap();
        assert_eq!(doc.root().name, "rss");
        assert_eq!(
            doc.root().attr("xmlns:torznab"),
            Some("http://torznab.com/schemas/2015/feed")
        );

        let items = doc.find_all("item");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].child_text("title"), Some("Show.S01E01.720p"));
        assert_eq!(items[1].child_text("title"), Some("Show & Co"));

        let attr = doc.find("torznab:attr").unwrap();
        assert_eq!(attr.attr("name"), Some("seeders"));
        assert_eq!(attr.attr("value"), Some("12"));
        assert!(doc.any_name_starts_with("torznab:"));
        assert!(!doc.contains("categories"));
    }

    #[test]
    fn test_mismatched_tags_are_malformed() {
        let result = XmlDocument::parse("<html><body><p>Error</div></body></html>");
        assert!(matches!(result, Err(XmlError::Malformed { .. })));
    }

    #[test]
    fn test_plain_text_is_empty_document() {
        assert_eq!(
            XmlDocument::parse("Service temporarily unavailable"),
            Err(XmlError::Empty)
        );
    }
}
