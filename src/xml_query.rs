use std::collections::HashMap;

use failure::Error;
use failure::Fail;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// An element captured by an `XmlQuery`: its attributes and all of its (descendant) text.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct XmlElement {
    pub attributes: HashMap<String, String>,
    pub text: String,
}

impl XmlElement {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// All elements of a document that matched one of the query's patterns, in document order.
#[derive(Debug, Default)]
pub struct Selection {
    elements: HashMap<String, Vec<XmlElement>>,
}

impl Selection {
    pub fn all(&self, pattern: &str) -> &[XmlElement] {
        self.elements
            .get(pattern)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn first(&self, pattern: &str) -> Option<&XmlElement> {
        self.all(pattern).first()
    }

    /// The text of the first match, if it is not blank.
    pub fn first_text(&self, pattern: &str) -> Option<&str> {
        self.first(pattern)
            .map(|element| element.text.trim())
            .filter(|text| !text.is_empty())
    }

    fn push(&mut self, pattern: &str, element: XmlElement) {
        self.elements
            .entry(pattern.to_string())
            .or_default()
            .push(element);
    }
}

/// Selects elements from an XML document by qualified name.
///
/// A pattern is either a qualified name as written in the document (`safe:orbitNumber`)
/// or `*:` followed by a local name, which matches that name under any prefix.
#[derive(Debug)]
pub struct XmlQuery<'p> {
    patterns: &'p [&'p str],
}

struct OpenElement {
    pattern: usize,
    depth: usize,
    element: XmlElement,
}

impl<'p> XmlQuery<'p> {
    pub fn new(patterns: &'p [&'p str]) -> Self {
        Self { patterns }
    }

    /// Parse the document and collect every element matching one of the patterns.
    pub fn select(&self, xml_bytes: &[u8]) -> Result<Selection, Error> {
        let mut xml_reader = Reader::from_reader(xml_bytes);
        xml_reader.trim_text(true);

        let mut xml_buffer = Vec::new();
        let mut open: Vec<OpenElement> = Vec::new();
        let mut depth = 0;
        let mut selection = Selection::default();

        loop {
            match xml_reader.read_event(&mut xml_buffer) {
                Ok(Event::Start(ref e)) => {
                    depth += 1;

                    if let Some(pattern) = matching_pattern(self.patterns, e.name()) {
                        open.push(OpenElement {
                            pattern,
                            depth,
                            element: XmlElement {
                                attributes: attributes(e),
                                text: String::new(),
                            },
                        });
                    }
                }
                Ok(Event::Empty(ref e)) => {
                    if let Some(pattern) = matching_pattern(self.patterns, e.name()) {
                        selection.push(
                            self.patterns[pattern],
                            XmlElement {
                                attributes: attributes(e),
                                text: String::new(),
                            },
                        );
                    }
                }
                Ok(Event::Text(ref e)) => {
                    if !open.is_empty() {
                        let unescaped = e.unescaped()?;
                        let text = String::from_utf8_lossy(&unescaped);

                        for open_element in open.iter_mut() {
                            if !open_element.element.text.is_empty() {
                                open_element.element.text.push(' ');
                            }
                            open_element.element.text.push_str(&text);
                        }
                    }
                }
                Ok(Event::End(_)) => {
                    if open.last().map_or(false, |element| element.depth == depth) {
                        if let Some(closed) = open.pop() {
                            selection.push(self.patterns[closed.pattern], closed.element);
                        }
                    }

                    depth = depth.saturating_sub(1);
                }
                Ok(Event::Eof) => break, // exits the loop when reaching end of file
                Err(e) => {
                    return Err(MalformedXmlError {
                        position: xml_reader.buffer_position(),
                        cause: e.to_string(),
                    }
                    .into())
                }
                _ => (), // ignore all other events
            }

            xml_buffer.clear();
        }

        Ok(selection)
    }
}

fn matching_pattern(patterns: &[&str], name: &[u8]) -> Option<usize> {
    patterns
        .iter()
        .position(|pattern| match pattern.strip_prefix("*:") {
            Some(local) => local_name(name) == local.as_bytes(),
            None => name == pattern.as_bytes(),
        })
}

/// Strip the namespace prefix from a tag.
fn local_name(tag: &[u8]) -> &[u8] {
    match tag.iter().position(|&b| b == b':') {
        Some(colon) => &tag[colon + 1..],
        None => tag,
    }
}

fn attributes(start: &BytesStart) -> HashMap<String, String> {
    start
        .attributes()
        .filter_map(Result::ok)
        .filter_map(|attribute| {
            let value = attribute.unescaped_value().ok()?;
            Some((
                String::from_utf8_lossy(attribute.key).into_owned(),
                String::from_utf8_lossy(&value).into_owned(),
            ))
        })
        .collect()
}

/// This error occurs when a document is not well-formed XML.
#[derive(Debug, Fail)]
#[fail(display = "Malformed XML at position {}: {}", position, cause)]
pub struct MalformedXmlError {
    position: usize,
    cause: String,
}
