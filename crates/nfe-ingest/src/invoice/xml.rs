//! Owned XML element tree with resolved namespaces.

use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;

use crate::error::DocumentParseError;

use super::namespace::QName;

/// An element with its resolved namespace, attributes, text and children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    /// Namespace URI bound to the element, if any.
    pub namespace: Option<String>,
    /// Local name without prefix.
    pub name: String,
    /// Attributes by local name, namespace declarations excluded.
    pub attributes: Vec<(String, String)>,
    /// Concatenated character data directly inside this element.
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Trimmed text content.
    pub fn text(&self) -> &str {
        self.text.trim()
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn first_child(&self) -> Option<&XmlElement> {
        self.children.first()
    }

    /// Direct children matching `name`.
    pub fn children_named<'a>(&'a self, name: QName<'_>) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |child| name.matches(child))
    }

    /// All descendants in document order, excluding `self`.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }

    /// Descendants matching `name`, in document order.
    pub fn find_all<'a>(&'a self, name: QName<'_>) -> impl Iterator<Item = &'a XmlElement> {
        self.descendants().filter(move |element| name.matches(element))
    }

    /// First descendant matching `name`.
    pub fn find(&self, name: QName<'_>) -> Option<&XmlElement> {
        self.descendants().find(|element| name.matches(element))
    }

    /// First match of a path whose head is any descendant and whose tail
    /// steps through direct children (`.//a/b/c`).
    pub fn find_path(&self, path: &[QName<'_>]) -> Option<&XmlElement> {
        let (head, tail) = path.split_first()?;
        self.find_all(*head)
            .find_map(|element| element.follow_children(tail))
    }

    fn follow_children(&self, path: &[QName<'_>]) -> Option<&XmlElement> {
        let Some((head, tail)) = path.split_first() else {
            return Some(self);
        };
        self.children_named(*head)
            .find_map(|child| child.follow_children(tail))
    }
}

/// Pre-order traversal over an element's descendants.
pub struct Descendants<'a> {
    stack: Vec<&'a XmlElement>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a XmlElement;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.stack.pop()?;
        self.stack.extend(element.children.iter().rev());
        Some(element)
    }
}

/// A parsed XML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    root: XmlElement,
}

impl XmlDocument {
    pub fn root(&self) -> &XmlElement {
        &self.root
    }
}

/// Deepest element nesting accepted by [`parse_document`].
pub const MAX_DEPTH: usize = 256;

/// Parses XML text into an element tree.
///
/// Comments, processing instructions and the declaration are dropped.
/// Documents nested deeper than [`MAX_DEPTH`] are rejected.
pub fn parse_document(xml: &str) -> Result<XmlDocument, DocumentParseError> {
    let mut reader = NsReader::from_str(xml);
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let step = reader
            .read_resolved_event()
            .map(|(resolved, event)| (namespace_uri(&resolved), event));
        let (namespace, event) = match step {
            Ok(step) => step,
            Err(e) => {
                return Err(DocumentParseError::Xml {
                    position: reader.buffer_position() as u64,
                    message: e.to_string(),
                });
            }
        };

        match event {
            Event::Start(start) => {
                if stack.len() >= MAX_DEPTH {
                    return Err(xml_error(&reader, "element nesting too deep"));
                }
                stack.push(element_from(namespace, &start));
            }
            Event::Empty(start) => {
                let element = element_from(namespace, &start);
                attach(&mut stack, &mut root, element, &reader)?;
            }
            Event::End(_) => {
                let element = stack.pop().ok_or_else(|| xml_error(&reader, "unexpected end tag"))?;
                attach(&mut stack, &mut root, element, &reader)?;
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&text));
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::GeneralRef(reference) => {
                if let Some(current) = stack.last_mut() {
                    let name = String::from_utf8_lossy(&reference);
                    current.text.push_str(&resolve_entity(&name));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(xml_error(&reader, "unclosed element at end of document"));
    }

    root.map(|root| XmlDocument { root })
        .ok_or(DocumentParseError::NoRootElement)
}

fn namespace_uri(resolved: &ResolveResult<'_>) -> Option<String> {
    match resolved {
        ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.as_ref()).into_owned()),
        _ => None,
    }
}

fn element_from(namespace: Option<String>, start: &BytesStart<'_>) -> XmlElement {
    let attributes = start
        .attributes()
        .flatten()
        .filter(|attr| {
            let key = attr.key.as_ref();
            key != b"xmlns" && !key.starts_with(b"xmlns:")
        })
        .map(|attr| {
            (
                String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned(),
                String::from_utf8_lossy(&attr.value).into_owned(),
            )
        })
        .collect();

    XmlElement {
        namespace,
        name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
        attributes,
        text: String::new(),
        children: Vec::new(),
    }
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
    reader: &NsReader<&[u8]>,
) -> Result<(), DocumentParseError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(xml_error(reader, "multiple root elements")),
    }
    Ok(())
}

fn xml_error(reader: &NsReader<&[u8]>, message: &str) -> DocumentParseError {
    DocumentParseError::Xml {
        position: reader.buffer_position() as u64,
        message: message.to_string(),
    }
}

/// Expands a predefined entity or character reference name.
fn resolve_entity(name: &str) -> String {
    let predefined = match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => None,
    };
    let resolved = predefined.or_else(|| {
        let code = name.strip_prefix('#')?;
        let value = match code.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => code.parse().ok()?,
        };
        char::from_u32(value)
    });
    resolved.map_or_else(|| format!("&{name};"), String::from)
}
