use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::XmlError;
use crate::tree::{Document, Element, Node};
use crate::Result;

impl Document {
    /// Parses raw file content. Empty content yields an empty document.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not UTF-8 or not well-formed XML.
    pub fn from_bytes(content: &[u8]) -> Result<Self> {
        Self::parse(std::str::from_utf8(content)?)
    }

    /// Parses a document, dropping whitespace-only text, comments, processing
    /// instructions and the XML declaration. Text content is trimmed.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not well-formed XML.
    pub fn parse(content: &str) -> Result<Self> {
        let content = content.trim_start_matches('\u{feff}');
        let mut reader = Reader::from_str(content);
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event()? {
                Event::Start(start) => stack.push(element_from(&start)?),
                Event::Empty(start) => attach(&mut stack, &mut root, element_from(&start)?)?,
                Event::End(_) => {
                    let element = stack.pop().ok_or(XmlError::UnexpectedEnd)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => push_text(&mut stack, &text.unescape()?),
                Event::CData(data) => {
                    let bytes = data.into_inner();
                    push_text(&mut stack, std::str::from_utf8(&bytes)?);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(unclosed) = stack.pop() {
            return Err(XmlError::UnclosedElement {
                name: unclosed.name,
            });
        }

        Ok(Self::from_root(root))
    }
}

fn element_from(start: &BytesStart<'_>) -> Result<Element> {
    let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()));
    for attribute in start.attributes() {
        let attribute = attribute?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute.unescape_value()?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(Node::Element(element));
        return Ok(());
    }
    if root.is_some() {
        return Err(XmlError::MultipleRoots);
    }
    *root = Some(element);
    Ok(())
}

fn push_text(stack: &mut [Element], text: &str) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    if let Some(parent) = stack.last_mut() {
        parent.children.push(Node::Text(text.to_owned()));
    }
}
