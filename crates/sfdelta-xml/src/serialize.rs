use std::fmt::Write;

use quick_xml::escape::{escape, partial_escape};

use crate::tree::{Document, Element, Node};

const DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
const INDENT: &str = "    ";

impl Document {
    /// Renders the document with an XML declaration and four-space indentation.
    ///
    /// Elements holding only text are written on one line, elements without
    /// children self-close.
    #[must_use]
    pub fn to_xml_string(&self) -> String {
        let mut out = String::from(DECLARATION);
        out.push('\n');
        if let Some(root) = self.root() {
            write_element(&mut out, root, 0);
        }
        out
    }
}

fn write_element(out: &mut String, element: &Element, depth: usize) {
    let indent = INDENT.repeat(depth);
    out.push_str(&indent);
    out.push('<');
    out.push_str(&element.name);
    for (key, value) in &element.attributes {
        let _ = write!(out, " {key}=\"{}\"", escape(value.as_str()));
    }

    if element.children.is_empty() {
        out.push_str("/>\n");
        return;
    }
    out.push('>');

    if element.has_elements() {
        out.push('\n');
        for child in &element.children {
            match child {
                Node::Element(nested) => write_element(out, nested, depth + 1),
                Node::Text(text) => {
                    out.push_str(&INDENT.repeat(depth + 1));
                    out.push_str(&partial_escape(text.as_str()));
                    out.push('\n');
                }
            }
        }
        out.push_str(&indent);
    } else if let Some(text) = element.text() {
        out.push_str(&partial_escape(text.as_str()));
    }

    let _ = writeln!(out, "</{}>", element.name);
}
